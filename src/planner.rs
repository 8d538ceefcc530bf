//! Route comparison planner.
//!
//! Turns two place names and a vehicle into a [`RoutePlan`]: geocode both
//! endpoints, fetch route metrics and the vehicle profile, normalize the
//! router's response, then price each candidate.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BackendError, PlanError};
use crate::fuel::FuelCostModel;
use crate::haversine::{path_distance_m, SpeedEstimate, DEFAULT_SPEED_KMH};
use crate::model::{
    Choice, Coordinate, CostBasis, Endpoint, GeocodeMatch, MetricSource, NewRoute, RawRoute,
    RouteCandidate, RoutePlan, RouteRequest, RouteResponse, SavedRoute, Session, Strategy,
    VehicleProfile,
};
use crate::traits::{Geocoder, RouteMetricsProvider, RouteStore, VehicleDirectory};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub fuel: FuelCostModel,
    /// Speed used to estimate durations the router did not report.
    pub average_speed_kmh: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            fuel: FuelCostModel::default(),
            average_speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

/// Plans eco/shortest route comparisons over borrowed collaborators.
///
/// Holds no mutable state; one planner can serve concurrent requests.
#[derive(Debug)]
pub struct RoutePlanner<'a, G, R, V> {
    geocoder: &'a G,
    router: &'a R,
    vehicles: &'a V,
    config: PlannerConfig,
}

impl<'a, G, R, V> RoutePlanner<'a, G, R, V>
where
    G: Geocoder + Sync,
    R: RouteMetricsProvider + Sync,
    V: VehicleDirectory + Sync,
{
    pub fn new(geocoder: &'a G, router: &'a R, vehicles: &'a V, config: PlannerConfig) -> Self {
        Self {
            geocoder,
            router,
            vehicles,
            config,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Builds a route plan from two place names and a vehicle id.
    ///
    /// Any failure aborts the whole plan. When several steps fail, the
    /// reported error follows a fixed order: start, end, vehicle, route.
    #[tracing::instrument(skip(self, session), fields(user_id = session.user_id))]
    pub fn plan_route(
        &self,
        session: &Session,
        start_text: &str,
        end_text: &str,
        vehicle_id: &str,
    ) -> Result<RoutePlan, PlanError> {
        if vehicle_id.trim().is_empty() {
            return Err(PlanError::VehicleNotFound {
                vehicle_id: vehicle_id.to_string(),
            });
        }

        let (start, end) = rayon::join(
            || self.resolve(session, Endpoint::Start, start_text),
            || self.resolve(session, Endpoint::End, end_text),
        );
        let start = start?;
        let end = end?;
        debug!(start = %start.label, end = %end.label, "endpoints resolved");

        let request = RouteRequest {
            start: start.coordinate,
            end: end.coordinate,
            vehicle_id: vehicle_id.to_string(),
        };
        let (vehicle, response) = rayon::join(
            || self.vehicles.vehicle(session, vehicle_id),
            || self.router.route_metrics(session, &request),
        );
        let vehicle = vehicle.map_err(|source| vehicle_error(vehicle_id, source))?;
        validate_vehicle(&vehicle)?;
        let response = response.map_err(|source| {
            warn!(error = %source, "route metrics request failed");
            PlanError::RoutingBackendUnavailable { source }
        })?;

        self.assemble(start.coordinate, end.coordinate, &vehicle, response)
    }

    /// All geocoding matches for the text typed into one endpoint field.
    ///
    /// Blank text and "no match" both yield an empty list.
    pub fn suggest(
        &self,
        session: &Session,
        endpoint: Endpoint,
        text: &str,
    ) -> Result<Vec<GeocodeMatch>, PlanError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match self.geocoder.geocode(session, text) {
            Ok(matches) => Ok(matches),
            Err(BackendError::NotFound { .. }) => Ok(Vec::new()),
            Err(source) => Err(PlanError::GeocodeFailed {
                endpoint,
                query: text.to_string(),
                source,
            }),
        }
    }

    fn resolve(
        &self,
        session: &Session,
        endpoint: Endpoint,
        text: &str,
    ) -> Result<GeocodeMatch, PlanError> {
        let failed = |source| PlanError::GeocodeFailed {
            endpoint,
            query: text.to_string(),
            source,
        };

        if text.trim().is_empty() {
            return Err(failed(BackendError::not_found("place")));
        }

        let matches = self.geocoder.geocode(session, text).map_err(|source| {
            warn!(%endpoint, query = text, error = %source, "geocoding failed");
            failed(source)
        })?;

        matches
            .into_iter()
            .next()
            .ok_or_else(|| failed(BackendError::not_found(format!("place {:?}", text))))
    }

    fn assemble(
        &self,
        start: Coordinate,
        end: Coordinate,
        vehicle: &VehicleProfile,
        response: RouteResponse,
    ) -> Result<RoutePlan, PlanError> {
        let rate = vehicle.fuel_consumption;
        let fuel = &self.config.fuel;

        let (primary, alternative) = match response {
            RouteResponse::Single(route) => {
                let mut primary = self.candidate(Strategy::Baseline, start, end, route)?;
                primary.fuel_cost = fuel.cost(primary.distance_m, rate);
                (primary, None)
            }
            RouteResponse::Comparison { eco, shortest } => {
                let mut shortest = self.candidate(Strategy::Shortest, start, end, shortest)?;
                shortest.fuel_cost = fuel.cost(shortest.distance_m, rate);

                let mut eco = self.candidate(Strategy::Eco, start, end, eco)?;
                eco.fuel_cost = fuel.eco_cost(shortest.fuel_cost);
                eco.cost_basis = CostBasis::EcoDiscount;
                (eco, Some(shortest))
            }
        };

        Ok(RoutePlan {
            vehicle_id: vehicle.id.clone(),
            primary,
            alternative,
        })
    }

    /// Normalizes one raw route. Fuel cost is left at zero for the caller.
    fn candidate(
        &self,
        strategy: Strategy,
        start: Coordinate,
        end: Coordinate,
        route: RawRoute,
    ) -> Result<RouteCandidate, PlanError> {
        let malformed = |source| PlanError::MalformedGeometry { strategy, source };
        let geometry = route.geometry.into_polyline().map_err(malformed)?;
        geometry.ensure_route().map_err(malformed)?;

        let (distance_m, distance_source) = match route.distance_m {
            Some(distance) => (distance, MetricSource::Reported),
            None => {
                let distance = path_distance_m(geometry.points());
                debug!(%strategy, distance, "distance derived from geometry");
                (distance, MetricSource::Derived)
            }
        };
        check_metric(strategy, "distance", distance_m)?;

        let (duration_s, duration_source) = match route.duration_s {
            Some(duration) => (duration, MetricSource::Reported),
            None => {
                let duration =
                    SpeedEstimate::new(self.config.average_speed_kmh).duration_s(distance_m);
                debug!(%strategy, duration, "duration estimated from distance");
                (duration, MetricSource::Derived)
            }
        };
        check_metric(strategy, "duration", duration_s)?;

        Ok(RouteCandidate {
            strategy,
            start,
            end,
            geometry,
            distance_m,
            duration_s,
            fuel_cost: 0.0,
            distance_source,
            duration_source,
            cost_basis: CostBasis::Modeled,
        })
    }
}

/// Stores the chosen candidate of a plan.
#[tracing::instrument(skip(store, session, plan), fields(vehicle_id = %plan.vehicle_id))]
pub fn save_candidate<S: RouteStore>(
    store: &S,
    session: &Session,
    plan: &RoutePlan,
    choice: Choice,
) -> Result<SavedRoute, PlanError> {
    let candidate = plan.candidate(choice).ok_or(PlanError::InvalidChoice)?;
    let route = NewRoute {
        start_coordinate: candidate.start,
        end_coordinate: candidate.end,
        car_id: plan.vehicle_id.clone(),
    };
    store
        .save_route(session, &route)
        .map_err(|source| PlanError::PersistFailed { source })
}

fn vehicle_error(vehicle_id: &str, source: BackendError) -> PlanError {
    match source {
        BackendError::NotFound { .. } => PlanError::VehicleNotFound {
            vehicle_id: vehicle_id.to_string(),
        },
        source => {
            warn!(vehicle_id, error = %source, "vehicle lookup failed");
            PlanError::VehicleLookupFailed {
                vehicle_id: vehicle_id.to_string(),
                source,
            }
        }
    }
}

fn validate_vehicle(vehicle: &VehicleProfile) -> Result<(), PlanError> {
    let rate = vehicle.fuel_consumption;
    if !rate.is_finite() || rate < 0.0 {
        return Err(PlanError::InvalidVehicleProfile {
            vehicle_id: vehicle.id.clone(),
            reason: format!("fuel consumption {} L/100km", rate),
        });
    }
    Ok(())
}

fn check_metric(strategy: Strategy, name: &str, value: f64) -> Result<(), PlanError> {
    if !value.is_finite() || value < 0.0 {
        return Err(PlanError::InvalidRouteMetrics {
            strategy,
            reason: format!("{} is {}", name, value),
        });
    }
    Ok(())
}
