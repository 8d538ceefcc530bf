//! HTTP adapter for the application backend.
//!
//! One client covers geocoding, route calculation, vehicle lookup and route
//! persistence. Calls are blocking; the configured timeout bounds each one.

use std::env;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BackendError;
use crate::model::{
    Coordinate, GeocodeMatch, NewRoute, RawRoute, RouteRequest, RouteResponse, SavedRoute,
    Session, VehicleProfile,
};
use crate::polyline::{AxisOrder, Geometry};
use crate::traits::{Geocoder, RouteMetricsProvider, RouteStore, VehicleDirectory};

pub const BACKEND_URL_VAR: &str = "ECOROUTE_BACKEND_URL";
pub const TIMEOUT_SECS_VAR: &str = "ECOROUTE_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 10,
        }
    }
}

impl BackendConfig {
    /// Defaults overridden by `ECOROUTE_BACKEND_URL` and `ECOROUTE_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var(BACKEND_URL_VAR) {
            config.base_url = url;
        }
        if let Some(secs) = env::var(TIMEOUT_SECS_VAR)
            .ok()
            .and_then(|value| value.parse().ok())
        {
            config.timeout_secs = secs;
        }
        config
    }
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    config: BackendConfig,
    client: reqwest::blocking::Client,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// `/cars/{id}` with the id as one percent-encoded path segment.
    fn vehicle_url(&self, vehicle_id: &str) -> Result<reqwest::Url, BackendError> {
        if matches!(vehicle_id, "." | "..") {
            return Err(BackendError::not_found("vehicle"));
        }
        let mut url = reqwest::Url::parse(&self.url("/cars"))
            .map_err(|err| BackendError::Unavailable(format!("invalid backend url: {}", err)))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::Unavailable("backend url cannot carry a path".into()))?
            .push(vehicle_id);
        Ok(url)
    }

    fn send<T: DeserializeOwned>(
        &self,
        session: &Session,
        request: reqwest::blocking::RequestBuilder,
        what: &str,
    ) -> Result<T, BackendError> {
        let request = match &session.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send()?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::not_found(what));
        }
        if status.is_client_error() {
            let message = response.text().unwrap_or_default();
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            return Err(BackendError::Unavailable(format!(
                "{} request returned {}",
                what, status
            )));
        }

        Ok(response.json::<T>()?)
    }
}

impl Geocoder for BackendClient {
    #[tracing::instrument(skip(self, session))]
    fn geocode(&self, session: &Session, query: &str) -> Result<Vec<GeocodeMatch>, BackendError> {
        let request = self
            .client
            .get(self.url("/routes/geocode/search"))
            .query(&[("text", query)]);
        let body: GeocodeBody = self.send(session, request, "place")?;

        let matches: Vec<GeocodeMatch> = body.features.into_iter().map(Into::into).collect();
        if matches.is_empty() {
            return Err(BackendError::not_found(format!("place {:?}", query)));
        }
        debug!(count = matches.len(), "geocode matches");
        Ok(matches)
    }
}

impl RouteMetricsProvider for BackendClient {
    #[tracing::instrument(skip(self, session))]
    fn route_metrics(
        &self,
        session: &Session,
        request: &RouteRequest,
    ) -> Result<RouteResponse, BackendError> {
        let body = CalculateRouteRequest {
            coordinates: [request.start, request.end],
            car_id: &request.vehicle_id,
        };
        let http = self
            .client
            .post(self.url("/routes/calculate-route"))
            .json(&body);
        let response: CalculateRouteBody = self.send(session, http, "route")?;
        response.into_route_response()
    }
}

impl VehicleDirectory for BackendClient {
    #[tracing::instrument(skip(self, session))]
    fn vehicle(&self, session: &Session, vehicle_id: &str) -> Result<VehicleProfile, BackendError> {
        let request = self.client.get(self.vehicle_url(vehicle_id)?);
        let car: CarBody = self.send(session, request, "vehicle")?;
        Ok(car.into())
    }
}

impl RouteStore for BackendClient {
    #[tracing::instrument(skip(self, session))]
    fn save_route(&self, session: &Session, route: &NewRoute) -> Result<SavedRoute, BackendError> {
        let request = self.client.post(self.url("/routes")).json(route);
        let saved: SavedRouteBody = self.send(session, request, "route")?;
        Ok(SavedRoute {
            id: saved.id.into_string(),
        })
    }
}

// Wire shapes.

#[derive(Debug, Deserialize)]
struct GeocodeBody {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: PointGeometry,
    #[serde(default)]
    properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    coordinates: Coordinate,
}

#[derive(Debug, Default, Deserialize)]
struct FeatureProperties {
    label: Option<String>,
    name: Option<String>,
}

impl From<Feature> for GeocodeMatch {
    fn from(feature: Feature) -> Self {
        let label = feature
            .properties
            .label
            .or(feature.properties.name)
            .unwrap_or_default();
        GeocodeMatch {
            label,
            coordinate: feature.geometry.coordinates,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateRouteRequest<'a> {
    coordinates: [Coordinate; 2],
    car_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CalculateRouteBody {
    Comparison {
        eco_route: WireRoute,
        #[serde(default)]
        shortest_route: Option<WireRoute>,
    },
    Routes {
        routes: Vec<WireRoute>,
    },
}

impl CalculateRouteBody {
    fn into_route_response(self) -> Result<RouteResponse, BackendError> {
        match self {
            CalculateRouteBody::Comparison {
                eco_route,
                shortest_route,
            } => match shortest_route {
                Some(shortest) => Ok(RouteResponse::Comparison {
                    eco: eco_route.into_raw()?,
                    shortest: shortest.into_raw()?,
                }),
                None => {
                    debug!("eco route returned without a shortest route");
                    Ok(RouteResponse::Single(eco_route.into_raw()?))
                }
            },
            CalculateRouteBody::Routes { routes } => {
                if routes.len() > 2 {
                    debug!(count = routes.len(), "ignoring routes beyond the first two");
                }
                let mut routes = routes.into_iter();
                let first = routes
                    .next()
                    .ok_or_else(|| BackendError::InvalidResponse("no routes returned".into()))?;
                match routes.next() {
                    Some(second) => Ok(RouteResponse::Comparison {
                        eco: first.into_raw()?,
                        shortest: second.into_raw()?,
                    }),
                    None => Ok(RouteResponse::Single(first.into_raw()?)),
                }
            }
        }
    }
}

/// A route carries its geometry either nested (`geometry`) or flat (`coordinates`).
#[derive(Debug, Deserialize)]
struct WireRoute {
    geometry: Option<WireGeometry>,
    coordinates: Option<Vec<Coordinate>>,
    distance: Option<f64>,
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireGeometry {
    Encoded(String),
    LineString { coordinates: Vec<Coordinate> },
}

impl WireRoute {
    fn into_raw(self) -> Result<RawRoute, BackendError> {
        let geometry = match (self.geometry, self.coordinates) {
            (Some(WireGeometry::Encoded(polyline)), _) => {
                Geometry::encoded(polyline, AxisOrder::LatLon)
            }
            (Some(WireGeometry::LineString { coordinates }), _) | (None, Some(coordinates)) => {
                Geometry::Coordinates(coordinates)
            }
            (None, None) => {
                return Err(BackendError::InvalidResponse(
                    "route without geometry".into(),
                ));
            }
        };
        Ok(RawRoute {
            geometry,
            distance_m: self.distance,
            duration_s: self.duration,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CarBody {
    id: WireId,
    fuel_consumption: f64,
    #[serde(alias = "engine_type")]
    vehicle_type: Option<String>,
    #[serde(alias = "fuel_type")]
    fuel_type: Option<String>,
    weight: Option<f64>,
    year: Option<u16>,
}

impl From<CarBody> for VehicleProfile {
    fn from(car: CarBody) -> Self {
        VehicleProfile {
            id: car.id.into_string(),
            fuel_consumption: car.fuel_consumption,
            vehicle_type: car.vehicle_type,
            fuel_type: car.fuel_type,
            weight_kg: car.weight,
            model_year: car.year,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SavedRouteBody {
    id: WireId,
}

/// Ids arrive as strings from some endpoints and numbers from others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(u64),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Text(id) => id,
            WireId::Number(id) => id.to_string(),
        }
    }
}
