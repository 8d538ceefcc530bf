//! In-memory collaborators that record how the planner calls them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use eco_route_planner::model::{
    GeocodeMatch, NewRoute, RawRoute, RouteRequest, RouteResponse, SavedRoute,
};
use eco_route_planner::polyline::Geometry;
use eco_route_planner::traits::{Geocoder, RouteMetricsProvider, RouteStore, VehicleDirectory};
use eco_route_planner::{BackendError, Coordinate, Session, VehicleProfile};

use super::turkish_cities::Location;

// ============================================================================
// Geocoder
// ============================================================================

#[derive(Default)]
pub struct FakeGeocoder {
    places: HashMap<String, Vec<GeocodeMatch>>,
    failures: HashMap<String, BackendError>,
    queries: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(mut self, location: &Location) -> Self {
        self.places
            .entry(location.name.to_string())
            .or_default()
            .push(GeocodeMatch {
                label: location.name.to_string(),
                coordinate: location.coordinate(),
            });
        self
    }

    /// Adds a lower-ranked match under an existing query.
    pub fn extra_match(mut self, query: &str, label: &str, coordinate: Coordinate) -> Self {
        self.places
            .entry(query.to_string())
            .or_default()
            .push(GeocodeMatch {
                label: label.to_string(),
                coordinate,
            });
        self
    }

    pub fn failing(mut self, query: &str, error: BackendError) -> Self {
        self.failures.insert(query.to_string(), error);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        let mut queries = self.queries.lock().unwrap().clone();
        queries.sort();
        queries
    }
}

impl Geocoder for FakeGeocoder {
    fn geocode(&self, _session: &Session, query: &str) -> Result<Vec<GeocodeMatch>, BackendError> {
        self.queries.lock().unwrap().push(query.to_string());
        if let Some(error) = self.failures.get(query) {
            return Err(error.clone());
        }
        match self.places.get(query) {
            Some(matches) if !matches.is_empty() => Ok(matches.clone()),
            _ => Err(BackendError::not_found(format!("place {:?}", query))),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub struct FakeRouter {
    response: Result<RouteResponse, BackendError>,
    calls: AtomicUsize,
    last_request: Mutex<Option<RouteRequest>>,
}

impl FakeRouter {
    pub fn single(route: RawRoute) -> Self {
        Self::responding(Ok(RouteResponse::Single(route)))
    }

    pub fn comparison(eco: RawRoute, shortest: RawRoute) -> Self {
        Self::responding(Ok(RouteResponse::Comparison { eco, shortest }))
    }

    pub fn failing(error: BackendError) -> Self {
        Self::responding(Err(error))
    }

    fn responding(response: Result<RouteResponse, BackendError>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RouteRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl RouteMetricsProvider for FakeRouter {
    fn route_metrics(
        &self,
        _session: &Session,
        request: &RouteRequest,
    ) -> Result<RouteResponse, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.response.clone()
    }
}

/// A raw route over `points` with backend-reported metrics.
pub fn reported_route(points: Vec<Coordinate>, distance_m: f64, duration_s: f64) -> RawRoute {
    RawRoute::new(Geometry::Coordinates(points)).with_metrics(distance_m, duration_s)
}

/// A raw route over `points` with no metrics, as the eco/shortest endpoint returns.
pub fn bare_route(points: Vec<Coordinate>) -> RawRoute {
    RawRoute::new(Geometry::Coordinates(points))
}

// ============================================================================
// Vehicles
// ============================================================================

#[derive(Default)]
pub struct FakeVehicles {
    vehicles: HashMap<String, VehicleProfile>,
    failure: Option<BackendError>,
    calls: AtomicUsize,
}

impl FakeVehicles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, vehicle: VehicleProfile) -> Self {
        self.vehicles.insert(vehicle.id.clone(), vehicle);
        self
    }

    pub fn failing(mut self, error: BackendError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VehicleDirectory for FakeVehicles {
    fn vehicle(&self, _session: &Session, vehicle_id: &str) -> Result<VehicleProfile, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.vehicles
            .get(vehicle_id)
            .cloned()
            .ok_or_else(|| BackendError::not_found("vehicle"))
    }
}

// ============================================================================
// Route store
// ============================================================================

#[derive(Default)]
pub struct FakeStore {
    saved: Mutex<Vec<NewRoute>>,
    failure: Option<BackendError>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: BackendError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn saved(&self) -> Vec<NewRoute> {
        self.saved.lock().unwrap().clone()
    }
}

impl RouteStore for FakeStore {
    fn save_route(&self, _session: &Session, route: &NewRoute) -> Result<SavedRoute, BackendError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        let mut saved = self.saved.lock().unwrap();
        saved.push(route.clone());
        Ok(SavedRoute {
            id: format!("route-{}", saved.len()),
        })
    }
}
