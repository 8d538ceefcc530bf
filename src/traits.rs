//! Collaborator seams for the route planner.
//!
//! The planner only orchestrates; geocoding, routing, vehicle data and
//! persistence live behind these traits. Implementations are called from
//! several threads at once during one planning request, so the planner
//! requires them to be `Sync`.

use crate::error::BackendError;
use crate::model::{
    GeocodeMatch, NewRoute, RouteRequest, RouteResponse, SavedRoute, Session, VehicleProfile,
};

/// Resolves free text to coordinates.
pub trait Geocoder {
    /// Matches ordered by relevance. Zero matches is `BackendError::NotFound`.
    fn geocode(&self, session: &Session, query: &str) -> Result<Vec<GeocodeMatch>, BackendError>;
}

/// Computes one route, or an eco/shortest pair, between two coordinates.
pub trait RouteMetricsProvider {
    fn route_metrics(
        &self,
        session: &Session,
        request: &RouteRequest,
    ) -> Result<RouteResponse, BackendError>;
}

/// Looks up vehicle profiles by id.
pub trait VehicleDirectory {
    /// Unknown ids are `BackendError::NotFound`.
    fn vehicle(&self, session: &Session, vehicle_id: &str) -> Result<VehicleProfile, BackendError>;
}

/// Persists a route the user decided to keep.
pub trait RouteStore {
    fn save_route(&self, session: &Session, route: &NewRoute) -> Result<SavedRoute, BackendError>;
}
