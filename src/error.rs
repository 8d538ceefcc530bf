//! Error types for route planning and its collaborators.

use thiserror::Error;

use crate::model::{Endpoint, Strategy};

/// Failure reported by a collaborator (geocoder, router, vehicle directory, route store).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    /// The backend answered but has nothing for the request.
    #[error("{what} not found")]
    NotFound { what: String },

    /// Transport failure, timeout or server-side error. Retrying may help.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the request.
    #[error("backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response body did not match the expected contract.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    pub fn not_found(what: impl Into<String>) -> Self {
        BackendError::NotFound { what: what.into() }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::InvalidResponse(err.to_string())
        } else {
            BackendError::Unavailable(err.to_string())
        }
    }
}

/// Failure while turning a backend geometry into a coordinate sequence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// The encoded string ended while a value still expected more chunks.
    #[error("encoded polyline ends mid-value at byte {offset}")]
    TruncatedValue { offset: usize },

    /// An odd number of values was decoded, so the last latitude has no longitude.
    #[error("encoded polyline ends with an unpaired coordinate at byte {offset}")]
    UnpairedCoordinate { offset: usize },

    #[error("invalid polyline character {character:?} at byte {offset}")]
    InvalidCharacter { offset: usize, character: char },

    /// A value too long for 5-digit degrees, or a point outside ±180°/±90°.
    #[error("encoded polyline value out of range at byte {offset}")]
    ValueOutOfRange { offset: usize },

    /// A route geometry needs at least a start and an end point.
    #[error("route geometry has {found} point(s), at least 2 required")]
    TooFewPoints { found: usize },
}

/// The single failure returned by [`crate::planner::RoutePlanner::plan_route`].
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("geocoding failed for {endpoint} point {query:?}: {source}")]
    GeocodeFailed {
        endpoint: Endpoint,
        query: String,
        #[source]
        source: BackendError,
    },

    #[error("route calculation failed: {source}")]
    RoutingBackendUnavailable {
        #[source]
        source: BackendError,
    },

    #[error("{strategy} route geometry is malformed: {source}")]
    MalformedGeometry {
        strategy: Strategy,
        #[source]
        source: GeometryError,
    },

    #[error("{strategy} route metrics are invalid: {reason}")]
    InvalidRouteMetrics { strategy: Strategy, reason: String },

    #[error("vehicle {vehicle_id:?} not found")]
    VehicleNotFound { vehicle_id: String },

    #[error("vehicle lookup for {vehicle_id:?} failed: {source}")]
    VehicleLookupFailed {
        vehicle_id: String,
        #[source]
        source: BackendError,
    },

    #[error("vehicle {vehicle_id:?} has an unusable profile: {reason}")]
    InvalidVehicleProfile { vehicle_id: String, reason: String },

    /// The alternative candidate was chosen on a plan that has none.
    #[error("route plan has no alternative route to choose")]
    InvalidChoice,

    #[error("saving the chosen route failed: {source}")]
    PersistFailed {
        #[source]
        source: BackendError,
    },
}

impl PlanError {
    /// True when the user can fix the failure by changing their input.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            PlanError::GeocodeFailed {
                source: BackendError::NotFound { .. },
                ..
            }
        )
    }

    /// True when the failure came from a backend that may answer on a retry.
    pub fn is_transient(&self) -> bool {
        match self {
            PlanError::GeocodeFailed { source, .. }
            | PlanError::RoutingBackendUnavailable { source }
            | PlanError::VehicleLookupFailed { source, .. }
            | PlanError::PersistFailed { source } => {
                matches!(source, BackendError::Unavailable(_))
            }
            _ => false,
        }
    }
}
