//! eco-route-planner
//!
//! Plans an eco route and a shortest route between two place names for a
//! given vehicle, with distance, duration and fuel cost for each, on top of
//! remote geocoding and routing services.

pub mod error;
pub mod model;
pub mod traits;
pub mod planner;
pub mod backend;
pub mod osrm;
pub mod haversine;
pub mod polyline;
pub mod fuel;

pub use error::{BackendError, GeometryError, PlanError};
pub use model::{Choice, Coordinate, RouteCandidate, RoutePlan, Session, VehicleProfile};
pub use planner::{save_candidate, PlannerConfig, RoutePlanner};
