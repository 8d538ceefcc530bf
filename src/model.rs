//! Data shapes shared by the planner and its collaborators.
//!
//! Coordinates are always (longitude, latitude), matching the map layer.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::polyline::{Geometry, Polyline};

/// A geographic position in (longitude, latitude) order.
///
/// Serializes as a `[lon, lat]` array, the GeoJSON convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(coord: Coordinate) -> Self {
        [coord.lon, coord.lat]
    }
}

/// Which side of the trip a place query belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => f.write_str("start"),
            Endpoint::End => f.write_str("end"),
        }
    }
}

/// The routing strategy a candidate was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Single route from a backend that offers no comparison.
    Baseline,
    /// Recommended fuel/time-optimized route.
    Eco,
    /// Minimal-distance alternative.
    Shortest,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Baseline => f.write_str("baseline"),
            Strategy::Eco => f.write_str("eco"),
            Strategy::Shortest => f.write_str("shortest"),
        }
    }
}

/// One geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeMatch {
    pub label: String,
    pub coordinate: Coordinate,
}

/// Vehicle data read from the vehicle directory. The planner never modifies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleProfile {
    pub id: String,
    /// Liters per 100 km.
    pub fuel_consumption: f64,
    pub vehicle_type: Option<String>,
    pub fuel_type: Option<String>,
    pub weight_kg: Option<f64>,
    pub model_year: Option<u16>,
}

impl VehicleProfile {
    pub fn new(id: impl Into<String>, fuel_consumption: f64) -> Self {
        Self {
            id: id.into(),
            fuel_consumption,
            vehicle_type: None,
            fuel_type: None,
            weight_kg: None,
            model_year: None,
        }
    }
}

/// Signed-in user context passed explicitly into every backend call.
#[derive(Clone, Default)]
pub struct Session {
    pub user_id: u64,
    pub token: Option<String>,
}

impl Session {
    pub fn new(user_id: u64, token: impl Into<String>) -> Self {
        Self {
            user_id,
            token: Some(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// What the planner asks the router for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub start: Coordinate,
    pub end: Coordinate,
    pub vehicle_id: String,
}

/// A route as returned by a backend, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRoute {
    pub geometry: Geometry,
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
}

impl RawRoute {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            distance_m: None,
            duration_s: None,
        }
    }

    pub fn with_metrics(mut self, distance_m: f64, duration_s: f64) -> Self {
        self.distance_m = Some(distance_m);
        self.duration_s = Some(duration_s);
        self
    }
}

/// The two response shapes a router may produce.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteResponse {
    Single(RawRoute),
    Comparison { eco: RawRoute, shortest: RawRoute },
}

/// Whether a metric came from the backend or was computed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricSource {
    Reported,
    /// Computed from geometry (distance) or from distance at an assumed speed (duration).
    Derived,
}

/// How a candidate's fuel cost was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostBasis {
    /// Distance and consumption run through the fuel cost model.
    Modeled,
    /// The shortest route's cost reduced by the eco discount. An approximation.
    EcoDiscount,
}

/// A normalized route ready for rendering and comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteCandidate {
    pub strategy: Strategy,
    pub start: Coordinate,
    pub end: Coordinate,
    pub geometry: Polyline,
    pub distance_m: f64,
    pub duration_s: f64,
    pub fuel_cost: f64,
    pub distance_source: MetricSource,
    pub duration_source: MetricSource,
    pub cost_basis: CostBasis,
}

impl RouteCandidate {
    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            distance_km: (self.distance_m / 100.0).round() / 10.0,
            duration_min: (self.duration_s / 60.0).round() as u64,
            fuel_cost: (self.fuel_cost * 100.0).round() / 100.0,
        }
    }

    fn to_geojson_feature(&self) -> Value {
        let coordinates: Vec<[f64; 2]> = self.geometry.points().iter().map(|&p| p.into()).collect();
        json!({
            "type": "Feature",
            "properties": {
                "strategy": self.strategy,
                "distance": self.distance_m,
                "duration": self.duration_s,
                "fuelCost": self.fuel_cost,
            },
            "geometry": {
                "type": "LineString",
                "coordinates": coordinates,
            }
        })
    }
}

/// Rounded figures for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteSummary {
    pub distance_km: f64,
    pub duration_min: u64,
    pub fuel_cost: f64,
}

impl fmt::Display for RouteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1} km, {} min, {:.2}",
            self.distance_km, self.duration_min, self.fuel_cost
        )
    }
}

/// Which candidate of a plan the user picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Primary,
    Alternative,
}

/// The result of one planning request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub vehicle_id: String,
    pub primary: RouteCandidate,
    pub alternative: Option<RouteCandidate>,
}

impl RoutePlan {
    pub fn start(&self) -> Coordinate {
        self.primary.start
    }

    pub fn end(&self) -> Coordinate {
        self.primary.end
    }

    pub fn candidate(&self, choice: Choice) -> Option<&RouteCandidate> {
        match choice {
            Choice::Primary => Some(&self.primary),
            Choice::Alternative => self.alternative.as_ref(),
        }
    }

    pub fn candidates(&self) -> impl Iterator<Item = &RouteCandidate> {
        std::iter::once(&self.primary).chain(self.alternative.iter())
    }

    /// How much more the alternative costs than the primary route.
    pub fn savings(&self) -> Option<f64> {
        self.alternative
            .as_ref()
            .map(|alt| alt.fuel_cost - self.primary.fuel_cost)
    }

    /// GeoJSON `FeatureCollection` with one `LineString` per candidate.
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .candidates()
            .map(RouteCandidate::to_geojson_feature)
            .collect();
        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}

/// Body sent to the route store when the user keeps a candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoute {
    pub start_coordinate: Coordinate,
    pub end_coordinate: Coordinate,
    pub car_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SavedRoute {
    pub id: String,
}
