//! OSRM HTTP adapter for route metrics.

use serde::Deserialize;
use tracing::debug;

use crate::error::BackendError;
use crate::model::{RawRoute, RouteRequest, RouteResponse, Session};
use crate::polyline::{AxisOrder, Geometry};
use crate::traits::RouteMetricsProvider;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
    /// Ask OSRM for alternatives so a shortest route can be offered.
    pub alternatives: bool,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
            alternatives: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn route_url(&self, request: &RouteRequest) -> String {
        format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=full&geometries=polyline&alternatives={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            request.start.lon,
            request.start.lat,
            request.end.lon,
            request.end.lat,
            self.config.alternatives
        )
    }
}

impl RouteMetricsProvider for OsrmClient {
    /// OSRM ignores the session; the vehicle is fixed by the server profile.
    #[tracing::instrument(skip(self, _session))]
    fn route_metrics(
        &self,
        _session: &Session,
        request: &RouteRequest,
    ) -> Result<RouteResponse, BackendError> {
        let response = self.client.get(self.route_url(request)).send()?;
        let status = response.status();
        if status.is_server_error() {
            return Err(BackendError::Unavailable(format!("OSRM returned {}", status)));
        }

        response.json::<OsrmRouteResponse>()?.into_route_response()
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: String,
    distance: f64,
    duration: f64,
}

impl OsrmRoute {
    fn into_raw(self) -> RawRoute {
        RawRoute::new(Geometry::encoded(self.geometry, AxisOrder::LatLon))
            .with_metrics(self.distance, self.duration)
    }
}

impl OsrmRouteResponse {
    /// First route is the recommended one; the shortest of the others, if any,
    /// becomes the alternative.
    fn into_route_response(self) -> Result<RouteResponse, BackendError> {
        if self.code != "Ok" {
            // OSRM answers 400 with a code such as "NoRoute" or "InvalidQuery".
            return Err(BackendError::Rejected {
                status: 400,
                message: self.message.unwrap_or(self.code),
            });
        }

        let mut routes = self.routes.into_iter();
        let primary = routes
            .next()
            .ok_or_else(|| BackendError::InvalidResponse("OSRM returned no routes".into()))?;
        let shortest = routes.min_by(|a, b| a.distance.total_cmp(&b.distance));

        match shortest {
            Some(shortest) => {
                debug!(
                    primary = primary.distance,
                    shortest = shortest.distance,
                    "OSRM returned alternatives"
                );
                Ok(RouteResponse::Comparison {
                    eco: primary.into_raw(),
                    shortest: shortest.into_raw(),
                })
            }
            None => Ok(RouteResponse::Single(primary.into_raw())),
        }
    }
}
