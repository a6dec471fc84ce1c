//! OSRM HTTP adapter for driving routes.

use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::polyline::Polyline;
use crate::traits::{Route, RouteLeg, RouteProvider};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 15,
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

    fn route_url(&self, coordinates: &[(f64, f64)]) -> String {
        let coords = coordinates
            .iter()
            .map(|(lat, lng)| format!("{:.6},{:.6}", lng, lat))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson",
            self.config.base_url, self.config.profile, coords
        )
    }
}

impl RouteProvider for OsrmClient {
    fn route(&self, coordinates: &[(f64, f64)]) -> Result<Route, ProviderError> {
        if coordinates.len() < 2 {
            return Err(ProviderError::TooFewCoordinates(coordinates.len()));
        }

        let url = self.route_url(coordinates);
        debug!(%url, "requesting OSRM route");

        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                operation: "OSRM route",
                status: status.as_u16(),
            });
        }

        let body: OsrmRouteResponse = response.json()?;
        body.into_route()
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    #[serde(default)]
    coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    distance: f64,
    duration: f64,
}

impl OsrmRouteResponse {
    fn into_route(self) -> Result<Route, ProviderError> {
        let route = self.routes.into_iter().next().ok_or(ProviderError::NoRoute)?;
        Ok(Route {
            distance_m: route.distance,
            duration_s: route.duration,
            geometry: Polyline::from_positions(route.geometry.coordinates),
            legs: route
                .legs
                .into_iter()
                .map(|leg| RouteLeg {
                    distance_m: leg.distance,
                    duration_s: leg.duration,
                })
                .collect(),
        })
    }
}
