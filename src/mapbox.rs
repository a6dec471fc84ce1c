//! Mapbox HTTP adapter: forward/reverse geocoding, autocomplete and directions.

use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::polyline::Polyline;
use crate::traits::{
    Geocoder, PlaceSuggester, PlaceSuggestion, ReverseGeocoder, Route, RouteLeg, RouteProvider,
};

pub const TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";

#[derive(Debug, Clone)]
pub struct MapboxConfig {
    pub base_url: String,
    pub access_token: Option<String>,
    /// Directions profile, e.g. `driving-traffic`.
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for MapboxConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mapbox.com".to_string(),
            access_token: None,
            profile: "driving-traffic".to_string(),
            timeout_secs: 10,
        }
    }
}

impl MapboxConfig {
    /// Defaults with the access token taken from `MAPBOX_ACCESS_TOKEN`.
    pub fn from_env() -> Self {
        Self {
            access_token: std::env::var(TOKEN_ENV).ok().filter(|token| !token.is_empty()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapboxClient {
    config: MapboxConfig,
    client: reqwest::blocking::Client,
}

impl MapboxClient {
    pub fn new(config: MapboxConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn token(&self) -> Result<&str, ProviderError> {
        self.config
            .access_token
            .as_deref()
            .ok_or(ProviderError::MissingToken(TOKEN_ENV))
    }

    /// `base_url` with `segments` appended, each percent-encoded as one path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let invalid = || ProviderError::InvalidUrl(self.config.base_url.clone());
        let mut url = Url::parse(&self.config.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn places_url(&self, query: &str) -> Result<Url, ProviderError> {
        let file = format!("{query}.json");
        self.endpoint(&["geocoding", "v5", "mapbox.places", file.as_str()])
    }

    fn get<T: serde::de::DeserializeOwned>(
        &self,
        operation: &'static str,
        url: Url,
        params: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        debug!(operation, %url, "requesting Mapbox");
        let response = self.client.get(url).query(params).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                operation,
                status: status.as_u16(),
            });
        }
        Ok(response.json()?)
    }
}

impl Geocoder for MapboxClient {
    fn geocode(&self, place: &str) -> Result<(f64, f64), ProviderError> {
        let token = self.token()?;
        let url = self.places_url(place)?;
        let body: FeatureCollection =
            self.get("geocode", url, &[("access_token", token), ("limit", "1")])?;

        let (lon, lat) = body
            .features
            .into_iter()
            .find_map(|feature| feature.center)
            .ok_or_else(|| ProviderError::NoResults(place.to_string()))?;
        Ok((lat, lon))
    }
}

impl ReverseGeocoder for MapboxClient {
    fn reverse_geocode(&self, lon: f64, lat: f64) -> Result<Option<String>, ProviderError> {
        let token = self.token()?;
        let url = self.places_url(&format!("{lon},{lat}"))?;
        let body: FeatureCollection =
            self.get("reverse geocode", url, &[("access_token", token), ("limit", "1")])?;
        Ok(body.features.first().and_then(Feature::region_label))
    }
}

impl PlaceSuggester for MapboxClient {
    fn autocomplete(&self, query: &str, limit: usize) -> Result<Vec<PlaceSuggestion>, ProviderError> {
        let query = query.trim();
        if query.chars().count() < 2 {
            return Ok(Vec::new());
        }
        let token = self.token()?;
        let url = self.places_url(query)?;
        let limit = limit.to_string();
        let body: FeatureCollection = self.get(
            "autocomplete",
            url,
            &[
                ("access_token", token),
                ("limit", limit.as_str()),
                ("types", "place,address,poi"),
            ],
        )?;

        Ok(body
            .features
            .into_iter()
            .map(|feature| PlaceSuggestion {
                place_name: feature.place_name.unwrap_or_default(),
                center: feature.center.unwrap_or((0.0, 0.0)),
            })
            .collect())
    }
}

impl RouteProvider for MapboxClient {
    fn route(&self, coordinates: &[(f64, f64)]) -> Result<Route, ProviderError> {
        if coordinates.len() < 2 {
            return Err(ProviderError::TooFewCoordinates(coordinates.len()));
        }
        let token = self.token()?;
        let coords = coordinates
            .iter()
            .map(|(lat, lon)| format!("{lon},{lat}"))
            .collect::<Vec<_>>()
            .join(";");
        let url = self.endpoint(&[
            "directions",
            "v5",
            "mapbox",
            self.config.profile.as_str(),
            coords.as_str(),
        ])?;
        let body: DirectionsResponse = self.get(
            "directions",
            url,
            &[
                ("access_token", token),
                ("geometries", "geojson"),
                ("overview", "full"),
            ],
        )?;
        body.into_route()
    }
}

#[derive(Debug, Default, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Default, Deserialize)]
struct Feature {
    center: Option<(f64, f64)>,
    place_name: Option<String>,
    text: Option<String>,
    #[serde(default)]
    properties: FeatureProperties,
    #[serde(default)]
    context: Vec<FeatureContext>,
}

#[derive(Debug, Default, Deserialize)]
struct FeatureProperties {
    place_formatted: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeatureContext {
    #[serde(default)]
    id: String,
    #[serde(default)]
    text: String,
}

impl Feature {
    /// "City, State" style label.
    ///
    /// Prefers `properties.place_formatted`, then the place/region context
    /// entries, then the leading parts of `place_name`.
    fn region_label(&self) -> Option<String> {
        if let Some(formatted) = self.properties.place_formatted.as_deref() {
            if let Some(label) = first_two_parts(formatted) {
                return Some(label);
            }
        }

        let mut place = None;
        let mut region = None;
        for entry in &self.context {
            let id = entry.id.to_lowercase();
            let text = entry.text.trim();
            if text.is_empty() {
                continue;
            }
            if id.starts_with("place.") {
                place = Some(text);
            } else if id.starts_with("region.") {
                region = Some(text);
            }
        }
        match (place, region) {
            (Some(place), Some(region)) => return Some(format!("{place}, {region}")),
            (Some(only), None) | (None, Some(only)) => return Some(only.to_string()),
            (None, None) => {}
        }

        self.place_name
            .as_deref()
            .or(self.text.as_deref())
            .and_then(first_two_parts)
    }
}

fn first_two_parts(raw: &str) -> Option<String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
    match parts.as_slice() {
        [] => None,
        [only] => Some(only.to_string()),
        [first, second, ..] => Some(format!("{first}, {second}")),
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    geometry: Option<DirectionsGeometry>,
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Deserialize)]
struct DirectionsGeometry {
    #[serde(default)]
    coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

impl DirectionsResponse {
    fn into_route(self) -> Result<Route, ProviderError> {
        let route = self.routes.into_iter().next().ok_or(ProviderError::NoRoute)?;
        Ok(Route {
            distance_m: route.distance,
            duration_s: route.duration,
            geometry: route
                .geometry
                .map(|geometry| Polyline::from_positions(geometry.coordinates))
                .unwrap_or_default(),
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
