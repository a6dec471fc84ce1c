//! Collaborator interfaces for geocoding and routing.
//!
//! The planner only depends on these traits. Concrete providers live in
//! [`crate::mapbox`], [`crate::osrm`] and [`crate::haversine`].

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::polyline::Polyline;
use crate::simulator::LegBreakdown;

/// Resolves a place name to coordinates.
pub trait Geocoder {
    /// Returns `(latitude, longitude)` of the best match.
    fn geocode(&self, place: &str) -> Result<(f64, f64), ProviderError>;
}

/// Resolves coordinates to a short "Place, Region" label.
pub trait ReverseGeocoder {
    /// `Ok(None)` when the provider knows nothing about the point.
    fn reverse_geocode(&self, lon: f64, lat: f64) -> Result<Option<String>, ProviderError>;
}

/// Computes a driving route through coordinates given as `(latitude, longitude)`.
pub trait RouteProvider {
    fn route(&self, coordinates: &[(f64, f64)]) -> Result<Route, ProviderError>;
}

/// Place name completion for search boxes.
pub trait PlaceSuggester {
    fn autocomplete(&self, query: &str, limit: usize) -> Result<Vec<PlaceSuggestion>, ProviderError>;
}

/// A routed trip through two or more coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub distance_m: f64,
    pub duration_s: f64,
    pub geometry: Polyline,
    /// One entry per consecutive coordinate pair.
    pub legs: Vec<RouteLeg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_m: f64,
    pub duration_s: f64,
}

impl From<RouteLeg> for LegBreakdown {
    fn from(leg: RouteLeg) -> Self {
        LegBreakdown::new(leg.distance_m, leg.duration_s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub place_name: String,
    /// `(longitude, latitude)`.
    pub center: (f64, f64),
}
