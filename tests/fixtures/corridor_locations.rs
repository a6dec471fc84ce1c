//! US freight corridor cities for realistic test fixtures.
//!
//! Coordinates are city-center points from OpenStreetMap.

use std::sync::atomic::{AtomicUsize, Ordering};

use hos_planner::error::ProviderError;
use hos_planner::traits::{Geocoder, ReverseGeocoder};

/// A named location with coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

pub const CHICAGO: Location = Location::new("Chicago, IL", 41.8781, -87.6298);
pub const INDIANAPOLIS: Location = Location::new("Indianapolis, IN", 39.7684, -86.1581);
pub const NASHVILLE: Location = Location::new("Nashville, TN", 36.1627, -86.7816);
pub const ATLANTA: Location = Location::new("Atlanta, GA", 33.7490, -84.3880);
pub const MEMPHIS: Location = Location::new("Memphis, TN", 35.1495, -90.0490);
pub const JACKSON: Location = Location::new("Jackson, TN", 35.6145, -88.8139);
pub const DALLAS: Location = Location::new("Dallas, TX", 32.7767, -96.7970);
pub const LOS_ANGELES: Location = Location::new("Los Angeles, CA", 34.0522, -118.2437);

pub const CORRIDOR: &[Location] = &[
    CHICAGO,
    INDIANAPOLIS,
    NASHVILLE,
    ATLANTA,
    MEMPHIS,
    JACKSON,
    DALLAS,
    LOS_ANGELES,
];

/// Geocoder answering from [`CORRIDOR`].
#[derive(Default)]
pub struct CorridorGeocoder {
    pub calls: AtomicUsize,
}

impl Geocoder for CorridorGeocoder {
    fn geocode(&self, place: &str) -> Result<(f64, f64), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CORRIDOR
            .iter()
            .find(|location| location.name.eq_ignore_ascii_case(place.trim()))
            .map(Location::coords)
            .ok_or_else(|| ProviderError::NoResults(place.to_string()))
    }
}

/// Reverse geocoder labelling a point with the nearest corridor city.
pub struct NearestCity;

impl ReverseGeocoder for NearestCity {
    fn reverse_geocode(&self, lon: f64, lat: f64) -> Result<Option<String>, ProviderError> {
        let nearest = CORRIDOR.iter().min_by(|a, b| {
            let da = (a.lat - lat).hypot(a.lng - lon);
            let db = (b.lat - lat).hypot(b.lng - lon);
            da.total_cmp(&db)
        });
        Ok(nearest.map(|location| format!("Near {}", location.name)))
    }
}

/// Reverse geocoder that is always down.
pub struct Unavailable;

impl ReverseGeocoder for Unavailable {
    fn reverse_geocode(&self, _lon: f64, _lat: f64) -> Result<Option<String>, ProviderError> {
        Err(ProviderError::Status {
            operation: "reverse geocode",
            status: 503,
        })
    }
}
