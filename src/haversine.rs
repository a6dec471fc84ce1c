//! Straight-line route provider.
//!
//! Uses great-circle distance and an assumed speed. Less accurate than a
//! road router but needs no network; hosts opt into it explicitly.

use crate::error::ProviderError;
use crate::polyline::Polyline;
use crate::traits::{Route, RouteLeg, RouteProvider};

/// Average highway speed assumption, 55 mph.
const DEFAULT_SPEED_KMH: f64 = 88.5;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone)]
pub struct StraightLineRouter {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for StraightLineRouter {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl StraightLineRouter {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Haversine distance between two `(lat, lng)` points in kilometers.
    pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
        let (lat1, lng1) = from;
        let (lat2, lng2) = to;

        let lat1_rad = lat1.to_radians();
        let lat2_rad = lat2.to_radians();
        let delta_lat = (lat2 - lat1).to_radians();
        let delta_lng = (lng2 - lng1).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    fn km_to_seconds(&self, km: f64) -> f64 {
        km / self.speed_kmh * 3600.0
    }
}

impl RouteProvider for StraightLineRouter {
    fn route(&self, coordinates: &[(f64, f64)]) -> Result<Route, ProviderError> {
        if coordinates.len() < 2 {
            return Err(ProviderError::TooFewCoordinates(coordinates.len()));
        }

        let legs: Vec<RouteLeg> = coordinates
            .windows(2)
            .map(|pair| {
                let km = Self::haversine_km(pair[0], pair[1]);
                RouteLeg {
                    distance_m: km * 1000.0,
                    duration_s: self.km_to_seconds(km),
                }
            })
            .collect();

        Ok(Route {
            distance_m: legs.iter().map(|leg| leg.distance_m).sum(),
            duration_s: legs.iter().map(|leg| leg.duration_s).sum(),
            geometry: Polyline::new(coordinates.iter().map(|&(lat, lng)| (lng, lat)).collect()),
            legs,
        })
    }
}
