//! Position-at-time along the route.
//!
//! Progress is measured in driving time, not wall-clock time, so rests and
//! breaks do not move the truck. Shared by the waypoint and remark builders.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::model::{DutySegment, DutyStatus};
use crate::polyline::Polyline;
use crate::traits::ReverseGeocoder;

/// Fraction (0..1) of total driving time completed by `at`.
///
/// `None` when there are no driving segments.
pub fn drive_fraction_at(segments: &[DutySegment], at: DateTime<Utc>) -> Option<f64> {
    let mut total = 0.0;
    let mut before = 0.0;
    for segment in segments.iter().filter(|s| s.status == DutyStatus::Driving) {
        let seconds = segment.duration().num_milliseconds() as f64 / 1000.0;
        if seconds <= 0.0 {
            continue;
        }
        total += seconds;
        if segment.end <= at {
            before += seconds;
        } else if segment.contains(at) {
            before += (at - segment.start).num_milliseconds() as f64 / 1000.0;
        }
    }
    if total <= 0.0 {
        return None;
    }
    Some((before / total).clamp(0.0, 1.0))
}

/// Maps timestamps of one simulated trip onto its route geometry.
#[derive(Debug, Clone)]
pub struct RouteProjector<'a> {
    geometry: &'a Polyline,
    segments: &'a [DutySegment],
    departure: DateTime<Utc>,
    trip_seconds: f64,
}

impl<'a> RouteProjector<'a> {
    pub fn new(geometry: &'a Polyline, segments: &'a [DutySegment], departure: DateTime<Utc>) -> Self {
        let trip_seconds = segments
            .last()
            .map(|last| (last.end - departure).num_seconds() as f64)
            .unwrap_or(0.0)
            .max(1.0);
        Self {
            geometry,
            segments,
            departure,
            trip_seconds,
        }
    }

    pub fn segments(&self) -> &'a [DutySegment] {
        self.segments
    }

    /// Driving fraction at `at`, or the wall-clock fraction of the trip
    /// when nothing was driven.
    pub fn fraction_at(&self, at: DateTime<Utc>) -> f64 {
        drive_fraction_at(self.segments, at).unwrap_or_else(|| {
            let elapsed = (at - self.departure).num_seconds() as f64;
            (elapsed / self.trip_seconds).clamp(0.0, 1.0)
        })
    }

    /// `(longitude, latitude)` at `at`.
    pub fn position_at(&self, at: DateTime<Utc>) -> (f64, f64) {
        self.geometry.point_at_fraction(self.fraction_at(at))
    }

    /// Reverse-geocoded label for the position at `at`, or `fallback` when
    /// there is no geometry or the lookup fails or comes back empty.
    pub fn locate<G>(&self, at: DateTime<Utc>, geocoder: &G, fallback: &str) -> String
    where
        G: ReverseGeocoder + ?Sized,
    {
        if self.geometry.is_empty() {
            return fallback.to_string();
        }
        let (lon, lat) = self.position_at(at);
        match geocoder.reverse_geocode(lon, lat) {
            Ok(Some(label)) if !label.trim().is_empty() => label,
            Ok(_) => fallback.to_string(),
            Err(err) => {
                warn!(lon, lat, error = %err, "reverse geocode failed, using fallback label");
                fallback.to_string()
            }
        }
    }
}
