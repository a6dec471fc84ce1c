//! Route geometry as a decoded coordinate sequence.
//!
//! Points are `(longitude, latitude)` pairs, the GeoJSON order routing
//! providers return and map clients draw.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    /// Creates a polyline from `(longitude, latitude)` points.
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Builds from GeoJSON positions, keeping the first two values of each
    /// and skipping positions with fewer than two.
    pub fn from_positions(positions: Vec<Vec<f64>>) -> Self {
        Self::new(
            positions
                .into_iter()
                .filter_map(|position| match position[..] {
                    [lon, lat, ..] => Some((lon, lat)),
                    _ => None,
                })
                .collect(),
        )
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at `fraction` (0..1) of the polyline's length.
    ///
    /// Lengths are planar Euclidean distances in degree units. Fractions at
    /// or below 0 give the first point, at or above 1 the last; an empty
    /// polyline gives `(0.0, 0.0)`.
    pub fn point_at_fraction(&self, fraction: f64) -> (f64, f64) {
        let (Some(&first), Some(&last)) = (self.points.first(), self.points.last()) else {
            return (0.0, 0.0);
        };
        if fraction <= 0.0 {
            return first;
        }
        if fraction >= 1.0 {
            return last;
        }

        let mut cumulative = Vec::with_capacity(self.points.len());
        cumulative.push(0.0);
        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let length = (b.0 - a.0).hypot(b.1 - a.1);
            let total = cumulative.last().copied().unwrap_or(0.0);
            cumulative.push(total + length);
        }
        let total = cumulative.last().copied().unwrap_or(0.0);
        if total <= 0.0 {
            return first;
        }

        let target = fraction * total;
        for i in 0..cumulative.len() - 1 {
            if cumulative[i + 1] >= target {
                let span = cumulative[i + 1] - cumulative[i];
                let t = if span > 0.0 {
                    (target - cumulative[i]) / span
                } else {
                    1.0
                };
                let (a, b) = (self.points[i], self.points[i + 1]);
                return (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1));
            }
        }
        last
    }
}
