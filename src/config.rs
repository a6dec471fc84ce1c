//! Hours-of-Service rule parameters.

use serde::{Deserialize, Serialize};

/// Business constants that drive the duty-cycle simulation.
///
/// Defaults approximate the FMCSA property-carrying 70 hour / 8 day rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub max_driving_hours_per_day: f64,
    pub max_on_duty_hours_per_day: f64,
    /// Off-duty rest that ends a driving day.
    pub daily_rest_hours: f64,
    /// Cumulative driving that triggers a break.
    pub break_after_driving_hours: f64,
    pub break_minutes: f64,
    pub fuel_every_miles: f64,
    pub fuel_stop_minutes: f64,
    /// On-duty block at pickup and again at dropoff.
    pub pickup_dropoff_minutes: f64,
    pub max_cycle_hours: f64,
    pub restart_hours: f64,
    /// Largest single drive segment. Keeps a segment from spanning a
    /// break, fuel or day boundary; not a legal limit.
    pub drive_chunk_hours: f64,
    /// No fuel stop is inserted when less phase driving than this remains.
    pub fuel_skip_threshold_hours: f64,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            max_driving_hours_per_day: 11.0,
            max_on_duty_hours_per_day: 14.0,
            daily_rest_hours: 10.0,
            break_after_driving_hours: 8.0,
            break_minutes: 30.0,
            fuel_every_miles: 1000.0,
            fuel_stop_minutes: 30.0,
            pickup_dropoff_minutes: 60.0,
            max_cycle_hours: 70.0,
            restart_hours: 34.0,
            drive_chunk_hours: 2.0,
            fuel_skip_threshold_hours: 0.5,
        }
    }
}

impl RuleSet {
    pub fn break_hours(&self) -> f64 {
        self.break_minutes / 60.0
    }

    pub fn fuel_stop_hours(&self) -> f64 {
        self.fuel_stop_minutes / 60.0
    }

    pub fn pickup_dropoff_hours(&self) -> f64 {
        self.pickup_dropoff_minutes / 60.0
    }

    /// Reject rule sets the simulator cannot make progress under.
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("max_driving_hours_per_day", self.max_driving_hours_per_day),
            ("max_on_duty_hours_per_day", self.max_on_duty_hours_per_day),
            ("daily_rest_hours", self.daily_rest_hours),
            ("break_after_driving_hours", self.break_after_driving_hours),
            ("fuel_every_miles", self.fuel_every_miles),
            ("max_cycle_hours", self.max_cycle_hours),
            ("restart_hours", self.restart_hours),
            ("drive_chunk_hours", self.drive_chunk_hours),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{name} must be a positive number, got {value}"));
            }
        }
        let non_negative = [
            ("break_minutes", self.break_minutes),
            ("fuel_stop_minutes", self.fuel_stop_minutes),
            ("pickup_dropoff_minutes", self.pickup_dropoff_minutes),
            ("fuel_skip_threshold_hours", self.fuel_skip_threshold_hours),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(format!("{name} must not be negative, got {value}"));
            }
        }
        Ok(())
    }
}
