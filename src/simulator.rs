//! Duty-cycle simulator.
//!
//! Advances a clock through drive, rest, break, fuel and restart phases and
//! records the resulting duty segments alongside structured transitions.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::RuleSet;
use crate::instruction::{Transition, TransitionKind};
use crate::model::{hours_to_duration, push_segment, DutySegment, DutyStatus};

/// Meters per statute mile.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Durations below this are treated as this, so average speed stays defined.
pub const MIN_DURATION_HOURS: f64 = 0.01;

/// One routed leg as reported by the routing provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegBreakdown {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl LegBreakdown {
    pub fn new(distance_meters: f64, duration_seconds: f64) -> Self {
        Self {
            distance_meters,
            duration_seconds,
        }
    }

    fn miles(&self) -> f64 {
        (self.distance_meters / METERS_PER_MILE).max(0.0)
    }

    fn hours(&self) -> f64 {
        (self.duration_seconds / 3600.0).max(MIN_DURATION_HOURS)
    }
}

#[derive(Debug, Clone)]
pub struct SimulationInput {
    pub distance_miles: f64,
    pub duration_hours: f64,
    pub departure: DateTime<Utc>,
    pub current_cycle_hours_used: f64,
    /// `(current -> pickup, pickup -> dropoff)`. `None` runs the single-leg
    /// mode with the pickup block at departure.
    pub legs: Option<(LegBreakdown, LegBreakdown)>,
}

impl SimulationInput {
    pub fn new(distance_miles: f64, duration_hours: f64, departure: DateTime<Utc>) -> Self {
        Self {
            distance_miles,
            duration_hours,
            departure,
            current_cycle_hours_used: 0.0,
            legs: None,
        }
    }

    pub fn cycle_hours_used(mut self, hours: f64) -> Self {
        self.current_cycle_hours_used = hours;
        self
    }

    pub fn legs(mut self, to_pickup: LegBreakdown, to_dropoff: LegBreakdown) -> Self {
        self.legs = Some((to_pickup, to_dropoff));
        self
    }
}

/// Simulator output: merged duty segments and the transitions that produced them.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pub segments: Vec<DutySegment>,
    pub transitions: Vec<Transition>,
}

impl Schedule {
    /// Timestamp-prefixed audit lines, one per transition.
    pub fn instructions(&self) -> Vec<String> {
        self.transitions.iter().map(Transition::instruction).collect()
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.segments.last().map(|segment| segment.end)
    }

    fn record(&mut self, transition: Transition) {
        push_segment(
            &mut self.segments,
            duty_status(transition.kind),
            transition.at,
            transition.end(),
        );
        self.transitions.push(transition);
    }
}

fn duty_status(kind: TransitionKind) -> DutyStatus {
    match kind {
        TransitionKind::Drive => DutyStatus::Driving,
        TransitionKind::Pickup | TransitionKind::Dropoff | TransitionKind::Fuel => DutyStatus::OnDuty,
        TransitionKind::Break | TransitionKind::EndOfDay | TransitionKind::Restart => {
            DutyStatus::OffDuty
        }
    }
}

/// Driving still owed for one leg of the trip.
#[derive(Debug, Clone, PartialEq)]
pub struct DrivePhase {
    pub remaining_hours: f64,
    pub distance_miles: f64,
    pub duration_hours: f64,
}

impl DrivePhase {
    pub fn new(distance_miles: f64, duration_hours: f64) -> Self {
        let duration_hours = duration_hours.max(MIN_DURATION_HOURS);
        Self {
            remaining_hours: duration_hours,
            distance_miles: distance_miles.max(0.0),
            duration_hours,
        }
    }

    pub fn average_speed_mph(&self) -> f64 {
        self.distance_miles / self.duration_hours
    }

    pub fn is_done(&self) -> bool {
        self.remaining_hours <= 0.0
    }
}

/// The next thing the driver does inside a drive phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Restart,
    EndOfDay,
    Break,
    Drive { hours: f64 },
}

/// Counters threaded through the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub current_time: DateTime<Utc>,
    pub cycle_hours_used: f64,
    pub miles_since_fuel: f64,
    pub day_driving_hours: f64,
    pub day_on_duty_hours: f64,
    pub driving_hours_since_break: f64,
}

impl SimulationState {
    pub fn new(departure: DateTime<Utc>, cycle_hours_used: f64) -> Self {
        Self {
            current_time: departure,
            cycle_hours_used,
            miles_since_fuel: 0.0,
            day_driving_hours: 0.0,
            day_on_duty_hours: 0.0,
            driving_hours_since_break: 0.0,
        }
    }

    /// Pick the next action. Order matters: cycle restart, then end of
    /// day, then break, then drive.
    pub fn next_action(&self, phase: &DrivePhase, rules: &RuleSet) -> Action {
        if self.cycle_hours_used >= rules.max_cycle_hours {
            return Action::Restart;
        }

        let remaining_today = (rules.max_driving_hours_per_day - self.day_driving_hours)
            .min(rules.max_on_duty_hours_per_day - self.day_on_duty_hours)
            .min(phase.remaining_hours);
        if remaining_today <= 0.0 {
            return Action::EndOfDay;
        }

        if self.driving_hours_since_break >= rules.break_after_driving_hours {
            return Action::Break;
        }

        Action::Drive {
            hours: rules.drive_chunk_hours.min(remaining_today),
        }
    }

    /// Apply one action, returning the transitions it emits in order.
    ///
    /// A drive may be followed by a fuel stop; every other action emits
    /// exactly one transition.
    pub fn apply(&mut self, action: Action, phase: &mut DrivePhase, rules: &RuleSet) -> Vec<Transition> {
        match action {
            Action::Restart => vec![self.restart(rules)],
            Action::EndOfDay => {
                let rest = self.advance(TransitionKind::EndOfDay, rules.daily_rest_hours);
                self.day_driving_hours = 0.0;
                self.day_on_duty_hours = 0.0;
                self.driving_hours_since_break = 0.0;
                vec![rest]
            }
            Action::Break => {
                let rest = self.advance(TransitionKind::Break, rules.break_hours());
                self.driving_hours_since_break = 0.0;
                vec![rest]
            }
            Action::Drive { hours } => {
                let mut emitted = vec![self.advance(TransitionKind::Drive, hours)];
                phase.remaining_hours -= hours;
                self.day_driving_hours += hours;
                self.day_on_duty_hours += hours;
                self.cycle_hours_used += hours;
                self.driving_hours_since_break += hours;
                self.miles_since_fuel += phase.average_speed_mph() * hours;

                if self.miles_since_fuel >= rules.fuel_every_miles
                    && phase.remaining_hours > rules.fuel_skip_threshold_hours
                {
                    emitted.push(self.fuel_stop(rules));
                }
                emitted
            }
        }
    }

    /// 34-hour style restart: clears the cycle and every daily counter.
    pub fn restart(&mut self, rules: &RuleSet) -> Transition {
        debug!(
            at = %self.current_time,
            cycle_hours = self.cycle_hours_used,
            "inserting cycle restart"
        );
        let rest = self.advance(TransitionKind::Restart, rules.restart_hours);
        self.cycle_hours_used = 0.0;
        self.day_driving_hours = 0.0;
        self.day_on_duty_hours = 0.0;
        self.driving_hours_since_break = 0.0;
        rest
    }

    /// Pickup or dropoff on-duty block.
    pub fn stop_block(&mut self, kind: TransitionKind, rules: &RuleSet) -> Transition {
        let hours = rules.pickup_dropoff_hours();
        let block = self.advance(kind, hours);
        self.cycle_hours_used += hours;
        self.day_on_duty_hours += hours;
        if kind == TransitionKind::Pickup {
            self.driving_hours_since_break = 0.0;
        }
        block
    }

    fn fuel_stop(&mut self, rules: &RuleSet) -> Transition {
        let hours = rules.fuel_stop_hours();
        let stop = self.advance(TransitionKind::Fuel, hours);
        self.day_on_duty_hours += hours;
        self.cycle_hours_used += hours;
        self.miles_since_fuel = 0.0;
        if rules.fuel_stop_minutes >= rules.break_minutes {
            self.driving_hours_since_break = 0.0;
        }
        stop
    }

    fn advance(&mut self, kind: TransitionKind, hours: f64) -> Transition {
        let duration = hours_to_duration(hours);
        let transition = Transition::new(kind, self.current_time, duration);
        self.current_time += duration;
        transition
    }
}

/// Run the full schedule: optional drive to pickup, pickup block, drive to
/// dropoff, a restart if the cycle is exhausted, then the dropoff block.
pub fn simulate(input: &SimulationInput, rules: &RuleSet) -> Schedule {
    let mut state = SimulationState::new(input.departure, input.current_cycle_hours_used);
    let mut schedule = Schedule::default();

    let to_dropoff = match &input.legs {
        Some((to_pickup, to_dropoff)) => {
            let mut phase = DrivePhase::new(to_pickup.miles(), to_pickup.hours());
            drive_phase(&mut state, &mut phase, rules, &mut schedule);
            DrivePhase::new(to_dropoff.miles(), to_dropoff.hours())
        }
        None => DrivePhase::new(input.distance_miles, input.duration_hours),
    };

    schedule.record(state.stop_block(TransitionKind::Pickup, rules));

    let mut phase = to_dropoff;
    drive_phase(&mut state, &mut phase, rules, &mut schedule);

    if state.cycle_hours_used >= rules.max_cycle_hours {
        schedule.record(state.restart(rules));
    }

    schedule.record(state.stop_block(TransitionKind::Dropoff, rules));

    info!(
        segments = schedule.segments.len(),
        transitions = schedule.transitions.len(),
        restarts = schedule
            .transitions
            .iter()
            .filter(|t| t.kind == TransitionKind::Restart)
            .count(),
        "simulated duty schedule"
    );
    schedule
}

fn drive_phase(state: &mut SimulationState, phase: &mut DrivePhase, rules: &RuleSet, schedule: &mut Schedule) {
    while !phase.is_done() {
        let action = state.next_action(phase, rules);
        for transition in state.apply(action, phase, rules) {
            schedule.record(transition);
        }
    }
}
