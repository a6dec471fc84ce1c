//! Trip planning: geocode, route, simulate, then annotate.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::RuleSet;
use crate::daily_log::{attach_remarks, partition_by_date, DailyLog};
use crate::error::{PlanError, Result};
use crate::model::DutySegment;
use crate::polyline::Polyline;
use crate::projector::RouteProjector;
use crate::remarks::{build_remark_events, StopNames};
use crate::instruction::transitions_from_lines;
use crate::simulator::{simulate, SimulationInput, METERS_PER_MILE};
use crate::traits::{Geocoder, ReverseGeocoder, RouteProvider};
use crate::waypoints::{build_waypoints, TripStops, Waypoint};

/// Hour of day (UTC) trips depart when the caller does not choose.
pub const DEFAULT_DEPARTURE_HOUR: u32 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRequest {
    pub current_location: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    #[serde(default)]
    pub current_cycle_hours_used: f64,
    #[serde(default)]
    pub departure: Option<DateTime<Utc>>,
}

impl TripRequest {
    pub fn new(
        current_location: impl Into<String>,
        pickup_location: impl Into<String>,
        dropoff_location: impl Into<String>,
    ) -> Self {
        Self {
            current_location: current_location.into(),
            pickup_location: pickup_location.into(),
            dropoff_location: dropoff_location.into(),
            current_cycle_hours_used: 0.0,
            departure: None,
        }
    }

    /// Reject requests the engine should never see.
    pub fn validate(&self, rules: &RuleSet) -> Result<()> {
        let places = [
            ("current_location", &self.current_location),
            ("pickup_location", &self.pickup_location),
            ("dropoff_location", &self.dropoff_location),
        ];
        for (field, value) in places {
            if value.trim().is_empty() {
                return Err(PlanError::InvalidInput(format!("{field} is required")));
            }
        }

        let cycle = self.current_cycle_hours_used;
        if !cycle.is_finite() || cycle < 0.0 || cycle > rules.max_cycle_hours {
            return Err(PlanError::InvalidInput(format!(
                "current_cycle_hours_used must be between 0 and {}, got {cycle}",
                rules.max_cycle_hours
            )));
        }

        rules.validate().map_err(PlanError::InvalidInput)
    }
}

/// Today's date in UTC at the default departure hour.
pub fn default_departure(now: DateTime<Utc>) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(DEFAULT_DEPARTURE_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    now.date_naive().and_time(time).and_utc()
}

/// Everything a client needs to draw the trip and its log pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPlan {
    pub distance_m: f64,
    pub duration_s: f64,
    pub geometry: Polyline,
    pub waypoints: Vec<Waypoint>,
    pub logs: Vec<DailyLog>,
    pub segments: Vec<DutySegment>,
    pub instructions: Vec<String>,
}

impl TripPlan {
    /// Dates that get one log page each.
    pub fn log_dates(&self) -> Vec<NaiveDate> {
        self.logs.iter().map(|log| log.date).collect()
    }
}

/// The collaborators a plan needs.
pub struct Providers<'a> {
    pub geocoder: &'a dyn Geocoder,
    pub router: &'a dyn RouteProvider,
    pub reverse_geocoder: &'a (dyn ReverseGeocoder + Sync),
}

/// Plan a trip from the current location through pickup to dropoff.
///
/// Geocoding and routing failures surface as [`PlanError::Upstream`];
/// reverse-geocoding failures only degrade remark labels.
pub fn plan_trip(
    request: &TripRequest,
    providers: &Providers<'_>,
    rules: &RuleSet,
    now: DateTime<Utc>,
) -> Result<TripPlan> {
    request.validate(rules)?;
    let departure = request.departure.unwrap_or_else(|| default_departure(now));

    let (current_lat, current_lon) = providers.geocoder.geocode(&request.current_location)?;
    let (pickup_lat, pickup_lon) = providers.geocoder.geocode(&request.pickup_location)?;
    let (drop_lat, drop_lon) = providers.geocoder.geocode(&request.dropoff_location)?;

    let route = providers.router.route(&[
        (current_lat, current_lon),
        (pickup_lat, pickup_lon),
        (drop_lat, drop_lon),
    ])?;

    let mut input = SimulationInput::new(
        route.distance_m / METERS_PER_MILE,
        route.duration_s / 3600.0,
        departure,
    )
    .cycle_hours_used(request.current_cycle_hours_used);
    if let [to_pickup, to_dropoff] = route.legs[..] {
        input = input.legs(to_pickup.into(), to_dropoff.into());
    }

    let schedule = simulate(&input, rules);
    let projector = RouteProjector::new(&route.geometry, &schedule.segments, departure);

    let stops = TripStops {
        current: (current_lon, current_lat),
        pickup: (pickup_lon, pickup_lat),
        dropoff: (drop_lon, drop_lat),
        current_label: Some(request.current_location.clone()),
    };
    let waypoints = build_waypoints(&schedule.transitions, &projector, &stops);

    let names = StopNames {
        pickup: request.pickup_location.clone(),
        dropoff: request.dropoff_location.clone(),
    };
    let remarks = build_remark_events(
        &schedule.transitions,
        &projector,
        providers.reverse_geocoder,
        &names,
    );

    let mut logs = partition_by_date(&schedule.segments);
    attach_remarks(&mut logs, remarks);

    info!(
        distance_m = route.distance_m,
        duration_s = route.duration_s,
        days = logs.len(),
        waypoints = waypoints.len(),
        "planned trip"
    );

    let instructions = schedule.instructions();
    Ok(TripPlan {
        distance_m: route.distance_m,
        duration_s: route.duration_s,
        geometry: route.geometry,
        waypoints,
        logs,
        segments: schedule.segments,
        instructions,
    })
}

/// Rebuild the waypoints and log remarks of a stored plan from its
/// instruction trail, geometry and segments.
///
/// Stored plans keep the instruction text but not the transition records,
/// so stop times are recovered from the text at minute precision and stop
/// lengths from `rules`. A plan without segments keeps only its start and
/// dropoff markers.
pub fn rebuild_annotations<G>(
    plan: &mut TripPlan,
    stops: &TripStops,
    names: &StopNames,
    reverse_geocoder: &G,
    rules: &RuleSet,
) where
    G: ReverseGeocoder + Sync + ?Sized,
{
    let transitions = transitions_from_lines(&plan.instructions, rules);
    let departure = plan
        .segments
        .first()
        .map(|segment| segment.start)
        .or_else(|| transitions.first().map(|t| t.at))
        .unwrap_or_default();
    let projector = RouteProjector::new(&plan.geometry, &plan.segments, departure);

    plan.waypoints = build_waypoints(&transitions, &projector, stops);

    let remarks = build_remark_events(&transitions, &projector, reverse_geocoder, names);
    let mut logs = partition_by_date(&plan.segments);
    attach_remarks(&mut logs, remarks);
    plan.logs = logs;

    info!(
        transitions = transitions.len(),
        waypoints = plan.waypoints.len(),
        days = plan.logs.len(),
        "rebuilt plan annotations"
    );
}
