//! End-to-end planning over offline providers.

mod fixtures;

use std::sync::atomic::Ordering;

use chrono::{DateTime, Duration, TimeZone, Utc};

use fixtures::*;
use hos_planner::config::RuleSet;
use hos_planner::error::{PlanError, ProviderError};
use hos_planner::haversine::StraightLineRouter;
use hos_planner::instruction::TransitionKind;
use hos_planner::model::DutySegment;
use hos_planner::planner::{
    default_departure, plan_trip, rebuild_annotations, Providers, TripPlan, TripRequest,
};
use hos_planner::polyline::Polyline;
use hos_planner::remarks::{StopNames, EN_ROUTE_FALLBACK, OFF_DUTY_FALLBACK};
use hos_planner::traits::{Route, RouteLeg, RouteProvider};
use hos_planner::waypoints::{TripStops, WaypointKind};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 15, 42, 10).unwrap()
}

fn cross_country() -> TripRequest {
    TripRequest::new(LOS_ANGELES.name, DALLAS.name, ATLANTA.name)
}

fn plan_with<R>(request: &TripRequest, reverse: &R) -> Result<TripPlan, PlanError>
where
    R: hos_planner::traits::ReverseGeocoder + Sync,
{
    let geocoder = CorridorGeocoder::default();
    let router = StraightLineRouter::default();
    let providers = Providers {
        geocoder: &geocoder,
        router: &router,
        reverse_geocoder: reverse,
    };
    plan_trip(request, &providers, &RuleSet::default(), now())
}

#[test]
fn test_cross_country_plan() {
    let plan = plan_with(&cross_country(), &NearestCity).expect("plan");

    // ~3150 km at 55 mph.
    assert!(plan.distance_m > 3_000_000.0 && plan.distance_m < 3_300_000.0);
    assert_eq!(plan.geometry.points().len(), 3);
    assert_eq!(plan.geometry.points()[0], (LOS_ANGELES.lng, LOS_ANGELES.lat));

    // Default departure: 07:00 UTC on the day of the request.
    let first = &plan.segments[0];
    assert_eq!(first.start, Utc.with_ymd_and_hms(2024, 3, 4, 7, 0, 0).unwrap());

    // Two legs, so the day opens with driving toward the pickup.
    assert!(plan.instructions[0].contains("Drive for"), "{}", plan.instructions[0]);
    assert!(plan.instructions.iter().any(|line| line.contains("Pickup")));
    assert!(plan.instructions.last().is_some_and(|line| line.contains("Drop-off")));
}

#[test]
fn test_waypoints_frame_the_trip() {
    let plan = plan_with(&cross_country(), &NearestCity).expect("plan");
    let waypoints = &plan.waypoints;

    let start = &waypoints[0];
    assert_eq!(start.kind, WaypointKind::Start);
    assert_eq!((start.lon, start.lat), (LOS_ANGELES.lng, LOS_ANGELES.lat));
    assert_eq!(start.label, LOS_ANGELES.name);

    let pickup = waypoints
        .iter()
        .find(|w| w.kind == WaypointKind::Pickup)
        .expect("pickup marker");
    assert_eq!((pickup.lon, pickup.lat), (DALLAS.lng, DALLAS.lat));

    let last = waypoints.last().expect("markers");
    assert_eq!(last.kind, WaypointKind::Dropoff);
    assert_eq!((last.lon, last.lat), (ATLANTA.lng, ATLANTA.lat));

    // Over 1000 miles and well past one driving day.
    assert!(waypoints.iter().any(|w| w.kind == WaypointKind::Fuel));
    assert!(waypoints.iter().any(|w| w.kind == WaypointKind::EndOfDay));

    // Route markers lie within the corridor's bounding box.
    for w in waypoints {
        assert!((-118.3..=-84.3).contains(&w.lon), "{w:?}");
        assert!((32.7..=34.1).contains(&w.lat), "{w:?}");
    }
}

#[test]
fn test_logs_cover_every_segment() {
    let plan = plan_with(&cross_country(), &NearestCity).expect("plan");

    let dates = plan.log_dates();
    assert!(dates.len() >= 3);
    for pair in dates.windows(2) {
        assert!(pair[0] < pair[1]);
    }

    let flattened: Vec<DutySegment> = plan
        .logs
        .iter()
        .flat_map(|log| log.segments.iter().cloned())
        .collect();
    assert_eq!(flattened, plan.segments);

    for log in &plan.logs {
        assert!(log.segments.iter().all(|s| s.start.date_naive() == log.date));
        assert!(log.remark_events.iter().all(|e| e.start.date_naive() == log.date));
    }
}

#[test]
fn test_remarks_name_places() {
    let plan = plan_with(&cross_country(), &NearestCity).expect("plan");
    let remarks: Vec<_> = plan.logs.iter().flat_map(|log| &log.remark_events).collect();

    let pickup = remarks
        .iter()
        .find(|e| e.kind == TransitionKind::Pickup)
        .expect("pickup remark");
    assert_eq!(pickup.location, DALLAS.name);
    assert_eq!(pickup.reason, "Pickup");
    assert_eq!(pickup.end, Some(pickup.start + Duration::hours(1)));

    let dropoff = remarks.last().expect("remarks");
    assert_eq!(dropoff.kind, TransitionKind::Dropoff);
    assert_eq!(dropoff.location, ATLANTA.name);

    let rest = remarks
        .iter()
        .find(|e| e.kind == TransitionKind::EndOfDay)
        .expect("daily rest remark");
    assert!(rest.location.starts_with("Near "), "{}", rest.location);
    assert_eq!(rest.end, Some(rest.start + Duration::hours(10)));

    assert!(remarks.iter().all(|e| e.kind != TransitionKind::Drive));
}

#[test]
fn test_reverse_geocoder_outage_degrades_labels() {
    let plan = plan_with(&cross_country(), &Unavailable).expect("plan still succeeds");
    let remarks: Vec<_> = plan.logs.iter().flat_map(|log| &log.remark_events).collect();

    for event in remarks {
        let expected = match event.kind {
            TransitionKind::Pickup => DALLAS.name,
            TransitionKind::Dropoff => ATLANTA.name,
            TransitionKind::Fuel | TransitionKind::Break => EN_ROUTE_FALLBACK,
            TransitionKind::EndOfDay | TransitionKind::Restart => OFF_DUTY_FALLBACK,
            TransitionKind::Drive => unreachable!("drive transitions have no remark"),
        };
        assert_eq!(event.location, expected);
    }
}

#[test]
fn test_geocodes_each_stop_once() {
    let geocoder = CorridorGeocoder::default();
    let router = StraightLineRouter::default();
    let providers = Providers {
        geocoder: &geocoder,
        router: &router,
        reverse_geocoder: &NearestCity,
    };

    plan_trip(&cross_country(), &providers, &RuleSet::default(), now()).expect("plan");
    assert_eq!(geocoder.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_explicit_departure_and_restart() {
    let departure = Utc.with_ymd_and_hms(2024, 3, 10, 13, 30, 0).unwrap();
    let mut request = TripRequest::new(CHICAGO.name, INDIANAPOLIS.name, NASHVILLE.name);
    request.departure = Some(departure);
    request.current_cycle_hours_used = 70.0;

    let plan = plan_with(&request, &NearestCity).expect("plan");

    assert_eq!(plan.segments[0].start, departure);
    assert!(plan.instructions[0].contains("34-hour OFF restart"));
    assert_eq!(plan.waypoints[1].kind, WaypointKind::Restart);
}

#[test]
fn test_invalid_cycle_is_rejected() {
    for cycle in [-1.0, 70.5, f64::NAN] {
        let mut request = cross_country();
        request.current_cycle_hours_used = cycle;
        let err = plan_with(&request, &NearestCity).unwrap_err();
        assert!(matches!(err, PlanError::InvalidInput(_)), "{cycle}: {err}");
    }
}

#[test]
fn test_blank_location_is_rejected() {
    let request = TripRequest::new(CHICAGO.name, "   ", ATLANTA.name);
    let err = plan_with(&request, &NearestCity).unwrap_err();
    assert!(matches!(&err, PlanError::InvalidInput(msg) if msg.contains("pickup_location")));
}

#[test]
fn test_unknown_place_is_upstream_error() {
    let request = TripRequest::new(CHICAGO.name, "Atlantis", ATLANTA.name);
    let err = plan_with(&request, &NearestCity).unwrap_err();
    assert!(matches!(err, PlanError::Upstream(_)));
    assert!(err.to_string().contains("Atlantis"));
}

#[test]
fn test_default_departure_keeps_date() {
    let late = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
    assert_eq!(
        default_departure(late),
        Utc.with_ymd_and_hms(2024, 12, 31, 7, 0, 0).unwrap()
    );
}

#[test]
fn test_plan_wire_shape() {
    let plan = plan_with(&cross_country(), &NearestCity).expect("plan");
    let json = serde_json::to_value(&plan).expect("serialize");

    let segment = &json["logs"][0]["segments"][0];
    assert_eq!(segment["status"], "D");
    assert_eq!(segment["start_iso"], "2024-03-04T07:00:00Z");
    assert!(segment["end_iso"].is_string());

    let waypoint = &json["waypoints"][0];
    assert_eq!(waypoint["type"], "start");
    assert!(waypoint["lng"].is_number());
    assert!(waypoint["lat"].is_number());

    let remark = &json["logs"][0]["remark_events"][0];
    for key in ["start_iso", "end_iso", "type", "location", "reason"] {
        assert!(remark.get(key).is_some(), "remark missing {key}");
    }

    let round_trip: TripPlan = serde_json::from_value(json).expect("deserialize");
    assert_eq!(round_trip.segments, plan.segments);
}

/// Router with whole-hour legs at 60 mph, so every stop lands on a minute.
struct HourlyRouter {
    leg_hours: [f64; 2],
}

impl RouteProvider for HourlyRouter {
    fn route(&self, coordinates: &[(f64, f64)]) -> Result<Route, ProviderError> {
        let legs: Vec<RouteLeg> = self
            .leg_hours
            .iter()
            .map(|hours| RouteLeg {
                distance_m: hours * 60.0 * 1609.34,
                duration_s: hours * 3600.0,
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

#[test]
fn test_stored_instructions_rebuild_annotations() {
    let geocoder = CorridorGeocoder::default();
    let router = HourlyRouter { leg_hours: [1.0, 12.0] };
    let providers = Providers {
        geocoder: &geocoder,
        router: &router,
        reverse_geocoder: &NearestCity,
    };
    let request = TripRequest::new(CHICAGO.name, INDIANAPOLIS.name, NASHVILLE.name);
    let plan = plan_trip(&request, &providers, &RuleSet::default(), now()).expect("plan");
    assert!(plan.waypoints.iter().any(|w| w.kind == WaypointKind::Break));
    assert!(plan.waypoints.iter().any(|w| w.kind == WaypointKind::EndOfDay));

    // A stored plan keeps geometry, segments and instruction text only.
    let mut stored = plan.clone();
    stored.waypoints.clear();
    for log in &mut stored.logs {
        log.remark_events.clear();
    }

    let stops = TripStops {
        current: (CHICAGO.lng, CHICAGO.lat),
        pickup: (INDIANAPOLIS.lng, INDIANAPOLIS.lat),
        dropoff: (NASHVILLE.lng, NASHVILLE.lat),
        current_label: Some(CHICAGO.name.to_string()),
    };
    let names = StopNames {
        pickup: INDIANAPOLIS.name.to_string(),
        dropoff: NASHVILLE.name.to_string(),
    };
    rebuild_annotations(&mut stored, &stops, &names, &NearestCity, &RuleSet::default());

    assert_eq!(stored.waypoints, plan.waypoints);
    assert_eq!(stored.logs, plan.logs);
}
