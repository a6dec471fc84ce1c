//! Map markers for the notable events of a planned trip.

use serde::{Deserialize, Serialize};

use crate::instruction::{Transition, TransitionKind};
use crate::projector::RouteProjector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointKind {
    Start,
    Pickup,
    Dropoff,
    Fuel,
    Break,
    EndOfDay,
    Restart,
}

impl WaypointKind {
    fn for_transition(kind: TransitionKind) -> Option<Self> {
        match kind {
            TransitionKind::Pickup => Some(WaypointKind::Pickup),
            TransitionKind::Dropoff => Some(WaypointKind::Dropoff),
            TransitionKind::Fuel => Some(WaypointKind::Fuel),
            TransitionKind::Break => Some(WaypointKind::Break),
            TransitionKind::EndOfDay => Some(WaypointKind::EndOfDay),
            TransitionKind::Restart => Some(WaypointKind::Restart),
            TransitionKind::Drive => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(rename = "type")]
    pub kind: WaypointKind,
    #[serde(rename = "lng")]
    pub lon: f64,
    pub lat: f64,
    pub label: String,
}

impl Waypoint {
    fn new(kind: WaypointKind, (lon, lat): (f64, f64), label: impl Into<String>) -> Self {
        Self {
            kind,
            lon,
            lat,
            label: label.into(),
        }
    }
}

/// Known trip endpoints, all `(longitude, latitude)`.
#[derive(Debug, Clone)]
pub struct TripStops {
    pub current: (f64, f64),
    pub pickup: (f64, f64),
    pub dropoff: (f64, f64),
    /// Label for the start marker; `"Start"` when absent.
    pub current_label: Option<String>,
}

/// Build map markers: a start marker, then one per non-drive transition,
/// and a trailing dropoff if none was emitted.
///
/// Pickup and dropoff sit on their known coordinates; everything else is
/// placed along the route by driving progress.
pub fn build_waypoints(
    transitions: &[Transition],
    projector: &RouteProjector<'_>,
    stops: &TripStops,
) -> Vec<Waypoint> {
    let start_label = stops
        .current_label
        .as_deref()
        .filter(|label| !label.is_empty())
        .unwrap_or("Start");
    let mut waypoints = vec![Waypoint::new(WaypointKind::Start, stops.current, start_label)];

    let mut has_dropoff = false;
    if !projector.segments().is_empty() {
        for transition in transitions {
            let Some(kind) = WaypointKind::for_transition(transition.kind) else {
                continue;
            };
            let position = match kind {
                WaypointKind::Pickup => stops.pickup,
                WaypointKind::Dropoff => {
                    has_dropoff = true;
                    stops.dropoff
                }
                _ => projector.position_at(transition.at),
            };
            waypoints.push(Waypoint::new(kind, position, transition.kind.label()));
        }
    }

    if !has_dropoff {
        waypoints.push(Waypoint::new(
            WaypointKind::Dropoff,
            stops.dropoff,
            TransitionKind::Dropoff.label(),
        ));
    }
    waypoints
}
