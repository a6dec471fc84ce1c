//! Dated remark events for the daily log pages.
//!
//! Pickup and dropoff carry the known place name. Route events are
//! reverse-geocoded at their projected position; those lookups run in
//! parallel and each one degrades to a fixed label on failure.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::instruction::{Transition, TransitionKind};
use crate::model::utc_seconds;
use crate::projector::RouteProjector;
use crate::traits::ReverseGeocoder;

/// Label used for fuel stops and breaks when no place can be resolved.
pub const EN_ROUTE_FALLBACK: &str = "En route";
/// Label used for daily rests and restarts when no place can be resolved.
pub const OFF_DUTY_FALLBACK: &str = "Off duty";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemarkEvent {
    #[serde(rename = "start_iso", with = "utc_seconds")]
    pub start: DateTime<Utc>,
    #[serde(rename = "end_iso", with = "utc_seconds::option")]
    pub end: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: TransitionKind,
    pub location: String,
    pub reason: String,
}

/// Place names for the two fixed stops.
#[derive(Debug, Clone, Default)]
pub struct StopNames {
    pub pickup: String,
    pub dropoff: String,
}

enum Placement {
    Known(String),
    Lookup(&'static str),
}

fn placement(kind: TransitionKind, names: &StopNames) -> Option<Placement> {
    match kind {
        TransitionKind::Pickup => Some(Placement::Known(names.pickup.clone())),
        TransitionKind::Dropoff => Some(Placement::Known(names.dropoff.clone())),
        TransitionKind::Fuel | TransitionKind::Break => Some(Placement::Lookup(EN_ROUTE_FALLBACK)),
        TransitionKind::EndOfDay | TransitionKind::Restart => Some(Placement::Lookup(OFF_DUTY_FALLBACK)),
        TransitionKind::Drive => None,
    }
}

/// Build remark events keyed by the UTC date each event starts on.
///
/// Drive transitions produce no remark. Events keep transition order
/// within a date.
pub fn build_remark_events<G>(
    transitions: &[Transition],
    projector: &RouteProjector<'_>,
    geocoder: &G,
    names: &StopNames,
) -> BTreeMap<NaiveDate, Vec<RemarkEvent>>
where
    G: ReverseGeocoder + Sync + ?Sized,
{
    let events: Vec<RemarkEvent> = transitions
        .par_iter()
        .filter_map(|transition| {
            let location = match placement(transition.kind, names)? {
                Placement::Known(name) => name,
                Placement::Lookup(fallback) => projector.locate(transition.at, geocoder, fallback),
            };
            Some(RemarkEvent {
                start: transition.at,
                end: Some(transition.end()),
                kind: transition.kind,
                location,
                reason: transition.kind.label().to_string(),
            })
        })
        .collect();

    let mut by_date: BTreeMap<NaiveDate, Vec<RemarkEvent>> = BTreeMap::new();
    for event in events {
        by_date.entry(event.start.date_naive()).or_default().push(event);
    }
    by_date
}
