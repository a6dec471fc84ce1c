//! Daily log pages: duty segments grouped by UTC calendar date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::DutySegment;
use crate::remarks::RemarkEvent;

/// One log page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    pub segments: Vec<DutySegment>,
    #[serde(default)]
    pub remark_events: Vec<RemarkEvent>,
}

/// Bucket segments by the UTC date of their start, dates ascending.
///
/// A segment crossing midnight stays whole on its start date.
pub fn partition_by_date(segments: &[DutySegment]) -> Vec<DailyLog> {
    let mut by_date: BTreeMap<NaiveDate, Vec<DutySegment>> = BTreeMap::new();
    for segment in segments {
        by_date
            .entry(segment.start.date_naive())
            .or_default()
            .push(segment.clone());
    }

    by_date
        .into_iter()
        .map(|(date, segments)| DailyLog {
            date,
            segments,
            remark_events: Vec::new(),
        })
        .collect()
}

/// Attach remark events to the page with the matching date. Events dated
/// on a day with no page are dropped.
pub fn attach_remarks(logs: &mut [DailyLog], mut remarks: BTreeMap<NaiveDate, Vec<RemarkEvent>>) {
    for log in logs.iter_mut() {
        if let Some(events) = remarks.remove(&log.date) {
            log.remark_events = events;
        }
    }
}
