//! Structured duty transitions and their human-readable audit lines.
//!
//! The simulator emits [`Transition`] records directly. Text is rendered
//! from them for the instruction trail; [`transitions_from_lines`] recovers
//! events from previously stored instruction text.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RuleSet;
use crate::model::hours_to_duration;

/// What happened at a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Pickup,
    Dropoff,
    Fuel,
    Break,
    EndOfDay,
    Restart,
    Drive,
}

impl TransitionKind {
    /// Short label used on map markers and remark reasons.
    pub fn label(self) -> &'static str {
        match self {
            TransitionKind::Pickup => "Pickup",
            TransitionKind::Dropoff => "Drop-off",
            TransitionKind::Fuel => "Fuel stop",
            TransitionKind::Break => "Break",
            TransitionKind::EndOfDay => "End of day",
            TransitionKind::Restart => "34-hour restart",
            TransitionKind::Drive => "Drive",
        }
    }

    /// Length of this event's block under `rules`. Drives have no fixed length.
    pub fn block_duration(self, rules: &RuleSet) -> Option<Duration> {
        let hours = match self {
            TransitionKind::Pickup | TransitionKind::Dropoff => rules.pickup_dropoff_hours(),
            TransitionKind::Fuel => rules.fuel_stop_hours(),
            TransitionKind::Break => rules.break_hours(),
            TransitionKind::EndOfDay => rules.daily_rest_hours,
            TransitionKind::Restart => rules.restart_hours,
            TransitionKind::Drive => return None,
        };
        Some(hours_to_duration(hours))
    }
}

/// One emitted step of the duty schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub at: DateTime<Utc>,
    pub duration: Duration,
}

impl Transition {
    pub fn new(kind: TransitionKind, at: DateTime<Utc>, duration: Duration) -> Self {
        Self { kind, at, duration }
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.at + self.duration
    }

    /// Render the timestamp-prefixed audit line.
    pub fn instruction(&self) -> String {
        let hours = self.duration.num_seconds() as f64 / 3600.0;
        let text = match self.kind {
            TransitionKind::Pickup => format!("Pickup - {} ON duty.", hour_phrase(hours)),
            TransitionKind::Dropoff => format!("Drop-off - {} ON duty.", hour_phrase(hours)),
            TransitionKind::Fuel => format!(
                "Fuel stop - {} minutes ON duty.",
                self.duration.num_minutes()
            ),
            TransitionKind::Break => format!(
                "{}-minute break (OFF duty).",
                self.duration.num_minutes()
            ),
            TransitionKind::EndOfDay => format!(
                "End of day - {} OFF. Stop here; resume next day from this location.",
                hour_phrase(hours)
            ),
            TransitionKind::Restart => format!(
                "{}-hour OFF restart due to cycle limit.",
                hours.round() as i64
            ),
            TransitionKind::Drive => format!("Drive for {hours:.1} hours."),
        };
        format!("{}: {}", self.at.format(LINE_TIME_FORMAT), text)
    }
}

const LINE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

fn hour_phrase(hours: f64) -> String {
    if (hours - 1.0).abs() < f64::EPSILON {
        "1 hour".to_string()
    } else if hours.fract() == 0.0 {
        format!("{hours:.0} hours")
    } else {
        format!("{hours:.1} hours")
    }
}

/// Recover `(timestamp, kind)` from an instruction line.
///
/// The restart phrase is matched without its hour count, so lines written
/// under a shortened restart still parse.
///
/// Matching is done on case-folded text with unicode dashes folded to `-`.
/// Drive lines, unknown phrases and lines without a readable timestamp
/// return `None`.
pub fn parse_line(line: &str) -> Option<(DateTime<Utc>, TransitionKind)> {
    let idx = line.find(": ")?;
    if idx == 0 {
        return None;
    }
    let at = parse_timestamp(line[..idx].trim())?;
    let text = normalize(line[idx + 2..].trim());

    let kind = if text.contains("pickup") && text.contains("1 hour") {
        TransitionKind::Pickup
    } else if text.contains("drop-off") || text.contains("drop off") {
        TransitionKind::Dropoff
    } else if text.contains("fuel stop") {
        TransitionKind::Fuel
    } else if text.contains("minute break") {
        TransitionKind::Break
    } else if text.contains("end of day") {
        TransitionKind::EndOfDay
    } else if text.contains("restart") {
        TransitionKind::Restart
    } else {
        return None;
    };
    Some((at, kind))
}

/// Rebuild the non-drive transitions of a stored instruction trail.
///
/// Block lengths come from `rules`, since the text only carries a start
/// minute. Lines that do not parse are skipped.
pub fn transitions_from_lines<S: AsRef<str>>(lines: &[S], rules: &RuleSet) -> Vec<Transition> {
    lines
        .iter()
        .filter_map(|line| parse_line(line.as_ref()))
        .filter_map(|(at, kind)| {
            let duration = kind.block_duration(rules)?;
            Some(Transition::new(kind, at, duration))
        })
        .collect()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z") {
        return Some(parsed.with_timezone(&Utc));
    }
    let naive = raw.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' => '-',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
}
