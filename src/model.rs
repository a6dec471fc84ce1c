//! Duty statuses, duty segments and the timestamp wire format.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Duty status on a log graph line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DutyStatus {
    #[serde(rename = "OFF")]
    OffDuty,
    /// Sleeper berth. Reserved; the current rules never emit it.
    #[serde(rename = "SB")]
    SleeperBerth,
    #[serde(rename = "D")]
    Driving,
    #[serde(rename = "ON")]
    OnDuty,
}

impl DutyStatus {
    pub fn code(self) -> &'static str {
        match self {
            DutyStatus::OffDuty => "OFF",
            DutyStatus::SleeperBerth => "SB",
            DutyStatus::Driving => "D",
            DutyStatus::OnDuty => "ON",
        }
    }

    /// Driving and on-duty time both count against the daily and cycle caps.
    pub fn is_on_duty(self) -> bool {
        matches!(self, DutyStatus::Driving | DutyStatus::OnDuty)
    }
}

/// A contiguous stretch of a single duty status. `end` is always after `start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutySegment {
    pub status: DutyStatus,
    #[serde(rename = "start_iso", with = "utc_seconds")]
    pub start: DateTime<Utc>,
    #[serde(rename = "end_iso", with = "utc_seconds")]
    pub end: DateTime<Utc>,
}

impl DutySegment {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn hours(&self) -> f64 {
        self.duration().num_seconds() as f64 / 3600.0
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start < at && at < self.end
    }
}

/// Append a segment, extending the previous one when it has the same status
/// and ends exactly where the new one starts. Empty spans are dropped.
pub fn push_segment(
    segments: &mut Vec<DutySegment>,
    status: DutyStatus,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) {
    if end <= start {
        return;
    }
    if let Some(last) = segments.last_mut() {
        if last.status == status && last.end == start {
            last.end = end;
            return;
        }
    }
    segments.push(DutySegment { status, start, end });
}

/// Convert fractional hours to a whole-second duration.
pub fn hours_to_duration(hours: f64) -> Duration {
    Duration::seconds((hours * 3600.0).round() as i64)
}

/// `YYYY-MM-DDTHH:MM:SSZ` serialization for UTC timestamps.
pub mod utc_seconds {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

    pub fn format(at: &DateTime<Utc>) -> String {
        at.format(FORMAT).to_string()
    }

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }

    /// Same format for an optional timestamp, `null` when absent.
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            at: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match at {
                Some(at) => serializer.serialize_str(&super::format(at)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            raw.map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|parsed| parsed.with_timezone(&Utc))
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
        }
    }
}
