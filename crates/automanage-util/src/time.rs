//! Time utilities for automanage
//!
//! Policies are evaluated against a [`TimeContext`]: the hour-of-day and
//! day-of-week of one instant, expressed in the configured timezone. The
//! context is built once per evaluation cycle and never reads the clock
//! itself, so every evaluation is a pure function of its inputs.
//!
//! Day numbering follows the policy tag convention: `0` is Sunday and `6`
//! is Saturday.

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::{AutomanageError, ResourceId, Result};

/// Milliseconds in one hour, used for running-time limits
pub const MILLIS_PER_HOUR: u64 = 1000 * 60 * 60;

/// Format accepted for explicit evaluation instants (`--at`)
pub const WALL_CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp layout embedded in snapshot identifiers
const SNAPSHOT_STAMP_FORMAT: &str = "%Y-%m-%d-%H-%M";

/// The evaluation instant, reduced to what policies look at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeContext {
    pub hour: u8,
    pub day: Weekday,
}

impl TimeContext {
    pub fn new(hour: u8, day: Weekday) -> Option<Self> {
        if hour < 24 { Some(Self { hour, day }) } else { None }
    }

    /// Build a context from an instant already converted to the target timezone
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self {
            hour: dt.hour() as u8,
            day: dt.weekday(),
        }
    }

    /// Monday through Friday
    pub fn is_weekday(&self) -> bool {
        !matches!(self.day, Weekday::Sat | Weekday::Sun)
    }
}

/// Convert a 0 (Sunday) to 6 (Saturday) index into a weekday
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// Interpret a `YYYY-MM-DD HH:MM:SS` wall-clock time in the given timezone.
///
/// Times that fall in a DST gap are rejected; ambiguous times resolve to the
/// earlier instant.
pub fn parse_wall_clock<Tz: TimeZone>(s: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), WALL_CLOCK_FORMAT).map_err(|e| {
        AutomanageError::invalid_time(format!(
            "'{}' does not match {}: {}",
            s, WALL_CLOCK_FORMAT, e
        ))
    })?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            AutomanageError::invalid_time(format!("'{}' does not exist in the configured timezone", s))
        })
}

/// Snapshot identifier for a stop request: `<resource-id>-lifecycle-<YYYY-MM-DD-HH-mm>`
pub fn snapshot_identifier<Tz: TimeZone>(resource_id: &ResourceId, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}-lifecycle-{}",
        resource_id,
        at.format(SNAPSHOT_STAMP_FORMAT)
    )
}

/// Format a DateTime with full date and time.
pub fn format_datetime_full<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format(WALL_CLOCK_FORMAT).to_string()
}
