//! Half-open time intervals and the strict-overlap primitive.
//!
//! Every busy period and candidate in the engine is `[start, end)`. Two
//! intervals overlap when each starts before the other ends, so intervals
//! that only touch at an endpoint never overlap, and an empty interval
//! overlaps nothing.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::dst;
use crate::error::{Result, ScheduleError};

/// Strict overlap of `[a_start, a_end)` and `[b_start, b_end)`.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < a_end && b_start < b_end && a_start < b_end && a_end > b_start
}

/// A half-open `[start, end)` span of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Build an interval that may be empty (`start == end`).
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidRange` when `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(ScheduleError::invalid_range(start, end));
        }
        Ok(Self { start, end })
    }

    /// Build a search window, which must have positive length.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidRange` when `start >= end`.
    pub fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(ScheduleError::invalid_range(start, end));
        }
        Ok(Self { start, end })
    }

    /// Build an interval from a local date with start and end wall-clock times.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidTimezone` for a bad configured zone,
    /// `ScheduleError::InvalidDateTime` when a time is skipped by the DST
    /// policy, and `ScheduleError::InvalidRange` when the end precedes the start.
    pub fn on_date(
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        config: &EngineConfig,
    ) -> Result<Self> {
        let tz = config.tz()?;
        let resolve = |time: NaiveTime| {
            dst::localize(date, time, tz, config.dst_policy).ok_or_else(|| {
                let local = date.and_time(time);
                ScheduleError::InvalidDateTime(format!("{} does not exist in {}", local, tz))
            })
        };
        Self::new(resolve(start)?, resolve(end)?)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    /// Minutes shared with `other`, zero when they do not overlap.
    pub fn overlap_minutes(&self, other: &Interval) -> i64 {
        if !self.overlaps(other) {
            return 0;
        }
        (self.end.min(other.end) - self.start.max(other.start)).num_minutes()
    }

    /// The local calendar dates this interval touches in `tz`.
    pub fn local_dates(&self, tz: Tz) -> DateRange {
        DateRange {
            first: self.start.with_timezone(&tz).date_naive(),
            last: self.end.with_timezone(&tz).date_naive(),
        }
    }
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl DateRange {
    pub fn single(date: NaiveDate) -> Self {
        Self {
            first: date,
            last: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }
}

/// Parse a timestamp from user input.
///
/// Accepts RFC 3339 (with offset, e.g. "2026-03-02T09:00:00+00:00") and naive
/// local time ("2026-03-02T09:00:00"), which is read in the configured
/// institution timezone.
///
/// # Errors
/// Returns `ScheduleError::InvalidDateTime` if the string matches neither form
/// or names a local time the DST policy skips.
pub fn parse_instant(s: &str, config: &EngineConfig) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|e| ScheduleError::InvalidDateTime(format!("'{}': {}", s, e)))?;
    dst::localize_naive(naive, config.tz()?, config.dst_policy)
        .ok_or_else(|| {
            ScheduleError::InvalidDateTime(format!("'{}' does not exist in {}", s, config.timezone))
        })
}
