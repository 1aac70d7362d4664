//! DST transition policies for lecture wall-clock times.
//!
//! Lectures are booked as a local date plus start and end times. Turning them
//! into instants needs a rule for local times that do not exist (spring
//! forward) or exist twice (fall back). Ambiguous times always resolve to the
//! earlier instant.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Policy for handling lecture times that fall during DST transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Drop occurrences that fall in the DST gap (e.g., 2:30 AM during spring forward)
    Skip,
    /// Shift to the next valid local time after the gap
    ShiftForward,
    /// Keep the wall clock reading and apply the offset in force before the gap
    #[default]
    WallClock,
}

/// Longest DST gap we search across when shifting forward.
const MAX_GAP_MINUTES: i64 = 180;

/// Convert a local date and time in `tz` to a UTC instant.
///
/// Returns `None` only when the local time does not exist and the policy is
/// [`DstPolicy::Skip`].
pub fn localize(
    date: NaiveDate,
    time: NaiveTime,
    tz: Tz,
    policy: DstPolicy,
) -> Option<DateTime<Utc>> {
    localize_naive(date.and_time(time), tz, policy)
}

/// Convert a naive local datetime in `tz` to a UTC instant.
pub fn localize_naive(local: NaiveDateTime, tz: Tz, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => (1..=MAX_GAP_MINUTES).find_map(|m| {
                tz.from_local_datetime(&(local + Duration::minutes(m)))
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
            }),
            DstPolicy::WallClock => {
                let before = tz
                    .from_local_datetime(&(local - Duration::minutes(MAX_GAP_MINUTES)))
                    .earliest()?;
                let offset_seconds = i64::from(before.offset().fix().local_minus_utc());
                Some((local - Duration::seconds(offset_seconds)).and_utc())
            }
        },
    }
}
