//! Lecture recurrence expansion: a lecture record into dated occurrences.
//!
//! Repeating lectures are evaluated as RFC 5545 rules with the `rrule` crate
//! (v0.13). Only the dates come from the rule. Wall-clock start and end
//! times are placed on each date afterwards with the configured DST policy,
//! so a lecture at 09:00 stays at 09:00 local across a DST change.

use chrono::{Duration, NaiveDate};
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::dst;
use crate::error::{Result, ScheduleError};
use crate::interval::{DateRange, Interval};
use crate::model::{Lecture, Recurrence};

/// One dated occurrence of a lecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LectureOccurrence {
    pub lecture_id: String,
    pub date: NaiveDate,
    pub interval: Interval,
}

/// Cheap pre-filter: could `lecture` have an occurrence inside `range`?
pub fn may_occur_within(lecture: &Lecture, range: DateRange) -> bool {
    match lecture.recurrence {
        Recurrence::Once => range.contains(lecture.date),
        Recurrence::Daily | Recurrence::Weekly => {
            lecture.date <= range.last
                && lecture.recur_until.is_none_or(|until| until >= range.first)
        }
    }
}

/// Dates on which `lecture` takes place within `range` (inclusive).
///
/// A repeating lecture without `recur_until` runs through the end of `range`.
///
/// # Errors
/// Returns `ScheduleError::InvalidRecurrence` if the generated rule is rejected
/// by the rule evaluator.
pub fn occurrence_dates(lecture: &Lecture, range: DateRange) -> Result<Vec<NaiveDate>> {
    if range.is_empty() {
        return Ok(Vec::new());
    }

    let (freq, step_days) = match lecture.recurrence {
        Recurrence::Once => {
            return Ok(if range.contains(lecture.date) {
                vec![lecture.date]
            } else {
                Vec::new()
            });
        }
        Recurrence::Daily => ("DAILY", 1),
        Recurrence::Weekly => ("WEEKLY", 7),
    };

    // Move DTSTART up to the first occurrence inside the range so the rule
    // never enumerates dates we would throw away.
    let first = if range.first > lecture.date {
        let behind = (range.first - lecture.date).num_days();
        let steps = (behind + step_days - 1) / step_days;
        lecture.date + Duration::days(steps * step_days)
    } else {
        lecture.date
    };
    let last = lecture
        .recur_until
        .map_or(range.last, |until| until.min(range.last));
    if first > last {
        return Ok(Vec::new());
    }

    let rrule_text = format!(
        "DTSTART:{}T000000Z\nRRULE:FREQ={};UNTIL={}T000000Z",
        first.format("%Y%m%d"),
        freq,
        last.format("%Y%m%d"),
    );
    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| ScheduleError::InvalidRecurrence(format!("{}", e)))?;

    // Upper bound on instances is one per day in [first, last].
    let limit = u16::try_from((last - first).num_days() + 1).unwrap_or(u16::MAX);
    let instances = rrule_set.all(limit);
    if instances.limited {
        tracing::warn!(
            lecture = %lecture.id,
            limit,
            "recurrence expansion hit its instance limit"
        );
    }

    Ok(instances
        .dates
        .into_iter()
        .map(|dt| dt.date_naive())
        .collect())
}

/// Expand a lecture into UTC busy intervals for every occurrence in `range`.
///
/// Occurrences whose start or end falls in a DST gap are dropped when the
/// policy is `Skip`.
///
/// # Errors
/// Returns `ScheduleError::InvalidTimezone` for a bad configured zone,
/// `ScheduleError::InvalidRecurrence` if the rule cannot be evaluated, and
/// `ScheduleError::InvalidRange` if the lecture ends before it starts.
pub fn expand_lecture(
    lecture: &Lecture,
    range: DateRange,
    config: &EngineConfig,
) -> Result<Vec<LectureOccurrence>> {
    let tz = config.tz()?;
    let mut occurrences = Vec::new();

    for date in occurrence_dates(lecture, range)? {
        let start = dst::localize(date, lecture.start_time, tz, config.dst_policy);
        let end = dst::localize(date, lecture.end_time, tz, config.dst_policy);
        let (Some(start), Some(end)) = (start, end) else {
            tracing::debug!(lecture = %lecture.id, %date, "occurrence skipped by DST policy");
            continue;
        };
        occurrences.push(LectureOccurrence {
            lecture_id: lecture.id.clone(),
            date,
            interval: Interval::new(start, end)?,
        });
    }

    Ok(occurrences)
}
