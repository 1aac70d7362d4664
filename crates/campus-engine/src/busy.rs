//! Busy-interval gathering: one person's calendar as `[start, end)` spans.
//!
//! A person's busy set is the union of their lecture occurrences (taught or
//! attended), their personal events, and their approved meetings. Sources are
//! collected in that fixed order, which the slot finder relies on for a
//! deterministic scan.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{Result, ScheduleError};
use crate::interval::Interval;
use crate::model::Person;
use crate::recurrence;
use crate::store::ScheduleStore;

/// Where a busy interval comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyKind {
    Lecture,
    PersonalEvent,
    Meeting,
}

impl BusyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BusyKind::Lecture => "lecture",
            BusyKind::PersonalEvent => "personal_event",
            BusyKind::Meeting => "meeting",
        }
    }
}

impl fmt::Display for BusyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusyKind {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lecture" => Ok(BusyKind::Lecture),
            "personal_event" | "personal-event" => Ok(BusyKind::PersonalEvent),
            "meeting" => Ok(BusyKind::Meeting),
            _ => Err(ScheduleError::InvalidRecordKey(s.to_string())),
        }
    }
}

/// All sources, in collection order.
pub const ALL_SOURCES: [BusyKind; 3] = [
    BusyKind::Lecture,
    BusyKind::PersonalEvent,
    BusyKind::Meeting,
];

/// A span during which a person is committed, tagged with its source record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub kind: BusyKind,
    pub record_id: String,
    pub interval: Interval,
}

impl BusyInterval {
    pub fn new(kind: BusyKind, record_id: impl Into<String>, interval: Interval) -> Self {
        Self {
            kind,
            record_id: record_id.into(),
            interval,
        }
    }
}

/// Collect `person`'s busy intervals of the requested `kinds` around `span`.
///
/// Lectures are expanded for every local date `span` touches; personal events
/// and approved meetings are those the store reports as overlapping `span`.
/// Output is grouped by kind in the order given, each group in store order.
pub fn collect<S: ScheduleStore + ?Sized>(
    store: &S,
    person: &Person,
    span: Interval,
    kinds: &[BusyKind],
    config: &EngineConfig,
) -> Result<Vec<BusyInterval>> {
    let reference = person.reference();
    let mut busy = Vec::new();

    for kind in kinds {
        match kind {
            BusyKind::Lecture => {
                let dates = span.local_dates(config.tz()?);
                for lecture in store.lectures_for(person, dates)? {
                    for occurrence in recurrence::expand_lecture(&lecture, dates, config)? {
                        busy.push(BusyInterval::new(
                            BusyKind::Lecture,
                            occurrence.lecture_id,
                            occurrence.interval,
                        ));
                    }
                }
            }
            BusyKind::PersonalEvent => {
                for event in store.personal_events_for(&reference, span)? {
                    busy.push(BusyInterval {
                        kind: BusyKind::PersonalEvent,
                        record_id: event.id,
                        interval: Interval {
                            start: event.start,
                            end: event.end,
                        },
                    });
                }
            }
            BusyKind::Meeting => {
                for meeting in store.approved_meetings_for(&reference, span)? {
                    busy.push(BusyInterval {
                        kind: BusyKind::Meeting,
                        record_id: meeting.id,
                        interval: Interval {
                            start: meeting.start,
                            end: meeting.end,
                        },
                    });
                }
            }
        }
    }

    tracing::debug!(person = %reference, count = busy.len(), "busy intervals collected");
    Ok(busy)
}
