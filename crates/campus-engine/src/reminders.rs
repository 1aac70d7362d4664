//! Reminder cadence for lectures and approved meetings.
//!
//! Each person picks one or more leads (`60min`, `30min`, `15min`,
//! `instant`). A periodic caller asks which reminders are due at `now`; a
//! lead counts as due while the time left before the start lies within the
//! configured tolerance of that lead. Choosing a channel and delivering the
//! message is left to the caller.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::interval::{DateRange, Interval};
use crate::model::{Person, PersonRef};
use crate::recurrence;
use crate::store::ScheduleStore;

/// How long before an event a reminder goes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ReminderLead {
    #[serde(rename = "60min")]
    SixtyMinutes,
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[default]
    #[serde(rename = "15min")]
    FifteenMinutes,
    #[serde(rename = "instant")]
    Instant,
}

impl ReminderLead {
    pub const ALL: [ReminderLead; 4] = [
        ReminderLead::SixtyMinutes,
        ReminderLead::ThirtyMinutes,
        ReminderLead::FifteenMinutes,
        ReminderLead::Instant,
    ];

    pub fn lead(self) -> Duration {
        match self {
            ReminderLead::SixtyMinutes => Duration::minutes(60),
            ReminderLead::ThirtyMinutes => Duration::minutes(30),
            ReminderLead::FifteenMinutes => Duration::minutes(15),
            ReminderLead::Instant => Duration::zero(),
        }
    }

    /// Is a reminder with this lead due at `now` for something starting at `starts_at`?
    ///
    /// Due when the time left `u` satisfies `lead - tolerance <= u < lead + tolerance`;
    /// for `Instant` the lower bound is zero instead.
    pub fn is_due(self, starts_at: DateTime<Utc>, now: DateTime<Utc>, tolerance: Duration) -> bool {
        let left = starts_at - now;
        let lower = match self {
            ReminderLead::Instant => Duration::zero(),
            _ => self.lead() - tolerance,
        };
        lower <= left && left < self.lead() + tolerance
    }

    fn phrase(self) -> &'static str {
        match self {
            ReminderLead::SixtyMinutes => "in 60 minutes",
            ReminderLead::ThirtyMinutes => "in 30 minutes",
            ReminderLead::FifteenMinutes => "in 15 minutes",
            ReminderLead::Instant => "now",
        }
    }
}

impl fmt::Display for ReminderLead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReminderLead::SixtyMinutes => "60min",
            ReminderLead::ThirtyMinutes => "30min",
            ReminderLead::FifteenMinutes => "15min",
            ReminderLead::Instant => "instant",
        })
    }
}

impl FromStr for ReminderLead {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ReminderLead::ALL
            .into_iter()
            .find(|lead| lead.to_string() == s)
            .ok_or_else(|| format!("unknown reminder lead '{}'", s))
    }
}

/// Parse a stored preference such as `"60min,15min"`.
///
/// Unknown entries are skipped with a warning; duplicates collapse.
pub fn parse_preferences(raw: &str) -> Vec<ReminderLead> {
    let mut leads = BTreeSet::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse() {
            Ok(lead) => {
                leads.insert(lead);
            }
            Err(e) => tracing::warn!(preference = %raw, "{}", e),
        }
    }
    leads.into_iter().collect()
}

/// What a reminder is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReminderSubject {
    Lecture { lecture_id: String },
    Meeting { meeting_id: String },
}

/// A reminder ready to hand to a delivery channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub recipient: PersonRef,
    pub subject: ReminderSubject,
    pub lead: ReminderLead,
    pub starts_at: DateTime<Utc>,
    pub message: String,
}

/// Works out which reminders are due.
pub struct ReminderPlanner<'a, S: ScheduleStore + ?Sized> {
    store: &'a S,
    config: &'a EngineConfig,
}

impl<'a, S: ScheduleStore + ?Sized> ReminderPlanner<'a, S> {
    pub fn new(store: &'a S, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    /// Every lecture and meeting reminder due at `now`, ordered by start time
    /// then recipient.
    ///
    /// # Errors
    /// Propagates store and configuration errors.
    pub fn due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>> {
        let tolerance = Duration::seconds(self.config.reminder_tolerance_seconds);
        let mut reminders = self.lecture_reminders(now, tolerance)?;
        reminders.extend(self.meeting_reminders(now, tolerance)?);
        reminders.sort_by(|a, b| {
            (a.starts_at, &a.recipient).cmp(&(b.starts_at, &b.recipient))
        });
        tracing::debug!(%now, count = reminders.len(), "reminders due");
        Ok(reminders)
    }

    /// Lectures later today, for the lecturer and every attending student.
    fn lecture_reminders(&self, now: DateTime<Utc>, tolerance: Duration) -> Result<Vec<Reminder>> {
        let today = DateRange::single(now.with_timezone(&self.config.tz()?).date_naive());
        let mut reminders = Vec::new();

        for lecture in self.store.lectures_between(today)? {
            let occurrences: Vec<_> = recurrence::expand_lecture(&lecture, today, self.config)?
                .into_iter()
                .filter(|o| o.interval.start >= now)
                .collect();
            if occurrences.is_empty() {
                continue;
            }

            let course = match self.store.unit(&lecture.unit_id) {
                Ok(unit) => unit.course_name,
                Err(e) => {
                    tracing::warn!(lecture = %lecture.id, error = %e, "lecture unit missing");
                    lecture.unit_id.clone()
                }
            };
            let attendees = dedup(self.store.lecture_attendees(&lecture)?);

            for occurrence in &occurrences {
                let starts_at = occurrence.interval.start;
                for person in &attendees {
                    for lead in due_leads(person, starts_at, now, tolerance) {
                        reminders.push(Reminder {
                            recipient: person.reference(),
                            subject: ReminderSubject::Lecture {
                                lecture_id: lecture.id.clone(),
                            },
                            lead,
                            starts_at,
                            message: format!(
                                "Reminder: Your course '{}' is starting {}.",
                                course,
                                lead.phrase()
                            ),
                        });
                    }
                }
            }
        }

        Ok(reminders)
    }

    /// Approved meetings, for the student and the lecturer.
    fn meeting_reminders(&self, now: DateTime<Utc>, tolerance: Duration) -> Result<Vec<Reminder>> {
        let horizon = Interval {
            start: now,
            end: now + ReminderLead::SixtyMinutes.lead() + tolerance,
        };
        let mut reminders = Vec::new();

        for meeting in self.store.approved_meetings_between(horizon)? {
            let student = self.store.person(&PersonRef::student(&meeting.student_id));
            let lecturer = self.store.person(&PersonRef::faculty(&meeting.lecturer_id));
            let (Ok(student), Ok(lecturer)) = (student, lecturer) else {
                tracing::warn!(meeting = %meeting.id, "meeting references an unknown participant");
                continue;
            };

            for (person, other) in [(&student, &lecturer), (&lecturer, &student)] {
                for lead in due_leads(person, meeting.start, now, tolerance) {
                    reminders.push(Reminder {
                        recipient: person.reference(),
                        subject: ReminderSubject::Meeting {
                            meeting_id: meeting.id.clone(),
                        },
                        lead,
                        starts_at: meeting.start,
                        message: format!(
                            "Reminder: You have a meeting with {} titled '{}' starting {}.",
                            other.name(),
                            meeting.title,
                            lead.phrase()
                        ),
                    });
                }
            }
        }

        Ok(reminders)
    }
}

fn due_leads(
    person: &Person,
    starts_at: DateTime<Utc>,
    now: DateTime<Utc>,
    tolerance: Duration,
) -> Vec<ReminderLead> {
    person
        .reminder_preferences()
        .iter()
        .copied()
        .filter(|lead| lead.is_due(starts_at, now, tolerance))
        .collect()
}

fn dedup(people: Vec<Person>) -> Vec<Person> {
    let mut seen = BTreeSet::new();
    people
        .into_iter()
        .filter(|p| seen.insert(p.reference()))
        .collect()
}
