//! Calendar entities read by the engine.
//!
//! These mirror what the surrounding application persists. The engine only
//! reads them, apart from the meeting status transitions and the taught
//! sweep which callers apply explicitly.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::reminders::ReminderLead;

/// Whether a reference points at a student or a faculty member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonKind {
    Student,
    Faculty,
}

impl PersonKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PersonKind::Student => "student",
            PersonKind::Faculty => "faculty",
        }
    }
}

impl fmt::Display for PersonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unresolved reference to a person.
///
/// Written as `student:<id>` or `faculty:<id>` on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonRef {
    pub kind: PersonKind,
    pub id: String,
}

impl PersonRef {
    pub fn student(id: impl Into<String>) -> Self {
        Self {
            kind: PersonKind::Student,
            id: id.into(),
        }
    }

    pub fn faculty(id: impl Into<String>) -> Self {
        Self {
            kind: PersonKind::Faculty,
            id: id.into(),
        }
    }
}

impl fmt::Display for PersonRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for PersonRef {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ScheduleError::InvalidReference(s.to_string());
        let (kind, id) = s.split_once(':').ok_or_else(invalid)?;
        let id = id.trim();
        if id.is_empty() {
            return Err(invalid());
        }
        match kind.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::student(id)),
            "faculty" | "lecturer" => Ok(Self::faculty(id)),
            _ => Err(invalid()),
        }
    }
}

/// Students sharing course, year of study, and semester.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cohort {
    pub course: String,
    pub year_of_study: String,
    pub semester: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: String,
    pub name: String,
    pub cohort: Cohort,
    #[serde(default = "default_preferences")]
    pub reminder_preferences: Vec<ReminderLead>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default = "default_preferences")]
    pub reminder_preferences: Vec<ReminderLead>,
}

fn default_preferences() -> Vec<ReminderLead> {
    vec![ReminderLead::default()]
}

/// A resolved person. Which lectures apply depends on the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Person {
    Student(StudentProfile),
    Faculty(FacultyProfile),
}

impl Person {
    pub fn reference(&self) -> PersonRef {
        match self {
            Person::Student(s) => PersonRef::student(&s.id),
            Person::Faculty(f) => PersonRef::faculty(&f.id),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Person::Student(s) => &s.id,
            Person::Faculty(f) => &f.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Person::Student(s) => &s.name,
            Person::Faculty(f) => &f.name,
        }
    }

    pub fn reminder_preferences(&self) -> &[ReminderLead] {
        match self {
            Person::Student(s) => &s.reminder_preferences,
            Person::Faculty(f) => &f.reminder_preferences,
        }
    }
}

/// A unit a lecturer teaches to one cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookedUnit {
    pub id: String,
    pub lecturer_id: String,
    pub course_name: String,
    pub cohort: Cohort,
}

/// A student's registration for a booked unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub student_id: String,
    pub unit_id: String,
}

/// How a lecture repeats after its first date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    #[default]
    Once,
    Daily,
    Weekly,
}

/// A scheduled lecture. Date and times are local to the institution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lecture {
    pub id: String,
    pub lecturer_id: String,
    pub unit_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub recurrence: Recurrence,
    /// Last date (inclusive) a repeating lecture runs on.
    #[serde(default)]
    pub recur_until: Option<NaiveDate>,
    #[serde(default)]
    pub taught: bool,
}

/// A personal calendar entry owned by a student or a faculty member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalEvent {
    pub id: String,
    pub owner: PersonRef,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Modified,
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MeetingStatus::Pending => "pending",
            MeetingStatus::Approved => "approved",
            MeetingStatus::Rejected => "rejected",
            MeetingStatus::Modified => "modified",
        })
    }
}

/// A step in the meeting request workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingAction {
    /// Lecturer approves a pending request, or the student accepts a modified one.
    Approve,
    /// Lecturer rejects a pending request, or the student declines a modified one.
    Reject,
    /// Lecturer proposes a different time or place.
    Modify,
}

impl fmt::Display for MeetingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MeetingAction::Approve => "approve",
            MeetingAction::Reject => "reject",
            MeetingAction::Modify => "modify",
        })
    }
}

impl MeetingStatus {
    /// The status reached by applying `action`.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidTransition` once a request is approved or
    /// rejected.
    pub fn apply(self, action: MeetingAction) -> Result<MeetingStatus> {
        use MeetingAction::*;
        use MeetingStatus::*;

        match (self, action) {
            (Pending | Modified, Approve) => Ok(Approved),
            (Pending | Modified, Reject) => Ok(Rejected),
            (Pending | Modified, Modify) => Ok(Modified),
            (from, action) => Err(ScheduleError::InvalidTransition { from, action }),
        }
    }
}

/// A meeting a student asked a lecturer for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRequest {
    pub id: String,
    pub student_id: String,
    pub lecturer_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub status: MeetingStatus,
}

impl MeetingRequest {
    /// Only approved meetings occupy a calendar.
    pub fn is_busy(&self) -> bool {
        self.status == MeetingStatus::Approved
    }

    pub fn involves(&self, person: &PersonRef) -> bool {
        match person.kind {
            PersonKind::Student => self.student_id == person.id,
            PersonKind::Faculty => self.lecturer_id == person.id,
        }
    }

    /// Move the request through its workflow.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidTransition` for a finished request.
    pub fn apply(&mut self, action: MeetingAction) -> Result<MeetingStatus> {
        self.status = self.status.apply(action)?;
        Ok(self.status)
    }

    /// Lecturer counter-proposal: new time and place, status becomes modified.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidRange` for an empty or inverted time and
    /// `ScheduleError::InvalidTransition` for a finished request.
    pub fn propose(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        location: impl Into<String>,
    ) -> Result<MeetingStatus> {
        if start >= end {
            return Err(ScheduleError::invalid_range(start, end));
        }
        let status = self.status.apply(MeetingAction::Modify)?;
        self.start = start;
        self.end = end;
        self.location = location.into();
        self.status = status;
        Ok(status)
    }
}
