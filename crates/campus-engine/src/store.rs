//! Read access to calendar data.
//!
//! The engine never owns persistence. It asks a [`ScheduleStore`] for whole
//! result sets bounded by a date range or time window and does all interval
//! reasoning itself. [`MemoryStore`] implements the trait over a snapshot,
//! typically decoded from JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::interval::{overlaps, DateRange, Interval};
use crate::model::{
    BookedUnit, FacultyProfile, Lecture, MeetingAction, MeetingRequest, MeetingStatus, Person,
    PersonKind, PersonRef, PersonalEvent, Registration, StudentProfile,
};
use crate::recurrence;

/// Data-access collaborator consumed by the conflict checker, slot finder,
/// and reminder planner.
pub trait ScheduleStore {
    /// Resolve a reference.
    ///
    /// # Errors
    /// Returns `ScheduleError::NotFound` when no such student or faculty exists.
    fn person(&self, person: &PersonRef) -> Result<Person>;

    /// Lectures the person teaches or attends that may occur within `range`.
    fn lectures_for(&self, person: &Person, range: DateRange) -> Result<Vec<Lecture>>;

    /// Personal events owned by the person that overlap `window`.
    fn personal_events_for(
        &self,
        person: &PersonRef,
        window: Interval,
    ) -> Result<Vec<PersonalEvent>>;

    /// Approved meetings the person takes part in that overlap `window`.
    fn approved_meetings_for(
        &self,
        person: &PersonRef,
        window: Interval,
    ) -> Result<Vec<MeetingRequest>>;

    /// Every lecture that may occur within `range`.
    fn lectures_between(&self, range: DateRange) -> Result<Vec<Lecture>>;

    /// Every approved meeting that starts within `window`.
    fn approved_meetings_between(&self, window: Interval) -> Result<Vec<MeetingRequest>>;

    /// The lecturer followed by every student attending `lecture`.
    fn lecture_attendees(&self, lecture: &Lecture) -> Result<Vec<Person>>;

    /// Look up a booked unit.
    ///
    /// # Errors
    /// Returns `ScheduleError::NotFound` for an unknown id.
    fn unit(&self, unit_id: &str) -> Result<BookedUnit>;
}

/// A full copy of the institution's calendar data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub students: Vec<StudentProfile>,
    pub faculty: Vec<FacultyProfile>,
    pub units: Vec<BookedUnit>,
    pub registrations: Vec<Registration>,
    pub lectures: Vec<Lecture>,
    pub personal_events: Vec<PersonalEvent>,
    pub meetings: Vec<MeetingRequest>,
}

/// In-memory [`ScheduleStore`] over a [`Snapshot`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Snapshot,
}

impl MemoryStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Decode a snapshot from JSON.
    ///
    /// # Errors
    /// Returns `ScheduleError::Snapshot` if the JSON does not describe a snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot =
            serde_json::from_str(json).map_err(|e| ScheduleError::Snapshot(e.to_string()))?;
        tracing::debug!(
            students = snapshot.students.len(),
            faculty = snapshot.faculty.len(),
            lectures = snapshot.lectures.len(),
            personal_events = snapshot.personal_events.len(),
            meetings = snapshot.meetings.len(),
            "snapshot loaded"
        );
        Ok(Self::new(snapshot))
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }

    /// Mark every lecture dated on or before `today` as taught.
    ///
    /// Idempotent: returns how many lectures changed, which is zero on a
    /// second run for the same day.
    pub fn mark_taught_through(&mut self, today: NaiveDate) -> usize {
        let mut changed = 0;
        for lecture in self
            .snapshot
            .lectures
            .iter_mut()
            .filter(|l| !l.taught && l.date <= today)
        {
            lecture.taught = true;
            changed += 1;
        }
        tracing::info!(changed, %today, "lectures marked as taught");
        changed
    }

    /// Apply a workflow step to a stored meeting request.
    ///
    /// # Errors
    /// Returns `ScheduleError::NotFound` for an unknown id and
    /// `ScheduleError::InvalidTransition` for a finished request.
    pub fn apply_meeting_action(
        &mut self,
        meeting_id: &str,
        action: MeetingAction,
    ) -> Result<MeetingStatus> {
        let meeting = self
            .snapshot
            .meetings
            .iter_mut()
            .find(|m| m.id == meeting_id)
            .ok_or_else(|| ScheduleError::NotFound {
                kind: "meeting request",
                id: meeting_id.to_string(),
            })?;
        let status = meeting.apply(action)?;
        tracing::info!(meeting = %meeting_id, %action, %status, "meeting request updated");
        Ok(status)
    }

    fn student(&self, id: &str) -> Option<&StudentProfile> {
        self.snapshot.students.iter().find(|s| s.id == id)
    }

    fn find_unit(&self, unit_id: &str) -> Option<&BookedUnit> {
        self.snapshot.units.iter().find(|u| u.id == unit_id)
    }

    /// Registered for the unit, or the unit is taught to the student's cohort.
    fn attends(&self, student: &StudentProfile, lecture: &Lecture) -> bool {
        let registered = self
            .snapshot
            .registrations
            .iter()
            .any(|r| r.student_id == student.id && r.unit_id == lecture.unit_id);
        registered
            || self
                .find_unit(&lecture.unit_id)
                .is_some_and(|unit| unit.cohort == student.cohort)
    }
}

impl ScheduleStore for MemoryStore {
    fn person(&self, person: &PersonRef) -> Result<Person> {
        let found = match person.kind {
            PersonKind::Student => self.student(&person.id).cloned().map(Person::Student),
            PersonKind::Faculty => self
                .snapshot
                .faculty
                .iter()
                .find(|f| f.id == person.id)
                .cloned()
                .map(Person::Faculty),
        };
        found.ok_or_else(|| ScheduleError::NotFound {
            kind: person.kind.as_str(),
            id: person.id.clone(),
        })
    }

    fn lectures_for(&self, person: &Person, range: DateRange) -> Result<Vec<Lecture>> {
        Ok(self
            .snapshot
            .lectures
            .iter()
            .filter(|l| recurrence::may_occur_within(l, range))
            .filter(|l| match person {
                Person::Faculty(f) => l.lecturer_id == f.id,
                Person::Student(s) => self.attends(s, l),
            })
            .cloned()
            .collect())
    }

    fn personal_events_for(
        &self,
        person: &PersonRef,
        window: Interval,
    ) -> Result<Vec<PersonalEvent>> {
        Ok(self
            .snapshot
            .personal_events
            .iter()
            .filter(|e| &e.owner == person)
            .filter(|e| overlaps(e.start, e.end, window.start, window.end))
            .cloned()
            .collect())
    }

    fn approved_meetings_for(
        &self,
        person: &PersonRef,
        window: Interval,
    ) -> Result<Vec<MeetingRequest>> {
        Ok(self
            .snapshot
            .meetings
            .iter()
            .filter(|m| m.is_busy() && m.involves(person))
            .filter(|m| overlaps(m.start, m.end, window.start, window.end))
            .cloned()
            .collect())
    }

    fn lectures_between(&self, range: DateRange) -> Result<Vec<Lecture>> {
        Ok(self
            .snapshot
            .lectures
            .iter()
            .filter(|l| recurrence::may_occur_within(l, range))
            .cloned()
            .collect())
    }

    fn approved_meetings_between(&self, window: Interval) -> Result<Vec<MeetingRequest>> {
        Ok(self
            .snapshot
            .meetings
            .iter()
            .filter(|m| m.is_busy() && window.start <= m.start && m.start < window.end)
            .cloned()
            .collect())
    }

    fn lecture_attendees(&self, lecture: &Lecture) -> Result<Vec<Person>> {
        let mut attendees = Vec::new();
        match self.person(&PersonRef::faculty(&lecture.lecturer_id)) {
            Ok(lecturer) => attendees.push(lecturer),
            Err(_) => tracing::warn!(
                lecture = %lecture.id,
                lecturer = %lecture.lecturer_id,
                "lecture references an unknown lecturer"
            ),
        }
        attendees.extend(
            self.snapshot
                .students
                .iter()
                .filter(|s| self.attends(s, lecture))
                .cloned()
                .map(Person::Student),
        );
        Ok(attendees)
    }

    fn unit(&self, unit_id: &str) -> Result<BookedUnit> {
        self.find_unit(unit_id)
            .cloned()
            .ok_or_else(|| ScheduleError::NotFound {
                kind: "unit",
                id: unit_id.to_string(),
            })
    }
}
