//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use campus_engine::model::{
    BookedUnit, Cohort, FacultyProfile, Lecture, MeetingRequest, MeetingStatus, PersonRef,
    PersonalEvent, Recurrence, Registration, StudentProfile,
};
use campus_engine::reminders::ReminderLead;
use campus_engine::Snapshot;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// Monday 2 March 2026 at the given UTC wall-clock time.
pub fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, min, 0).unwrap()
}

pub fn on(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0).unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn time(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).unwrap()
}

pub fn cs_first_years() -> Cohort {
    Cohort {
        course: "Computer Science".to_string(),
        year_of_study: "1st year".to_string(),
        semester: "1".to_string(),
    }
}

pub fn education_third_years() -> Cohort {
    Cohort {
        course: "Education".to_string(),
        year_of_study: "3rd year".to_string(),
        semester: "2".to_string(),
    }
}

pub fn student(id: &str, name: &str, cohort: Cohort) -> StudentProfile {
    StudentProfile {
        id: id.to_string(),
        name: name.to_string(),
        cohort,
        reminder_preferences: vec![ReminderLead::FifteenMinutes],
    }
}

pub fn lecturer(id: &str, name: &str) -> FacultyProfile {
    FacultyProfile {
        id: id.to_string(),
        name: name.to_string(),
        department: "Computing".to_string(),
        reminder_preferences: vec![ReminderLead::FifteenMinutes],
    }
}

/// A one-off lecture on 2 March 2026.
pub fn lecture(
    id: &str,
    lecturer_id: &str,
    unit_id: &str,
    start: (u32, u32),
    end: (u32, u32),
) -> Lecture {
    Lecture {
        id: id.to_string(),
        lecturer_id: lecturer_id.to_string(),
        unit_id: unit_id.to_string(),
        date: date(2026, 3, 2),
        start_time: time(start.0, start.1),
        end_time: time(end.0, end.1),
        recurrence: Recurrence::Once,
        recur_until: None,
        taught: false,
    }
}

pub fn personal(
    id: &str,
    owner: PersonRef,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> PersonalEvent {
    PersonalEvent {
        id: id.to_string(),
        owner,
        title: format!("event {}", id),
        description: None,
        start,
        end,
    }
}

pub fn meeting(
    id: &str,
    student_id: &str,
    lecturer_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    status: MeetingStatus,
) -> MeetingRequest {
    MeetingRequest {
        id: id.to_string(),
        student_id: student_id.to_string(),
        lecturer_id: lecturer_id.to_string(),
        title: "Project supervision".to_string(),
        description: None,
        location: "Room 4".to_string(),
        start,
        end,
        status,
    }
}

/// Two lecturers, three students, two units, no calendar entries.
///
/// - `f1` teaches `u1` (CS101) to CS first years; `f2` teaches `u2` to Education third years.
/// - `s1` is a CS first year; `s2` is an Education third year registered for `u1` anyway;
///   `s3` is an Education third year with no registrations.
pub fn people() -> Snapshot {
    Snapshot {
        students: vec![
            student("s1", "Amani Otieno", cs_first_years()),
            student("s2", "Brian Kiptoo", education_third_years()),
            student("s3", "Cynthia Wanjiru", education_third_years()),
        ],
        faculty: vec![lecturer("f1", "Dr. Njoroge"), lecturer("f2", "Prof. Achieng")],
        units: vec![
            BookedUnit {
                id: "u1".to_string(),
                lecturer_id: "f1".to_string(),
                course_name: "CS101 Introduction to Programming".to_string(),
                cohort: cs_first_years(),
            },
            BookedUnit {
                id: "u2".to_string(),
                lecturer_id: "f2".to_string(),
                course_name: "EDU301 Curriculum Studies".to_string(),
                cohort: education_third_years(),
            },
        ],
        registrations: vec![Registration {
            student_id: "s2".to_string(),
            unit_id: "u1".to_string(),
        }],
        ..Snapshot::default()
    }
}
