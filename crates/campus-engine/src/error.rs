//! Error types for campus-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::conflict::ConflictCategory;
use crate::model::{MeetingAction, MeetingStatus};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Invalid range: start {start} is not before end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid duration: {0} minutes (must be positive)")]
    InvalidDuration(i64),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid person reference '{0}': expected student:<id> or faculty:<id>")]
    InvalidReference(String),

    #[error(
        "Invalid record reference '{0}': expected lecture:<id>, personal_event:<id> or meeting:<id>"
    )]
    InvalidRecordKey(String),

    #[error("{message}")]
    ConflictDetected {
        category: ConflictCategory,
        message: &'static str,
    },

    #[error("Cannot {action} a meeting request that is {from}")]
    InvalidTransition {
        from: MeetingStatus,
        action: MeetingAction,
    },

    #[error("Invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDateTime(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl ScheduleError {
    pub(crate) fn invalid_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::InvalidRange { start, end }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
