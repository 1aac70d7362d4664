//! Detect conflicts between a candidate booking and a person's calendar.
//!
//! A candidate conflicts with an existing busy interval when
//! `existing.start < candidate.end && existing.end > candidate.start`.
//! Adjacent intervals (where one ends exactly when another starts) are NOT
//! conflicts, and an empty candidate conflicts with nothing.
//!
//! Sources are checked one at a time in a scenario's precedence order and the
//! first source with an overlap decides the reported category.
//!
//! Lecture, personal event, and meeting ids are only unique within their own
//! kind, so a record left out of the comparison is named by a [`RecordKey`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::busy::{self, BusyInterval, BusyKind};
use crate::config::EngineConfig;
use crate::error::{Result, ScheduleError};
use crate::interval::Interval;
use crate::model::PersonRef;
use crate::store::ScheduleStore;

/// What a candidate collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictCategory {
    Lecture,
    PersonalEvent,
    Meeting,
    #[default]
    None,
}

impl ConflictCategory {
    /// User-facing validation message.
    pub fn message(self) -> &'static str {
        match self {
            ConflictCategory::Lecture => "You have a lecture scheduled at this time.",
            ConflictCategory::PersonalEvent => "You have a personal event scheduled at this time.",
            ConflictCategory::Meeting => "You have a meeting scheduled at this time.",
            ConflictCategory::None => "No conflict.",
        }
    }

    /// Message for a clash with a record of the same kind as the one being saved.
    pub fn same_kind_message(self) -> &'static str {
        match self {
            ConflictCategory::Lecture => "You have another lecture scheduled at this time.",
            ConflictCategory::PersonalEvent => {
                "You have another personal event scheduled at this time."
            }
            ConflictCategory::Meeting => "You have another meeting scheduled at this time.",
            ConflictCategory::None => "No conflict.",
        }
    }
}

impl From<BusyKind> for ConflictCategory {
    fn from(kind: BusyKind) -> Self {
        match kind {
            BusyKind::Lecture => ConflictCategory::Lecture,
            BusyKind::PersonalEvent => ConflictCategory::PersonalEvent,
            BusyKind::Meeting => ConflictCategory::Meeting,
        }
    }
}

/// Which kind of record is being saved. Decides the order sources are checked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// No particular record type.
    #[default]
    Any,
    /// Scheduling or editing a lecture.
    Lecture,
    /// Adding or editing a personal event.
    PersonalEvent,
    /// Requesting or editing a meeting.
    Meeting,
}

impl Scenario {
    /// Own type first, then personal events, then the rest.
    pub fn precedence(self) -> [BusyKind; 3] {
        match self {
            Scenario::Any | Scenario::Lecture => {
                [BusyKind::Lecture, BusyKind::PersonalEvent, BusyKind::Meeting]
            }
            Scenario::PersonalEvent => {
                [BusyKind::PersonalEvent, BusyKind::Lecture, BusyKind::Meeting]
            }
            Scenario::Meeting => [BusyKind::Meeting, BusyKind::PersonalEvent, BusyKind::Lecture],
        }
    }

    /// The kind of record being saved, if the scenario names one.
    pub fn own_kind(self) -> Option<BusyKind> {
        match self {
            Scenario::Any => None,
            Scenario::Lecture => Some(BusyKind::Lecture),
            Scenario::PersonalEvent => Some(BusyKind::PersonalEvent),
            Scenario::Meeting => Some(BusyKind::Meeting),
        }
    }

    /// Message for `category`, worded as "another" for the scenario's own kind.
    pub fn message(self, category: ConflictCategory) -> &'static str {
        if self.own_kind().map(ConflictCategory::from) == Some(category) {
            category.same_kind_message()
        } else {
            category.message()
        }
    }
}

/// A stored record, named by kind and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub kind: BusyKind,
    pub id: String,
}

impl RecordKey {
    pub fn new(kind: BusyKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn lecture(id: impl Into<String>) -> Self {
        Self::new(BusyKind::Lecture, id)
    }

    pub fn personal_event(id: impl Into<String>) -> Self {
        Self::new(BusyKind::PersonalEvent, id)
    }

    pub fn meeting(id: impl Into<String>) -> Self {
        Self::new(BusyKind::Meeting, id)
    }

    /// Parse `kind:id`, or a bare id taken to be of the scenario's own kind.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidRecordKey` for an unknown kind, an empty
    /// id, or a bare id under [`Scenario::Any`].
    pub fn parse_for(raw: &str, scenario: Scenario) -> Result<Self> {
        if raw.contains(':') {
            return raw.parse();
        }
        match scenario.own_kind() {
            Some(kind) if !raw.is_empty() => Ok(Self::new(kind, raw)),
            _ => Err(ScheduleError::InvalidRecordKey(raw.to_string())),
        }
    }

    fn matches(&self, busy: &BusyInterval) -> bool {
        self.kind == busy.kind && self.id == busy.record_id
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for RecordKey {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ScheduleError::InvalidRecordKey(s.to_string());
        let (kind, id) = s.split_once(':').ok_or_else(invalid)?;
        if id.is_empty() {
            return Err(invalid());
        }
        let kind = kind.parse().map_err(|_| invalid())?;
        Ok(Self::new(kind, id))
    }
}

/// Outcome of a conflict check.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConflictResult {
    pub has_conflict: bool,
    pub category: ConflictCategory,
    /// Id of the record the candidate collided with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

impl ConflictResult {
    pub fn none() -> Self {
        Self::default()
    }

    fn found(busy: &BusyInterval) -> Self {
        Self {
            has_conflict: true,
            category: busy.kind.into(),
            record_id: Some(busy.record_id.clone()),
        }
    }
}

/// A detected conflict between the candidate and one busy interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub category: ConflictCategory,
    pub record_id: String,
    pub busy: Interval,
    pub overlap_minutes: i64,
}

/// Checks candidate bookings against a person's calendar.
pub struct ConflictChecker<'a, S: ScheduleStore + ?Sized> {
    store: &'a S,
    config: &'a EngineConfig,
}

impl<'a, S: ScheduleStore + ?Sized> ConflictChecker<'a, S> {
    pub fn new(store: &'a S, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    /// Check every source: lectures, then personal events, then approved meetings.
    ///
    /// `exclude` names a record left out of the comparison, normally the
    /// record being edited. Only the busy interval of that kind and id is
    /// skipped.
    ///
    /// # Errors
    /// Returns `ScheduleError::NotFound` for an unknown person.
    pub fn check(
        &self,
        person: &PersonRef,
        candidate: Interval,
        exclude: Option<&RecordKey>,
    ) -> Result<ConflictResult> {
        self.check_scenario(Scenario::Any, person, candidate, exclude)
    }

    /// Does the candidate collide with anything in the person's calendar?
    ///
    /// # Errors
    /// Returns `ScheduleError::NotFound` for an unknown person.
    pub fn has_conflict(
        &self,
        person: &PersonRef,
        candidate: Interval,
        exclude: Option<&RecordKey>,
    ) -> Result<bool> {
        Ok(self.check(person, candidate, exclude)?.has_conflict)
    }

    /// Check the sources relevant to saving a record of the scenario's type.
    ///
    /// # Errors
    /// Returns `ScheduleError::NotFound` for an unknown person.
    pub fn check_scenario(
        &self,
        scenario: Scenario,
        person: &PersonRef,
        candidate: Interval,
        exclude: Option<&RecordKey>,
    ) -> Result<ConflictResult> {
        self.check_sources(&scenario.precedence(), person, candidate, exclude)
    }

    /// Check only the given sources, in the given order.
    ///
    /// # Errors
    /// Returns `ScheduleError::NotFound` for an unknown person.
    pub fn check_sources(
        &self,
        kinds: &[BusyKind],
        person: &PersonRef,
        candidate: Interval,
        exclude: Option<&RecordKey>,
    ) -> Result<ConflictResult> {
        let person = self.store.person(person)?;
        if candidate.is_empty() {
            return Ok(ConflictResult::none());
        }

        for kind in kinds {
            let busy = busy::collect(self.store, &person, candidate, &[*kind], self.config)?;
            if let Some(hit) = busy
                .iter()
                .find(|b| !is_excluded(b, exclude) && b.interval.overlaps(&candidate))
            {
                tracing::debug!(
                    person = %person.reference(),
                    category = ?hit.kind,
                    record = %hit.record_id,
                    "conflict found"
                );
                return Ok(ConflictResult::found(hit));
            }
        }

        Ok(ConflictResult::none())
    }

    /// Every busy interval the candidate overlaps, across all of the
    /// scenario's sources, in precedence order.
    ///
    /// # Errors
    /// Returns `ScheduleError::NotFound` for an unknown person.
    pub fn conflicts(
        &self,
        scenario: Scenario,
        person: &PersonRef,
        candidate: Interval,
        exclude: Option<&RecordKey>,
    ) -> Result<Vec<Conflict>> {
        let person = self.store.person(person)?;
        if candidate.is_empty() {
            return Ok(Vec::new());
        }

        let busy = busy::collect(
            self.store,
            &person,
            candidate,
            &scenario.precedence(),
            self.config,
        )?;

        Ok(busy
            .into_iter()
            .filter(|b| !is_excluded(b, exclude) && b.interval.overlaps(&candidate))
            .map(|b| Conflict {
                category: b.kind.into(),
                overlap_minutes: b.interval.overlap_minutes(&candidate),
                record_id: b.record_id,
                busy: b.interval,
            })
            .collect())
    }

    /// Validation before a record is saved.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidRange` for an empty candidate,
    /// `ScheduleError::ConflictDetected` with the first conflicting category
    /// and its scenario-worded message,
    /// and `ScheduleError::NotFound` for an unknown person.
    pub fn validate(
        &self,
        scenario: Scenario,
        person: &PersonRef,
        candidate: Interval,
        exclude: Option<&RecordKey>,
    ) -> Result<()> {
        if candidate.is_empty() {
            return Err(ScheduleError::invalid_range(candidate.start, candidate.end));
        }
        let result = self.check_scenario(scenario, person, candidate, exclude)?;
        if result.has_conflict {
            return Err(ScheduleError::ConflictDetected {
                category: result.category,
                message: scenario.message(result.category),
            });
        }
        Ok(())
    }
}

fn is_excluded(busy: &BusyInterval, exclude: Option<&RecordKey>) -> bool {
    exclude.is_some_and(|key| key.matches(busy))
}
