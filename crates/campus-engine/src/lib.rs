//! # campus-engine
//!
//! Conflict detection and shared availability for academic timetables.
//!
//! The engine answers two questions over a person's calendar of lectures,
//! personal events, and approved meetings: does a candidate booking collide
//! with anything, and which slots of a given length are free for both a
//! student and a lecturer inside a search window. Persistence stays outside;
//! calendar data is read through the [`ScheduleStore`] trait.
//!
//! ## Modules
//!
//! - [`interval`]: Half-open intervals and the strict-overlap primitive
//! - [`model`]: Students, faculty, lectures, personal events, meeting requests
//! - [`store`]: Data-access trait and an in-memory snapshot store
//! - [`busy`]: Gather one person's busy intervals
//! - [`conflict`]: Check a candidate booking against a calendar
//! - [`slots`]: Find free slots common to two calendars
//! - [`recurrence`]: Expand daily/weekly lectures into occurrences
//! - [`dst`]: DST transition policies for lecture wall-clock times
//! - [`reminders`]: Which lecture and meeting reminders are due
//! - [`config`]: Engine configuration
//! - [`error`]: Error types

pub mod busy;
pub mod config;
pub mod conflict;
pub mod dst;
pub mod error;
pub mod interval;
pub mod model;
pub mod recurrence;
pub mod reminders;
pub mod slots;
pub mod store;

pub use busy::{BusyInterval, BusyKind};
pub use config::EngineConfig;
pub use conflict::{ConflictCategory, ConflictChecker, ConflictResult, RecordKey, Scenario};
pub use error::ScheduleError;
pub use interval::{parse_instant, Interval};
pub use model::{Person, PersonKind, PersonRef};
pub use reminders::{Reminder, ReminderLead, ReminderPlanner};
pub use slots::{FreePeriod, Slot, SlotFinder};
pub use store::{MemoryStore, ScheduleStore, Snapshot};
