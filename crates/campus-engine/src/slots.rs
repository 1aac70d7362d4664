//! Shared availability: free slots common to two calendars.
//!
//! Busy intervals of both people are concatenated in collection order
//! (lectures, personal events, meetings; first person before second),
//! stable-sorted by start, then swept with a cursor. At each cursor position
//! the whole merged list is scanned from the beginning; the first interval
//! overlapping `[cursor, cursor + duration)` moves the cursor to its end.
//! When a full pass finds nothing, the slot is taken and the cursor moves
//! past it. This is greedy leftmost-fit, and quadratic in the number of busy
//! intervals, which stays small for a bounded window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::busy::{self, BusyInterval, ALL_SOURCES};
use crate::config::EngineConfig;
use crate::error::{Result, ScheduleError};
use crate::interval::{overlaps, Interval};
use crate::model::PersonRef;
use crate::store::ScheduleStore;

/// A bookable slot of exactly the requested length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Slot {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// A maximal free gap between merged busy blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreePeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

/// Greedy leftmost-fit sweep over `busy` (already in scan order).
///
/// Every returned slot is exactly `duration` long, lies inside `window`, and
/// overlaps no busy interval. A non-positive `duration`, or one longer than
/// the window, yields nothing.
pub fn scan_slots(busy: &[BusyInterval], window: Interval, duration: Duration) -> Vec<Slot> {
    let mut slots = Vec::new();
    if duration <= Duration::zero() || duration > window.duration() {
        return slots;
    }

    let mut cursor = window.start;
    while cursor < window.end {
        let Some(slot_end) = cursor.checked_add_signed(duration) else {
            break;
        };

        // Rescan from the top each time; a blocker always ends after the
        // cursor, so the cursor strictly advances.
        if let Some(blocker) = busy
            .iter()
            .find(|b| overlaps(cursor, slot_end, b.interval.start, b.interval.end))
        {
            cursor = blocker.interval.end;
            continue;
        }

        if slot_end <= window.end {
            slots.push(Slot {
                start: cursor,
                end: slot_end,
            });
        }
        cursor = slot_end;
    }

    slots
}

/// Merge overlapping or adjacent busy intervals, clipped to the window.
///
/// Returns a sorted, non-overlapping list of intervals.
pub fn merge_busy(busy: &[BusyInterval], window: Interval) -> Vec<Interval> {
    // Collect intervals clipped to the window, discarding those entirely outside.
    let mut intervals: Vec<(DateTime<Utc>, DateTime<Utc>)> = busy
        .iter()
        .map(|b| b.interval)
        .filter(|i| overlaps(i.start, i.end, window.start, window.end))
        .map(|i| (i.start.max(window.start), i.end.min(window.end)))
        .collect();

    intervals.sort_by_key(|&(start, end)| (start, end));

    let mut merged: Vec<Interval> = Vec::new();
    for (start, end) in intervals {
        if let Some(last) = merged.last_mut() {
            if start <= last.end {
                last.end = last.end.max(end);
                continue;
            }
        }
        merged.push(Interval { start, end });
    }

    merged
}

/// The gaps between merged busy blocks inside the window, sorted by start.
pub fn free_periods(busy: &[BusyInterval], window: Interval) -> Vec<FreePeriod> {
    let mut free = Vec::new();
    let mut cursor = window.start;

    for block in merge_busy(busy, window) {
        if cursor < block.start {
            free.push(FreePeriod {
                start: cursor,
                end: block.start,
                duration_minutes: (block.start - cursor).num_minutes(),
            });
        }
        cursor = cursor.max(block.end);
    }

    // Trailing free period after the last busy block.
    if cursor < window.end {
        free.push(FreePeriod {
            start: cursor,
            end: window.end,
            duration_minutes: (window.end - cursor).num_minutes(),
        });
    }

    free
}

/// Finds time that is free in several people's calendars at once.
pub struct SlotFinder<'a, S: ScheduleStore + ?Sized> {
    store: &'a S,
    config: &'a EngineConfig,
}

impl<'a, S: ScheduleStore + ?Sized> SlotFinder<'a, S> {
    pub fn new(store: &'a S, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    /// Slots of `duration_minutes` free for both `requester` and `target`
    /// within `[window_start, window_end]`, earliest first.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidRange` when `window_start >= window_end`,
    /// `ScheduleError::InvalidDuration` for a non-positive duration or one too
    /// large to represent, and
    /// `ScheduleError::NotFound` when either person does not exist.
    pub fn find_available_slots(
        &self,
        requester: &PersonRef,
        target: &PersonRef,
        duration_minutes: i64,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Slot>> {
        let window = Interval::window(window_start, window_end)?;
        let duration = Duration::try_minutes(duration_minutes)
            .filter(|d| *d > Duration::zero())
            .ok_or(ScheduleError::InvalidDuration(duration_minutes))?;

        let busy = self.merged_busy(&[requester.clone(), target.clone()], window)?;
        let slots = scan_slots(&busy, window, duration);

        tracing::debug!(
            %requester,
            %target,
            duration_minutes,
            busy = busy.len(),
            slots = slots.len(),
            "available slots computed"
        );
        Ok(slots)
    }

    /// Maximal free periods shared by every person in `people`.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidRange` for an empty or inverted window and
    /// `ScheduleError::NotFound` for an unknown person.
    pub fn free_periods(
        &self,
        people: &[PersonRef],
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<FreePeriod>> {
        let window = Interval::window(window_start, window_end)?;
        let busy = self.merged_busy(people, window)?;
        Ok(free_periods(&busy, window))
    }

    /// Busy intervals of everyone in `people`, in scan order.
    ///
    /// # Errors
    /// Returns `ScheduleError::NotFound` for an unknown person.
    pub fn merged_busy(&self, people: &[PersonRef], window: Interval) -> Result<Vec<BusyInterval>> {
        // Resolve everyone first so a bad reference fails before any gathering.
        let resolved = people
            .iter()
            .map(|p| self.store.person(p))
            .collect::<Result<Vec<_>>>()?;

        let mut all = Vec::new();
        for person in &resolved {
            all.extend(busy::collect(
                self.store,
                person,
                window,
                &ALL_SOURCES,
                self.config,
            )?);
        }

        // Stable: ties keep collection order.
        all.sort_by_key(|b| b.interval.start);
        Ok(all)
    }
}
