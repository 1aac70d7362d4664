//! Tests for shared availability between a student and a lecturer.

mod common;

use campus_engine::model::{MeetingStatus, PersonRef, Recurrence};
use campus_engine::slots::{free_periods, merge_busy, scan_slots};
use campus_engine::{
    BusyInterval, BusyKind, EngineConfig, Interval, MemoryStore, ScheduleError, Slot, SlotFinder,
};
use chrono::{DateTime, Duration, Utc};
use common::{at, date, lecture, meeting, on, people, personal};

fn starts(slots: &[Slot]) -> Vec<DateTime<Utc>> {
    slots.iter().map(|s| s.start).collect()
}

fn busy(kind: BusyKind, id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> BusyInterval {
    BusyInterval::new(kind, id, Interval::new(start, end).unwrap())
}

/// `s1` busy 10:00-10:45 (personal), `f2` busy 10:15-10:30 (personal).
fn overlapping_calendars() -> MemoryStore {
    let mut snapshot = people();
    snapshot.personal_events = vec![
        personal("p-a", PersonRef::student("s1"), at(10, 0), at(10, 45)),
        personal("p-b", PersonRef::faculty("f2"), at(10, 15), at(10, 30)),
    ];
    MemoryStore::new(snapshot)
}

#[test]
fn empty_calendars_give_back_to_back_slots() {
    let store = MemoryStore::new(people());
    let config = EngineConfig::default();
    let finder = SlotFinder::new(&store, &config);

    let slots = finder
        .find_available_slots(
            &PersonRef::student("s3"),
            &PersonRef::faculty("f2"),
            60,
            at(8, 0),
            at(16, 0),
        )
        .unwrap();

    assert_eq!(slots.len(), 8);
    for (i, slot) in slots.iter().enumerate() {
        assert_eq!(slot.start, at(8 + i as u32, 0));
        assert_eq!(slot.duration_minutes(), 60);
    }
}

#[test]
fn merged_busy_lists_from_both_people() {
    let store = overlapping_calendars();
    let config = EngineConfig::default();
    let finder = SlotFinder::new(&store, &config);

    let slots = finder
        .find_available_slots(
            &PersonRef::student("s1"),
            &PersonRef::faculty("f2"),
            30,
            at(9, 0),
            at(12, 0),
        )
        .unwrap();

    assert_eq!(
        starts(&slots),
        vec![at(9, 0), at(9, 30), at(10, 45), at(11, 15)]
    );
}

#[test]
fn working_day_gives_eight_hourly_slots() {
    let store = MemoryStore::new(people());
    let config = EngineConfig::default();
    let finder = SlotFinder::new(&store, &config);

    let slots = finder
        .find_available_slots(
            &PersonRef::student("s3"),
            &PersonRef::faculty("f2"),
            60,
            at(9, 0),
            at(17, 0),
        )
        .unwrap();

    assert_eq!(slots.len(), 8);
    assert_eq!(
        slots.first(),
        Some(&Slot {
            start: at(9, 0),
            end: at(10, 0)
        })
    );
    assert_eq!(
        slots.last(),
        Some(&Slot {
            start: at(16, 0),
            end: at(17, 0)
        })
    );
}

#[test]
fn staggered_blocks_need_a_second_jump() {
    // s1 busy 10:00-10:30, f2 busy 10:15-10:45: the cursor lands on 10:30,
    // then the rescan moves it on to 10:45.
    let mut snapshot = people();
    snapshot.personal_events = vec![
        personal("p-a", PersonRef::student("s1"), at(10, 0), at(10, 30)),
        personal("p-b", PersonRef::faculty("f2"), at(10, 15), at(10, 45)),
    ];
    let store = MemoryStore::new(snapshot);
    let config = EngineConfig::default();
    let finder = SlotFinder::new(&store, &config);

    let slots = finder
        .find_available_slots(
            &PersonRef::student("s1"),
            &PersonRef::faculty("f2"),
            30,
            at(9, 0),
            at(12, 0),
        )
        .unwrap();

    assert_eq!(
        starts(&slots),
        vec![at(9, 0), at(9, 30), at(10, 45), at(11, 15)]
    );
}

#[test]
fn fully_booked_window_has_no_slots() {
    let mut snapshot = people();
    snapshot
        .personal_events
        .push(personal("p1", PersonRef::faculty("f2"), at(8, 0), at(18, 0)));
    let store = MemoryStore::new(snapshot);
    let config = EngineConfig::default();
    let finder = SlotFinder::new(&store, &config);

    let slots = finder
        .find_available_slots(
            &PersonRef::student("s3"),
            &PersonRef::faculty("f2"),
            30,
            at(9, 0),
            at(17, 0),
        )
        .unwrap();

    assert!(slots.is_empty());
}

#[test]
fn gaps_shorter_than_duration_are_skipped() {
    let mut snapshot = people();
    snapshot.personal_events = vec![
        personal("p1", PersonRef::student("s3"), at(9, 0), at(10, 0)),
        personal("p2", PersonRef::faculty("f2"), at(10, 30), at(12, 0)),
    ];
    let store = MemoryStore::new(snapshot);
    let config = EngineConfig::default();
    let finder = SlotFinder::new(&store, &config);

    let slots = finder
        .find_available_slots(
            &PersonRef::student("s3"),
            &PersonRef::faculty("f2"),
            60,
            at(9, 0),
            at(12, 0),
        )
        .unwrap();

    assert!(slots.is_empty(), "the 30-minute gap cannot hold an hour");
}

#[test]
fn trailing_partial_slot_is_not_offered() {
    let store = MemoryStore::new(people());
    let config = EngineConfig::default();
    let finder = SlotFinder::new(&store, &config);

    let slots = finder
        .find_available_slots(
            &PersonRef::student("s3"),
            &PersonRef::faculty("f2"),
            60,
            at(9, 0),
            at(10, 30),
        )
        .unwrap();

    assert_eq!(
        slots,
        vec![Slot {
            start: at(9, 0),
            end: at(10, 0)
        }]
    );
}

#[test]
fn empty_or_inverted_window_is_invalid_range() {
    let store = MemoryStore::new(people());
    let config = EngineConfig::default();
    let finder = SlotFinder::new(&store, &config);
    let s3 = PersonRef::student("s3");
    let f2 = PersonRef::faculty("f2");

    for (start, end) in [(at(9, 0), at(9, 0)), (at(12, 0), at(9, 0))] {
        let err = finder
            .find_available_slots(&s3, &f2, 30, start, end)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidRange { .. }), "{:?}", err);
    }
}

#[test]
fn window_is_checked_before_people() {
    let store = MemoryStore::new(people());
    let config = EngineConfig::default();
    let finder = SlotFinder::new(&store, &config);

    let err = finder
        .find_available_slots(
            &PersonRef::student("ghost"),
            &PersonRef::faculty("f2"),
            30,
            at(12, 0),
            at(9, 0),
        )
        .unwrap_err();

    assert!(matches!(err, ScheduleError::InvalidRange { .. }));
}

#[test]
fn non_positive_duration_is_rejected() {
    let store = MemoryStore::new(people());
    let config = EngineConfig::default();
    let finder = SlotFinder::new(&store, &config);

    for minutes in [0, -15] {
        let err = finder
            .find_available_slots(
                &PersonRef::student("s3"),
                &PersonRef::faculty("f2"),
                minutes,
                at(9, 0),
                at(12, 0),
            )
            .unwrap_err();
        assert_eq!(err, ScheduleError::InvalidDuration(minutes));
    }
}

#[test]
fn huge_durations_do_not_overflow() {
    let store = MemoryStore::new(people());
    let config = EngineConfig::default();
    let finder = SlotFinder::new(&store, &config);
    let s3 = PersonRef::student("s3");
    let f2 = PersonRef::faculty("f2");

    // Representable, but far longer than the window.
    let slots = finder
        .find_available_slots(&s3, &f2, 1_000_000_000_000, at(9, 0), at(17, 0))
        .unwrap();
    assert!(slots.is_empty());

    let err = finder
        .find_available_slots(&s3, &f2, i64::MAX, at(9, 0), at(17, 0))
        .unwrap_err();
    assert_eq!(err, ScheduleError::InvalidDuration(i64::MAX));
}

#[test]
fn unknown_target_is_not_found() {
    let store = MemoryStore::new(people());
    let config = EngineConfig::default();
    let finder = SlotFinder::new(&store, &config);

    let err = finder
        .find_available_slots(
            &PersonRef::student("s1"),
            &PersonRef::faculty("f9"),
            30,
            at(9, 0),
            at(12, 0),
        )
        .unwrap_err();

    assert_eq!(
        err,
        ScheduleError::NotFound {
            kind: "faculty",
            id: "f9".to_string()
        }
    );
}

#[test]
fn only_approved_meetings_take_time() {
    let s1 = PersonRef::student("s1");
    let f2 = PersonRef::faculty("f2");
    let config = EngineConfig::default();

    let mut snapshot = people();
    snapshot
        .meetings
        .push(meeting("m1", "s1", "f1", at(10, 0), at(11, 0), MeetingStatus::Pending));
    let pending = MemoryStore::new(snapshot.clone());
    let slots = SlotFinder::new(&pending, &config)
        .find_available_slots(&s1, &f2, 60, at(9, 0), at(12, 0))
        .unwrap();
    assert_eq!(starts(&slots), vec![at(9, 0), at(10, 0), at(11, 0)]);

    snapshot.meetings[0].status = MeetingStatus::Approved;
    let approved = MemoryStore::new(snapshot);
    let slots = SlotFinder::new(&approved, &config)
        .find_available_slots(&s1, &f2, 60, at(9, 0), at(12, 0))
        .unwrap();
    assert_eq!(starts(&slots), vec![at(9, 0), at(11, 0)]);
}

#[test]
fn weekly_lecture_blocks_later_weeks() {
    let mut snapshot = people();
    let mut weekly = lecture("l1", "f1", "u1", (10, 0), (11, 0));
    weekly.recurrence = Recurrence::Weekly;
    weekly.recur_until = Some(date(2026, 4, 30));
    snapshot.lectures.push(weekly);
    let store = MemoryStore::new(snapshot);
    let config = EngineConfig::default();
    let finder = SlotFinder::new(&store, &config);

    // s1 attends l1 through their cohort; 9 March is one week on.
    let slots = finder
        .find_available_slots(
            &PersonRef::student("s1"),
            &PersonRef::faculty("f2"),
            60,
            on(2026, 3, 9, 9, 0),
            on(2026, 3, 9, 12, 0),
        )
        .unwrap();
    assert_eq!(
        starts(&slots),
        vec![on(2026, 3, 9, 9, 0), on(2026, 3, 9, 11, 0)]
    );

    // A Tuesday is untouched.
    let tuesday = finder
        .find_available_slots(
            &PersonRef::student("s1"),
            &PersonRef::faculty("f2"),
            60,
            on(2026, 3, 10, 9, 0),
            on(2026, 3, 10, 12, 0),
        )
        .unwrap();
    assert_eq!(tuesday.len(), 3);
}

#[test]
fn free_periods_are_maximal_gaps() {
    let store = overlapping_calendars();
    let config = EngineConfig::default();
    let finder = SlotFinder::new(&store, &config);

    let free = finder
        .free_periods(
            &[PersonRef::student("s1"), PersonRef::faculty("f2")],
            at(9, 0),
            at(12, 0),
        )
        .unwrap();

    assert_eq!(free.len(), 2);
    assert_eq!((free[0].start, free[0].end), (at(9, 0), at(10, 0)));
    assert_eq!(free[0].duration_minutes, 60);
    assert_eq!((free[1].start, free[1].end), (at(10, 45), at(12, 0)));
    assert_eq!(free[1].duration_minutes, 75);
}

#[test]
fn merged_busy_is_sorted_by_start() {
    let store = overlapping_calendars();
    let config = EngineConfig::default();
    let finder = SlotFinder::new(&store, &config);

    let merged = finder
        .merged_busy(
            &[PersonRef::faculty("f2"), PersonRef::student("s1")],
            Interval::window(at(9, 0), at(12, 0)).unwrap(),
        )
        .unwrap();

    let ids: Vec<_> = merged.iter().map(|b| b.record_id.as_str()).collect();
    assert_eq!(ids, vec!["p-a", "p-b"]);
}

#[test]
fn scan_skips_past_each_blocker() {
    let window = Interval::window(at(9, 0), at(13, 0)).unwrap();
    let busy = vec![
        busy(BusyKind::Lecture, "l1", at(9, 30), at(10, 0)),
        busy(BusyKind::Meeting, "m1", at(11, 0), at(12, 0)),
    ];

    let slots = scan_slots(&busy, window, Duration::minutes(60));

    assert_eq!(starts(&slots), vec![at(10, 0), at(12, 0)]);
}

#[test]
fn scan_near_the_end_of_time_stops_cleanly() {
    let end = DateTime::<Utc>::MAX_UTC;
    let window = Interval::window(end - Duration::hours(3), end).unwrap();

    let slots = scan_slots(&[], window, Duration::minutes(120));

    assert_eq!(starts(&slots), vec![end - Duration::hours(3)]);
    assert!(scan_slots(&[], window, Duration::hours(4)).is_empty());
}

#[test]
fn scan_with_zero_duration_finds_nothing() {
    let window = Interval::window(at(9, 0), at(10, 0)).unwrap();
    assert!(scan_slots(&[], window, Duration::zero()).is_empty());
}

#[test]
fn merge_joins_overlapping_and_adjacent_blocks() {
    let window = Interval::window(at(9, 0), at(17, 0)).unwrap();
    let busy = vec![
        busy(BusyKind::PersonalEvent, "c", at(14, 0), at(15, 0)),
        busy(BusyKind::Lecture, "a", at(8, 0), at(10, 0)),
        busy(BusyKind::Meeting, "b", at(10, 0), at(11, 0)),
        busy(BusyKind::PersonalEvent, "d", at(14, 30), at(18, 0)),
    ];

    let merged = merge_busy(&busy, window);

    assert_eq!(
        merged,
        vec![
            Interval::new(at(9, 0), at(11, 0)).unwrap(),
            Interval::new(at(14, 0), at(17, 0)).unwrap(),
        ]
    );
}

#[test]
fn free_periods_of_an_empty_calendar_is_the_window() {
    let window = Interval::window(at(9, 0), at(17, 0)).unwrap();
    let free = free_periods(&[], window);
    assert_eq!(free.len(), 1);
    assert_eq!(free[0].duration_minutes, 8 * 60);
}
