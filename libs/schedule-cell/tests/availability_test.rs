// libs/schedule-cell/tests/availability_test.rs

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use schedule_cell::models::{DateException, Schedule, TimeLabel, WeeklySlotRule};
use schedule_cell::services::{AvailabilityResolver, BookingWindow, SlotGenerator};

fn t(s: &str) -> TimeLabel {
    s.parse().unwrap()
}

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn weekday_schedule() -> Schedule {
    // Monday to Friday, 09:00-11:00 in 30 minute slots.
    Schedule {
        default_slots: (1..=5)
            .map(|day| WeeklySlotRule {
                id: format!("rule-{}", day),
                day_of_week: day,
                start_time: t("09:00"),
                end_time: t("11:00"),
                slot_duration_minutes: 30,
                break_minutes: 0,
                is_available: true,
            })
            .collect(),
        exceptions: vec![],
    }
}

fn resolver() -> AvailabilityResolver {
    // Saturday 2026-10-17.
    AvailabilityResolver::new(BookingWindow::new(d("2026-10-17"), Some(60)))
}

fn booked(times: &[&str]) -> HashSet<TimeLabel> {
    times.iter().map(|s| t(s)).collect()
}

#[test]
fn booked_times_are_removed_and_counted_once() {
    let availability = resolver().available(d("2026-10-19"), &weekday_schedule(), &booked(&["09:30"]));

    assert!(availability.is_open);
    assert_eq!(availability.available_slots, vec![t("09:00"), t("10:00"), t("10:30")]);
    assert_eq!(availability.total_slots, 4);
    assert_eq!(availability.taken_slots, 1);
    assert_eq!(availability.reason, None);
}

#[test]
fn bookings_outside_the_generated_slots_are_ignored() {
    let availability = resolver().available(d("2026-10-19"), &weekday_schedule(), &booked(&["12:00"]));

    assert_eq!(availability.available_slots.len(), 4);
    assert_eq!(availability.taken_slots, 0);
}

#[test]
fn available_slots_are_a_subset_of_generated_slots() {
    let schedule = weekday_schedule();
    let date = d("2026-10-21");
    let generated: HashSet<TimeLabel> = SlotGenerator::generate(date, &schedule).into_iter().collect();

    let availability = resolver().available(date, &schedule, &booked(&["09:00", "10:30"]));

    assert!(availability.available_slots.iter().all(|s| generated.contains(s)));
    assert!(availability.available_slots.iter().all(|s| *s != t("09:00") && *s != t("10:30")));
    assert_eq!(availability.available_slots.len() + availability.taken_slots, availability.total_slots);
}

#[test]
fn fully_booked_day_is_open_with_no_slots() {
    let availability = resolver().available(
        d("2026-10-19"),
        &weekday_schedule(),
        &booked(&["09:00", "09:30", "10:00", "10:30"]),
    );

    assert!(availability.is_open);
    assert!(availability.available_slots.is_empty());
    assert!(availability.is_fully_booked());
    assert_eq!(availability.taken_slots, 4);
}

#[test]
fn closed_exception_is_reported_with_its_reason() {
    let mut schedule = weekday_schedule();
    schedule.exceptions.push(DateException {
        id: "closed".to_string(),
        date: d("2026-10-19"),
        is_available: false,
        reason: Some("Inventory day".to_string()),
        custom_slots: None,
    });

    let availability = resolver().available(d("2026-10-19"), &schedule, &HashSet::new());

    assert!(!availability.is_open);
    assert!(availability.available_slots.is_empty());
    assert!(!availability.is_fully_booked());
    assert_eq!(availability.reason.as_deref(), Some("Inventory day"));
}

#[test]
fn closed_exception_without_reason_gets_a_default() {
    let mut schedule = weekday_schedule();
    schedule.exceptions.push(DateException {
        id: "closed".to_string(),
        date: d("2026-10-19"),
        is_available: false,
        reason: None,
        custom_slots: None,
    });

    let availability = resolver().available(d("2026-10-19"), &schedule, &HashSet::new());
    assert_eq!(availability.reason.as_deref(), Some("Closed on this date"));
}

#[test]
fn weekend_without_rules_is_closed() {
    let availability = resolver().available(d("2026-10-18"), &weekday_schedule(), &HashSet::new());

    assert!(!availability.is_open);
    assert_eq!(availability.reason.as_deref(), Some("No appointments are offered on this day"));
}

#[test]
fn past_dates_are_closed() {
    let availability = resolver().available(d("2026-10-16"), &weekday_schedule(), &HashSet::new());

    assert!(!availability.is_open);
    assert_eq!(availability.reason.as_deref(), Some("Date is in the past"));
}

#[test]
fn dates_past_the_horizon_are_closed() {
    let window = BookingWindow::new(d("2026-10-17"), Some(7));
    let resolver = AvailabilityResolver::new(window);

    assert_eq!(window.last_bookable_date(), Some(d("2026-10-24")));
    assert!(resolver.available(d("2026-10-23"), &weekday_schedule(), &HashSet::new()).is_open);

    let beyond = resolver.available(d("2026-10-26"), &weekday_schedule(), &HashSet::new());
    assert!(!beyond.is_open);
    assert_eq!(beyond.reason.as_deref(), Some("Bookings open at most 7 days in advance"));
}

#[test]
fn no_horizon_means_no_upper_bound() {
    let resolver = AvailabilityResolver::new(BookingWindow::new(d("2026-10-17"), None));
    assert!(resolver.available(d("2028-03-06"), &weekday_schedule(), &HashSet::new()).is_open);
}

#[test]
fn calendar_summarises_each_day_in_range() {
    let mut bookings = HashMap::new();
    bookings.insert(d("2026-10-19"), booked(&["09:00", "10:00"]));

    let days = resolver().calendar(d("2026-10-17"), d("2026-10-20"), &weekday_schedule(), &bookings);

    assert_eq!(days.len(), 4);
    assert_eq!(days[0].date, d("2026-10-17"));
    assert!(!days[0].is_open);
    assert!(!days[1].is_open);

    assert!(days[2].is_open);
    assert_eq!(days[2].total_slots, 4);
    assert_eq!(days[2].taken_slots, 2);
    assert_eq!(days[2].available_count, 2);

    assert_eq!(days[3].available_count, 4);
}

#[test]
fn calendar_with_inverted_range_is_empty() {
    let days = resolver().calendar(d("2026-10-20"), d("2026-10-19"), &weekday_schedule(), &HashMap::new());
    assert!(days.is_empty());
}
