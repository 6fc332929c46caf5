// libs/schedule-cell/tests/slot_generator_test.rs

use chrono::NaiveDate;

use schedule_cell::models::{DateException, Schedule, SlotRule, TimeLabel, WeeklySlotRule};
use schedule_cell::services::SlotGenerator;

fn t(s: &str) -> TimeLabel {
    s.parse().unwrap()
}

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn weekly(id: &str, day: u8, start: &str, end: &str, duration: u32, break_minutes: u32) -> WeeklySlotRule {
    WeeklySlotRule {
        id: id.to_string(),
        day_of_week: day,
        start_time: t(start),
        end_time: t(end),
        slot_duration_minutes: duration,
        break_minutes,
        is_available: true,
    }
}

fn monday_morning() -> Schedule {
    Schedule {
        default_slots: vec![weekly("mon", 1, "09:00", "11:00", 30, 0)],
        exceptions: vec![],
    }
}

// 2026-10-19 is a Monday.
const MONDAY: &str = "2026-10-19";

#[test]
fn monday_rule_produces_four_half_hour_slots() {
    let slots = SlotGenerator::generate(d(MONDAY), &monday_morning());
    assert_eq!(slots, vec![t("09:00"), t("09:30"), t("10:00"), t("10:30")]);
}

#[test]
fn other_weekdays_have_no_slots() {
    let schedule = monday_morning();
    assert!(SlotGenerator::generate(d("2026-10-18"), &schedule).is_empty());
    assert!(SlotGenerator::generate(d("2026-10-20"), &schedule).is_empty());
    assert_eq!(SlotGenerator::generate(d("2026-10-26"), &schedule).len(), 4);
}

#[test]
fn closed_exception_yields_no_slots() {
    let mut schedule = monday_morning();
    schedule.exceptions.push(DateException {
        id: "holiday".to_string(),
        date: d(MONDAY),
        is_available: false,
        reason: Some("Staff training".to_string()),
        custom_slots: None,
    });

    assert!(SlotGenerator::generate(d(MONDAY), &schedule).is_empty());
}

#[test]
fn custom_slots_replace_the_weekly_template() {
    let mut schedule = monday_morning();
    schedule.exceptions.push(DateException {
        id: "short-day".to_string(),
        date: d(MONDAY),
        is_available: true,
        reason: None,
        custom_slots: Some(vec![SlotRule {
            id: None,
            start_time: t("13:00"),
            end_time: t("14:00"),
            slot_duration_minutes: 60,
            break_minutes: 0,
            is_available: true,
        }]),
    });

    assert_eq!(SlotGenerator::generate(d(MONDAY), &schedule), vec![t("13:00")]);
}

#[test]
fn open_exception_without_custom_slots_keeps_weekly_rules() {
    let mut schedule = monday_morning();
    schedule.exceptions.push(DateException {
        id: "note".to_string(),
        date: d(MONDAY),
        is_available: true,
        reason: Some("Late opening announced".to_string()),
        custom_slots: None,
    });

    assert_eq!(SlotGenerator::generate(d(MONDAY), &schedule).len(), 4);
}

#[test]
fn exception_opens_a_day_without_weekly_rules() {
    let mut schedule = monday_morning();
    schedule.exceptions.push(DateException {
        id: "sunday-sale".to_string(),
        date: d("2026-10-18"),
        is_available: true,
        reason: None,
        custom_slots: Some(vec![SlotRule {
            id: None,
            start_time: t("10:00"),
            end_time: t("11:00"),
            slot_duration_minutes: 20,
            break_minutes: 10,
            is_available: true,
        }]),
    });

    assert_eq!(
        SlotGenerator::generate(d("2026-10-18"), &schedule),
        vec![t("10:00"), t("10:30")]
    );
}

#[test]
fn unavailable_rules_are_skipped() {
    let mut schedule = monday_morning();
    let mut afternoon = weekly("mon-pm", 1, "14:00", "15:00", 30, 0);
    afternoon.is_available = false;
    schedule.default_slots.push(afternoon);

    assert_eq!(SlotGenerator::generate(d(MONDAY), &schedule).len(), 4);
}

#[test]
fn multiple_rules_merge_in_order_without_duplicates() {
    let schedule = Schedule {
        default_slots: vec![
            weekly("pm", 1, "14:00", "15:00", 30, 0),
            weekly("am", 1, "09:00", "10:00", 30, 0),
            weekly("overlap", 1, "09:30", "10:30", 30, 0),
        ],
        exceptions: vec![],
    };

    assert_eq!(
        SlotGenerator::generate(d(MONDAY), &schedule),
        vec![t("09:00"), t("09:30"), t("10:00"), t("14:00"), t("14:30")]
    );
}

#[test]
fn generation_is_deterministic() {
    let schedule = Schedule {
        default_slots: vec![
            weekly("a", 1, "08:00", "12:00", 45, 15),
            weekly("b", 1, "13:00", "17:30", 40, 5),
        ],
        exceptions: vec![],
    };

    let first = SlotGenerator::generate(d(MONDAY), &schedule);
    let second = SlotGenerator::generate(d(MONDAY), &schedule);
    assert_eq!(first, second);
    assert!(first.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn last_exception_for_a_date_wins() {
    let mut schedule = monday_morning();
    schedule.exceptions.push(DateException {
        id: "first".to_string(),
        date: d(MONDAY),
        is_available: false,
        reason: None,
        custom_slots: None,
    });
    schedule.exceptions.push(DateException {
        id: "second".to_string(),
        date: d(MONDAY),
        is_available: true,
        reason: None,
        custom_slots: None,
    });

    assert_eq!(SlotGenerator::generate(d(MONDAY), &schedule).len(), 4);
}

#[test]
fn stored_rules_with_huge_breaks_do_not_overflow() {
    let mut schedule = Schedule {
        default_slots: vec![weekly("huge-break", 1, "09:00", "11:00", 30, u32::MAX - 10)],
        exceptions: Vec::new(),
    };
    assert_eq!(SlotGenerator::generate(d(MONDAY), &schedule), vec![t("09:00")]);

    schedule.exceptions.push(DateException {
        id: "custom".to_string(),
        date: d(MONDAY),
        is_available: true,
        reason: None,
        custom_slots: Some(vec![SlotRule {
            id: None,
            start_time: t("13:00"),
            end_time: t("15:00"),
            slot_duration_minutes: u32::MAX,
            break_minutes: u32::MAX,
            is_available: true,
        }]),
    });
    assert!(SlotGenerator::generate(d(MONDAY), &schedule).is_empty());
}
