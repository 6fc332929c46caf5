// libs/schedule-cell/tests/schedule_config_test.rs

use std::io::Write;
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;

use schedule_cell::models::{
    CreateWeeklyRuleRequest, ScheduleError, SlotRule, TimeLabel, UpdateExceptionRequest,
    UpdateWeeklyRuleRequest, UpsertExceptionRequest,
};
use schedule_cell::services::ScheduleConfigService;
use schedule_cell::store::{InMemoryScheduleStore, ScheduleStore};

fn t(s: &str) -> TimeLabel {
    s.parse().unwrap()
}

fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn service() -> (ScheduleConfigService, Arc<InMemoryScheduleStore>) {
    let store = Arc::new(InMemoryScheduleStore::default());
    (ScheduleConfigService::new(store.clone()), store)
}

fn monday_rule() -> CreateWeeklyRuleRequest {
    CreateWeeklyRuleRequest {
        day_of_week: 1,
        start_time: t("09:00"),
        end_time: t("11:00"),
        slot_duration_minutes: 30,
        break_minutes: None,
        is_available: None,
    }
}

#[tokio::test]
async fn creates_weekly_rules_with_defaults() {
    let (service, store) = service();

    let rule = service.create_weekly_rule(monday_rule()).await.unwrap();

    assert!(!rule.id.is_empty());
    assert_eq!(rule.break_minutes, 0);
    assert!(rule.is_available);
    assert_eq!(store.read_schedule().await.unwrap().default_slots, vec![rule]);
}

#[tokio::test]
async fn rejects_invalid_weekly_rules() {
    let (service, _) = service();

    let bad_day = CreateWeeklyRuleRequest { day_of_week: 7, ..monday_rule() };
    assert_matches!(service.create_weekly_rule(bad_day).await, Err(ScheduleError::Validation(_)));

    let inverted = CreateWeeklyRuleRequest { start_time: t("11:00"), end_time: t("09:00"), ..monday_rule() };
    assert_matches!(service.create_weekly_rule(inverted).await, Err(ScheduleError::Validation(_)));

    let zero = CreateWeeklyRuleRequest { slot_duration_minutes: 0, ..monday_rule() };
    assert_matches!(service.create_weekly_rule(zero).await, Err(ScheduleError::Validation(_)));

    let negative_break = CreateWeeklyRuleRequest { break_minutes: Some(-5), ..monday_rule() };
    assert_matches!(service.create_weekly_rule(negative_break).await, Err(ScheduleError::Validation(_)));

    assert!(service.list_weekly_rules().await.unwrap().is_empty());
}

#[tokio::test]
async fn rejects_breaks_longer_than_the_window() {
    let (service, _) = service();

    for break_minutes in [121, i64::from(u32::MAX) - 10, 5_000_000_000] {
        let rule = CreateWeeklyRuleRequest { break_minutes: Some(break_minutes), ..monday_rule() };
        assert_matches!(service.create_weekly_rule(rule).await, Err(ScheduleError::Validation(_)));
    }

    let whole_window = CreateWeeklyRuleRequest { break_minutes: Some(120), ..monday_rule() };
    assert_eq!(service.create_weekly_rule(whole_window).await.unwrap().break_minutes, 120);

    let result = service
        .upsert_exception(UpsertExceptionRequest {
            date: d("2026-12-24"),
            is_available: true,
            reason: None,
            custom_slots: Some(vec![SlotRule {
                id: None,
                start_time: t("10:00"),
                end_time: t("12:00"),
                slot_duration_minutes: 30,
                break_minutes: u32::MAX,
                is_available: true,
            }]),
        })
        .await;
    assert_matches!(result, Err(ScheduleError::Validation(_)));
}

#[tokio::test]
async fn partial_update_keeps_unchanged_fields() {
    let (service, _) = service();
    let rule = service.create_weekly_rule(monday_rule()).await.unwrap();

    let updated = service
        .update_weekly_rule(&rule.id, UpdateWeeklyRuleRequest {
            end_time: Some(t("12:00")),
            break_minutes: Some(10),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.id, rule.id);
    assert_eq!(updated.start_time, t("09:00"));
    assert_eq!(updated.end_time, t("12:00"));
    assert_eq!(updated.break_minutes, 10);
    assert_eq!(updated.day_of_week, 1);
}

#[tokio::test]
async fn update_validates_the_merged_rule() {
    let (service, _) = service();
    let rule = service.create_weekly_rule(monday_rule()).await.unwrap();

    let result = service
        .update_weekly_rule(&rule.id, UpdateWeeklyRuleRequest {
            start_time: Some(t("12:00")),
            ..Default::default()
        })
        .await;

    assert_matches!(result, Err(ScheduleError::Validation(_)));
}

#[tokio::test]
async fn missing_rules_are_not_found() {
    let (service, _) = service();

    assert_matches!(
        service.update_weekly_rule("missing", UpdateWeeklyRuleRequest::default()).await,
        Err(ScheduleError::NotFound(_))
    );
    assert_matches!(service.delete_weekly_rule("missing").await, Err(ScheduleError::NotFound(_)));
}

#[tokio::test]
async fn list_is_ordered_by_day_then_start() {
    let (service, _) = service();
    service.create_weekly_rule(CreateWeeklyRuleRequest { day_of_week: 3, ..monday_rule() }).await.unwrap();
    service
        .create_weekly_rule(CreateWeeklyRuleRequest { start_time: t("13:00"), end_time: t("15:00"), ..monday_rule() })
        .await
        .unwrap();
    service.create_weekly_rule(monday_rule()).await.unwrap();

    let rules = service.list_weekly_rules().await.unwrap();
    let order: Vec<(u8, String)> = rules.iter().map(|r| (r.day_of_week, r.start_time.to_string())).collect();

    assert_eq!(order, vec![
        (1, "09:00".to_string()),
        (1, "13:00".to_string()),
        (3, "09:00".to_string()),
    ]);
}

#[tokio::test]
async fn upsert_exception_replaces_by_date() {
    let (service, _) = service();

    let first = service
        .upsert_exception(UpsertExceptionRequest {
            date: d("2026-12-24"),
            is_available: false,
            reason: Some("  Holiday  ".to_string()),
            custom_slots: None,
        })
        .await
        .unwrap();
    assert_eq!(first.reason.as_deref(), Some("Holiday"));

    let second = service
        .upsert_exception(UpsertExceptionRequest {
            date: d("2026-12-24"),
            is_available: true,
            reason: None,
            custom_slots: Some(vec![SlotRule {
                id: None,
                start_time: t("10:00"),
                end_time: t("12:00"),
                slot_duration_minutes: 60,
                break_minutes: 0,
                is_available: true,
            }]),
        })
        .await
        .unwrap();

    assert_eq!(second.id, first.id);
    let exceptions = service.list_exceptions().await.unwrap();
    assert_eq!(exceptions.len(), 1);
    assert!(exceptions[0].is_available);
}

#[tokio::test]
async fn rejects_invalid_custom_slots() {
    let (service, _) = service();

    let result = service
        .upsert_exception(UpsertExceptionRequest {
            date: d("2026-12-24"),
            is_available: true,
            reason: None,
            custom_slots: Some(vec![SlotRule {
                id: None,
                start_time: t("10:00"),
                end_time: t("10:30"),
                slot_duration_minutes: 45,
                break_minutes: 0,
                is_available: true,
            }]),
        })
        .await;

    assert_matches!(result, Err(ScheduleError::Validation(_)));
}

#[tokio::test]
async fn moving_an_exception_onto_another_date_conflicts() {
    let (service, _) = service();
    let closed = |date: &str| UpsertExceptionRequest {
        date: d(date),
        is_available: false,
        reason: None,
        custom_slots: None,
    };

    service.upsert_exception(closed("2026-12-24")).await.unwrap();
    let boxing_day = service.upsert_exception(closed("2026-12-26")).await.unwrap();

    let result = service
        .update_exception(&boxing_day.id, UpdateExceptionRequest {
            date: Some(d("2026-12-24")),
            ..Default::default()
        })
        .await;
    assert_matches!(result, Err(ScheduleError::Conflict(_)));

    let reopened = service
        .update_exception(&boxing_day.id, UpdateExceptionRequest {
            is_available: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(reopened.is_available);
    assert_eq!(reopened.date, d("2026-12-26"));

    service.delete_exception(&boxing_day.id).await.unwrap();
    assert_eq!(service.list_exceptions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn memory_store_loads_json_fixture() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "defaultSlots": [
                {{ "id": "mon", "dayOfWeek": 1, "startTime": "09:00:00", "endTime": "11:00",
                   "slotDurationMinutes": 30 }}
            ],
            "exceptions": [
                {{ "id": "xmas", "date": "2026-12-25", "isAvailable": false, "reason": "Christmas" }}
            ]
        }}"#
    )
    .unwrap();

    let store = InMemoryScheduleStore::from_json_file(file.path()).unwrap();
    let schedule = store.read_schedule().await.unwrap();

    assert_eq!(schedule.default_slots.len(), 1);
    assert_eq!(schedule.default_slots[0].start_time, t("09:00"));
    assert_eq!(schedule.default_slots[0].break_minutes, 0);
    assert!(schedule.default_slots[0].is_available);
    assert_eq!(schedule.exceptions[0].reason.as_deref(), Some("Christmas"));
}

#[test]
fn missing_fixture_is_reported() {
    assert!(InMemoryScheduleStore::from_json_file("/nonexistent/schedule.json").is_err());
}
