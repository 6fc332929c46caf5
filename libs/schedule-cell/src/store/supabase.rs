use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{supabase::SupabaseClient, StoreError};

use crate::models::{
    DateException, ExceptionDraft, Schedule, SlotRule, TimeLabel, WeeklyRuleDraft, WeeklySlotRule,
};
use crate::store::ScheduleStore;

const WEEKLY_RULES: &str = "/rest/v1/weekly_slot_rules";
const EXCEPTIONS: &str = "/rest/v1/date_exceptions";
const SNAPSHOT_FUNCTION: &str = "schedule_snapshot";

#[derive(Debug, Deserialize)]
struct WeeklyRuleRow {
    id: String,
    day_of_week: u8,
    start_time: TimeLabel,
    end_time: TimeLabel,
    slot_duration_minutes: u32,
    break_minutes: u32,
    is_available: bool,
}

impl From<WeeklyRuleRow> for WeeklySlotRule {
    fn from(row: WeeklyRuleRow) -> Self {
        WeeklySlotRule {
            id: row.id,
            day_of_week: row.day_of_week,
            start_time: row.start_time,
            end_time: row.end_time,
            slot_duration_minutes: row.slot_duration_minutes,
            break_minutes: row.break_minutes,
            is_available: row.is_available,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExceptionRow {
    id: String,
    exception_date: NaiveDate,
    is_available: bool,
    reason: Option<String>,
    custom_slots: Option<Vec<SlotRule>>,
}

impl From<ExceptionRow> for DateException {
    fn from(row: ExceptionRow) -> Self {
        DateException {
            id: row.id,
            date: row.exception_date,
            is_available: row.is_available,
            reason: row.reason,
            custom_slots: row.custom_slots,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotRow {
    default_slots: Vec<WeeklyRuleRow>,
    exceptions: Vec<ExceptionRow>,
}

/// Schedule configuration stored in PostgreSQL and reached through PostgREST.
pub struct SupabaseScheduleStore {
    supabase: SupabaseClient,
}

impl SupabaseScheduleStore {
    pub fn new(config: &AppConfig) -> Result<Self, StoreError> {
        Ok(Self {
            supabase: SupabaseClient::new(config)?,
        })
    }

    fn rule_body(draft: &WeeklyRuleDraft) -> Value {
        json!({
            "day_of_week": draft.day_of_week,
            "start_time": draft.start_time.to_string(),
            "end_time": draft.end_time.to_string(),
            "slot_duration_minutes": draft.slot_duration_minutes,
            "break_minutes": draft.break_minutes,
            "is_available": draft.is_available,
            "updated_at": Utc::now().to_rfc3339()
        })
    }

    fn exception_body(draft: &ExceptionDraft) -> Value {
        json!({
            "exception_date": draft.date,
            "is_available": draft.is_available,
            "reason": draft.reason,
            "custom_slots": draft.custom_slots,
            "updated_at": Utc::now().to_rfc3339()
        })
    }

    /// Ids are UUIDs in the database; anything else cannot match a row.
    fn id_filter(id: &str, what: &str) -> Result<String, StoreError> {
        let id = Uuid::parse_str(id).map_err(|_| StoreError::NotFound(format!("{} {}", what, id)))?;
        Ok(format!("id=eq.{}", id))
    }

    fn first<T, R>(rows: Vec<R>, missing: impl FnOnce() -> StoreError) -> Result<T, StoreError>
    where R: Into<T> {
        rows.into_iter().next().map(Into::into).ok_or_else(missing)
    }
}

#[async_trait]
impl ScheduleStore for SupabaseScheduleStore {
    async fn read_schedule(&self) -> Result<Schedule, StoreError> {
        let snapshot: SnapshotRow = self.supabase.rpc(SNAPSHOT_FUNCTION, json!({})).await?;

        debug!(
            "Read schedule snapshot: {} weekly rules, {} exceptions",
            snapshot.default_slots.len(),
            snapshot.exceptions.len()
        );

        Ok(Schedule {
            default_slots: snapshot.default_slots.into_iter().map(Into::into).collect(),
            exceptions: snapshot.exceptions.into_iter().map(Into::into).collect(),
        })
    }

    async fn insert_weekly_rule(&self, draft: WeeklyRuleDraft) -> Result<WeeklySlotRule, StoreError> {
        let mut body = Self::rule_body(&draft);
        body["created_at"] = json!(Utc::now().to_rfc3339());

        let rows: Vec<WeeklyRuleRow> = self.supabase.request(Method::POST, WEEKLY_RULES, Some(body)).await?;
        Self::first(rows, || StoreError::Decode("Insert returned no weekly rule".to_string()))
    }

    async fn update_weekly_rule(&self, id: &str, draft: WeeklyRuleDraft) -> Result<WeeklySlotRule, StoreError> {
        let path = format!("{}?{}", WEEKLY_RULES, Self::id_filter(id, "Weekly rule")?);
        let rows: Vec<WeeklyRuleRow> = self.supabase
            .request(Method::PATCH, &path, Some(Self::rule_body(&draft)))
            .await?;
        Self::first(rows, || StoreError::NotFound(format!("Weekly rule {}", id)))
    }

    async fn delete_weekly_rule(&self, id: &str) -> Result<(), StoreError> {
        let path = format!("{}?{}", WEEKLY_RULES, Self::id_filter(id, "Weekly rule")?);
        let rows: Vec<Value> = self.supabase.request(Method::DELETE, &path, None).await?;

        if rows.is_empty() {
            return Err(StoreError::NotFound(format!("Weekly rule {}", id)));
        }
        Ok(())
    }

    async fn upsert_exception(&self, draft: ExceptionDraft) -> Result<DateException, StoreError> {
        let rows: Vec<ExceptionRow> = self.supabase
            .upsert(EXCEPTIONS, "exception_date", Self::exception_body(&draft))
            .await?;
        Self::first(rows, || StoreError::Decode("Upsert returned no exception".to_string()))
    }

    async fn update_exception(&self, id: &str, draft: ExceptionDraft) -> Result<DateException, StoreError> {
        let path = format!("{}?{}", EXCEPTIONS, Self::id_filter(id, "Date exception")?);
        let rows: Vec<ExceptionRow> = self.supabase
            .request(Method::PATCH, &path, Some(Self::exception_body(&draft)))
            .await?;
        Self::first(rows, || StoreError::NotFound(format!("Date exception {}", id)))
    }

    async fn delete_exception(&self, id: &str) -> Result<(), StoreError> {
        let path = format!("{}?{}", EXCEPTIONS, Self::id_filter(id, "Date exception")?);
        let rows: Vec<Value> = self.supabase.request(Method::DELETE, &path, None).await?;

        if rows.is_empty() {
            return Err(StoreError::NotFound(format!("Date exception {}", id)));
        }
        Ok(())
    }
}
