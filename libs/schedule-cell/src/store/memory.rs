use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_database::StoreError;

use crate::models::{DateException, ExceptionDraft, Schedule, WeeklyRuleDraft, WeeklySlotRule};
use crate::store::ScheduleStore;

/// Schedule kept in process memory, optionally seeded from a JSON fixture.
/// Reads clone the whole schedule under the lock, so callers get a snapshot.
#[derive(Default)]
pub struct InMemoryScheduleStore {
    schedule: RwLock<Schedule>,
}

impl InMemoryScheduleStore {
    pub fn new(schedule: Schedule) -> Self {
        Self { schedule: RwLock::new(schedule) }
    }

    /// Load a schedule file shaped like `{ "defaultSlots": [...], "exceptions": [...] }`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Unavailable(format!("Failed to read {}: {}", path.display(), e)))?;
        let schedule: Schedule = serde_json::from_str(&raw)?;
        Ok(Self::new(schedule))
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn read_schedule(&self) -> Result<Schedule, StoreError> {
        Ok(self.schedule.read().await.clone())
    }

    async fn insert_weekly_rule(&self, draft: WeeklyRuleDraft) -> Result<WeeklySlotRule, StoreError> {
        let rule = draft.with_id(Uuid::new_v4().to_string());
        self.schedule.write().await.default_slots.push(rule.clone());
        Ok(rule)
    }

    async fn update_weekly_rule(&self, id: &str, draft: WeeklyRuleDraft) -> Result<WeeklySlotRule, StoreError> {
        let mut schedule = self.schedule.write().await;
        let slot = schedule
            .default_slots
            .iter_mut()
            .find(|rule| rule.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Weekly rule {}", id)))?;

        *slot = draft.with_id(id.to_string());
        Ok(slot.clone())
    }

    async fn delete_weekly_rule(&self, id: &str) -> Result<(), StoreError> {
        let mut schedule = self.schedule.write().await;
        let before = schedule.default_slots.len();
        schedule.default_slots.retain(|rule| rule.id != id);

        if schedule.default_slots.len() == before {
            return Err(StoreError::NotFound(format!("Weekly rule {}", id)));
        }
        Ok(())
    }

    async fn upsert_exception(&self, draft: ExceptionDraft) -> Result<DateException, StoreError> {
        let mut schedule = self.schedule.write().await;

        if let Some(existing) = schedule.exceptions.iter_mut().find(|e| e.date == draft.date) {
            *existing = draft.with_id(existing.id.clone());
            return Ok(existing.clone());
        }

        let exception = draft.with_id(Uuid::new_v4().to_string());
        schedule.exceptions.push(exception.clone());
        Ok(exception)
    }

    async fn update_exception(&self, id: &str, draft: ExceptionDraft) -> Result<DateException, StoreError> {
        let mut schedule = self.schedule.write().await;

        if schedule.exceptions.iter().any(|e| e.id != id && e.date == draft.date) {
            return Err(StoreError::Conflict(format!("An exception for {} already exists", draft.date)));
        }

        let slot = schedule
            .exceptions
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Date exception {}", id)))?;

        *slot = draft.with_id(id.to_string());
        Ok(slot.clone())
    }

    async fn delete_exception(&self, id: &str) -> Result<(), StoreError> {
        let mut schedule = self.schedule.write().await;
        let before = schedule.exceptions.len();
        schedule.exceptions.retain(|e| e.id != id);

        if schedule.exceptions.len() == before {
            return Err(StoreError::NotFound(format!("Date exception {}", id)));
        }
        Ok(())
    }
}
