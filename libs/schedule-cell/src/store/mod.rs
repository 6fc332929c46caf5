use async_trait::async_trait;

use shared_database::StoreError;

use crate::models::{DateException, ExceptionDraft, Schedule, WeeklyRuleDraft, WeeklySlotRule};

pub mod memory;
pub mod supabase;

pub use memory::InMemoryScheduleStore;
pub use supabase::SupabaseScheduleStore;

/// Persistence for weekly rules and date exceptions. The scheduler only reads;
/// the admin screens write.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Rules and exceptions as one consistent snapshot.
    async fn read_schedule(&self) -> Result<Schedule, StoreError>;

    async fn insert_weekly_rule(&self, draft: WeeklyRuleDraft) -> Result<WeeklySlotRule, StoreError>;

    async fn update_weekly_rule(&self, id: &str, draft: WeeklyRuleDraft) -> Result<WeeklySlotRule, StoreError>;

    async fn delete_weekly_rule(&self, id: &str) -> Result<(), StoreError>;

    /// Insert or replace the exception for `draft.date`; the latest write wins.
    async fn upsert_exception(&self, draft: ExceptionDraft) -> Result<DateException, StoreError>;

    async fn update_exception(&self, id: &str, draft: ExceptionDraft) -> Result<DateException, StoreError>;

    async fn delete_exception(&self, id: &str) -> Result<(), StoreError>;
}
