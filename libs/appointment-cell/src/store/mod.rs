use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use shared_database::StoreError;

use crate::models::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment};

pub mod memory;
pub mod supabase;

pub use memory::InMemoryAppointmentStore;
pub use supabase::SupabaseAppointmentStore;

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Insert a `pending` appointment. Fails with `StoreError::Conflict` when a
    /// non-cancelled appointment already holds the same date and time; the check
    /// and the write are one atomic step.
    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, StoreError>;

    async fn get(&self, id: &str) -> Result<Appointment, StoreError>;

    /// Ordered by date, then time.
    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StoreError>;

    /// Appointments in `from..=to` that still occupy their slot.
    async fn list_active_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Appointment>, StoreError>;

    async fn list_active_on(&self, date: NaiveDate) -> Result<Vec<Appointment>, StoreError> {
        self.list_active_between(date, date).await
    }

    /// Move `id` to `status` only if it is still `expected`. `Ok(None)` means the
    /// guard did not match anything.
    async fn update_status(
        &self,
        id: &str,
        expected: AppointmentStatus,
        status: AppointmentStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Appointment>, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
