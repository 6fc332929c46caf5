// libs/appointment-cell/src/services/appointments.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::models::{Appointment, AppointmentFilter, AppointmentStatus, BookingError};
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::store::AppointmentStore;

/// Back-office operations on existing appointments.
pub struct AppointmentService {
    store: Arc<dyn AppointmentStore>,
    lifecycle: AppointmentLifecycleService,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self {
            store,
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    pub async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, BookingError> {
        Ok(self.store.list(filter).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Appointment, BookingError> {
        Ok(self.store.get(id).await?)
    }

    /// Apply one lifecycle step. The write only lands if the appointment still has
    /// the status it was validated against.
    pub async fn update_status(&self, id: &str, new_status: AppointmentStatus) -> Result<Appointment, BookingError> {
        let current = self.store.get(id).await?;
        self.lifecycle.validate_status_transition(current.status, new_status)?;

        let completed_at = (new_status == AppointmentStatus::Completed).then(Utc::now);

        match self.store.update_status(id, current.status, new_status, completed_at).await? {
            Some(updated) => {
                info!("Appointment {} moved from {} to {}", id, current.status, new_status);
                Ok(updated)
            }
            None => {
                warn!("Appointment {} changed while moving from {} to {}", id, current.status, new_status);
                Err(BookingError::ConcurrentUpdate)
            }
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), BookingError> {
        self.store.delete(id).await?;
        info!("Appointment {} deleted", id);
        Ok(())
    }
}
