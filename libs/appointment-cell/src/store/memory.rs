use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_database::StoreError;

use crate::models::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment};
use crate::store::AppointmentStore;

/// Appointments kept in process memory. The slot check and the insert happen
/// under one write lock, which gives the same guarantee as the unique index.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<Vec<Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new(appointments: Vec<Appointment>) -> Self {
        Self { appointments: RwLock::new(appointments) }
    }

    /// Load a JSON array of appointments in their API shape.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Unavailable(format!("Failed to read {}: {}", path.display(), e)))?;
        let appointments: Vec<Appointment> = serde_json::from_str(&raw)?;
        Ok(Self::new(appointments))
    }

    fn sorted(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
        appointments.sort_by_key(|a| (a.appointment_date, a.appointment_time));
        appointments
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        let mut appointments = self.appointments.write().await;

        let taken = appointments.iter().any(|existing| {
            existing.occupies_slot()
                && existing.appointment_date == appointment.appointment_date
                && existing.appointment_time == appointment.appointment_time
        });
        if taken {
            return Err(StoreError::Conflict(format!(
                "{} {} is already booked",
                appointment.appointment_date, appointment.appointment_time
            )));
        }

        let now = Utc::now();
        let created = Appointment {
            id: Uuid::new_v4().to_string(),
            appointment_date: appointment.appointment_date,
            appointment_time: appointment.appointment_time,
            status: AppointmentStatus::Pending,
            details: appointment.details,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        appointments.push(created.clone());
        Ok(created)
    }

    async fn get(&self, id: &str) -> Result<Appointment, StoreError> {
        self.appointments
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Appointment {}", id)))
    }

    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StoreError> {
        let matching = self
            .appointments
            .read()
            .await
            .iter()
            .filter(|a| filter.date.map_or(true, |date| a.appointment_date == date))
            .filter(|a| filter.status.map_or(true, |status| a.status == status))
            .cloned()
            .collect();

        Ok(Self::sorted(matching))
    }

    async fn list_active_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Appointment>, StoreError> {
        let matching = self
            .appointments
            .read()
            .await
            .iter()
            .filter(|a| a.occupies_slot() && a.appointment_date >= from && a.appointment_date <= to)
            .cloned()
            .collect();

        Ok(Self::sorted(matching))
    }

    async fn update_status(
        &self,
        id: &str,
        expected: AppointmentStatus,
        status: AppointmentStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Appointment>, StoreError> {
        let mut appointments = self.appointments.write().await;

        let Some(appointment) = appointments.iter_mut().find(|a| a.id == id && a.status == expected) else {
            return Ok(None);
        };

        appointment.status = status;
        appointment.updated_at = Utc::now();
        if completed_at.is_some() {
            appointment.completed_at = completed_at;
        }

        Ok(Some(appointment.clone()))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut appointments = self.appointments.write().await;
        let before = appointments.len();
        appointments.retain(|a| a.id != id);

        if appointments.len() == before {
            return Err(StoreError::NotFound(format!("Appointment {}", id)));
        }
        Ok(())
    }
}
