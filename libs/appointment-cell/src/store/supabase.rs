use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use schedule_cell::models::TimeLabel;
use shared_config::AppConfig;
use shared_database::{supabase::SupabaseClient, StoreError};

use crate::models::{Appointment, AppointmentFilter, AppointmentStatus, BookingDetails, NewAppointment};
use crate::store::AppointmentStore;

const APPOINTMENTS: &str = "/rest/v1/appointments";
const ORDER: &str = "order=appointment_date.asc,appointment_time.asc";

#[derive(Debug, Deserialize)]
struct AppointmentRow {
    id: String,
    appointment_date: NaiveDate,
    appointment_time: TimeLabel,
    status: AppointmentStatus,
    customer_name: String,
    customer_phone: String,
    customer_email: Option<String>,
    device_type: Option<String>,
    brand: Option<String>,
    model: Option<String>,
    service: Option<String>,
    notes: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AppointmentRow> for Appointment {
    fn from(row: AppointmentRow) -> Self {
        Appointment {
            id: row.id,
            appointment_date: row.appointment_date,
            appointment_time: row.appointment_time,
            status: row.status,
            details: BookingDetails {
                customer_name: row.customer_name,
                customer_phone: row.customer_phone,
                customer_email: row.customer_email,
                device_type: row.device_type,
                brand: row.brand,
                model: row.model,
                service: row.service,
                notes: row.notes,
            },
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Appointments table behind PostgREST. Double bookings are refused by the
/// `appointments_active_slot_key` partial unique index.
pub struct SupabaseAppointmentStore {
    supabase: SupabaseClient,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Result<Self, StoreError> {
        Ok(Self {
            supabase: SupabaseClient::new(config)?,
        })
    }

    fn id_filter(id: &str) -> Result<String, StoreError> {
        let id = Uuid::parse_str(id).map_err(|_| StoreError::NotFound(format!("Appointment {}", id)))?;
        Ok(format!("id=eq.{}", id))
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Appointment>, StoreError> {
        let path = format!("{}?{}", APPOINTMENTS, query);
        let rows: Vec<AppointmentRow> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        let details = &appointment.details;
        let body = json!({
            "appointment_date": appointment.appointment_date,
            "appointment_time": appointment.appointment_time.to_string(),
            "status": AppointmentStatus::Pending,
            "customer_name": details.customer_name,
            "customer_phone": details.customer_phone,
            "customer_email": details.customer_email,
            "device_type": details.device_type,
            "brand": details.brand,
            "model": details.model,
            "service": details.service,
            "notes": details.notes
        });

        let rows: Vec<AppointmentRow> = self.supabase.request(Method::POST, APPOINTMENTS, Some(body)).await?;
        rows.into_iter()
            .next()
            .map(Into::into)
            .ok_or_else(|| StoreError::Decode("Insert returned no appointment".to_string()))
    }

    async fn get(&self, id: &str) -> Result<Appointment, StoreError> {
        self.fetch(&Self::id_filter(id)?)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("Appointment {}", id)))
    }

    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StoreError> {
        let mut query = vec!["select=*".to_string()];
        if let Some(date) = filter.date {
            query.push(format!("appointment_date=eq.{}", date));
        }
        if let Some(status) = filter.status {
            query.push(format!("status=eq.{}", status));
        }
        query.push(ORDER.to_string());

        self.fetch(&query.join("&")).await
    }

    async fn list_active_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Appointment>, StoreError> {
        debug!("Fetching active appointments between {} and {}", from, to);
        let query = format!(
            "select=*&appointment_date=gte.{}&appointment_date=lte.{}&status=neq.{}&{}",
            from, to, AppointmentStatus::Cancelled, ORDER
        );
        self.fetch(&query).await
    }

    async fn update_status(
        &self,
        id: &str,
        expected: AppointmentStatus,
        status: AppointmentStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Appointment>, StoreError> {
        let path = format!("{}?{}&status=eq.{}", APPOINTMENTS, Self::id_filter(id)?, expected);

        let mut body = json!({
            "status": status,
            "updated_at": Utc::now().to_rfc3339()
        });
        if let Some(completed_at) = completed_at {
            body["completed_at"] = json!(completed_at.to_rfc3339());
        }

        let rows: Vec<AppointmentRow> = self.supabase.request(Method::PATCH, &path, Some(body)).await?;
        Ok(rows.into_iter().next().map(Into::into))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let path = format!("{}?{}", APPOINTMENTS, Self::id_filter(id)?);
        let rows: Vec<Value> = self.supabase.request(Method::DELETE, &path, None).await?;

        if rows.is_empty() {
            return Err(StoreError::NotFound(format!("Appointment {}", id)));
        }
        Ok(())
    }
}
