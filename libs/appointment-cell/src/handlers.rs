// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State, Extension},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::info;

use schedule_cell::store::ScheduleStore;
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::clock::Clock;
use shared_utils::extractor::ApiJson;
use shared_utils::rate_limit::RateLimiter;

use crate::models::{
    AppointmentFilter, AvailabilityQuery, BookAppointmentRequest, BookingError, CalendarQuery,
    UpdateAppointmentRequest,
};
use crate::services::{AppointmentService, AvailabilityService, BookingGate};
use crate::store::AppointmentStore;

#[derive(Clone)]
pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub availability: Arc<AvailabilityService>,
    pub booking: Arc<BookingGate>,
    pub appointments: Arc<AppointmentService>,
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
}

impl AppointmentState {
    pub fn new(
        config: Arc<AppConfig>,
        schedules: Arc<dyn ScheduleStore>,
        appointments: Arc<dyn AppointmentStore>,
        clock: Arc<dyn Clock>,
        rate_limiter: Option<Arc<dyn RateLimiter>>,
    ) -> Self {
        let availability = Arc::new(AvailabilityService::new(
            schedules,
            appointments.clone(),
            clock.clone(),
            config.booking_horizon_days,
        ));
        let booking = Arc::new(BookingGate::new(availability.clone(), appointments.clone(), clock));

        Self {
            config,
            availability,
            booking,
            appointments: Arc::new(AppointmentService::new(appointments)),
            rate_limiter,
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidDate(msg) => AppError::BadRequest(msg),
            BookingError::Validation(msg) => AppError::ValidationError(msg),
            BookingError::SlotUnavailable(msg) => AppError::Conflict(msg),
            BookingError::StoreWriteConflict(_) => {
                AppError::Conflict("The requested slot is no longer available".to_string())
            }
            BookingError::NotFound(msg) => AppError::NotFound(msg),
            e @ BookingError::InvalidStatusTransition { .. } => AppError::BadRequest(e.to_string()),
            e @ BookingError::ConcurrentUpdate => AppError::Conflict(e.to_string()),
            BookingError::ConfigurationUnavailable(msg) | BookingError::StoreUnavailable(msg) => {
                AppError::ServiceUnavailable(msg)
            }
        }
    }
}

fn parse_date(raw: Option<&str>, field: &str) -> Result<NaiveDate, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("'{}' query parameter is required", field)))?;

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid {} '{}', expected YYYY-MM-DD", field, raw)))
}

// ==============================================================================
// PUBLIC AVAILABILITY HANDLERS
// ==============================================================================

pub async fn get_available_slots(
    State(state): State<AppointmentState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let date = parse_date(query.date.as_deref(), "date")?;
    let availability = state.availability.for_date(date).await?;

    Ok(Json(json!({
        "success": true,
        "data": availability
    })))
}

pub async fn get_availability_calendar(
    State(state): State<AppointmentState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Value>, AppError> {
    let from = parse_date(query.from.as_deref(), "from")?;
    let to = parse_date(query.to.as_deref(), "to")?;
    let days = state.availability.calendar(from, to).await?;

    Ok(Json(json!({
        "success": true,
        "data": days
    })))
}

// ==============================================================================
// PUBLIC BOOKING HANDLER
// ==============================================================================

pub async fn book_appointment(
    State(state): State<AppointmentState>,
    ApiJson(request): ApiJson<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = state.booking.try_book(request).await?;

    Ok((StatusCode::CREATED, Json(json!({
        "success": true,
        "data": appointment
    }))))
}

// ==============================================================================
// ADMIN APPOINTMENT HANDLERS
// ==============================================================================

pub async fn list_appointments(
    State(state): State<AppointmentState>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.appointments.list(&filter).await?;

    Ok(Json(json!({
        "success": true,
        "data": appointments
    })))
}

pub async fn get_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.appointments.get(&appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": appointment
    })))
}

pub async fn update_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<String>,
    Extension(user): Extension<User>,
    ApiJson(request): ApiJson<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.appointments.update_status(&appointment_id, request.status).await?;
    info!("User {} set appointment {} to {}", user.id, appointment_id, appointment.status);

    Ok(Json(json!({
        "success": true,
        "data": appointment
    })))
}

pub async fn delete_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<String>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    state.appointments.delete(&appointment_id).await?;
    info!("User {} deleted appointment {}", user.id, appointment_id);

    Ok(Json(json!({
        "success": true,
        "message": "Appointment deleted"
    })))
}
