// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use schedule_cell::models::TimeLabel;
use shared_utils::clock::Clock;

use crate::models::{Appointment, BookAppointmentRequest, BookingDetails, BookingError, NewAppointment};
use crate::services::availability::AvailabilityService;
use crate::store::AppointmentStore;

/// Write-time gate for new appointments. Availability is re-checked against the
/// current schedule and bookings, and the store insert is the final arbiter.
pub struct BookingGate {
    availability: Arc<AvailabilityService>,
    appointments: Arc<dyn AppointmentStore>,
    clock: Arc<dyn Clock>,
}

impl BookingGate {
    pub fn new(
        availability: Arc<AvailabilityService>,
        appointments: Arc<dyn AppointmentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { availability, appointments, clock }
    }

    pub async fn try_book(&self, request: BookAppointmentRequest) -> Result<Appointment, BookingError> {
        let booking = self.validate(request)?;
        let (date, time) = (booking.appointment_date, booking.appointment_time);
        debug!("Booking request for {} {}", date, time);

        let availability = self.availability.for_date(date).await?;

        if !availability.is_open {
            let reason = availability.reason.unwrap_or_else(|| "Closed".to_string());
            return Err(BookingError::SlotUnavailable(format!("{} is not open for bookings: {}", date, reason)));
        }

        if !availability.available_slots.contains(&time) {
            return Err(BookingError::SlotUnavailable(format!("{} on {} is not available", time, date)));
        }

        match self.appointments.insert(booking).await {
            Ok(appointment) => {
                info!("Appointment {} booked for {} {}", appointment.id, date, time);
                Ok(appointment)
            }
            Err(e) => match BookingError::from(e) {
                BookingError::StoreWriteConflict(detail) => {
                    warn!("Concurrent booking lost the race for {} {}: {}", date, time, detail);
                    Err(BookingError::SlotUnavailable(format!("{} on {} was just booked", time, date)))
                }
                other => Err(other),
            },
        }
    }

    fn validate(&self, request: BookAppointmentRequest) -> Result<NewAppointment, BookingError> {
        let raw_date = required(request.appointment_date, "appointmentDate")
            .map_err(BookingError::InvalidDate)?;
        let raw_time = required(request.appointment_time, "appointmentTime")
            .map_err(BookingError::InvalidDate)?;

        let appointment_date = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d")
            .map_err(|_| BookingError::InvalidDate(format!("Invalid date '{}', expected YYYY-MM-DD", raw_date)))?;
        let appointment_time: TimeLabel = raw_time
            .parse()
            .map_err(|_| BookingError::InvalidDate(format!("Invalid time '{}', expected HH:MM", raw_time)))?;

        if appointment_date.and_time(appointment_time.as_time()) < self.clock.now() {
            return Err(BookingError::InvalidDate("Appointment date and time must not be in the past".to_string()));
        }

        let customer_name = required(request.customer_name, "customerName").map_err(BookingError::Validation)?;
        let customer_phone = required(request.customer_phone, "customerPhone").map_err(BookingError::Validation)?;

        Ok(NewAppointment {
            appointment_date,
            appointment_time,
            details: BookingDetails {
                customer_name,
                customer_phone,
                customer_email: optional(request.customer_email),
                device_type: optional(request.device_type),
                brand: optional(request.brand),
                model: optional(request.model),
                service: optional(request.service),
                notes: optional(request.notes),
            },
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, String> {
    optional(value).ok_or_else(|| format!("{} is required", field))
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
