// libs/appointment-cell/src/services/availability.rs
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use schedule_cell::models::{Availability, DaySummary, TimeLabel};
use schedule_cell::services::availability::MAX_CALENDAR_DAYS;
use schedule_cell::services::{AvailabilityResolver, BookingWindow};
use schedule_cell::store::ScheduleStore;
use shared_utils::clock::Clock;

use crate::models::BookingError;
use crate::store::AppointmentStore;

/// Joins the schedule and the day's bookings into what a customer may still pick.
pub struct AvailabilityService {
    schedules: Arc<dyn ScheduleStore>,
    appointments: Arc<dyn AppointmentStore>,
    clock: Arc<dyn Clock>,
    horizon_days: Option<u32>,
}

impl AvailabilityService {
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        appointments: Arc<dyn AppointmentStore>,
        clock: Arc<dyn Clock>,
        horizon_days: Option<u32>,
    ) -> Self {
        Self { schedules, appointments, clock, horizon_days }
    }

    fn resolver(&self) -> AvailabilityResolver {
        AvailabilityResolver::new(BookingWindow::new(self.clock.today(), self.horizon_days))
    }

    pub async fn for_date(&self, date: NaiveDate) -> Result<Availability, BookingError> {
        debug!("Resolving availability for {}", date);

        let schedule = self
            .schedules
            .read_schedule()
            .await
            .map_err(|e| BookingError::ConfigurationUnavailable(e.to_string()))?;

        let booked: HashSet<TimeLabel> = self
            .appointments
            .list_active_on(date)
            .await?
            .into_iter()
            .map(|a| a.appointment_time)
            .collect();

        Ok(self.resolver().available(date, &schedule, &booked))
    }

    pub async fn calendar(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DaySummary>, BookingError> {
        if to < from {
            return Err(BookingError::InvalidDate("'to' must not be before 'from'".to_string()));
        }

        let span = (to - from).num_days() + 1;
        if span > MAX_CALENDAR_DAYS {
            return Err(BookingError::InvalidDate(format!(
                "Calendar range is limited to {} days",
                MAX_CALENDAR_DAYS
            )));
        }

        let schedule = self
            .schedules
            .read_schedule()
            .await
            .map_err(|e| BookingError::ConfigurationUnavailable(e.to_string()))?;

        let mut booked: HashMap<NaiveDate, HashSet<TimeLabel>> = HashMap::new();
        for appointment in self.appointments.list_active_between(from, to).await? {
            booked
                .entry(appointment.appointment_date)
                .or_default()
                .insert(appointment.appointment_time);
        }

        Ok(self.resolver().calendar(from, to, &schedule, &booked))
    }
}
