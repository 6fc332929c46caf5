// libs/schedule-cell/src/services/availability.rs
use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::models::{Availability, DaySummary, Schedule, TimeLabel};
use crate::services::slot_generator::SlotGenerator;

/// Longest range the calendar view will resolve in one call.
pub const MAX_CALENDAR_DAYS: i64 = 62;

/// The dates customers may book: from `today` up to an optional horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookingWindow {
    pub today: NaiveDate,
    pub horizon_days: Option<u32>,
}

impl BookingWindow {
    pub fn new(today: NaiveDate, horizon_days: Option<u32>) -> Self {
        Self { today, horizon_days }
    }

    pub fn last_bookable_date(&self) -> Option<NaiveDate> {
        self.horizon_days
            .and_then(|days| self.today.checked_add_signed(Duration::days(days as i64)))
    }

    /// Why `date` falls outside the window, if it does.
    pub fn closed_reason(&self, date: NaiveDate) -> Option<String> {
        if date < self.today {
            return Some("Date is in the past".to_string());
        }

        match (self.last_bookable_date(), self.horizon_days) {
            (Some(last), Some(days)) if date > last => {
                Some(format!("Bookings open at most {} days in advance", days))
            }
            _ => None,
        }
    }
}

/// Subtracts booked times from generated slots for a date.
pub struct AvailabilityResolver {
    window: BookingWindow,
}

impl AvailabilityResolver {
    pub fn new(window: BookingWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &BookingWindow {
        &self.window
    }

    /// `booked` holds the times of appointments on `date` that still occupy a slot.
    pub fn available(&self, date: NaiveDate, schedule: &Schedule, booked: &HashSet<TimeLabel>) -> Availability {
        if let Some(reason) = self.window.closed_reason(date) {
            debug!("Date {} outside booking window: {}", date, reason);
            return Availability::closed(date, reason);
        }

        if let Some(exception) = schedule.exception_for(date) {
            if !exception.is_available {
                let reason = exception.reason.clone().unwrap_or_else(|| "Closed on this date".to_string());
                return Availability::closed(date, reason);
            }
        }

        let generated = SlotGenerator::generate(date, schedule);
        if generated.is_empty() {
            return Availability::closed(date, "No appointments are offered on this day");
        }

        let total_slots = generated.len();
        let available_slots: Vec<TimeLabel> = generated
            .into_iter()
            .filter(|label| !booked.contains(label))
            .collect();
        let taken_slots = total_slots - available_slots.len();

        debug!("Date {}: {} of {} slots available", date, available_slots.len(), total_slots);

        Availability {
            is_open: true,
            date,
            available_slots,
            total_slots,
            taken_slots,
            reason: None,
        }
    }

    /// One summary per date in `from..=to`. `booked` maps dates to their occupied times.
    pub fn calendar(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        schedule: &Schedule,
        booked: &HashMap<NaiveDate, HashSet<TimeLabel>>,
    ) -> Vec<DaySummary> {
        let empty = HashSet::new();

        from.iter_days()
            .take_while(|date| *date <= to)
            .map(|date| {
                let taken = booked.get(&date).unwrap_or(&empty);
                DaySummary::from(self.available(date, schedule, taken))
            })
            .collect()
    }
}
