// libs/schedule-cell/src/services/slot_generator.rs
use chrono::NaiveDate;
use tracing::debug;

use crate::models::{day_of_week, Schedule, TimeLabel};

/// Turns a schedule into the candidate time labels for a date, ignoring bookings.
pub struct SlotGenerator;

impl SlotGenerator {
    /// Ordered, de-duplicated labels for `date`. An exception for the date takes
    /// precedence over the weekly rules: closed means nothing, custom slots replace
    /// the weekday template.
    pub fn generate(date: NaiveDate, schedule: &Schedule) -> Vec<TimeLabel> {
        let mut labels = match schedule.exception_for(date) {
            Some(exception) if !exception.is_available => {
                debug!("Date {} closed by exception {}", date, exception.id);
                return Vec::new();
            }
            Some(exception) if exception.custom_slots.is_some() => {
                debug!("Date {} uses custom slots from exception {}", date, exception.id);
                exception
                    .custom_slots
                    .iter()
                    .flatten()
                    .filter(|rule| rule.is_available)
                    .flat_map(|rule| {
                        expand(rule.start_time, rule.end_time, rule.slot_duration_minutes, rule.break_minutes)
                    })
                    .collect::<Vec<_>>()
            }
            _ => {
                let weekday = day_of_week(date);
                schedule
                    .default_slots
                    .iter()
                    .filter(|rule| rule.day_of_week == weekday && rule.is_available)
                    .flat_map(|rule| {
                        expand(rule.start_time, rule.end_time, rule.slot_duration_minutes, rule.break_minutes)
                    })
                    .collect::<Vec<_>>()
            }
        };

        labels.sort();
        labels.dedup();
        labels
    }
}

/// Walk one rule's window: emit a label, then advance by duration plus break,
/// as long as a whole slot still fits before `end`.
fn expand(start: TimeLabel, end: TimeLabel, duration_minutes: u32, break_minutes: u32) -> Vec<TimeLabel> {
    if duration_minutes == 0 || start >= end {
        return Vec::new();
    }

    let end_minutes = end.minutes();
    // Fixture and database rules skip validation.
    let step = duration_minutes.saturating_add(break_minutes);

    let mut slots = Vec::new();
    let mut cursor = start.minutes();

    while cursor.saturating_add(duration_minutes) <= end_minutes {
        if let Some(label) = TimeLabel::from_minutes(cursor) {
            slots.push(label);
        }
        cursor = match cursor.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }

    slots
}
