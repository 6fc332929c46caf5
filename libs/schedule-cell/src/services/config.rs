// libs/schedule-cell/src/services/config.rs
use std::sync::Arc;

use tracing::{debug, info};

use crate::models::{
    CreateWeeklyRuleRequest, DateException, ExceptionDraft, Schedule, ScheduleError, SlotRule,
    TimeLabel, UpdateExceptionRequest, UpdateWeeklyRuleRequest, UpsertExceptionRequest,
    WeeklyRuleDraft, WeeklySlotRule,
};
use crate::store::ScheduleStore;

/// Administrative reads and edits of the schedule configuration.
pub struct ScheduleConfigService {
    store: Arc<dyn ScheduleStore>,
}

impl ScheduleConfigService {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    pub async fn get_schedule(&self) -> Result<Schedule, ScheduleError> {
        Ok(self.store.read_schedule().await?)
    }

    pub async fn list_weekly_rules(&self) -> Result<Vec<WeeklySlotRule>, ScheduleError> {
        let mut rules = self.get_schedule().await?.default_slots;
        rules.sort_by(|a, b| (a.day_of_week, a.start_time).cmp(&(b.day_of_week, b.start_time)));
        Ok(rules)
    }

    pub async fn list_exceptions(&self) -> Result<Vec<DateException>, ScheduleError> {
        let mut exceptions = self.get_schedule().await?.exceptions;
        exceptions.sort_by_key(|e| e.date);
        Ok(exceptions)
    }

    pub async fn create_weekly_rule(&self, request: CreateWeeklyRuleRequest) -> Result<WeeklySlotRule, ScheduleError> {
        debug!("Creating weekly rule for day {}", request.day_of_week);

        let draft = validate_weekly_rule(
            request.day_of_week,
            request.start_time,
            request.end_time,
            request.slot_duration_minutes,
            request.break_minutes.unwrap_or(0),
            request.is_available.unwrap_or(true),
        )?;

        let rule = self.store.insert_weekly_rule(draft).await?;
        info!("Weekly rule {} created for day {}", rule.id, rule.day_of_week);
        Ok(rule)
    }

    pub async fn update_weekly_rule(
        &self,
        rule_id: &str,
        request: UpdateWeeklyRuleRequest,
    ) -> Result<WeeklySlotRule, ScheduleError> {
        debug!("Updating weekly rule: {}", rule_id);

        let current = self
            .get_schedule()
            .await?
            .default_slots
            .into_iter()
            .find(|rule| rule.id == rule_id)
            .ok_or_else(|| ScheduleError::NotFound(format!("Weekly rule {} not found", rule_id)))?;

        let draft = validate_weekly_rule(
            request.day_of_week.unwrap_or(current.day_of_week as i32),
            request.start_time.unwrap_or(current.start_time),
            request.end_time.unwrap_or(current.end_time),
            request.slot_duration_minutes.unwrap_or(current.slot_duration_minutes as i64),
            request.break_minutes.unwrap_or(current.break_minutes as i64),
            request.is_available.unwrap_or(current.is_available),
        )?;

        let rule = self.store.update_weekly_rule(rule_id, draft).await?;
        info!("Weekly rule {} updated", rule.id);
        Ok(rule)
    }

    pub async fn delete_weekly_rule(&self, rule_id: &str) -> Result<(), ScheduleError> {
        self.store.delete_weekly_rule(rule_id).await?;
        info!("Weekly rule {} deleted", rule_id);
        Ok(())
    }

    /// Create the exception for a date, replacing any existing one for that date.
    pub async fn upsert_exception(&self, request: UpsertExceptionRequest) -> Result<DateException, ScheduleError> {
        debug!("Upserting exception for {}", request.date);

        let draft = validate_exception(ExceptionDraft {
            date: request.date,
            is_available: request.is_available,
            reason: request.reason,
            custom_slots: request.custom_slots,
        })?;

        let exception = self.store.upsert_exception(draft).await?;
        info!("Exception {} stored for {} (open: {})", exception.id, exception.date, exception.is_available);
        Ok(exception)
    }

    pub async fn update_exception(
        &self,
        exception_id: &str,
        request: UpdateExceptionRequest,
    ) -> Result<DateException, ScheduleError> {
        debug!("Updating exception: {}", exception_id);

        let current = self
            .get_schedule()
            .await?
            .exceptions
            .into_iter()
            .find(|e| e.id == exception_id)
            .ok_or_else(|| ScheduleError::NotFound(format!("Date exception {} not found", exception_id)))?;

        let mut draft = ExceptionDraft::from(&current);
        if let Some(date) = request.date {
            draft.date = date;
        }
        if let Some(is_available) = request.is_available {
            draft.is_available = is_available;
        }
        if request.reason.is_some() {
            draft.reason = request.reason;
        }
        if request.custom_slots.is_some() {
            draft.custom_slots = request.custom_slots;
        }

        let exception = self.store.update_exception(exception_id, validate_exception(draft)?).await?;
        info!("Exception {} updated", exception.id);
        Ok(exception)
    }

    pub async fn delete_exception(&self, exception_id: &str) -> Result<(), ScheduleError> {
        self.store.delete_exception(exception_id).await?;
        info!("Exception {} deleted", exception_id);
        Ok(())
    }
}

fn validate_window(start: TimeLabel, end: TimeLabel, duration: i64, break_minutes: i64) -> Result<(u32, u32), ScheduleError> {
    if start >= end {
        return Err(ScheduleError::Validation("Start time must be before end time".to_string()));
    }

    if duration <= 0 {
        return Err(ScheduleError::Validation("Slot duration must be a positive number of minutes".to_string()));
    }

    if break_minutes < 0 {
        return Err(ScheduleError::Validation("Break minutes cannot be negative".to_string()));
    }

    let window = i64::from(end.minutes()) - i64::from(start.minutes());
    if duration > window {
        return Err(ScheduleError::Validation(format!(
            "Slot duration of {} minutes does not fit between {} and {}",
            duration, start, end
        )));
    }

    if break_minutes > window {
        return Err(ScheduleError::Validation(format!(
            "Break of {} minutes is longer than the window between {} and {}",
            break_minutes, start, end
        )));
    }

    let duration = u32::try_from(duration)
        .map_err(|_| ScheduleError::Validation("Slot duration is out of range".to_string()))?;
    let break_minutes = u32::try_from(break_minutes)
        .map_err(|_| ScheduleError::Validation("Break minutes are out of range".to_string()))?;

    Ok((duration, break_minutes))
}

pub fn validate_weekly_rule(
    day_of_week: i32,
    start_time: TimeLabel,
    end_time: TimeLabel,
    slot_duration_minutes: i64,
    break_minutes: i64,
    is_available: bool,
) -> Result<WeeklyRuleDraft, ScheduleError> {
    if !(0..=6).contains(&day_of_week) {
        return Err(ScheduleError::Validation(
            "Day of week must be between 0 (Sunday) and 6 (Saturday)".to_string(),
        ));
    }

    let (slot_duration_minutes, break_minutes) =
        validate_window(start_time, end_time, slot_duration_minutes, break_minutes)?;

    Ok(WeeklyRuleDraft {
        day_of_week: day_of_week as u8,
        start_time,
        end_time,
        slot_duration_minutes,
        break_minutes,
        is_available,
    })
}

fn validate_custom_slot(slot: &SlotRule) -> Result<(), ScheduleError> {
    validate_window(
        slot.start_time,
        slot.end_time,
        slot.slot_duration_minutes as i64,
        slot.break_minutes as i64,
    )
    .map(|_| ())
}

pub fn validate_exception(draft: ExceptionDraft) -> Result<ExceptionDraft, ScheduleError> {
    if let Some(slots) = &draft.custom_slots {
        slots.iter().try_for_each(validate_custom_slot)?;
    }

    let reason = draft
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    Ok(ExceptionDraft { reason, ..draft })
}
