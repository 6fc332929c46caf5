// libs/schedule-cell/src/models.rs
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use shared_database::StoreError;

// ==============================================================================
// TIME LABELS
// ==============================================================================

/// A wall-clock time of day with minute precision, rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeLabel(NaiveTime);

impl TimeLabel {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(TimeLabel)
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        NaiveTime::from_num_seconds_from_midnight_opt(minutes.checked_mul(60)?, 0).map(TimeLabel)
    }

    /// Minutes since midnight.
    pub fn minutes(&self) -> u32 {
        self.0.num_seconds_from_midnight() / 60
    }

    pub fn as_time(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for TimeLabel {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .map(|t| TimeLabel(t.with_second(0).unwrap_or(t)))
            .map_err(|_| ScheduleError::Validation(format!("Invalid time '{}', expected HH:MM", s)))
    }
}

impl fmt::Display for TimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for TimeLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Day of week with Sunday as 0, derived from the calendar date alone.
pub fn day_of_week(date: NaiveDate) -> u8 {
    use chrono::Datelike;
    date.weekday().num_days_from_sunday() as u8
}

// ==============================================================================
// SCHEDULE CONFIGURATION
// ==============================================================================

fn default_true() -> bool {
    true
}

/// An ad-hoc slot template used inside a date exception.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub start_time: TimeLabel,
    pub end_time: TimeLabel,
    pub slot_duration_minutes: u32,
    #[serde(default)]
    pub break_minutes: u32,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

/// Recurring template for one weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySlotRule {
    pub id: String,
    pub day_of_week: u8,
    pub start_time: TimeLabel,
    pub end_time: TimeLabel,
    pub slot_duration_minutes: u32,
    #[serde(default)]
    pub break_minutes: u32,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

/// Override for a single calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateException {
    pub id: String,
    pub date: NaiveDate,
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_slots: Option<Vec<SlotRule>>,
}

/// Weekly rules plus dated exceptions, read as one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default)]
    pub default_slots: Vec<WeeklySlotRule>,
    #[serde(default)]
    pub exceptions: Vec<DateException>,
}

impl Schedule {
    /// The exception governing `date`. If several exist, the last one wins.
    pub fn exception_for(&self, date: NaiveDate) -> Option<&DateException> {
        self.exceptions.iter().rev().find(|e| e.date == date)
    }
}

/// Validated fields of a weekly rule, before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyRuleDraft {
    pub day_of_week: u8,
    pub start_time: TimeLabel,
    pub end_time: TimeLabel,
    pub slot_duration_minutes: u32,
    pub break_minutes: u32,
    pub is_available: bool,
}

impl WeeklyRuleDraft {
    pub fn with_id(self, id: String) -> WeeklySlotRule {
        WeeklySlotRule {
            id,
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
            slot_duration_minutes: self.slot_duration_minutes,
            break_minutes: self.break_minutes,
            is_available: self.is_available,
        }
    }
}

impl From<&WeeklySlotRule> for WeeklyRuleDraft {
    fn from(rule: &WeeklySlotRule) -> Self {
        Self {
            day_of_week: rule.day_of_week,
            start_time: rule.start_time,
            end_time: rule.end_time,
            slot_duration_minutes: rule.slot_duration_minutes,
            break_minutes: rule.break_minutes,
            is_available: rule.is_available,
        }
    }
}

/// Validated fields of a date exception.
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionDraft {
    pub date: NaiveDate,
    pub is_available: bool,
    pub reason: Option<String>,
    pub custom_slots: Option<Vec<SlotRule>>,
}

impl ExceptionDraft {
    pub fn with_id(self, id: String) -> DateException {
        DateException {
            id,
            date: self.date,
            is_available: self.is_available,
            reason: self.reason,
            custom_slots: self.custom_slots,
        }
    }
}

impl From<&DateException> for ExceptionDraft {
    fn from(exception: &DateException) -> Self {
        Self {
            date: exception.date,
            is_available: exception.is_available,
            reason: exception.reason.clone(),
            custom_slots: exception.custom_slots.clone(),
        }
    }
}

// ==============================================================================
// AVAILABILITY RESULTS
// ==============================================================================

/// Bookable times for one date. A closed date and a fully booked date both have
/// no available slots; `is_open` tells them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub is_open: bool,
    pub date: NaiveDate,
    pub available_slots: Vec<TimeLabel>,
    pub total_slots: usize,
    pub taken_slots: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Availability {
    pub fn closed(date: NaiveDate, reason: impl Into<String>) -> Self {
        Self {
            is_open: false,
            date,
            available_slots: Vec::new(),
            total_slots: 0,
            taken_slots: 0,
            reason: Some(reason.into()),
        }
    }

    pub fn is_fully_booked(&self) -> bool {
        self.is_open && self.available_slots.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub is_open: bool,
    pub total_slots: usize,
    pub taken_slots: usize,
    pub available_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<Availability> for DaySummary {
    fn from(availability: Availability) -> Self {
        Self {
            date: availability.date,
            is_open: availability.is_open,
            total_slots: availability.total_slots,
            taken_slots: availability.taken_slots,
            available_count: availability.available_slots.len(),
            reason: availability.reason,
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWeeklyRuleRequest {
    pub day_of_week: i32,
    pub start_time: TimeLabel,
    pub end_time: TimeLabel,
    pub slot_duration_minutes: i64,
    pub break_minutes: Option<i64>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWeeklyRuleRequest {
    pub day_of_week: Option<i32>,
    pub start_time: Option<TimeLabel>,
    pub end_time: Option<TimeLabel>,
    pub slot_duration_minutes: Option<i64>,
    pub break_minutes: Option<i64>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertExceptionRequest {
    pub date: NaiveDate,
    pub is_available: bool,
    pub reason: Option<String>,
    pub custom_slots: Option<Vec<SlotRule>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExceptionRequest {
    pub date: Option<NaiveDate>,
    pub is_available: Option<bool>,
    pub reason: Option<String>,
    pub custom_slots: Option<Vec<SlotRule>>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Schedule configuration unavailable: {0}")]
    ConfigurationUnavailable(String),
}

impl From<StoreError> for ScheduleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ScheduleError::NotFound(msg),
            StoreError::Conflict(msg) => ScheduleError::Conflict(msg),
            other => ScheduleError::ConfigurationUnavailable(other.to_string()),
        }
    }
}
