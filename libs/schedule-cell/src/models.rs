use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::AppError;

/// Maximum number of open slots reported by one availability query.
pub const MAX_AVAILABLE_SLOTS: usize = 10;

/// Canonical weekday identifiers, stored and matched in uppercase.
/// Derived from the date's day-of-week ordinal, never from locale
/// formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl WeekDay {
    /// Position within the week, Monday first. Keeps weekly schedules
    /// sorted regardless of storage order.
    pub fn ordinal(&self) -> u8 {
        match self {
            WeekDay::Monday => 0,
            WeekDay::Tuesday => 1,
            WeekDay::Wednesday => 2,
            WeekDay::Thursday => 3,
            WeekDay::Friday => 4,
            WeekDay::Saturday => 5,
            WeekDay::Sunday => 6,
        }
    }
}

impl From<chrono::Weekday> for WeekDay {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => WeekDay::Monday,
            chrono::Weekday::Tue => WeekDay::Tuesday,
            chrono::Weekday::Wed => WeekDay::Wednesday,
            chrono::Weekday::Thu => WeekDay::Thursday,
            chrono::Weekday::Fri => WeekDay::Friday,
            chrono::Weekday::Sat => WeekDay::Saturday,
            chrono::Weekday::Sun => WeekDay::Sunday,
        }
    }
}

impl std::fmt::Display for WeekDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WeekDay::Monday => "MONDAY",
            WeekDay::Tuesday => "TUESDAY",
            WeekDay::Wednesday => "WEDNESDAY",
            WeekDay::Thursday => "THURSDAY",
            WeekDay::Friday => "FRIDAY",
            WeekDay::Saturday => "SATURDAY",
            WeekDay::Sunday => "SUNDAY",
        };
        write!(f, "{}", name)
    }
}

/// Recurring rule for one weekday. At most one row per (doctor, day).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day: WeekDay,
    pub is_off: bool,
    #[serde(default)]
    pub off_slots: Vec<String>,
}

/// Exception for one calendar date. When present it replaces the
/// weekly rule for that date entirely, it is never merged with it.
/// The start/end times are informational for clients; availability
/// is always computed against the fixed slot catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOverride {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub is_off: bool,
    #[serde(default)]
    pub off_slots: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeeklyScheduleEntry {
    pub day: WeekDay,
    pub is_off: bool,
    #[serde(default)]
    pub off_slots: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetWeeklyScheduleRequest {
    pub schedule: Vec<WeeklyScheduleEntry>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertOverrideRequest {
    pub date: String,
    pub is_off: bool,
    #[serde(default)]
    pub off_slots: Vec<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub start_date: String,
    pub end_date: String,
}

/// One bookable opening produced by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub date: NaiveDate,
    pub time_slot: String,
}

/// The appointment fields the resolver needs to mark a slot taken.
#[derive(Debug, Clone, Deserialize)]
pub struct BookedSlot {
    pub date: NaiveDate,
    pub time_slot: String,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub schedules: Vec<WeeklySchedule>,
    pub available_slots: Vec<AvailableSlot>,
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Invalid schedule data: {0}")]
    Validation(String),

    #[error("Unknown time slot: {0}")]
    UnknownSlot(String),

    #[error("Schedule override not found")]
    OverrideNotFound,

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::InvalidDateRange(msg) => AppError::InvalidInput(msg),
            ScheduleError::Validation(msg) => AppError::InvalidInput(msg),
            ScheduleError::UnknownSlot(slot) => {
                AppError::InvalidInput(format!("Unknown time slot: {}", slot))
            }
            ScheduleError::OverrideNotFound => {
                AppError::NotFound("Schedule override not found".to_string())
            }
            ScheduleError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}
