use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};

use shared_models::SLOT_CATALOG;

use crate::models::{
    AvailableSlot, BookedSlot, ScheduleError, ScheduleOverride, WeekDay, WeeklySchedule,
    MAX_AVAILABLE_SLOTS,
};

/// Parses an inclusive ISO-8601 date range, rejecting malformed dates
/// and inverted ranges.
pub fn parse_date_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), ScheduleError> {
    let start_date = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .map_err(|_| ScheduleError::InvalidDateRange(format!("Invalid start date: {}", start)))?;
    let end_date = NaiveDate::parse_from_str(end, "%Y-%m-%d")
        .map_err(|_| ScheduleError::InvalidDateRange(format!("Invalid end date: {}", end)))?;

    if start_date > end_date {
        return Err(ScheduleError::InvalidDateRange(format!(
            "start_date {} is after end_date {}",
            start, end
        )));
    }

    Ok((start_date, end_date))
}

/// Computes the open (date, slot) pairs for one doctor over an
/// inclusive date range.
///
/// Each date is governed by a single effective rule: the override for
/// exactly that date when one exists, otherwise the weekly entry
/// matching the date's weekday. A date with neither contributes no
/// slots. Catalog slots survive a date when they are absent from the
/// rule's off_slots and no non-cancelled appointment occupies them.
/// Slots are emitted in date-then-catalog order and the result is
/// capped at MAX_AVAILABLE_SLOTS entries.
pub fn resolve_available_slots(
    start_date: NaiveDate,
    end_date: NaiveDate,
    weekly: &[WeeklySchedule],
    overrides: &[ScheduleOverride],
    booked: &[BookedSlot],
) -> Vec<AvailableSlot> {
    let weekly_by_day: HashMap<WeekDay, &WeeklySchedule> =
        weekly.iter().map(|entry| (entry.day, entry)).collect();
    let override_by_date: HashMap<NaiveDate, &ScheduleOverride> =
        overrides.iter().map(|o| (o.date, o)).collect();
    let taken: HashSet<(NaiveDate, &str)> = booked
        .iter()
        .map(|b| (b.date, b.time_slot.as_str()))
        .collect();

    let mut available = Vec::new();

    for date in start_date.iter_days().take_while(|d| *d <= end_date) {
        let (is_off, off_slots) = match override_by_date.get(&date) {
            Some(rule) => (rule.is_off, rule.off_slots.as_slice()),
            None => match weekly_by_day.get(&WeekDay::from(date.weekday())) {
                Some(rule) => (rule.is_off, rule.off_slots.as_slice()),
                None => continue,
            },
        };

        if is_off {
            continue;
        }

        for slot in SLOT_CATALOG {
            if off_slots.iter().any(|s| s == slot) {
                continue;
            }
            if taken.contains(&(date, slot)) {
                continue;
            }
            available.push(AvailableSlot {
                date,
                time_slot: slot.to_string(),
            });
            if available.len() == MAX_AVAILABLE_SLOTS {
                return available;
            }
        }
    }

    available
}
