// lib/src/scheduling.rs

//! Calendar helpers for offering appointment times.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use crate::config::SchedulingSettings;

const MINUTES_PER_HOUR: u32 = 60;

/// Slot start times from `start_hour` (inclusive) to `end_hour` (exclusive),
/// stepping by `interval_minutes`. An `end_hour` of 24 means midnight.
pub fn generate_time_slots(start_hour: u32, end_hour: u32, interval_minutes: u32) -> Vec<NaiveTime> {
    if interval_minutes == 0 || end_hour <= start_hour {
        return Vec::new();
    }
    let end = end_hour.min(24) * MINUTES_PER_HOUR;
    (start_hour * MINUTES_PER_HOUR..end)
        .step_by(interval_minutes as usize)
        .filter_map(|minute| NaiveTime::from_hms_opt(minute / MINUTES_PER_HOUR, minute % MINUTES_PER_HOUR, 0))
        .collect()
}

/// The slot grid of one working day.
pub fn working_day_slots(settings: &SchedulingSettings) -> Vec<NaiveTime> {
    generate_time_slots(settings.working_hours_start, settings.working_hours_end, settings.appointment_duration)
}

/// `days` consecutive dates beginning with `from`.
pub fn next_available_dates(from: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days).filter_map(|offset| from.checked_add_signed(Duration::days(offset.into()))).collect()
}

/// Age in whole years on `today`.
pub fn calculate_age(date_of_birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

/// e.g. `Wednesday, January 10, 2024`.
pub fn format_date_for_display(date: NaiveDate) -> String {
    date.format("%A, %B %d, %Y").to_string()
}
