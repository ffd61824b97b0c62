//! Date utilities for daily reset hour handling.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Timelike};

/// Study day for the instant `now`.
///
/// If the hour of `now` is before the reset hour, the study day is still
/// "yesterday". This lets late-night sessions count towards the previous day.
///
/// # Arguments
/// * `now` - Current time in the user's zone
/// * `daily_reset_hour` - Hour of day (0-23) when a new study day begins
pub fn adjusted_day<Tz: TimeZone>(now: &DateTime<Tz>, daily_reset_hour: u32) -> NaiveDate {
    if now.hour() < daily_reset_hour {
        (now.clone() - Duration::days(1)).date_naive()
    } else {
        now.date_naive()
    }
}
