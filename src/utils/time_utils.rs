use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::AppError;

/// Current wall-clock instant in the configured deployment timezone,
/// stripped of its offset. Everything downstream works in local naive time.
pub fn local_now(tz: Tz) -> NaiveDateTime {
    Utc::now().with_timezone(&tz).naive_local()
}

/// Rounds to the 2-decimal precision used for every hour quantity.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parses a `HH:MM` 24-hour time-of-day string.
pub fn parse_hhmm(raw: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| AppError::InvalidTime(format!("expected HH:MM, got '{}'", raw)))
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Monday through Friday counts as a work day.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Every calendar date in `[start, end]`, inclusive on both ends.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        dates.push(cursor);
        cursor += Duration::days(1);
    }
    dates
}

/// Business days (Mon-Fri) in `[start, end]` inclusive.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    date_range(start, end)
        .into_iter()
        .filter(|d| is_business_day(*d))
        .collect()
}
