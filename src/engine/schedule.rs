use chrono::NaiveTime;

use crate::error::AppError;
use crate::model::schedule::{EmployeeSchedule, ScheduleDefaults};
use crate::utils::time_utils::parse_hhmm;

/// Parsed schedule the rest of the engine computes against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveSchedule {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub expected_hours: f64,
}

/// Resolves the schedule in effect for an employee.
///
/// A missing stored row is the normal state for a newly registered
/// employee and falls back to the configured defaults. A malformed stored
/// time string is an error rather than a silent fallback.
pub fn resolve(
    stored: Option<&EmployeeSchedule>,
    defaults: &ScheduleDefaults,
) -> Result<EffectiveSchedule, AppError> {
    let (start_raw, end_raw, expected_hours) = match stored {
        Some(s) => (s.start_time.as_str(), s.end_time.as_str(), s.expected_hours),
        None => (
            defaults.start_time.as_str(),
            defaults.end_time.as_str(),
            defaults.expected_hours,
        ),
    };

    Ok(EffectiveSchedule {
        start: parse_hhmm(start_raw)?,
        end: parse_hhmm(end_raw)?,
        expected_hours,
    })
}
