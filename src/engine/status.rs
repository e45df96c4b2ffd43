use chrono::NaiveDateTime;
use serde::Serialize;

use crate::engine::schedule::EffectiveSchedule;
use crate::error::AppError;
use crate::model::attendance::AttendanceRecord;
use crate::utils::time_utils::{format_hhmm, round2};

/// Per-record classification: lateness against the expected start, and
/// undertime/overtime against the expected daily hours. At most one of
/// undertime/overtime holds; exact equality means neither. Lateness is
/// judged independently of the hours comparison.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusResult {
    pub clock_in_time_of_day: String,
    pub hours_worked: f64,
    pub is_late: bool,
    pub late_minutes: i64,
    pub is_undertime: bool,
    pub undertime_hours: f64,
    pub is_overtime: bool,
    pub overtime_hours: f64,
}

/// A stored row together with its derived status.
#[derive(Debug, Serialize)]
pub struct AnnotatedRecord {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub status: StatusResult,
}

/// Classifies one attendance record against the effective schedule.
///
/// Lateness is strict: a clock-in exactly on the expected start is not
/// late. An open record (no clock-out) carries only the lateness verdict;
/// its hours flags stay false/zero. A clock-out earlier than the clock-in
/// is rejected instead of producing a negative duration.
pub fn classify(
    clock_in: NaiveDateTime,
    clock_out: Option<NaiveDateTime>,
    schedule: &EffectiveSchedule,
) -> Result<StatusResult, AppError> {
    let expected_start = clock_in.date().and_time(schedule.start);
    let is_late = clock_in > expected_start;
    let late_minutes = if is_late {
        ((clock_in - expected_start).num_seconds() as f64 / 60.0).round() as i64
    } else {
        0
    };

    let mut status = StatusResult {
        clock_in_time_of_day: format_hhmm(clock_in.time()),
        hours_worked: 0.0,
        is_late,
        late_minutes,
        is_undertime: false,
        undertime_hours: 0.0,
        is_overtime: false,
        overtime_hours: 0.0,
    };

    let Some(clock_out) = clock_out else {
        return Ok(status);
    };

    if clock_out < clock_in {
        return Err(AppError::Computation(format!(
            "clock-out {} precedes clock-in {}",
            clock_out, clock_in
        )));
    }

    let hours = round2((clock_out - clock_in).num_seconds() as f64 / 3600.0);
    status.hours_worked = hours;
    if hours < schedule.expected_hours {
        status.is_undertime = true;
        status.undertime_hours = round2(schedule.expected_hours - hours);
    } else if hours > schedule.expected_hours {
        status.is_overtime = true;
        status.overtime_hours = round2(hours - schedule.expected_hours);
    }

    Ok(status)
}

/// Classifier applied to a stored row.
pub fn classify_record(
    record: &AttendanceRecord,
    schedule: &EffectiveSchedule,
) -> Result<StatusResult, AppError> {
    classify(record.clock_in, record.clock_out, schedule)
}

pub fn annotate(
    record: &AttendanceRecord,
    schedule: &EffectiveSchedule,
) -> Result<AnnotatedRecord, AppError> {
    let status = classify_record(record, schedule)?;
    Ok(AnnotatedRecord {
        record: record.clone(),
        status,
    })
}
