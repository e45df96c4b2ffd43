use serde::{Deserialize, Serialize};

/// Per-employee expected work schedule, one row per employee (upsert
/// semantics). Times of day are stored as `HH:MM` 24-hour strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeSchedule {
    pub employee_id: u64,
    pub start_time: String,
    pub end_time: String,
    pub expected_hours: f64,
}

/// System-wide fallback schedule, carried in configuration rather than as
/// a hidden global so tests can run with alternate defaults.
#[derive(Debug, Clone)]
pub struct ScheduleDefaults {
    pub start_time: String,
    pub end_time: String,
    pub expected_hours: f64,
}
