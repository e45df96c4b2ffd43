use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Free-text notes are trimmed and capped at this many characters.
pub const NOTES_MAX_LEN: usize = 500;

/// One clock-in/clock-out pair for an employee. `clock_out` stays `None`
/// while the record is open; `hours_worked` is filled in at clock-out time
/// (or on manual correction) as elapsed wall-clock hours, 2-decimal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    pub clock_in: NaiveDateTime,
    pub clock_out: Option<NaiveDateTime>,
    pub hours_worked: Option<f64>,
    pub notes: Option<String>,
}

impl AttendanceRecord {
    pub fn is_complete(&self) -> bool {
        self.clock_out.is_some()
    }

    /// Calendar day the record belongs to, taken from the clock-in instant.
    pub fn date(&self) -> NaiveDate {
        self.clock_in.date()
    }
}

/// Trims notes and drops empty strings; anything past the cap is cut off.
pub fn normalize_notes(raw: Option<String>) -> Option<String> {
    raw.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.chars().take(NOTES_MAX_LEN).collect())
        }
    })
}
