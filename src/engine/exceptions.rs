use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use strum_macros::Display;

use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;
use crate::utils::time_utils::business_days;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExceptionKind {
    MissingClockOut,
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
}

/// An attendance row that was never closed.
#[derive(Debug, Serialize)]
pub struct IncompleteRecord {
    pub record_id: u64,
    pub employee_id: u64,
    pub date: NaiveDate,
    pub clock_in: NaiveDateTime,
    pub kind: ExceptionKind,
    pub severity: Severity,
}

/// An expected work day (Mon-Fri) with no attendance row at all.
#[derive(Debug, Serialize)]
pub struct MissingDay {
    pub employee_id: u64,
    pub date: NaiveDate,
    pub kind: ExceptionKind,
    pub severity: Severity,
}

#[derive(Debug, Serialize)]
pub struct ExceptionSummary {
    pub incomplete_count: usize,
    pub missing_day_count: usize,
    pub employees_with_issues: usize,
}

#[derive(Debug, Serialize)]
pub struct ExceptionSet {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub incomplete_records: Vec<IncompleteRecord>,
    pub missing_days: Vec<MissingDay>,
    pub summary: ExceptionSummary,
}

/// Scans `[start, end]` inclusive for incomplete records and missing
/// work days across the given employees. The work-day calendar is fixed
/// Mon-Fri; any attendance row on a date, open or closed, keeps that date
/// from being reported missing.
pub fn detect(
    start: NaiveDate,
    end: NaiveDate,
    employees: &[Employee],
    records: &[AttendanceRecord],
) -> ExceptionSet {
    let in_range: Vec<&AttendanceRecord> = records
        .iter()
        .filter(|r| r.date() >= start && r.date() <= end)
        .collect();

    let incomplete_records: Vec<IncompleteRecord> = in_range
        .iter()
        .filter(|r| !r.is_complete())
        .map(|r| IncompleteRecord {
            record_id: r.id,
            employee_id: r.employee_id,
            date: r.date(),
            clock_in: r.clock_in,
            kind: ExceptionKind::MissingClockOut,
            severity: Severity::High,
        })
        .collect();

    let mut covered: HashMap<u64, HashSet<NaiveDate>> = HashMap::new();
    for record in &in_range {
        covered.entry(record.employee_id).or_default().insert(record.date());
    }

    let work_days = business_days(start, end);
    let mut missing_days = Vec::new();
    for employee in employees {
        let own = covered.get(&employee.id);
        for day in &work_days {
            if own.map_or(true, |dates| !dates.contains(day)) {
                missing_days.push(MissingDay {
                    employee_id: employee.id,
                    date: *day,
                    kind: ExceptionKind::Absent,
                    severity: Severity::Medium,
                });
            }
        }
    }

    let mut with_issues: HashSet<u64> = HashSet::new();
    with_issues.extend(incomplete_records.iter().map(|r| r.employee_id));
    with_issues.extend(missing_days.iter().map(|d| d.employee_id));

    let summary = ExceptionSummary {
        incomplete_count: incomplete_records.len(),
        missing_day_count: missing_days.len(),
        employees_with_issues: with_issues.len(),
    };

    ExceptionSet {
        start_date: start,
        end_date: end,
        incomplete_records,
        missing_days,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::EmployeeStatus;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee(id: u64) -> Employee {
        Employee {
            id,
            employee_code: format!("EMP-{:03}", id),
            first_name: "Test".into(),
            last_name: format!("Employee{}", id),
            email: format!("e{}@example.com", id),
            hire_date: date(2024, 1, 1),
            status: EmployeeStatus::Active,
        }
    }

    fn open_record(id: u64, employee_id: u64, clock_in: NaiveDateTime) -> AttendanceRecord {
        AttendanceRecord {
            id,
            employee_id,
            clock_in,
            clock_out: None,
            hours_worked: None,
            notes: None,
        }
    }

    fn closed_record(id: u64, employee_id: u64, clock_in: NaiveDateTime) -> AttendanceRecord {
        AttendanceRecord {
            id,
            employee_id,
            clock_in,
            clock_out: Some(clock_in + chrono::Duration::hours(8)),
            hours_worked: Some(8.0),
            notes: None,
        }
    }

    #[test]
    fn zero_attendance_over_mon_to_sun_yields_five_missing_days() {
        // 2025-12-01 is a Monday, 2025-12-07 a Sunday
        let set = detect(date(2025, 12, 1), date(2025, 12, 7), &[employee(1)], &[]);
        assert_eq!(set.missing_days.len(), 5);
        assert!(set.incomplete_records.is_empty());
        assert_eq!(set.summary.employees_with_issues, 1);
        assert_eq!(set.missing_days[0].date, date(2025, 12, 1));
        assert_eq!(set.missing_days[4].date, date(2025, 12, 5));
        assert!(set.missing_days.iter().all(|d| d.kind == ExceptionKind::Absent));
        assert!(set.missing_days.iter().all(|d| d.severity == Severity::Medium));
    }

    #[test]
    fn pure_weekend_range_has_no_missing_days() {
        let set = detect(date(2025, 12, 6), date(2025, 12, 7), &[employee(1)], &[]);
        assert!(set.missing_days.is_empty());
        assert_eq!(set.summary.employees_with_issues, 0);
    }

    #[test]
    fn open_record_is_incomplete_but_covers_its_day() {
        // A record that exists but lacks clock-out must not also count as
        // a missing day.
        let records = vec![open_record(10, 1, dt(2025, 12, 1, 9, 0))];
        let set = detect(date(2025, 12, 1), date(2025, 12, 1), &[employee(1)], &records);

        assert_eq!(set.incomplete_records.len(), 1);
        assert_eq!(set.incomplete_records[0].kind, ExceptionKind::MissingClockOut);
        assert_eq!(set.incomplete_records[0].severity, Severity::High);
        assert!(set.missing_days.is_empty());
        assert_eq!(set.summary.employees_with_issues, 1);
    }

    #[test]
    fn employees_with_issues_is_distinct_across_both_sets() {
        // Employee 1: incomplete record Monday and absent Tuesday.
        // Employee 2: full week worked.
        let records = vec![
            open_record(10, 1, dt(2025, 12, 1, 9, 0)),
            closed_record(11, 2, dt(2025, 12, 1, 9, 0)),
            closed_record(12, 2, dt(2025, 12, 2, 9, 0)),
        ];
        let set = detect(
            date(2025, 12, 1),
            date(2025, 12, 2),
            &[employee(1), employee(2)],
            &records,
        );

        assert_eq!(set.incomplete_records.len(), 1);
        assert_eq!(set.missing_days.len(), 1);
        assert_eq!(set.missing_days[0].employee_id, 1);
        assert_eq!(set.summary.employees_with_issues, 1);
    }

    #[test]
    fn records_outside_range_are_ignored() {
        let records = vec![open_record(10, 1, dt(2025, 11, 28, 9, 0))];
        let set = detect(date(2025, 12, 1), date(2025, 12, 1), &[employee(1)], &records);
        assert!(set.incomplete_records.is_empty());
        assert_eq!(set.missing_days.len(), 1);
    }
}
