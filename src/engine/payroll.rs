use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::engine::schedule::EffectiveSchedule;
use crate::engine::status;
use crate::error::AppError;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;
use crate::utils::time_utils::{business_days, is_business_day, round2};

/// One calendar day inside a payroll window.
#[derive(Debug, Serialize)]
pub struct PayrollDay {
    pub date: NaiveDate,
    pub hours: f64,
    pub record_count: usize,
    pub late: bool,
    pub overtime_hours: f64,
}

/// Payroll for a single employee over a date range. `total_hours` is
/// gross worked time; break deduction is tracked elsewhere and not yet
/// applied here.
#[derive(Debug, Serialize)]
pub struct PayrollSummary {
    pub employee_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hourly_rate: f64,
    pub total_hours: f64,
    pub payroll_amount: f64,
    pub daily_breakdown: Vec<PayrollDay>,
}

#[derive(Debug, Serialize)]
pub struct EmployeePayroll {
    pub employee_id: u64,
    pub employee_name: String,
    pub total_hours: f64,
    pub payroll_amount: f64,
    pub days_worked: usize,
    pub expected_work_days: usize,
    pub missing_days: usize,
    pub attendance_rate_pct: i64,
}

#[derive(Debug, Serialize)]
pub struct PayrollReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hourly_rate: f64,
    pub employees: Vec<EmployeePayroll>,
    pub total_hours: f64,
    pub total_payroll: f64,
}

fn validate_rate(hourly_rate: f64) -> Result<(), AppError> {
    if !hourly_rate.is_finite() || hourly_rate < 0.0 {
        return Err(AppError::Validation(format!(
            "hourly rate must be a non-negative number, got {}",
            hourly_rate
        )));
    }
    Ok(())
}

/// Computes payroll for one employee: per-record classification feeds a
/// per-day breakdown, and the amount is `round2(total_hours × rate)`.
pub fn summarize_one(
    employee_id: u64,
    start: NaiveDate,
    end: NaiveDate,
    hourly_rate: f64,
    records: &[AttendanceRecord],
    schedule: &EffectiveSchedule,
) -> Result<PayrollSummary, AppError> {
    validate_rate(hourly_rate)?;

    let mut by_date: BTreeMap<NaiveDate, Vec<&AttendanceRecord>> = BTreeMap::new();
    for record in records {
        if record.date() >= start && record.date() <= end {
            by_date.entry(record.date()).or_default().push(record);
        }
    }

    let mut daily_breakdown = Vec::with_capacity(by_date.len());
    for (date, rows) in &by_date {
        let mut hours = 0.0;
        let mut late = false;
        let mut overtime_hours = 0.0;
        for row in rows {
            let st = status::classify_record(row, schedule)?;
            hours = round2(hours + st.hours_worked);
            late = late || st.is_late;
            overtime_hours = round2(overtime_hours + st.overtime_hours);
        }
        daily_breakdown.push(PayrollDay {
            date: *date,
            hours,
            record_count: rows.len(),
            late,
            overtime_hours,
        });
    }

    let total_hours = daily_breakdown.iter().fold(0.0, |acc, d| round2(acc + d.hours));
    Ok(PayrollSummary {
        employee_id,
        start_date: start,
        end_date: end,
        hourly_rate,
        total_hours,
        payroll_amount: round2(total_hours * hourly_rate),
        daily_breakdown,
    })
}

/// Payroll across every listed employee, folding in the Mon-Fri expected
/// work-day calendar: missing days and the attendance rate are computed
/// per employee, and the report carries grand totals.
pub fn summarize_all(
    start: NaiveDate,
    end: NaiveDate,
    hourly_rate: f64,
    employees: &[Employee],
    records: &[AttendanceRecord],
    schedules: &HashMap<u64, EffectiveSchedule>,
) -> Result<PayrollReport, AppError> {
    validate_rate(hourly_rate)?;

    let expected_work_days = business_days(start, end).len();
    let mut rows = Vec::with_capacity(employees.len());
    let mut total_hours = 0.0;
    let mut total_payroll = 0.0;

    for employee in employees {
        let own: Vec<AttendanceRecord> = records
            .iter()
            .filter(|r| r.employee_id == employee.id)
            .cloned()
            .collect();
        let schedule = schedules.get(&employee.id).copied().ok_or_else(|| {
            AppError::NotFound(format!("schedule for employee {}", employee.id))
        })?;
        let summary = summarize_one(employee.id, start, end, hourly_rate, &own, &schedule)?;

        let worked_dates: HashSet<NaiveDate> =
            summary.daily_breakdown.iter().map(|d| d.date).collect();
        let worked_business_days =
            worked_dates.iter().filter(|d| is_business_day(**d)).count();
        let missing_days = expected_work_days - worked_business_days.min(expected_work_days);
        let attendance_rate_pct = if expected_work_days > 0 {
            (worked_business_days as f64 / expected_work_days as f64 * 100.0).round() as i64
        } else {
            0
        };

        total_hours = round2(total_hours + summary.total_hours);
        total_payroll = round2(total_payroll + summary.payroll_amount);
        rows.push(EmployeePayroll {
            employee_id: employee.id,
            employee_name: employee.full_name(),
            total_hours: summary.total_hours,
            payroll_amount: summary.payroll_amount,
            days_worked: worked_dates.len(),
            expected_work_days,
            missing_days,
            attendance_rate_pct,
        });
    }

    Ok(PayrollReport {
        start_date: start,
        end_date: end,
        hourly_rate,
        employees: rows,
        total_hours,
        total_payroll,
    })
}
