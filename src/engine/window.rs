use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::engine::schedule::EffectiveSchedule;
use crate::error::AppError;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;
use crate::utils::time_utils::round2;

/// One calendar day's slice of an attendance window.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub hours: f64,
    pub record_count: usize,
}

/// Single-day aggregate with completion counts and the raw rows.
#[derive(Debug, Serialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub total_hours: f64,
    pub total_records: usize,
    pub completed_count: usize,
    pub incomplete_count: usize,
    pub records: Vec<AttendanceRecord>,
}

/// Multi-day aggregate over an inclusive date range.
#[derive(Debug, Serialize)]
pub struct RangeAggregate {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_hours: f64,
    pub days_worked: usize,
    pub avg_hours_per_day: f64,
    pub daily_breakdown: Vec<DaySummary>,
}

#[derive(Debug, Serialize)]
pub struct WeekSummary {
    pub week: String,
    pub total_hours: f64,
    pub days_worked: usize,
}

#[derive(Debug, Serialize)]
pub struct MonthlyAggregate {
    pub year: i32,
    pub month: u32,
    pub total_hours: f64,
    pub days_worked: usize,
    pub avg_hours_per_day: f64,
    pub weekly_summary: Vec<WeekSummary>,
    pub daily_breakdown: Vec<DaySummary>,
}

/// Per-employee row of the all-employees summary.
#[derive(Debug, Serialize)]
pub struct EmployeeRangeSummary {
    pub employee_id: u64,
    pub employee_name: String,
    pub total_hours: f64,
    pub days_worked: usize,
    pub avg_hours_per_day: f64,
    pub expected_total_hours: f64,
    pub variance: f64,
    pub compliance_pct: i64,
}

/// Sums hour quantities with 2-decimal rounding applied at each step, the
/// same way the running totals are built everywhere else. Null hours
/// (open records) count as zero.
fn sum_rounded<I: IntoIterator<Item = f64>>(hours: I) -> f64 {
    hours.into_iter().fold(0.0, |acc, h| round2(acc + h))
}

fn group_by_date(records: &[AttendanceRecord]) -> BTreeMap<NaiveDate, Vec<&AttendanceRecord>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&AttendanceRecord>> = BTreeMap::new();
    for record in records {
        by_date.entry(record.date()).or_default().push(record);
    }
    by_date
}

fn day_summaries(by_date: &BTreeMap<NaiveDate, Vec<&AttendanceRecord>>) -> Vec<DaySummary> {
    by_date
        .iter()
        .map(|(date, rows)| DaySummary {
            date: *date,
            hours: sum_rounded(rows.iter().map(|r| r.hours_worked.unwrap_or(0.0))),
            record_count: rows.len(),
        })
        .collect()
}

/// Aggregates one calendar date. Records outside `date` are ignored so the
/// caller may pass a wider slice.
pub fn aggregate_daily(date: NaiveDate, records: &[AttendanceRecord]) -> DailyAggregate {
    let rows: Vec<AttendanceRecord> = records
        .iter()
        .filter(|r| r.date() == date)
        .cloned()
        .collect();

    let completed_count = rows.iter().filter(|r| r.is_complete()).count();
    DailyAggregate {
        date,
        total_hours: sum_rounded(rows.iter().map(|r| r.hours_worked.unwrap_or(0.0))),
        total_records: rows.len(),
        completed_count,
        incomplete_count: rows.len() - completed_count,
        records: rows,
    }
}

/// Aggregates `[start, end]` inclusive, grouping by calendar date.
/// `days_worked` counts distinct dates with at least one record; the
/// average is guarded against an empty range.
pub fn aggregate_range(
    start: NaiveDate,
    end: NaiveDate,
    records: &[AttendanceRecord],
) -> RangeAggregate {
    let in_range: Vec<AttendanceRecord> = records
        .iter()
        .filter(|r| r.date() >= start && r.date() <= end)
        .cloned()
        .collect();
    let by_date = group_by_date(&in_range);
    let daily_breakdown = day_summaries(&by_date);

    let total_hours = sum_rounded(daily_breakdown.iter().map(|d| d.hours));
    let days_worked = daily_breakdown.len();
    let avg_hours_per_day = if days_worked > 0 {
        round2(total_hours / days_worked as f64)
    } else {
        0.0
    };

    RangeAggregate {
        start_date: start,
        end_date: end,
        total_hours,
        days_worked,
        avg_hours_per_day,
        daily_breakdown,
    }
}

/// Weekly window: `end` defaults to `start + 6` days, inclusive.
pub fn aggregate_weekly(
    start: NaiveDate,
    end: Option<NaiveDate>,
    records: &[AttendanceRecord],
) -> RangeAggregate {
    let end = end.unwrap_or(start + Duration::days(6));
    aggregate_range(start, end, records)
}

/// Monthly window: first calendar day of the month up to (exclusive) the
/// first day of the next month. The weekly summary buckets days by
/// `ceil(day_of_month / 7)` into "Week N" groups; this is calendar-day
/// bucketing, not ISO weeks.
pub fn aggregate_monthly(
    year: i32,
    month: u32,
    records: &[AttendanceRecord],
) -> Result<MonthlyAggregate, AppError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Validation(format!("invalid month {}-{}", year, month)))?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::Validation(format!("invalid month {}-{}", year, month)))?;

    let in_month: Vec<AttendanceRecord> = records
        .iter()
        .filter(|r| r.date() >= first && r.date() < next_first)
        .cloned()
        .collect();
    let by_date = group_by_date(&in_month);
    let daily_breakdown = day_summaries(&by_date);

    let mut weeks: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for day in &daily_breakdown {
        let bucket = (day.date.day() - 1) / 7 + 1;
        let entry = weeks.entry(bucket).or_insert((0.0, 0));
        entry.0 = round2(entry.0 + day.hours);
        entry.1 += 1;
    }
    let weekly_summary = weeks
        .into_iter()
        .map(|(n, (total_hours, days_worked))| WeekSummary {
            week: format!("Week {}", n),
            total_hours,
            days_worked,
        })
        .collect();

    let total_hours = sum_rounded(daily_breakdown.iter().map(|d| d.hours));
    let days_worked = daily_breakdown.len();
    let avg_hours_per_day = if days_worked > 0 {
        round2(total_hours / days_worked as f64)
    } else {
        0.0
    };

    Ok(MonthlyAggregate {
        year,
        month,
        total_hours,
        days_worked,
        avg_hours_per_day,
        weekly_summary,
        daily_breakdown,
    })
}

/// Left-joins every listed employee against the attendance rows in range:
/// an employee with zero records still gets a row with zero totals.
/// Variance and compliance are computed against the employee's effective
/// schedule, guarded when the expected total is zero.
pub fn summarize_all(
    start: NaiveDate,
    end: NaiveDate,
    employees: &[Employee],
    records: &[AttendanceRecord],
    schedules: &HashMap<u64, EffectiveSchedule>,
) -> Vec<EmployeeRangeSummary> {
    let mut by_employee: HashMap<u64, Vec<AttendanceRecord>> = HashMap::new();
    for record in records {
        if record.date() >= start && record.date() <= end {
            by_employee
                .entry(record.employee_id)
                .or_default()
                .push(record.clone());
        }
    }

    employees
        .iter()
        .map(|employee| {
            let own = by_employee.remove(&employee.id).unwrap_or_default();
            let aggregate = aggregate_range(start, end, &own);
            let expected_per_day = schedules
                .get(&employee.id)
                .map(|s| s.expected_hours)
                .unwrap_or(0.0);
            let expected_total_hours = round2(expected_per_day * aggregate.days_worked as f64);
            let variance = round2(aggregate.total_hours - expected_total_hours);
            let compliance_pct = if expected_total_hours > 0.0 {
                (aggregate.total_hours / expected_total_hours * 100.0).round() as i64
            } else {
                0
            };

            EmployeeRangeSummary {
                employee_id: employee.id,
                employee_name: employee.full_name(),
                total_hours: aggregate.total_hours,
                days_worked: aggregate.days_worked,
                avg_hours_per_day: aggregate.avg_hours_per_day,
                expected_total_hours,
                variance,
                compliance_pct,
            }
        })
        .collect()
}
