use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::engine::schedule::EffectiveSchedule;
use crate::model::attendance::AttendanceRecord;
use crate::utils::time_utils::{format_hhmm, round2};

/// Actual-vs-expected comparison for one calendar day. `on_time` counts a
/// clock-in at or before the expected start, which is intentionally looser
/// than the classifier's strict-after lateness rule.
#[derive(Debug, Serialize)]
pub struct DayComparison {
    pub date: NaiveDate,
    pub actual_start: String,
    pub actual_end: String,
    pub expected_start: String,
    pub hours_worked: f64,
    pub expected_hours: f64,
    pub start_variance_minutes: i64,
    pub hours_variance: f64,
    pub on_time: bool,
    pub meets_expected_hours: bool,
    pub compliant: bool,
}

#[derive(Debug, Serialize)]
pub struct ComplianceSummary {
    pub total_days: usize,
    pub on_time_days: usize,
    pub on_time_pct: i64,
    pub hours_met_days: usize,
    pub hours_met_pct: i64,
    pub compliant_days: usize,
    pub compliance_pct: i64,
    pub avg_start_variance_minutes: f64,
    pub avg_hours_variance: f64,
}

#[derive(Debug, Serialize)]
pub struct ComplianceReport {
    pub employee_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<DayComparison>,
    pub summary: ComplianceSummary,
}

fn pct(part: usize, whole: usize) -> i64 {
    if whole == 0 {
        0
    } else {
        (part as f64 / whole as f64 * 100.0).round() as i64
    }
}

/// Compares actual attendance against the expected schedule per day over
/// `[start, end]` inclusive. Only completed records participate. When a
/// day holds several records, its actual start is the earliest clock-in,
/// its end the latest clock-out, and its hours the day's running total.
/// Averages are taken over signed variances, not magnitudes.
pub fn compare(
    employee_id: u64,
    start: NaiveDate,
    end: NaiveDate,
    records: &[AttendanceRecord],
    schedule: &EffectiveSchedule,
) -> ComplianceReport {
    let mut by_date: BTreeMap<NaiveDate, Vec<&AttendanceRecord>> = BTreeMap::new();
    for record in records {
        if record.is_complete() && record.date() >= start && record.date() <= end {
            by_date.entry(record.date()).or_default().push(record);
        }
    }

    let days: Vec<DayComparison> = by_date
        .iter()
        .map(|(date, rows)| {
            let first_in: NaiveDateTime =
                rows.iter().map(|r| r.clock_in).min().expect("non-empty day group");
            let last_out: NaiveDateTime = rows
                .iter()
                .filter_map(|r| r.clock_out)
                .max()
                .expect("completed records have clock-out");
            let hours_worked =
                rows.iter().fold(0.0, |acc, r| round2(acc + r.hours_worked.unwrap_or(0.0)));

            let expected_start = date.and_time(schedule.start);
            let start_variance_minutes =
                ((first_in - expected_start).num_seconds() as f64 / 60.0).round() as i64;
            let hours_variance = round2(hours_worked - schedule.expected_hours);
            let on_time = start_variance_minutes <= 0;
            let meets_expected_hours = hours_worked >= schedule.expected_hours;

            DayComparison {
                date: *date,
                actual_start: format_hhmm(first_in.time()),
                actual_end: format_hhmm(last_out.time()),
                expected_start: format_hhmm(schedule.start),
                hours_worked,
                expected_hours: schedule.expected_hours,
                start_variance_minutes,
                hours_variance,
                on_time,
                meets_expected_hours,
                compliant: on_time && meets_expected_hours,
            }
        })
        .collect();

    let total_days = days.len();
    let on_time_days = days.iter().filter(|d| d.on_time).count();
    let hours_met_days = days.iter().filter(|d| d.meets_expected_hours).count();
    let compliant_days = days.iter().filter(|d| d.compliant).count();
    let (avg_start_variance_minutes, avg_hours_variance) = if total_days > 0 {
        (
            round2(
                days.iter().map(|d| d.start_variance_minutes as f64).sum::<f64>()
                    / total_days as f64,
            ),
            round2(days.iter().map(|d| d.hours_variance).sum::<f64>() / total_days as f64),
        )
    } else {
        (0.0, 0.0)
    };

    ComplianceReport {
        employee_id,
        start_date: start,
        end_date: end,
        days,
        summary: ComplianceSummary {
            total_days,
            on_time_days,
            on_time_pct: pct(on_time_days, total_days),
            hours_met_days,
            hours_met_pct: pct(hours_met_days, total_days),
            compliant_days,
            compliance_pct: pct(compliant_days, total_days),
            avg_start_variance_minutes,
            avg_hours_variance,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn completed(id: u64, clock_in: NaiveDateTime, clock_out: NaiveDateTime, hours: f64) -> AttendanceRecord {
        AttendanceRecord {
            id,
            employee_id: 1,
            clock_in,
            clock_out: Some(clock_out),
            hours_worked: Some(hours),
            notes: None,
        }
    }

    fn schedule() -> EffectiveSchedule {
        EffectiveSchedule {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            expected_hours: 8.0,
        }
    }

    #[test]
    fn on_time_accepts_exactly_at_start() {
        // At-or-before the expected start is on time here, unlike the
        // classifier's strict-after lateness rule.
        let records = vec![completed(1, dt(2025, 12, 1, 9, 0), dt(2025, 12, 1, 17, 0), 8.0)];
        let report = compare(1, date(2025, 12, 1), date(2025, 12, 5), &records, &schedule());

        let day = &report.days[0];
        assert_eq!(day.start_variance_minutes, 0);
        assert!(day.on_time);
        assert!(day.meets_expected_hours);
        assert!(day.compliant);
    }

    #[test]
    fn early_start_has_negative_variance() {
        let records = vec![completed(1, dt(2025, 12, 1, 8, 45), dt(2025, 12, 1, 16, 45), 8.0)];
        let report = compare(1, date(2025, 12, 1), date(2025, 12, 5), &records, &schedule());
        assert_eq!(report.days[0].start_variance_minutes, -15);
        assert!(report.days[0].on_time);
    }

    #[test]
    fn late_short_day_fails_both_checks() {
        let records = vec![completed(1, dt(2025, 12, 1, 9, 30), dt(2025, 12, 1, 16, 30), 7.0)];
        let report = compare(1, date(2025, 12, 1), date(2025, 12, 5), &records, &schedule());

        let day = &report.days[0];
        assert_eq!(day.start_variance_minutes, 30);
        assert!(!day.on_time);
        assert_eq!(day.hours_variance, -1.0);
        assert!(!day.meets_expected_hours);
        assert!(!day.compliant);
    }

    #[test]
    fn incomplete_records_are_ignored() {
        let mut open = completed(1, dt(2025, 12, 1, 9, 0), dt(2025, 12, 1, 17, 0), 8.0);
        open.clock_out = None;
        open.hours_worked = None;
        let report = compare(1, date(2025, 12, 1), date(2025, 12, 5), &[open], &schedule());
        assert!(report.days.is_empty());
        assert_eq!(report.summary.total_days, 0);
        assert_eq!(report.summary.on_time_pct, 0);
        assert_eq!(report.summary.avg_start_variance_minutes, 0.0);
    }

    #[test]
    fn summary_averages_signed_variances() {
        let records = vec![
            // -15 minutes early, +1h over
            completed(1, dt(2025, 12, 1, 8, 45), dt(2025, 12, 1, 17, 45), 9.0),
            // +45 minutes late, -1h under
            completed(2, dt(2025, 12, 2, 9, 45), dt(2025, 12, 2, 16, 45), 7.0),
        ];
        let report = compare(1, date(2025, 12, 1), date(2025, 12, 5), &records, &schedule());

        assert_eq!(report.summary.total_days, 2);
        assert_eq!(report.summary.on_time_days, 1);
        assert_eq!(report.summary.on_time_pct, 50);
        assert_eq!(report.summary.hours_met_days, 1);
        assert_eq!(report.summary.compliant_days, 1);
        // Signed average: (-15 + 45) / 2, not (15 + 45) / 2
        assert_eq!(report.summary.avg_start_variance_minutes, 15.0);
        assert_eq!(report.summary.avg_hours_variance, 0.0);
    }

    #[test]
    fn multiple_records_one_day_merge_into_one_comparison() {
        let records = vec![
            completed(1, dt(2025, 12, 1, 9, 0), dt(2025, 12, 1, 13, 0), 4.0),
            completed(2, dt(2025, 12, 1, 14, 0), dt(2025, 12, 1, 18, 30), 4.5),
        ];
        let report = compare(1, date(2025, 12, 1), date(2025, 12, 5), &records, &schedule());

        assert_eq!(report.days.len(), 1);
        let day = &report.days[0];
        assert_eq!(day.actual_start, "09:00");
        assert_eq!(day.actual_end, "18:30");
        assert_eq!(day.hours_worked, 8.5);
        assert!(day.meets_expected_hours);
    }
}
