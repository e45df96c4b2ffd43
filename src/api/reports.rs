use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::Config;
use crate::engine::schedule::{self, EffectiveSchedule};
use crate::engine::{compliance, exceptions, payroll, window};
use crate::error::AppError;
use crate::model::employee::Employee;
use crate::store::MemoryStore;

#[derive(Deserialize)]
pub struct DailyQuery {
    pub employee_id: u64,
    pub date: NaiveDate,
}

#[derive(Deserialize)]
pub struct WeeklyQuery {
    pub employee_id: u64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct MonthlyQuery {
    pub employee_id: u64,
    pub year: i32,
    pub month: u32,
}

#[derive(Deserialize)]
pub struct RangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Deserialize)]
pub struct ComplianceQuery {
    pub employee_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Deserialize)]
pub struct ExceptionsQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub employee_id: Option<u64>,
}

#[derive(Deserialize)]
pub struct PayrollQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hourly_rate: f64,
    pub employee_id: Option<u64>,
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::Validation("start_date must not be after end_date".into()));
    }
    Ok(())
}

fn effective_for(
    store: &MemoryStore,
    config: &Config,
    employee_id: u64,
) -> Result<EffectiveSchedule, AppError> {
    let stored = store.get_schedule(employee_id);
    schedule::resolve(stored.as_ref(), &config.default_schedule)
}

fn effective_map(
    store: &MemoryStore,
    config: &Config,
    employees: &[Employee],
) -> Result<HashMap<u64, EffectiveSchedule>, AppError> {
    let mut map = HashMap::with_capacity(employees.len());
    for employee in employees {
        map.insert(employee.id, effective_for(store, config, employee.id)?);
    }
    Ok(map)
}

pub async fn daily(
    store: web::Data<MemoryStore>,
    query: web::Query<DailyQuery>,
) -> Result<HttpResponse, AppError> {
    store.get_employee(query.employee_id)?;
    let records = store.list_attendance(Some(query.employee_id), Some((query.date, query.date)));
    Ok(HttpResponse::Ok().json(window::aggregate_daily(query.date, &records)))
}

pub async fn weekly(
    store: web::Data<MemoryStore>,
    query: web::Query<WeeklyQuery>,
) -> Result<HttpResponse, AppError> {
    store.get_employee(query.employee_id)?;
    if let Some(end) = query.end_date {
        check_range(query.start_date, end)?;
    }
    let records = store.list_attendance(Some(query.employee_id), None);
    Ok(HttpResponse::Ok().json(window::aggregate_weekly(
        query.start_date,
        query.end_date,
        &records,
    )))
}

pub async fn monthly(
    store: web::Data<MemoryStore>,
    query: web::Query<MonthlyQuery>,
) -> Result<HttpResponse, AppError> {
    store.get_employee(query.employee_id)?;
    let records = store.list_attendance(Some(query.employee_id), None);
    let report = window::aggregate_monthly(query.year, query.month, &records)?;
    Ok(HttpResponse::Ok().json(report))
}

/// All-employees summary: every active employee appears, even with zero
/// records in range.
pub async fn summary(
    store: web::Data<MemoryStore>,
    config: web::Data<Config>,
    query: web::Query<RangeQuery>,
) -> Result<HttpResponse, AppError> {
    check_range(query.start_date, query.end_date)?;
    let employees = store.list_active_employees();
    let records = store.list_attendance(None, Some((query.start_date, query.end_date)));
    let schedules = effective_map(&store, &config, &employees)?;
    Ok(HttpResponse::Ok().json(window::summarize_all(
        query.start_date,
        query.end_date,
        &employees,
        &records,
        &schedules,
    )))
}

pub async fn compliance_report(
    store: web::Data<MemoryStore>,
    config: web::Data<Config>,
    query: web::Query<ComplianceQuery>,
) -> Result<HttpResponse, AppError> {
    check_range(query.start_date, query.end_date)?;
    store.get_employee(query.employee_id)?;
    let schedule = effective_for(&store, &config, query.employee_id)?;
    let records = store.list_attendance(
        Some(query.employee_id),
        Some((query.start_date, query.end_date)),
    );
    Ok(HttpResponse::Ok().json(compliance::compare(
        query.employee_id,
        query.start_date,
        query.end_date,
        &records,
        &schedule,
    )))
}

pub async fn exceptions_report(
    store: web::Data<MemoryStore>,
    query: web::Query<ExceptionsQuery>,
) -> Result<HttpResponse, AppError> {
    check_range(query.start_date, query.end_date)?;
    let employees = match query.employee_id {
        Some(id) => vec![store.get_employee(id)?],
        None => store.list_active_employees(),
    };
    let records = store.list_attendance(
        query.employee_id,
        Some((query.start_date, query.end_date)),
    );
    Ok(HttpResponse::Ok().json(exceptions::detect(
        query.start_date,
        query.end_date,
        &employees,
        &records,
    )))
}

pub async fn payroll_report(
    store: web::Data<MemoryStore>,
    config: web::Data<Config>,
    query: web::Query<PayrollQuery>,
) -> Result<HttpResponse, AppError> {
    check_range(query.start_date, query.end_date)?;

    match query.employee_id {
        Some(id) => {
            store.get_employee(id)?;
            let schedule = effective_for(&store, &config, id)?;
            let records =
                store.list_attendance(Some(id), Some((query.start_date, query.end_date)));
            let report = payroll::summarize_one(
                id,
                query.start_date,
                query.end_date,
                query.hourly_rate,
                &records,
                &schedule,
            )?;
            Ok(HttpResponse::Ok().json(report))
        }
        None => {
            let employees = store.list_active_employees();
            let records =
                store.list_attendance(None, Some((query.start_date, query.end_date)));
            let schedules = effective_map(&store, &config, &employees)?;
            let report = payroll::summarize_all(
                query.start_date,
                query.end_date,
                query.hourly_rate,
                &employees,
                &records,
                &schedules,
            )?;
            Ok(HttpResponse::Ok().json(report))
        }
    }
}
