use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::config::Config;
use crate::engine::schedule::{self, EffectiveSchedule};
use crate::engine::status;
use crate::error::AppError;
use crate::store::MemoryStore;
use crate::utils::time_utils::local_now;

#[derive(Deserialize)]
pub struct CheckInRequest {
    pub employee_id: u64,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct CheckOutRequest {
    pub employee_id: u64,
}

/// Manual correction path: an administrator supplies the timestamps.
#[derive(Deserialize)]
pub struct CreateAttendance {
    pub employee_id: u64,
    pub clock_in: NaiveDateTime,
    pub clock_out: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateAttendance {
    pub clock_in: Option<NaiveDateTime>,
    pub clock_out: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct AttendanceQuery {
    pub employee_id: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub async fn check_in(
    store: web::Data<MemoryStore>,
    config: web::Data<Config>,
    payload: web::Json<CheckInRequest>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let now = local_now(config.timezone);
    let record = store.clock_in(payload.employee_id, now, payload.notes)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Clocked in successfully",
        "record": record
    })))
}

pub async fn check_out(
    store: web::Data<MemoryStore>,
    config: web::Data<Config>,
    payload: web::Json<CheckOutRequest>,
) -> Result<HttpResponse, AppError> {
    let now = local_now(config.timezone);
    let record = store.clock_out(payload.employee_id, now)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Clocked out successfully",
        "record": record
    })))
}

pub async fn create_record(
    store: web::Data<MemoryStore>,
    payload: web::Json<CreateAttendance>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    let record = store.insert_record(
        payload.employee_id,
        payload.clock_in,
        payload.clock_out,
        payload.notes,
    )?;
    info!(record_id = record.id, employee_id = record.employee_id, "manual record created");

    Ok(HttpResponse::Created().json(json!({
        "message": "Attendance record created",
        "record": record
    })))
}

pub async fn update_record(
    store: web::Data<MemoryStore>,
    path: web::Path<u64>,
    payload: web::Json<UpdateAttendance>,
) -> Result<HttpResponse, AppError> {
    let record_id = path.into_inner();
    let payload = payload.into_inner();
    let record =
        store.update_record(record_id, payload.clock_in, payload.clock_out, payload.notes)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance record updated",
        "record": record
    })))
}

pub async fn get_record(
    store: web::Data<MemoryStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let record = store.get_record(path.into_inner())?;
    Ok(HttpResponse::Ok().json(record))
}

/// Lists records, each annotated with its derived status.
pub async fn list_records(
    store: web::Data<MemoryStore>,
    config: web::Data<Config>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, AppError> {
    let range = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => {
            if start > end {
                return Err(AppError::Validation("start_date must not be after end_date".into()));
            }
            Some((start, end))
        }
        (None, None) => None,
        _ => {
            return Err(AppError::Validation(
                "start_date and end_date must be provided together".into(),
            ));
        }
    };

    let records = store.list_attendance(query.employee_id, range);

    let mut schedules: HashMap<u64, EffectiveSchedule> = HashMap::new();
    let mut annotated = Vec::with_capacity(records.len());
    for record in &records {
        let effective = match schedules.get(&record.employee_id) {
            Some(s) => *s,
            None => {
                let stored = store.get_schedule(record.employee_id);
                let resolved = schedule::resolve(stored.as_ref(), &config.default_schedule)?;
                schedules.insert(record.employee_id, resolved);
                resolved
            }
        };
        annotated.push(status::annotate(record, &effective)?);
    }

    Ok(HttpResponse::Ok().json(annotated))
}
