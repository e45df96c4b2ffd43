use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::engine::schedule;
use crate::error::AppError;
use crate::model::schedule::EmployeeSchedule;
use crate::store::MemoryStore;
use crate::utils::time_utils::{format_hhmm, parse_hhmm};

#[derive(Deserialize)]
pub struct UpsertSchedule {
    pub start_time: String,
    pub end_time: String,
    pub expected_hours: f64,
}

/// Upsert semantics: create the row if absent, replace it if present.
pub async fn upsert_schedule(
    store: web::Data<MemoryStore>,
    path: web::Path<u64>,
    payload: web::Json<UpsertSchedule>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    let payload = payload.into_inner();

    // Reject malformed times at the door rather than at first use.
    parse_hhmm(&payload.start_time)?;
    parse_hhmm(&payload.end_time)?;
    if !payload.expected_hours.is_finite()
        || payload.expected_hours <= 0.0
        || payload.expected_hours > 24.0
    {
        return Err(AppError::Validation(
            "expected_hours must be between 0 and 24".into(),
        ));
    }

    let stored = store.upsert_schedule(EmployeeSchedule {
        employee_id,
        start_time: payload.start_time,
        end_time: payload.end_time,
        expected_hours: payload.expected_hours,
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Schedule saved",
        "schedule": stored
    })))
}

/// Returns the schedule in effect for the employee; `configured` tells
/// whether it comes from a stored row or from the system defaults.
pub async fn get_schedule(
    store: web::Data<MemoryStore>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    store.get_employee(employee_id)?;

    let stored = store.get_schedule(employee_id);
    let configured = stored.is_some();
    let effective = schedule::resolve(stored.as_ref(), &config.default_schedule)?;

    Ok(HttpResponse::Ok().json(json!({
        "employee_id": employee_id,
        "start_time": format_hhmm(effective.start),
        "end_time": format_hhmm(effective.end),
        "expected_hours": effective.expected_hours,
        "configured": configured
    })))
}
