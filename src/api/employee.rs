use std::str::FromStr;

use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::error::AppError;
use crate::model::employee::EmployeeStatus;
use crate::store::MemoryStore;

#[derive(Deserialize)]
pub struct CreateEmployee {
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub hire_date: NaiveDate,
}

#[derive(Deserialize)]
pub struct EmployeeQuery {
    pub status: Option<String>,
}

pub async fn create_employee(
    store: web::Data<MemoryStore>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    if payload.first_name.trim().is_empty() || payload.employee_code.trim().is_empty() {
        return Err(AppError::Validation(
            "employee_code and first_name are required".into(),
        ));
    }

    let employee = store
        .insert_employee(
            payload.employee_code,
            payload.first_name,
            payload.last_name,
            payload.email,
            payload.hire_date,
        )
        .inspect_err(|e| error!(error = %e, "failed to create employee"))?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Employee registered successfully",
        "employee": employee
    })))
}

pub async fn list_employees(
    store: web::Data<MemoryStore>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, AppError> {
    let status = match &query.status {
        Some(raw) => Some(EmployeeStatus::from_str(raw).map_err(|_| {
            AppError::Validation(format!("unknown employee status '{}'", raw))
        })?),
        None => None,
    };

    Ok(HttpResponse::Ok().json(store.list_employees(status)))
}

pub async fn get_employee(
    store: web::Data<MemoryStore>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let employee = store.get_employee(path.into_inner())?;
    Ok(HttpResponse::Ok().json(employee))
}
