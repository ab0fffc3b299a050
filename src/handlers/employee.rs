// src/handlers/employee.rs

use super::{check_money_scale, require_employee};
use crate::{
    errors::{AppError, AppResult},
    models::{CreateEmployeeRequest, Employee, EmployeeQuery, SetBaseSalaryRequest},
    state::AppState,
    store::NewEmployee,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

/// Register a new employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Validation error"),
    ),
    tag = "Employees"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    Json(body): Json<CreateEmployeeRequest>,
) -> AppResult<(axum::http::StatusCode, Json<Employee>)> {
    if body.first_name.trim().is_empty() || body.last_name.trim().is_empty() {
        return Err(AppError::Validation("Employee name cannot be empty".to_string()));
    }
    if body.base_salary < rust_decimal_macros::dec!(0) {
        return Err(AppError::Validation("Base salary cannot be negative".to_string()));
    }
    check_money_scale("Base salary", body.base_salary)?;

    if let Some(institution_id) = body.institution_id {
        if !state.store.institution_exists(institution_id).await? {
            return Err(AppError::Validation(format!("Unknown institution {institution_id}")));
        }
    }

    let employee = state
        .store
        .insert_employee(NewEmployee {
            first_name: body.first_name,
            last_name: body.last_name,
            institution_id: body.institution_id,
            base_salary: body.base_salary,
        })
        .await?;

    Ok((axum::http::StatusCode::CREATED, Json(employee)))
}

/// List all employees, optionally filtered by institution
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "List of employees", body = Vec<Employee>),
    ),
    tag = "Employees"
)]
pub async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<EmployeeQuery>,
) -> AppResult<Json<Vec<Employee>>> {
    let employees = state.store.list_employees(query.institution_id).await?;
    Ok(Json(employees))
}

/// Get a single employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee detail", body = Employee),
        (status = 404, description = "Employee not found"),
    ),
    tag = "Employees"
)]
pub async fn get_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<Employee>> {
    let employee = require_employee(state.store.as_ref(), employee_id).await?;
    Ok(Json(employee))
}

/// Set an employee's base salary
#[utoipa::path(
    patch,
    path = "/api/v1/employees/{employee_id}/salary",
    request_body = SetBaseSalaryRequest,
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Salary updated", body = Employee),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Employee not found"),
    ),
    tag = "Employees"
)]
pub async fn set_base_salary(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(body): Json<SetBaseSalaryRequest>,
) -> AppResult<Json<Employee>> {
    if body.base_salary < rust_decimal_macros::dec!(0) {
        return Err(AppError::Validation("Base salary cannot be negative".to_string()));
    }
    check_money_scale("Base salary", body.base_salary)?;

    let employee = state
        .store
        .set_base_salary(employee_id, body.base_salary)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;

    Ok(Json(employee))
}

/// Archive an employee so future payroll runs skip them
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee archived"),
        (status = 404, description = "Employee not found"),
    ),
    tag = "Employees"
)]
pub async fn archive_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    if !state.store.archive_employee(employee_id).await? {
        return Err(AppError::NotFound(format!("Employee {} not found", employee_id)));
    }

    Ok(Json(serde_json::json!({ "message": "Employee archived successfully" })))
}
