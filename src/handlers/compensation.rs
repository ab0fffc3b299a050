// src/handlers/compensation.rs

use super::{check_positive_amount, require_employee};
use crate::{
    errors::{AppError, AppResult},
    models::{AddCompensationRequest, Compensation, CompensationKind, CompensationQuery, Month},
    state::AppState,
    store::NewCompensation,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

async fn add_compensation(
    state: AppState,
    employee_id: Uuid,
    kind: CompensationKind,
    body: AddCompensationRequest,
) -> AppResult<(axum::http::StatusCode, Json<Compensation>)> {
    require_employee(state.store.as_ref(), employee_id).await?;
    check_positive_amount("Amount", body.amount)?;
    if body.reason.trim().is_empty() {
        return Err(AppError::Validation("Reason cannot be empty".to_string()));
    }

    let compensation = state
        .store
        .insert_compensation(NewCompensation {
            employee_id,
            kind,
            amount: body.amount,
            reason: body.reason,
            date: body.date,
        })
        .await?;

    Ok((axum::http::StatusCode::CREATED, Json(compensation)))
}

/// Add a one-off reward for an employee
#[utoipa::path(
    post,
    path = "/api/v1/employees/{employee_id}/rewards",
    request_body = AddCompensationRequest,
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 201, description = "Reward added", body = Compensation),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Employee not found"),
    ),
    tag = "Compensations"
)]
pub async fn add_reward(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(body): Json<AddCompensationRequest>,
) -> AppResult<(axum::http::StatusCode, Json<Compensation>)> {
    add_compensation(state, employee_id, CompensationKind::Reward, body).await
}

/// Add a one-off deduction for an employee
#[utoipa::path(
    post,
    path = "/api/v1/employees/{employee_id}/deductions",
    request_body = AddCompensationRequest,
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 201, description = "Deduction added", body = Compensation),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Employee not found"),
    ),
    tag = "Compensations"
)]
pub async fn add_deduction(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(body): Json<AddCompensationRequest>,
) -> AppResult<(axum::http::StatusCode, Json<Compensation>)> {
    add_compensation(state, employee_id, CompensationKind::Deduction, body).await
}

/// List an employee's compensations, optionally for one month
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}/compensations",
    params(
        ("employee_id" = Uuid, Path, description = "Employee ID"),
        CompensationQuery,
    ),
    responses(
        (status = 200, description = "List of compensations", body = Vec<Compensation>),
        (status = 400, description = "Invalid month filter"),
    ),
    tag = "Compensations"
)]
pub async fn list_compensations(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Query(query): Query<CompensationQuery>,
) -> AppResult<Json<Vec<Compensation>>> {
    let month = match query.month {
        Some(raw) => Some(
            raw.parse::<Month>()
                .map_err(|e| AppError::Validation(e.to_string()))?,
        ),
        None => None,
    };

    let compensations = state.store.list_compensations(employee_id, month).await?;
    Ok(Json(compensations))
}

/// Remove a compensation before it is paid out
#[utoipa::path(
    delete,
    path = "/api/v1/compensations/{compensation_id}",
    params(("compensation_id" = Uuid, Path, description = "Compensation ID")),
    responses(
        (status = 200, description = "Compensation removed"),
        (status = 404, description = "Compensation not found"),
    ),
    tag = "Compensations"
)]
pub async fn delete_compensation(
    State(state): State<AppState>,
    Path(compensation_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    if !state.store.delete_compensation(compensation_id).await? {
        return Err(AppError::NotFound(format!(
            "Compensation {} not found",
            compensation_id
        )));
    }

    Ok(Json(serde_json::json!({ "message": "Compensation removed successfully" })))
}
