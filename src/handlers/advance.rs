// src/handlers/advance.rs

use super::{check_positive_amount, require_employee};
use crate::{
    errors::{AppError, AppResult},
    models::{Advance, AdvanceStatus, CreateAdvanceRequest},
    services::round_money,
    state::AppState,
    store::NewAdvance,
};
use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Request a salary advance for an employee
#[utoipa::path(
    post,
    path = "/api/v1/employees/{employee_id}/advances",
    request_body = CreateAdvanceRequest,
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 201, description = "Advance requested", body = Advance),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Employee not found"),
    ),
    tag = "Advances"
)]
pub async fn create_advance(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(body): Json<CreateAdvanceRequest>,
) -> AppResult<(axum::http::StatusCode, Json<Advance>)> {
    require_employee(state.store.as_ref(), employee_id).await?;
    check_positive_amount("Amount", body.amount)?;
    if body.installments < 1 {
        return Err(AppError::Validation("Installments must be at least 1".to_string()));
    }
    // A plan whose installment rounds to zero cents would never pay off.
    if round_money(body.amount / Decimal::from(body.installments)).is_zero() {
        return Err(AppError::Validation(
            "Installments are too many for this amount".to_string(),
        ));
    }

    let advance = state
        .store
        .insert_advance(NewAdvance {
            employee_id,
            amount: body.amount,
            installments: body.installments,
        })
        .await?;

    Ok((axum::http::StatusCode::CREATED, Json(advance)))
}

/// List an employee's advances
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}/advances",
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "List of advances", body = Vec<Advance>),
    ),
    tag = "Advances"
)]
pub async fn list_advances(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<Vec<Advance>>> {
    let advances = state.store.list_advances(employee_id).await?;
    Ok(Json(advances))
}

async fn decide_advance(
    state: AppState,
    advance_id: Uuid,
    to: AdvanceStatus,
) -> AppResult<Json<Advance>> {
    let advance = state
        .store
        .find_advance(advance_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Advance {} not found", advance_id)))?;

    if advance.status != AdvanceStatus::Pending {
        return Err(AppError::Conflict(format!(
            "Advance {} is {:?} and can no longer be decided",
            advance_id, advance.status
        )));
    }

    // Compare-and-set in case someone else decided it in between.
    let advance = state
        .store
        .transition_advance(advance_id, AdvanceStatus::Pending, to)
        .await?
        .ok_or_else(|| {
            AppError::Conflict(format!("Advance {} was decided concurrently", advance_id))
        })?;

    Ok(Json(advance))
}

/// Approve a pending advance so payroll starts amortizing it
#[utoipa::path(
    post,
    path = "/api/v1/advances/{advance_id}/approve",
    params(("advance_id" = Uuid, Path, description = "Advance ID")),
    responses(
        (status = 200, description = "Advance approved", body = Advance),
        (status = 404, description = "Advance not found"),
        (status = 409, description = "Advance is not pending"),
    ),
    tag = "Advances"
)]
pub async fn approve_advance(
    State(state): State<AppState>,
    Path(advance_id): Path<Uuid>,
) -> AppResult<Json<Advance>> {
    decide_advance(state, advance_id, AdvanceStatus::Approved).await
}

/// Reject a pending advance
#[utoipa::path(
    post,
    path = "/api/v1/advances/{advance_id}/reject",
    params(("advance_id" = Uuid, Path, description = "Advance ID")),
    responses(
        (status = 200, description = "Advance rejected", body = Advance),
        (status = 404, description = "Advance not found"),
        (status = 409, description = "Advance is not pending"),
    ),
    tag = "Advances"
)]
pub async fn reject_advance(
    State(state): State<AppState>,
    Path(advance_id): Path<Uuid>,
) -> AppResult<Json<Advance>> {
    decide_advance(state, advance_id, AdvanceStatus::Rejected).await
}
