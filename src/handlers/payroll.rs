// src/handlers/payroll.rs

use crate::{
    errors::{AppError, AppResult},
    models::{Month, PayrollRun, PayrollRunDetail, PayrollScopeRequest},
    services::{payroll::PayrollCalculationResult, payroll::PayrollCalculator, run_manager::PayrollRunManager},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

fn parse_scope(body: &PayrollScopeRequest) -> AppResult<(Month, Option<Uuid>)> {
    let month = body
        .month
        .parse::<Month>()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok((month, body.institution_id))
}

/// Calculate a month's payroll without persisting anything
#[utoipa::path(
    post,
    path = "/api/v1/payroll/preview",
    request_body = PayrollScopeRequest,
    responses(
        (status = 200, description = "Calculation result", body = PayrollCalculationResult),
        (status = 400, description = "Invalid month or institution"),
    ),
    tag = "Payroll"
)]
pub async fn preview_payroll(
    State(state): State<AppState>,
    Json(body): Json<PayrollScopeRequest>,
) -> AppResult<Json<PayrollCalculationResult>> {
    let (month, institution_id) = parse_scope(&body)?;
    let result = PayrollCalculator::new(state.store.as_ref())
        .preview(month, institution_id)
        .await?;
    Ok(Json(result))
}

/// Commit a payroll run for a month
#[utoipa::path(
    post,
    path = "/api/v1/payroll/runs",
    request_body = PayrollScopeRequest,
    responses(
        (status = 201, description = "Run committed", body = PayrollRun),
        (status = 400, description = "Invalid month or institution"),
        (status = 409, description = "A completed run already exists for this scope"),
    ),
    tag = "Payroll"
)]
pub async fn create_payroll_run(
    State(state): State<AppState>,
    Json(body): Json<PayrollScopeRequest>,
) -> AppResult<(axum::http::StatusCode, Json<PayrollRun>)> {
    let (month, institution_id) = parse_scope(&body)?;
    let run = PayrollCalculator::new(state.store.as_ref())
        .commit(month, institution_id)
        .await?;
    Ok((axum::http::StatusCode::CREATED, Json(run)))
}

/// List all committed payroll runs
#[utoipa::path(
    get,
    path = "/api/v1/payroll/runs",
    responses(
        (status = 200, description = "List of runs", body = Vec<PayrollRun>),
    ),
    tag = "Payroll"
)]
pub async fn list_payroll_runs(State(state): State<AppState>) -> AppResult<Json<Vec<PayrollRun>>> {
    let runs = PayrollRunManager::new(state.store.as_ref()).list().await?;
    Ok(Json(runs))
}

/// Get one payroll run with its per-employee entries
#[utoipa::path(
    get,
    path = "/api/v1/payroll/runs/{run_id}",
    params(("run_id" = Uuid, Path, description = "Payroll run ID")),
    responses(
        (status = 200, description = "Run detail", body = PayrollRunDetail),
        (status = 404, description = "Run not found"),
    ),
    tag = "Payroll"
)]
pub async fn get_payroll_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> AppResult<Json<PayrollRunDetail>> {
    let (run, entries) = PayrollRunManager::new(state.store.as_ref()).get(run_id).await?;
    Ok(Json(PayrollRunDetail { run, entries }))
}

/// Delete a payroll run and reverse its advance deductions
#[utoipa::path(
    delete,
    path = "/api/v1/payroll/runs/{run_id}",
    params(("run_id" = Uuid, Path, description = "Payroll run ID")),
    responses(
        (status = 200, description = "Run deleted and advances restored"),
        (status = 404, description = "Run not found"),
    ),
    tag = "Payroll"
)]
pub async fn delete_payroll_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    PayrollRunManager::new(state.store.as_ref()).delete(run_id).await?;
    Ok(Json(serde_json::json!({
        "message": "Payroll run deleted and advance deductions reversed"
    })))
}
