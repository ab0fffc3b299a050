// src/handlers/institution.rs

use crate::{
    errors::{AppError, AppResult},
    models::{CreateInstitutionRequest, Institution},
    state::AppState,
};
use axum::{Json, extract::State};

/// Create an institution
#[utoipa::path(
    post,
    path = "/api/v1/institutions",
    request_body = CreateInstitutionRequest,
    responses(
        (status = 201, description = "Institution created", body = Institution),
        (status = 400, description = "Validation error"),
    ),
    tag = "Institutions"
)]
pub async fn create_institution(
    State(state): State<AppState>,
    Json(body): Json<CreateInstitutionRequest>,
) -> AppResult<(axum::http::StatusCode, Json<Institution>)> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Institution name cannot be empty".to_string()));
    }

    let institution = state.store.insert_institution(name.to_string()).await?;
    Ok((axum::http::StatusCode::CREATED, Json(institution)))
}

/// List all institutions
#[utoipa::path(
    get,
    path = "/api/v1/institutions",
    responses(
        (status = 200, description = "List of institutions", body = Vec<Institution>),
    ),
    tag = "Institutions"
)]
pub async fn list_institutions(State(state): State<AppState>) -> AppResult<Json<Vec<Institution>>> {
    let institutions = state.store.list_institutions().await?;
    Ok(Json(institutions))
}
