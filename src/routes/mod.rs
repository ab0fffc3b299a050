// src/routes/mod.rs

use crate::{
    handlers::{
        advance::{approve_advance, create_advance, list_advances, reject_advance},
        compensation::{add_deduction, add_reward, delete_compensation, list_compensations},
        employee::{
            archive_employee, create_employee, get_employee, list_employees, set_base_salary,
        },
        general::{health_handler, root_handler},
        institution::{create_institution, list_institutions},
        payroll::{
            create_payroll_run, delete_payroll_run, get_payroll_run, list_payroll_runs,
            preview_payroll,
        },
    },
    openapi::ApiDoc,
    state::AppState,
};
use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // ─── Institutions ─────────────────────────────────────
        .route(
            "/institutions",
            post(create_institution).get(list_institutions),
        )
        // ─── Employees ────────────────────────────────────────
        .route("/employees", post(create_employee).get(list_employees))
        .route(
            "/employees/{employee_id}",
            get(get_employee).delete(archive_employee),
        )
        .route("/employees/{employee_id}/salary", patch(set_base_salary))
        // ─── Compensations ────────────────────────────────────
        .route("/employees/{employee_id}/rewards", post(add_reward))
        .route("/employees/{employee_id}/deductions", post(add_deduction))
        .route(
            "/employees/{employee_id}/compensations",
            get(list_compensations),
        )
        .route(
            "/compensations/{compensation_id}",
            delete(delete_compensation),
        )
        // ─── Advances ─────────────────────────────────────────
        .route(
            "/employees/{employee_id}/advances",
            post(create_advance).get(list_advances),
        )
        .route("/advances/{advance_id}/approve", post(approve_advance))
        .route("/advances/{advance_id}/reject", post(reject_advance))
        // ─── Payroll ──────────────────────────────────────────
        .route("/payroll/preview", post(preview_payroll))
        .route(
            "/payroll/runs",
            post(create_payroll_run).get(list_payroll_runs),
        )
        .route(
            "/payroll/runs/{run_id}",
            get(get_payroll_run).delete(delete_payroll_run),
        )
}

/// Full application router: landing page, health probe, the versioned API,
/// Swagger UI, and the HTTP middleware stack.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api/v1", api_routes())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
