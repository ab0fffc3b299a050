// src/handlers/general.rs

use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde_json::json;

/// Root handler — returns an HTML landing page with project info and links
pub async fn root_handler() -> impl IntoResponse {
    Html(r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
  <title>Payroll Engine API</title>
  <style>
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: 'Segoe UI', system-ui, sans-serif; background: #0f172a; color: #e2e8f0; min-height: 100vh; padding: 40px 20px; }
    .container { max-width: 860px; margin: 0 auto; }
    header { text-align: center; margin-bottom: 48px; }
    header h1 { font-size: 2.8rem; font-weight: 800; background: linear-gradient(135deg, #3b82f6, #8b5cf6); -webkit-background-clip: text; -webkit-text-fill-color: transparent; margin-bottom: 8px; }
    header p { color: #94a3b8; font-size: 1.1rem; }
    .badge { display: inline-block; background: #1e293b; border: 1px solid #334155; color: #38bdf8; padding: 4px 12px; border-radius: 20px; font-size: 0.8rem; margin-top: 12px; }
    .routes { background: #1e293b; border: 1px solid #334155; border-radius: 12px; padding: 24px; }
    .routes h2 { font-size: 1.2rem; font-weight: 700; color: #f1f5f9; margin-bottom: 16px; }
    .route-group { margin-bottom: 20px; }
    .route-group h4 { font-size: 0.8rem; font-weight: 600; text-transform: uppercase; letter-spacing: 0.1em; color: #64748b; margin-bottom: 8px; }
    .route-item { display: flex; align-items: flex-start; gap: 12px; padding: 8px 0; border-bottom: 1px solid #0f172a; }
    .route-item:last-child { border-bottom: none; }
    .method { font-size: 0.7rem; font-weight: 700; padding: 2px 8px; border-radius: 4px; min-width: 52px; text-align: center; font-family: monospace; }
    .get { background: #064e3b; color: #34d399; }
    .post { background: #1e3a5f; color: #60a5fa; }
    .patch { background: #451a03; color: #fb923c; }
    .delete { background: #4c0519; color: #fb7185; }
    .route-path { font-family: monospace; font-size: 0.85rem; color: #e2e8f0; flex: 1; }
    .route-desc { font-size: 0.8rem; color: #64748b; }
    footer { text-align: center; margin-top: 40px; color: #475569; font-size: 0.85rem; }
  </style>
</head>
<body>
<div class="container">
  <header>
    <h1>Payroll Engine API</h1>
    <p>Monthly payroll calculation with salary advance amortization</p>
    <span class="badge">v1.0.0 · REST API · <a href="/docs" style="color:#38bdf8;text-decoration:none">Swagger UI</a></span>
  </header>

  <div class="routes">
    <h2>All API Routes</h2>

    <div class="route-group">
      <h4>Institutions</h4>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/institutions</span><span class="route-desc">Create an institution</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/institutions</span><span class="route-desc">List institutions</span></div>
    </div>

    <div class="route-group">
      <h4>Employees</h4>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/employees</span><span class="route-desc">Register a new employee</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/employees</span><span class="route-desc">List employees, optionally by institution</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/employees/:id</span><span class="route-desc">Get a specific employee</span></div>
      <div class="route-item"><span class="method patch">PATCH</span><span class="route-path">/api/v1/employees/:id/salary</span><span class="route-desc">Set an employee's base salary</span></div>
      <div class="route-item"><span class="method delete">DELETE</span><span class="route-path">/api/v1/employees/:id</span><span class="route-desc">Archive an employee</span></div>
    </div>

    <div class="route-group">
      <h4>Compensations</h4>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/employees/:id/rewards</span><span class="route-desc">Add a one-off reward</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/employees/:id/deductions</span><span class="route-desc">Add a one-off deduction</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/employees/:id/compensations</span><span class="route-desc">List compensations, optionally by month</span></div>
      <div class="route-item"><span class="method delete">DELETE</span><span class="route-path">/api/v1/compensations/:id</span><span class="route-desc">Remove a compensation</span></div>
    </div>

    <div class="route-group">
      <h4>Advances</h4>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/employees/:id/advances</span><span class="route-desc">Request a salary advance</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/employees/:id/advances</span><span class="route-desc">List an employee's advances</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/advances/:id/approve</span><span class="route-desc">Approve a pending advance</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/advances/:id/reject</span><span class="route-desc">Reject a pending advance</span></div>
    </div>

    <div class="route-group">
      <h4>Payroll</h4>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/payroll/preview</span><span class="route-desc">Calculate a month without persisting anything</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/payroll/runs</span><span class="route-desc">Commit a payroll run for a month</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/payroll/runs</span><span class="route-desc">List committed runs</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/payroll/runs/:id</span><span class="route-desc">Get a run with its entries</span></div>
      <div class="route-item"><span class="method delete">DELETE</span><span class="route-path">/api/v1/payroll/runs/:id</span><span class="route-desc">Delete a run and reverse its advance deductions</span></div>
    </div>
  </div>

  <footer>
    <p>Built with Rust · Axum · SQLx · PostgreSQL</p>
  </footer>
</div>
</body>
</html>"#)
}

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "service": "payroll-engine",
                "version": "1.0.0"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "database": "disconnected",
                "error": e.to_string()
            })),
        ),
    }
}
