// tests/http_api.rs
//
// Routes, extractors, status codes and the error envelope, exercised by
// driving the real router in-memory with tower's oneshot.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use payroll_engine::config::Config;
use payroll_engine::routes;
use payroll_engine::state::AppState;
use payroll_engine::store::MemoryLedgerStore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn app() -> Router {
    let config = Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database_url: String::new(),
    };
    routes::app(AppState::new(Arc::new(MemoryLedgerStore::new()), config))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(value) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => Request::builder().method(method).uri(uri).body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn patch(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PATCH, uri, Some(body)).await
}

async fn delete(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, None).await
}

/// Amounts travel as JSON strings; parse them back for numeric asserts.
fn money(value: &Value) -> Decimal {
    value.as_str().expect("decimal fields serialize as strings").parse().unwrap()
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("id field").to_string()
}

#[tokio::test]
async fn health_reports_connected_store() {
    let (status, body) = get(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn landing_page_serves_html() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"), "got {content_type}");
}

#[tokio::test]
async fn creates_lists_and_updates_employees() {
    let app = app();

    let (status, institution) =
        post(app.clone(), "/api/v1/institutions", json!({ "name": "Unity College" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let institution_id = id_of(&institution);

    let (status, amina) = post(
        app.clone(),
        "/api/v1/employees",
        json!({
            "first_name": "Amina",
            "last_name": "Bello",
            "institution_id": institution_id,
            "base_salary": "1500.00"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(amina["status"], "active");
    assert_eq!(money(&amina["base_salary"]), dec!(1500));

    let (status, _) = post(
        app.clone(),
        "/api/v1/employees",
        json!({ "first_name": "Chidi", "last_name": "Okafor", "base_salary": "900" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, all) = get(app.clone(), "/api/v1/employees").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let uri = format!("/api/v1/employees?institution_id={institution_id}");
    let (_, scoped) = get(app.clone(), &uri).await;
    assert_eq!(scoped.as_array().unwrap().len(), 1);
    assert_eq!(scoped[0]["first_name"], "Amina");

    let uri = format!("/api/v1/employees/{}/salary", id_of(&amina));
    let (status, updated) = patch(app.clone(), &uri, json!({ "base_salary": "1600.00" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&updated["base_salary"]), dec!(1600));

    let (status, fetched) = get(app, &format!("/api/v1/employees/{}", id_of(&amina))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["last_name"], "Bello");
}

#[tokio::test]
async fn rejects_invalid_employee_payloads() {
    let app = app();

    let cases = [
        json!({ "first_name": "", "last_name": "Bello", "base_salary": "1000" }),
        json!({ "first_name": "Amina", "last_name": "Bello", "base_salary": "-1" }),
        json!({ "first_name": "Amina", "last_name": "Bello", "base_salary": "100.555" }),
        json!({
            "first_name": "Amina",
            "last_name": "Bello",
            "base_salary": "1000",
            "institution_id": Uuid::new_v4()
        }),
    ];
    for body in cases {
        let (status, response) = post(app.clone(), "/api/v1/employees", body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {body}");
        assert_eq!(response["error"]["code"], 400);
    }

    let uri = format!("/api/v1/employees/{}", Uuid::new_v4());
    let (status, _) = get(app.clone(), &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/v1/employees/{}/salary", Uuid::new_v4());
    let (status, _) = patch(app, &uri, json!({ "base_salary": "1000" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn archived_employees_drop_out_of_payroll() {
    let app = app();

    let (_, employee) = post(
        app.clone(),
        "/api/v1/employees",
        json!({ "first_name": "Ngozi", "last_name": "Eze", "base_salary": "1000" }),
    )
    .await;
    let employee_id = id_of(&employee);

    let (status, body) = delete(app.clone(), &format!("/api/v1/employees/{employee_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Employee archived successfully");

    let (_, fetched) = get(app.clone(), &format!("/api/v1/employees/{employee_id}")).await;
    assert_eq!(fetched["status"], "archived");

    let (status, preview) =
        post(app, "/api/v1/payroll/preview", json!({ "month": "2026-01" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["summary"]["total_employees"], 0);
    assert!(preview["employees"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn records_and_filters_compensations() {
    let app = app();

    let (_, employee) = post(
        app.clone(),
        "/api/v1/employees",
        json!({ "first_name": "Amina", "last_name": "Bello", "base_salary": "1000" }),
    )
    .await;
    let employee_id = id_of(&employee);

    let rewards_uri = format!("/api/v1/employees/{employee_id}/rewards");
    let deductions_uri = format!("/api/v1/employees/{employee_id}/deductions");

    let (status, reward) = post(
        app.clone(),
        &rewards_uri,
        json!({ "amount": "200", "reason": "Quarter bonus", "date": "2026-01-10" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reward["kind"], "reward");

    let (status, deduction) = post(
        app.clone(),
        &deductions_uri,
        json!({ "amount": "50", "reason": "Late arrival", "date": "2026-01-12" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(deduction["kind"], "deduction");

    post(
        app.clone(),
        &deductions_uri,
        json!({ "amount": "30", "reason": "Equipment damage", "date": "2026-02-03" }),
    )
    .await;

    let list_uri = format!("/api/v1/employees/{employee_id}/compensations");
    let (_, all) = get(app.clone(), &list_uri).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, january) = get(app.clone(), &format!("{list_uri}?month=2026-01")).await;
    assert_eq!(january.as_array().unwrap().len(), 2);

    let (status, _) = get(app.clone(), &format!("{list_uri}?month=2026-13")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for body in [
        json!({ "amount": "0", "reason": "Zero", "date": "2026-01-10" }),
        json!({ "amount": "10.005", "reason": "Sub-cent", "date": "2026-01-10" }),
        json!({ "amount": "10", "reason": "  ", "date": "2026-01-10" }),
    ] {
        let (status, _) = post(app.clone(), &rewards_uri, body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {body}");
    }

    let compensation_uri = format!("/api/v1/compensations/{}", id_of(&reward));
    let (status, body) = delete(app.clone(), &compensation_uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Compensation removed successfully");
    let (status, _) = delete(app, &compensation_uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn advance_approval_lifecycle() {
    let app = app();

    let (_, employee) = post(
        app.clone(),
        "/api/v1/employees",
        json!({ "first_name": "Chidi", "last_name": "Okafor", "base_salary": "1000" }),
    )
    .await;
    let advances_uri = format!("/api/v1/employees/{}/advances", id_of(&employee));

    let (status, advance) =
        post(app.clone(), &advances_uri, json!({ "amount": "500", "installments": 2 })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(advance["status"], "pending");
    assert_eq!(money(&advance["remaining_amount"]), dec!(500));

    let approve_uri = format!("/api/v1/advances/{}/approve", id_of(&advance));
    let (status, approved) = post(app.clone(), &approve_uri, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    // Decisions are one-shot.
    let (status, _) = post(app.clone(), &approve_uri, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let reject_uri = format!("/api/v1/advances/{}/reject", id_of(&advance));
    let (status, _) = post(app.clone(), &reject_uri, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    for body in [
        json!({ "amount": "500", "installments": 0 }),
        json!({ "amount": "-500", "installments": 2 }),
        json!({ "amount": "0.01", "installments": 5 }),
    ] {
        let (status, _) = post(app.clone(), &advances_uri, body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {body}");
    }

    let uri = format!("/api/v1/advances/{}/approve", Uuid::new_v4());
    let (status, _) = post(app, &uri, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn payroll_month_end_flow() {
    let app = app();

    let (_, employee) = post(
        app.clone(),
        "/api/v1/employees",
        json!({ "first_name": "Amina", "last_name": "Bello", "base_salary": "1000" }),
    )
    .await;
    let employee_id = id_of(&employee);

    post(
        app.clone(),
        &format!("/api/v1/employees/{employee_id}/rewards"),
        json!({ "amount": "200", "reason": "Quarter bonus", "date": "2026-01-10" }),
    )
    .await;
    post(
        app.clone(),
        &format!("/api/v1/employees/{employee_id}/deductions"),
        json!({ "amount": "50", "reason": "Late arrival", "date": "2026-01-12" }),
    )
    .await;
    let (_, advance) = post(
        app.clone(),
        &format!("/api/v1/employees/{employee_id}/advances"),
        json!({ "amount": "500", "installments": 2 }),
    )
    .await;
    post(app.clone(), &format!("/api/v1/advances/{}/approve", id_of(&advance)), json!({})).await;

    // Preview is read-only and repeatable.
    let scope = json!({ "month": "2026-01" });
    let (status, preview) = post(app.clone(), "/api/v1/payroll/preview", scope.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let line = &preview["employees"][0];
    assert_eq!(money(&line["gross_pay"]), dec!(1200));
    assert_eq!(money(&line["advance_deduction"]), dec!(250));
    assert_eq!(money(&line["net_pay"]), dec!(900));
    let (_, again) = post(app.clone(), "/api/v1/payroll/preview", scope.clone()).await;
    assert_eq!(preview, again);

    let (status, run) = post(app.clone(), "/api/v1/payroll/runs", scope.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(run["status"], "completed");
    assert_eq!(run["month"], "2026-01");
    assert_eq!(run["total_employees"], 1);
    assert_eq!(money(&run["total_net"]), dec!(900));

    let (status, conflict) = post(app.clone(), "/api/v1/payroll/runs", scope).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(conflict["error"]["code"], 409);
    assert!(
        conflict["error"]["message"].as_str().unwrap().contains("already exists"),
        "got {conflict}"
    );

    let (_, detail) = get(app.clone(), &format!("/api/v1/payroll/runs/{}", id_of(&run))).await;
    assert_eq!(detail["run"]["id"], run["id"]);
    assert_eq!(money(&detail["entries"][0]["advance_deduction"]), dec!(250));

    let (_, advances) = get(app.clone(), &format!("/api/v1/employees/{employee_id}/advances")).await;
    assert_eq!(money(&advances[0]["paid_amount"]), dec!(250));
    assert_eq!(advances[0]["status"], "approved");

    // February settles the advance; deleting February reopens it.
    let february = json!({ "month": "2026-02" });
    let (status, feb_run) = post(app.clone(), "/api/v1/payroll/runs", february.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, advances) = get(app.clone(), &format!("/api/v1/employees/{employee_id}/advances")).await;
    assert_eq!(advances[0]["status"], "paid");

    let run_uri = format!("/api/v1/payroll/runs/{}", id_of(&feb_run));
    let (status, body) = delete(app.clone(), &run_uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Payroll run deleted and advance deductions reversed");
    let (_, advances) = get(app.clone(), &format!("/api/v1/employees/{employee_id}/advances")).await;
    assert_eq!(advances[0]["status"], "approved");
    assert_eq!(money(&advances[0]["paid_amount"]), dec!(250));

    let (status, _) = delete(app.clone(), &run_uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, rerun) = post(app, "/api/v1/payroll/runs", february).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(money(&rerun["total_net"]), dec!(750));
}

#[tokio::test]
async fn rejects_bad_payroll_scopes() {
    let app = app();

    for month in ["2026-13", "2026-1", "02-2026", "garbage"] {
        let (status, body) =
            post(app.clone(), "/api/v1/payroll/preview", json!({ "month": month })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted month {month:?}");
        assert!(
            body["error"]["message"].as_str().unwrap().contains("Invalid month"),
            "got {body}"
        );
    }

    let scope = json!({ "month": "2026-01", "institution_id": Uuid::new_v4() });
    let (status, _) = post(app.clone(), "/api/v1/payroll/preview", scope).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing to pay: commit refuses, preview does not.
    let (status, _) = post(app.clone(), "/api/v1/payroll/runs", json!({ "month": "2026-01" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = post(app, "/api/v1/payroll/preview", json!({ "month": "2026-01" })).await;
    assert_eq!(status, StatusCode::OK);
}
