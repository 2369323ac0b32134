//! API integration tests
//!
//! Drive the full router in-process over the in-memory store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use medequip_server::{
    api::router, config::AppConfig, repository::MemoryStore, services::Services, AppState,
};

fn app() -> Router {
    let config = AppConfig::default();
    let services = Services::new(Arc::new(MemoryStore::new()), &config);
    router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Register an account and return (token, user id)
async fn sign_up(app: &Router, name: &str, role: &str) -> (String, String) {
    let email = format!("{}@hospital.test", name);
    let (status, _) = send(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": "secret123", "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": email, "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    (
        body["access_token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_str().unwrap().to_string(),
    )
}

async fn create_device(app: &Router, token: &str, code: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/devices",
        Some(token),
        Some(json!({ "code": code, "type": "Infusion pump", "location": "ICU" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = send(&app, Method::GET, "/api/v1/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let app = app();
    sign_up(&app, "nurse", "health_staff").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "nurse@hospital.test", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_requires_bearer_token() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/api/v1/devices", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/v1/devices", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_current_user() {
    let app = app();
    let (token, id) = sign_up(&app, "tech", "technician").await;

    let (status, body) = send(&app, Method::GET, "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["role"], "technician");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_full_fault_lifecycle() {
    let app = app();
    let (nurse, nurse_id) = sign_up(&app, "nurse", "health_staff").await;
    let (tech, tech_id) = sign_up(&app, "tech", "technician").await;
    let (manager, _) = sign_up(&app, "manager", "manager").await;
    let (quality, _) = sign_up(&app, "quality", "quality").await;

    // Health staff cannot register devices
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/devices",
        Some(&nurse),
        Some(json!({ "code": "INF-001", "type": "Infusion pump", "location": "ICU" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let device_id = create_device(&app, &manager, "INF-001").await;

    let (status, fault) = send(
        &app,
        Method::POST,
        "/api/v1/faults",
        Some(&nurse),
        Some(json!({ "device_id": device_id, "description": "Alarm keeps sounding" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(fault["status"], "open");
    assert_eq!(fault["created_by"], nurse_id.as_str());
    assert_eq!(fault["breakdown_iteration"], 1);
    let fault_id = fault["id"].as_str().unwrap().to_string();

    // Technicians cannot assign work
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/faults/{}/assign", fault_id),
        Some(&tech),
        Some(json!({ "assigned_to": tech_id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden_role");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/faults/{}/assign", fault_id),
        Some(&manager),
        Some(json!({ "assigned_to": tech_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assigned_to"], tech_id.as_str());

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/faults/{}/start-repair", fault_id),
        Some(&tech),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "in_progress");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/faults/{}/start-repair", fault_id),
        Some(&tech),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_started");

    // Notes must be at least 20 characters
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/faults/{}/end-repair", fault_id),
        Some(&tech),
        Some(json!({ "repair_notes": "Fixed it", "repair_category": "adjustment" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/faults/{}/end-repair", fault_id),
        Some(&tech),
        Some(json!({
            "repair_notes": "Replaced the pressure sensor and recalibrated",
            "repair_category": "part_replacement"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "in_progress");
    assert_eq!(body["repair_category"], "part_replacement");
    assert!(body["repair_end"].is_string());

    // Only the reporter confirms
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/faults/{}/confirm", fault_id),
        Some(&manager),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "not_creator");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/faults/{}/confirm", fault_id),
        Some(&nurse),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");
    assert_eq!(body["confirmed_by"], nurse_id.as_str());

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/faults/{}/assign", fault_id),
        Some(&manager),
        Some(json!({ "assigned_to": tech_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_closed");

    // Device counters reflect the failure
    let (status, device) = send(&app, Method::GET, &format!("/api/v1/devices/{}", device_id), Some(&nurse), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(device["total_failures"], 1);
    assert!(device["availability"].as_f64().unwrap() <= 100.0);

    // The technician is credited
    let (_, me) = send(&app, Method::GET, "/api/v1/auth/me", Some(&tech), None).await;
    assert_eq!(me["successful_repairs"], 1);

    // Visibility: the technician sees assigned work, the manager sees everything
    let (_, mine) = send(&app, Method::GET, "/api/v1/faults", Some(&tech), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    let (status, _) = send(&app, Method::GET, "/api/v1/faults/all", Some(&tech), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, all) = send(&app, Method::GET, "/api/v1/faults/all?status=closed", Some(&manager), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);

    // Every transition left an audit entry
    let (status, logs) = send(&app, Method::GET, "/api/v1/quality/logs", Some(&quality), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(logs.as_array().unwrap().len() >= 5);
    let (status, _) = send(&app, Method::GET, "/api/v1/quality/logs", Some(&manager), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_fault_on_unknown_device() {
    let app = app();
    let (nurse, _) = sign_up(&app, "nurse", "health_staff").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/faults",
        Some(&nurse),
        Some(json!({ "device_id": uuid::Uuid::new_v4(), "description": "Broken" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_transfer_approval_relocates_device() {
    let app = app();
    let (nurse, _) = sign_up(&app, "nurse", "health_staff").await;
    let (manager, _) = sign_up(&app, "manager", "manager").await;
    let (quality, _) = sign_up(&app, "quality", "quality").await;
    let device_id = create_device(&app, &manager, "VENT-7").await;

    let (status, transfer) = send(
        &app,
        Method::POST,
        "/api/v1/transfers",
        Some(&nurse),
        Some(json!({ "device_id": device_id, "to_location": "Surgery", "reason": "Needed in OR 2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(transfer["status"], "pending");
    assert_eq!(transfer["from_location"], "ICU");
    let transfer_id = transfer["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/transfers/{}/approve", transfer_id),
        Some(&manager),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/transfers/{}/approve", transfer_id),
        Some(&quality),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");

    let (_, device) = send(&app, Method::GET, &format!("/api/v1/devices/{}", device_id), Some(&nurse), None).await;
    assert_eq!(device["location"], "Surgery");

    // A completed transfer cannot be reviewed again
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/transfers/{}/reject", transfer_id),
        Some(&quality),
        Some(json!({ "rejection_reason": "Too late" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "transfer_not_pending");
}

#[tokio::test]
async fn test_transfer_rejection_requires_reason() {
    let app = app();
    let (nurse, _) = sign_up(&app, "nurse", "health_staff").await;
    let (manager, _) = sign_up(&app, "manager", "manager").await;
    let (quality, _) = sign_up(&app, "quality", "quality").await;
    let device_id = create_device(&app, &manager, "ECG-3").await;

    let (_, transfer) = send(
        &app,
        Method::POST,
        "/api/v1/transfers",
        Some(&nurse),
        Some(json!({ "device_id": device_id, "to_location": "Cardiology", "reason": "Ward reopening" })),
    )
    .await;
    let transfer_id = transfer["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/transfers/{}/reject", transfer_id),
        Some(&quality),
        Some(json!({ "rejection_reason": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/transfers/{}/reject", transfer_id),
        Some(&quality),
        Some(json!({ "rejection_reason": "Device due for calibration" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["rejection_reason"], "Device due for calibration");

    let (_, device) = send(&app, Method::GET, &format!("/api/v1/devices/{}", device_id), Some(&nurse), None).await;
    assert_eq!(device["location"], "ICU");

    let (_, pending) = send(&app, Method::GET, "/api/v1/transfers?status=pending", Some(&nurse), None).await;
    assert!(pending.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reports_are_role_gated() {
    let app = app();
    let (nurse, _) = sign_up(&app, "nurse", "health_staff").await;
    let (manager, _) = sign_up(&app, "manager", "manager").await;
    let (quality, _) = sign_up(&app, "quality", "quality").await;
    create_device(&app, &manager, "MON-1").await;

    let (status, stats) = send(&app, Method::GET, "/api/v1/dashboard/stats", Some(&nurse), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_devices"], 1);
    assert_eq!(stats["total_faults"], 0);

    let (status, _) = send(&app, Method::GET, "/api/v1/reports/breakdown-frequency", Some(&nurse), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, rows) = send(&app, Method::GET, "/api/v1/reports/breakdown-frequency", Some(&manager), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/reports/annual/failure-frequency?year=2024",
        Some(&manager),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, report) = send(
        &app,
        Method::GET,
        "/api/v1/reports/annual/failure-frequency?year=2024",
        Some(&quality),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["year"], 2024);

    let (status, totals) = send(&app, Method::GET, "/api/v1/quality/system-stats", Some(&quality), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(totals["total_users"], 3);
    assert_eq!(totals["total_devices"], 1);
}
