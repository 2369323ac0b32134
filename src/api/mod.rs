//! API handlers for the maintenance REST endpoints

pub mod auth;
pub mod devices;
pub mod faults;
pub mod health;
pub mod openapi;
pub mod reports;
pub mod transfers;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    models::{Principal, UserClaims},
    AppState,
};

/// Extractor for the authenticated principal from the JWT bearer token
pub struct AuthenticatedUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims.principal()))
    }
}

/// Build the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/technicians", get(users::list_technicians))
        // Devices
        .route("/devices", get(devices::list_devices).post(devices::create_device))
        .route("/devices/:id", get(devices::get_device))
        .route("/devices/:id/faults", get(devices::list_device_faults))
        // Faults
        .route("/faults", get(faults::list_faults).post(faults::create_fault))
        .route("/faults/all", get(faults::list_all_faults))
        .route("/faults/:id", get(faults::get_fault))
        .route("/faults/:id/assign", post(faults::assign_fault))
        .route("/faults/:id/start-repair", post(faults::start_repair))
        .route("/faults/:id/end-repair", post(faults::end_repair))
        .route("/faults/:id/confirm", post(faults::confirm_fault))
        // Transfers
        .route("/transfers", get(transfers::list_transfers).post(transfers::create_transfer))
        .route("/transfers/:id", get(transfers::get_transfer))
        .route("/transfers/:id/approve", post(transfers::approve_transfer))
        .route("/transfers/:id/reject", post(transfers::reject_transfer))
        // Dashboard and reports
        .route("/dashboard/stats", get(reports::dashboard_stats))
        .route("/reports/breakdown-frequency", get(reports::breakdown_frequency))
        .route("/reports/intervention-duration", get(reports::intervention_duration))
        .route("/reports/technician-performance", get(reports::technician_performance))
        .route("/reports/annual/failure-frequency", get(reports::annual_failure_frequency))
        .route("/reports/annual/intervention-duration", get(reports::annual_intervention_duration))
        .route("/reports/annual/facility-issues", get(reports::annual_facility_issues))
        // Quality department
        .route("/quality/logs", get(reports::audit_log))
        .route("/quality/system-stats", get(reports::system_stats))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
