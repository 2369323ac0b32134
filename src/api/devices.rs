//! Device API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CreateDevice, Device, FaultRecord},
};

use super::AuthenticatedUser;

/// List all devices
#[utoipa::path(
    get,
    path = "/devices",
    tag = "devices",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Device list", body = Vec<Device>)
    )
)]
pub async fn list_devices(
    State(state): State<crate::AppState>,
    _auth: AuthenticatedUser,
) -> AppResult<Json<Vec<Device>>> {
    let devices = state.services.devices.list().await?;
    Ok(Json(devices))
}

/// Get device by ID
#[utoipa::path(
    get,
    path = "/devices/{id}",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Device ID")),
    responses(
        (status = 200, description = "Device details", body = Device),
        (status = 404, description = "Device not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_device(
    State(state): State<crate::AppState>,
    _auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Device>> {
    let device = state.services.devices.get(id).await?;
    Ok(Json(device))
}

/// Create a device
#[utoipa::path(
    post,
    path = "/devices",
    tag = "devices",
    security(("bearer_auth" = [])),
    request_body = CreateDevice,
    responses(
        (status = 201, description = "Device created", body = Device),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse),
        (status = 409, description = "Device code already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_device(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Json(data): Json<CreateDevice>,
) -> AppResult<(StatusCode, Json<Device>)> {
    let device = state.services.devices.create(&principal, data).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

/// Fault history of a device
#[utoipa::path(
    get,
    path = "/devices/{id}/faults",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Device ID")),
    responses(
        (status = 200, description = "Faults of the device, newest first", body = Vec<FaultRecord>),
        (status = 404, description = "Device not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_device_faults(
    State(state): State<crate::AppState>,
    _auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<FaultRecord>>> {
    let faults = state.services.devices.faults(id).await?;
    Ok(Json(faults))
}
