//! Equipment transfer endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CreateTransfer, EquipmentTransfer, RejectTransfer, TransferQuery},
};

use super::AuthenticatedUser;

/// List transfers
#[utoipa::path(
    get,
    path = "/transfers",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(TransferQuery),
    responses(
        (status = 200, description = "Transfers, newest first", body = Vec<EquipmentTransfer>)
    )
)]
pub async fn list_transfers(
    State(state): State<crate::AppState>,
    _auth: AuthenticatedUser,
    Query(query): Query<TransferQuery>,
) -> AppResult<Json<Vec<EquipmentTransfer>>> {
    let transfers = state.services.transfers.list(query.status).await?;
    Ok(Json(transfers))
}

#[utoipa::path(
    get,
    path = "/transfers/{id}",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Transfer ID")),
    responses(
        (status = 200, description = "Transfer details", body = EquipmentTransfer),
        (status = 404, description = "Transfer not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_transfer(
    State(state): State<crate::AppState>,
    _auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EquipmentTransfer>> {
    let transfer = state.services.transfers.get(id).await?;
    Ok(Json(transfer))
}

/// Request a device transfer
#[utoipa::path(
    post,
    path = "/transfers",
    tag = "transfers",
    security(("bearer_auth" = [])),
    request_body = CreateTransfer,
    responses(
        (status = 201, description = "Transfer requested", body = EquipmentTransfer),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Device not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_transfer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Json(data): Json<CreateTransfer>,
) -> AppResult<(StatusCode, Json<EquipmentTransfer>)> {
    let transfer = state.services.transfers.create(&principal, data).await?;
    Ok((StatusCode::CREATED, Json(transfer)))
}

/// Approve a pending transfer and relocate the device (quality only)
#[utoipa::path(
    post,
    path = "/transfers/{id}/approve",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Transfer ID")),
    responses(
        (status = 200, description = "Transfer completed", body = EquipmentTransfer),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse),
        (status = 409, description = "Transfer not pending", body = crate::error::ErrorResponse)
    )
)]
pub async fn approve_transfer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EquipmentTransfer>> {
    let transfer = state.services.transfers.approve(&principal, id).await?;
    Ok(Json(transfer))
}

/// Reject a pending transfer (quality only)
#[utoipa::path(
    post,
    path = "/transfers/{id}/reject",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Transfer ID")),
    request_body = RejectTransfer,
    responses(
        (status = 200, description = "Transfer rejected", body = EquipmentTransfer),
        (status = 400, description = "Missing rejection reason", body = crate::error::ErrorResponse),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse),
        (status = 409, description = "Transfer not pending", body = crate::error::ErrorResponse)
    )
)]
pub async fn reject_transfer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<RejectTransfer>,
) -> AppResult<Json<EquipmentTransfer>> {
    let transfer = state.services.transfers.reject(&principal, id, data).await?;
    Ok(Json(transfer))
}
