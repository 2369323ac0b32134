//! Fault record endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{AssignFault, CreateFault, EndRepair, FaultQuery, FaultRecord},
};

use super::AuthenticatedUser;

/// List faults visible to the caller
#[utoipa::path(
    get,
    path = "/faults",
    tag = "faults",
    security(("bearer_auth" = [])),
    params(FaultQuery),
    responses(
        (status = 200, description = "Faults, newest first", body = Vec<FaultRecord>)
    )
)]
pub async fn list_faults(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<FaultQuery>,
) -> AppResult<Json<Vec<FaultRecord>>> {
    let faults = state.services.faults.list(&principal, query.status).await?;
    Ok(Json(faults))
}

/// List every fault (manager and quality only)
#[utoipa::path(
    get,
    path = "/faults/all",
    tag = "faults",
    security(("bearer_auth" = [])),
    params(FaultQuery),
    responses(
        (status = 200, description = "All faults, newest first", body = Vec<FaultRecord>),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_all_faults(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<FaultQuery>,
) -> AppResult<Json<Vec<FaultRecord>>> {
    let faults = state.services.faults.list_all(&principal, query.status).await?;
    Ok(Json(faults))
}

/// Get fault by ID
#[utoipa::path(
    get,
    path = "/faults/{id}",
    tag = "faults",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Fault ID")),
    responses(
        (status = 200, description = "Fault details", body = FaultRecord),
        (status = 404, description = "Fault not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_fault(
    State(state): State<crate::AppState>,
    _auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<FaultRecord>> {
    let fault = state.services.faults.get(id).await?;
    Ok(Json(fault))
}

/// Report a fault
#[utoipa::path(
    post,
    path = "/faults",
    tag = "faults",
    security(("bearer_auth" = [])),
    request_body = CreateFault,
    responses(
        (status = 201, description = "Fault reported", body = FaultRecord),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Device not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_fault(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Json(data): Json<CreateFault>,
) -> AppResult<(StatusCode, Json<FaultRecord>)> {
    let fault = state.services.faults.create(&principal, data).await?;
    Ok((StatusCode::CREATED, Json(fault)))
}

/// Assign a fault to a technician (manager only)
#[utoipa::path(
    post,
    path = "/faults/{id}/assign",
    tag = "faults",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Fault ID")),
    request_body = AssignFault,
    responses(
        (status = 200, description = "Fault assigned", body = FaultRecord),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse),
        (status = 404, description = "Fault or technician not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Fault already closed", body = crate::error::ErrorResponse)
    )
)]
pub async fn assign_fault(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<AssignFault>,
) -> AppResult<Json<FaultRecord>> {
    let fault = state.services.faults.assign(&principal, id, data).await?;
    Ok(Json(fault))
}

/// Start the repair (assigned technician only)
#[utoipa::path(
    post,
    path = "/faults/{id}/start-repair",
    tag = "faults",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Fault ID")),
    responses(
        (status = 200, description = "Repair started", body = FaultRecord),
        (status = 403, description = "Not the assignee", body = crate::error::ErrorResponse),
        (status = 409, description = "Repair already started", body = crate::error::ErrorResponse)
    )
)]
pub async fn start_repair(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<FaultRecord>> {
    let fault = state.services.faults.start_repair(&principal, id).await?;
    Ok(Json(fault))
}

/// Finish the repair with notes and a category (assigned technician only)
#[utoipa::path(
    post,
    path = "/faults/{id}/end-repair",
    tag = "faults",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Fault ID")),
    request_body = EndRepair,
    responses(
        (status = 200, description = "Repair completed", body = FaultRecord),
        (status = 400, description = "Missing category or notes too short", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the assignee", body = crate::error::ErrorResponse),
        (status = 409, description = "Repair not started or already ended", body = crate::error::ErrorResponse)
    )
)]
pub async fn end_repair(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<EndRepair>,
) -> AppResult<Json<FaultRecord>> {
    let fault = state.services.faults.end_repair(&principal, id, data).await?;
    Ok(Json(fault))
}

/// Confirm the repair and close the record (reporter only)
#[utoipa::path(
    post,
    path = "/faults/{id}/confirm",
    tag = "faults",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Fault ID")),
    responses(
        (status = 200, description = "Fault closed", body = FaultRecord),
        (status = 403, description = "Not the reporter", body = crate::error::ErrorResponse),
        (status = 409, description = "Repair not completed or already closed", body = crate::error::ErrorResponse)
    )
)]
pub async fn confirm_fault(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<FaultRecord>> {
    let fault = state.services.faults.confirm(&principal, id).await?;
    Ok(Json(fault))
}
