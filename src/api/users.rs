//! User listing endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{Role, User},
};

use super::AuthenticatedUser;

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    pub role: Option<Role>,
}

/// List users (manager and quality only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "List of users", body = Vec<User>),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<User>>> {
    let users = state.services.users.list_users(&principal, query.role).await?;
    Ok(Json(users))
}

/// List technicians available for assignment
#[utoipa::path(
    get,
    path = "/users/technicians",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of technicians", body = Vec<User>)
    )
)]
pub async fn list_technicians(
    State(state): State<crate::AppState>,
    _auth: AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    let technicians = state.services.users.list_technicians().await?;
    Ok(Json(technicians))
}
