//! Dashboard, report and quality endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        report::{
            BreakdownFrequencyRow, DashboardStats, FacilityIssuesReport, FailureFrequencyReport,
            InterventionDurationRow, LocationInterventionReport, SystemStats,
            TechnicianPerformanceRow, YearQuery,
        },
        LogEntry,
    },
};

use super::AuthenticatedUser;

/// Dashboard summary
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats)
    )
)]
pub async fn dashboard_stats(
    State(state): State<crate::AppState>,
    _auth: AuthenticatedUser,
) -> AppResult<Json<DashboardStats>> {
    Ok(Json(state.services.reports.dashboard().await?))
}

/// Operating hours per failure, per device
#[utoipa::path(
    get,
    path = "/reports/breakdown-frequency",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Breakdown frequency", body = Vec<BreakdownFrequencyRow>),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn breakdown_frequency(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Vec<BreakdownFrequencyRow>>> {
    Ok(Json(state.services.reports.breakdown_frequency(&principal).await?))
}

/// Average repair duration of closed faults, per device
#[utoipa::path(
    get,
    path = "/reports/intervention-duration",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Intervention durations", body = Vec<InterventionDurationRow>),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn intervention_duration(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Vec<InterventionDurationRow>>> {
    Ok(Json(state.services.reports.intervention_duration(&principal).await?))
}

#[utoipa::path(
    get,
    path = "/reports/technician-performance",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Technician performance", body = Vec<TechnicianPerformanceRow>),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn technician_performance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Vec<TechnicianPerformanceRow>>> {
    Ok(Json(state.services.reports.technician_performance(&principal).await?))
}

/// Monthly fault counts per device for one year
#[utoipa::path(
    get,
    path = "/reports/annual/failure-frequency",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(YearQuery),
    responses(
        (status = 200, description = "Failure frequency", body = FailureFrequencyReport),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn annual_failure_frequency(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<YearQuery>,
) -> AppResult<Json<FailureFrequencyReport>> {
    Ok(Json(
        state.services.reports.failure_frequency(&principal, query.year).await?,
    ))
}

/// Quarterly repair durations per location for one year
#[utoipa::path(
    get,
    path = "/reports/annual/intervention-duration",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(YearQuery),
    responses(
        (status = 200, description = "Intervention durations by location", body = LocationInterventionReport),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn annual_intervention_duration(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<YearQuery>,
) -> AppResult<Json<LocationInterventionReport>> {
    Ok(Json(
        state
            .services
            .reports
            .intervention_duration_by_location(&principal, query.year)
            .await?,
    ))
}

/// Facility-caused faults per month for one year
#[utoipa::path(
    get,
    path = "/reports/annual/facility-issues",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(YearQuery),
    responses(
        (status = 200, description = "Facility issues", body = FacilityIssuesReport),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn annual_facility_issues(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<YearQuery>,
) -> AppResult<Json<FacilityIssuesReport>> {
    Ok(Json(
        state.services.reports.facility_issues(&principal, query.year).await?,
    ))
}

/// Latest audit log entries (quality only)
#[utoipa::path(
    get,
    path = "/quality/logs",
    tag = "quality",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Audit log, newest first", body = Vec<LogEntry>),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn audit_log(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Vec<LogEntry>>> {
    Ok(Json(state.services.reports.audit_log(&principal).await?))
}

#[utoipa::path(
    get,
    path = "/quality/system-stats",
    tag = "quality",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "System totals", body = SystemStats),
        (status = 403, description = "Role not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn system_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<SystemStats>> {
    Ok(Json(state.services.reports.system_stats(&principal).await?))
}
