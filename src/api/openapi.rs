//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, devices, faults, health, reports, transfers, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MedEquip API",
        version = "1.0.0",
        description = "Hospital medical equipment maintenance REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Users
        users::list_users,
        users::list_technicians,
        // Devices
        devices::list_devices,
        devices::get_device,
        devices::create_device,
        devices::list_device_faults,
        // Faults
        faults::list_faults,
        faults::list_all_faults,
        faults::get_fault,
        faults::create_fault,
        faults::assign_fault,
        faults::start_repair,
        faults::end_repair,
        faults::confirm_fault,
        // Transfers
        transfers::list_transfers,
        transfers::get_transfer,
        transfers::create_transfer,
        transfers::approve_transfer,
        transfers::reject_transfer,
        // Reports
        reports::dashboard_stats,
        reports::breakdown_frequency,
        reports::intervention_duration,
        reports::technician_performance,
        reports::annual_failure_frequency,
        reports::annual_intervention_duration,
        reports::annual_facility_issues,
        // Quality
        reports::audit_log,
        reports::system_stats,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Users
            crate::models::user::Role,
            crate::models::user::User,
            crate::models::user::RegisterUser,
            users::UserQuery,
            // Devices
            crate::models::device::Device,
            crate::models::device::CreateDevice,
            // Faults
            crate::models::fault::FaultStatus,
            crate::models::fault::RepairCategory,
            crate::models::fault::FaultRecord,
            crate::models::fault::CreateFault,
            crate::models::fault::AssignFault,
            crate::models::fault::EndRepair,
            crate::models::fault::FaultQuery,
            // Transfers
            crate::models::transfer::TransferStatus,
            crate::models::transfer::EquipmentTransfer,
            crate::models::transfer::CreateTransfer,
            crate::models::transfer::RejectTransfer,
            crate::models::transfer::TransferQuery,
            // Reports
            crate::models::report::DashboardStats,
            crate::models::report::DeviceReliability,
            crate::models::report::BreakdownFrequencyRow,
            crate::models::report::InterventionDurationRow,
            crate::models::report::TechnicianPerformanceRow,
            crate::models::report::YearQuery,
            crate::models::report::FailureFrequencyReport,
            crate::models::report::FailureFrequencyRow,
            crate::models::report::LocationInterventionReport,
            crate::models::report::LocationInterventionRow,
            crate::models::report::FacilityIssuesReport,
            crate::models::report::FacilityIssuesMonth,
            crate::models::report::SystemStats,
            crate::models::log::LogEntry,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and authentication"),
        (name = "users", description = "User lookups"),
        (name = "devices", description = "Medical device inventory"),
        (name = "faults", description = "Fault reporting and repair lifecycle"),
        (name = "transfers", description = "Device transfers between locations"),
        (name = "reports", description = "Dashboard and reliability reports"),
        (name = "quality", description = "Quality department tools")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
