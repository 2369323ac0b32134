//! Report and dashboard payloads

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Dashboard summary
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_devices: i64,
    pub total_faults: i64,
    pub open_faults: i64,
    pub in_progress_faults: i64,
    pub closed_faults: i64,
    pub avg_mtbf: f64,
    pub avg_mttr: f64,
    pub avg_availability: f64,
    /// Five devices with the highest availability
    pub most_reliable_devices: Vec<DeviceReliability>,
    /// Five devices with the lowest availability (empty with five devices or fewer)
    pub least_reliable_devices: Vec<DeviceReliability>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeviceReliability {
    pub id: Uuid,
    pub code: String,
    pub device_type: String,
    pub location: String,
    pub availability: f64,
    pub mtbf: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BreakdownFrequencyRow {
    pub device_code: String,
    pub device_type: String,
    pub location: String,
    pub total_failures: i32,
    pub operating_hours: f64,
    /// Operating hours per failure
    pub breakdown_frequency: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InterventionDurationRow {
    pub device_code: String,
    pub device_type: String,
    pub total_interventions: i64,
    pub average_duration_hours: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TechnicianPerformanceRow {
    pub technician_id: Uuid,
    pub name: String,
    pub email: String,
    pub total_assigned: i64,
    pub completed: i64,
    pub successful_repairs: i32,
    pub failed_repairs: i32,
    pub success_rate: f64,
}

/// Year selector for annual reports
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct YearQuery {
    /// Defaults to the current year
    pub year: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FailureFrequencyReport {
    pub year: i32,
    pub rows: Vec<FailureFrequencyRow>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FailureFrequencyRow {
    pub device_code: String,
    pub device_type: String,
    pub location: String,
    /// Faults reported per month, January first
    pub monthly: Vec<i64>,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationInterventionReport {
    pub year: i32,
    pub rows: Vec<LocationInterventionRow>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationInterventionRow {
    pub location: String,
    /// Average repair duration per quarter, in hours
    pub quarter_average_hours: Vec<f64>,
    /// Same averages as MM:SS
    pub quarter_average: Vec<String>,
    pub yearly_average_hours: f64,
    pub yearly_average: String,
    pub total_faults: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FacilityIssuesReport {
    pub year: i32,
    pub months: Vec<FacilityIssuesMonth>,
    pub total_faults: i64,
    pub total_duration_hours: f64,
    pub total_duration: String,
    pub average_duration_hours: f64,
    pub average_duration: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FacilityIssuesMonth {
    /// 1 = January
    pub month: u32,
    pub fault_count: i64,
    pub total_duration_hours: f64,
    pub total_duration: String,
    pub average_duration_hours: f64,
    pub average_duration: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SystemStats {
    pub total_users: i64,
    pub total_devices: i64,
    pub total_faults: i64,
    pub total_transfers: i64,
    pub pending_transfers: i64,
}
