//! Device (medical equipment) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::lifecycle::metrics::{compute_metrics, ReliabilityMetrics};

/// Device record with its reliability counters
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Device {
    pub id: Uuid,
    /// Inventory code, unique across devices
    pub code: String,
    pub device_type: String,
    pub location: String,
    pub floor: Option<String>,
    pub asset_name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub quantity: i32,
    pub total_failures: i32,
    /// Observation window in hours (one year by default)
    pub total_operating_hours: f64,
    /// Accumulated downtime in hours
    pub total_repair_hours: f64,
    pub mtbf: f64,
    pub mttr: f64,
    /// Percentage in 0..=100 for sane counters
    pub availability: f64,
    pub created_at: DateTime<Utc>,
    pub version: i64,
}

impl Device {
    pub fn new(data: &CreateDevice, default_operating_hours: f64, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: data.code.trim().to_string(),
            device_type: data.device_type.clone(),
            location: data.location.clone(),
            floor: data.floor.clone(),
            asset_name: data.asset_name.clone(),
            brand: data.brand.clone(),
            model: data.model.clone(),
            serial_number: data.serial_number.clone(),
            quantity: data.quantity.unwrap_or(1),
            total_failures: 0,
            total_operating_hours: data.total_operating_hours.unwrap_or(default_operating_hours),
            total_repair_hours: 0.0,
            mtbf: 0.0,
            mttr: 0.0,
            availability: 100.0,
            created_at: now,
            version: 0,
        }
    }

    /// Metrics derived from the current counters
    pub fn metrics(&self) -> ReliabilityMetrics {
        compute_metrics(
            self.total_failures,
            self.total_operating_hours,
            self.total_repair_hours,
        )
    }

    /// Count a new failure and return the new total
    pub(crate) fn record_failure(&mut self) -> i32 {
        self.total_failures += 1;
        self.total_failures
    }

    /// Add downtime and refresh the derived metrics
    pub(crate) fn record_repair(&mut self, hours: f64) {
        self.total_repair_hours += hours;
        let metrics = self.metrics();
        self.mtbf = metrics.mtbf;
        self.mttr = metrics.mttr;
        self.availability = metrics.availability;
    }
}

/// Create device request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDevice {
    #[validate(length(min = 1, message = "Device code is required"))]
    pub code: String,
    #[serde(alias = "type")]
    #[validate(length(min = 1, message = "Device type is required"))]
    pub device_type: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    /// Defaults to the configured window (8760 hours)
    #[validate(range(min = 0.0, message = "Operating hours cannot be negative"))]
    pub total_operating_hours: Option<f64>,
    pub floor: Option<String>,
    pub asset_name: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: Option<i32>,
}
