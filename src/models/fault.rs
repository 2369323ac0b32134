//! Fault record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Fault status. Moves forward only: open -> in_progress -> closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FaultStatus {
    Open,
    InProgress,
    Closed,
}

impl FaultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultStatus::Open => "open",
            FaultStatus::InProgress => "in_progress",
            FaultStatus::Closed => "closed",
        }
    }
}

impl std::str::FromStr for FaultStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(FaultStatus::Open),
            "in_progress" => Ok(FaultStatus::InProgress),
            "closed" => Ok(FaultStatus::Closed),
            _ => Err(format!("Invalid fault status: {}", s)),
        }
    }
}

text_enum!(FaultStatus);

/// Kind of work done to clear a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RepairCategory {
    PartReplacement,
    Adjustment,
    CompleteRepair,
    Other,
}

impl RepairCategory {
    pub const ALL: [RepairCategory; 4] = [
        RepairCategory::PartReplacement,
        RepairCategory::Adjustment,
        RepairCategory::CompleteRepair,
        RepairCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RepairCategory::PartReplacement => "part_replacement",
            RepairCategory::Adjustment => "adjustment",
            RepairCategory::CompleteRepair => "complete_repair",
            RepairCategory::Other => "other",
        }
    }
}

impl std::str::FromStr for RepairCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RepairCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("Invalid repair category: {}", s))
    }
}

text_enum!(RepairCategory);

/// Fault record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FaultRecord {
    pub id: Uuid,
    pub device_id: Uuid,
    /// Device code at the time the fault was reported
    pub device_code: String,
    pub device_type: String,
    pub created_by: Uuid,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    pub description: String,
    pub status: FaultStatus,
    pub assigned_to: Option<Uuid>,
    pub assigned_to_name: Option<String>,
    pub repair_start: Option<DateTime<Utc>>,
    pub repair_end: Option<DateTime<Utc>>,
    /// Hours between repair_start and repair_end, unrounded
    pub repair_duration: f64,
    pub repair_notes: String,
    pub repair_category: Option<RepairCategory>,
    /// Device failure count when this fault was reported
    pub breakdown_iteration: i32,
    pub confirmed_by: Option<Uuid>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub version: i64,
}

/// Report a fault
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateFault {
    pub device_id: Uuid,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

/// Assign a fault to a technician
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignFault {
    pub assigned_to: Uuid,
}

/// Finish a repair
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EndRepair {
    /// At least 20 characters
    #[serde(default)]
    pub repair_notes: String,
    /// One of part_replacement, adjustment, complete_repair, other
    pub repair_category: Option<String>,
}

/// Query parameters for fault lists
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct FaultQuery {
    pub status: Option<FaultStatus>,
}
