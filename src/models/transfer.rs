//! Equipment transfer model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Transfer status. Approval completes the move in the same step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Approved => "approved",
            TransferStatus::Rejected => "rejected",
            TransferStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for TransferStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransferStatus::Pending),
            "approved" => Ok(TransferStatus::Approved),
            "rejected" => Ok(TransferStatus::Rejected),
            "completed" => Ok(TransferStatus::Completed),
            _ => Err(format!("Invalid transfer status: {}", s)),
        }
    }
}

text_enum!(TransferStatus);

/// Request to move a device to another location
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EquipmentTransfer {
    pub id: Uuid,
    pub device_id: Uuid,
    pub device_code: String,
    pub device_type: String,
    pub from_location: String,
    pub to_location: String,
    pub requested_by: Uuid,
    pub requested_by_name: String,
    pub requested_at: DateTime<Utc>,
    pub reason: String,
    pub status: TransferStatus,
    /// Reviewer, set on approval and on rejection
    pub approved_by: Option<Uuid>,
    pub approved_by_name: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub version: i64,
}

/// Create transfer request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTransfer {
    pub device_id: Uuid,
    #[validate(length(min = 1, message = "Destination is required"))]
    pub to_location: String,
    #[validate(length(min = 1, message = "Reason is required"))]
    pub reason: String,
}

/// Reject transfer request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RejectTransfer {
    #[serde(default)]
    pub rejection_reason: String,
}

/// Query parameters for transfer lists
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct TransferQuery {
    pub status: Option<TransferStatus>,
}
