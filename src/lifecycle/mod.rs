//! Maintenance state machines.
//!
//! Everything here is synchronous and storage independent: a transition takes
//! the principal, the entities as read from the store and the current time,
//! and either returns the new state of every touched entity or a
//! [`Rejection`] naming the violated rule. Inputs are never mutated.

pub mod fault;
pub mod metrics;
pub mod policy;
pub mod transfer;

use thiserror::Error;

use crate::models::{Role, TransferStatus};

pub use fault::FaultTransition;
pub use metrics::{compute_metrics, ReliabilityMetrics};
pub use policy::{Action, FaultScope};
pub use transfer::TransferTransition;

/// Broad category of a rejection, used to pick the response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    NotFound,
    Forbidden,
    InvalidState,
    Validation,
}

/// A transition precondition that did not hold
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Role {} may not {}", .role.as_str(), .action.description())]
    ForbiddenRole { action: Action, role: Role },

    #[error("Fault is not assigned to you")]
    WrongAssignee,

    #[error("Only the user who reported the fault can confirm it")]
    NotCreator,

    #[error("Faults can only be assigned to technicians")]
    InvalidAssignee,

    #[error("Repair already started")]
    AlreadyStarted,

    #[error("Repair not started")]
    NotStarted,

    #[error("Repair already ended")]
    AlreadyEnded,

    #[error("Repair not completed yet")]
    NotRepaired,

    #[error("Fault is already closed")]
    AlreadyClosed,

    #[error("Transfer is {} and can no longer be reviewed", .0.as_str())]
    TransferNotPending(TransferStatus),

    #[error("{0}")]
    Invalid(String),
}

impl Rejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Rejection::NotFound(_) => RejectionKind::NotFound,
            Rejection::ForbiddenRole { .. } | Rejection::WrongAssignee | Rejection::NotCreator => {
                RejectionKind::Forbidden
            }
            Rejection::InvalidAssignee | Rejection::Invalid(_) => RejectionKind::Validation,
            Rejection::AlreadyStarted
            | Rejection::NotStarted
            | Rejection::AlreadyEnded
            | Rejection::NotRepaired
            | Rejection::AlreadyClosed
            | Rejection::TransferNotPending(_) => RejectionKind::InvalidState,
        }
    }

    /// Stable rule name reported to clients
    pub fn rule(&self) -> &'static str {
        match self {
            Rejection::NotFound(_) => "not_found",
            Rejection::ForbiddenRole { .. } => "forbidden_role",
            Rejection::WrongAssignee => "wrong_assignee",
            Rejection::NotCreator => "not_creator",
            Rejection::InvalidAssignee => "invalid_assignee",
            Rejection::AlreadyStarted => "already_started",
            Rejection::NotStarted => "not_started",
            Rejection::AlreadyEnded => "already_ended",
            Rejection::NotRepaired => "not_repaired",
            Rejection::AlreadyClosed => "already_closed",
            Rejection::TransferNotPending(_) => "transfer_not_pending",
            Rejection::Invalid(_) => "validation",
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by the lifecycle and service tests

    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    use crate::models::{CreateDevice, Device, Principal, Role, User};

    pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, hour, minute, 0).unwrap()
    }

    pub fn principal(role: Role, name: &str) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            name: name.to_string(),
            role,
        }
    }

    pub fn user(principal: &Principal) -> User {
        User {
            id: principal.id,
            name: principal.name.clone(),
            email: format!("{}@hospital.test", principal.name.to_lowercase()),
            password: String::new(),
            role: principal.role,
            successful_repairs: 0,
            failed_repairs: 0,
            created_at: at(0, 0),
        }
    }

    pub fn new_device(code: &str) -> CreateDevice {
        CreateDevice {
            code: code.to_string(),
            device_type: "Infusion pump".to_string(),
            location: "ICU".to_string(),
            total_operating_hours: None,
            floor: None,
            asset_name: None,
            brand: None,
            model: None,
            serial_number: None,
            quantity: None,
        }
    }

    pub fn device(code: &str) -> Device {
        Device::new(&new_device(code), 8760.0, at(0, 0))
    }
}
