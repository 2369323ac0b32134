//! Equipment transfer lifecycle: pending -> completed | rejected.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{policy::Action, Rejection};
use crate::models::{
    CreateTransfer, Device, EquipmentTransfer, LogEntry, Principal, RejectTransfer, TransferStatus,
};

/// Result of an accepted transfer transition
#[derive(Debug, Clone)]
pub struct TransferTransition {
    pub transfer: EquipmentTransfer,
    /// Relocated device, on approval only
    pub device: Option<Device>,
    pub log: LogEntry,
}

fn require_pending(transfer: &EquipmentTransfer) -> Result<(), Rejection> {
    match transfer.status {
        TransferStatus::Pending => Ok(()),
        status => Err(Rejection::TransferNotPending(status)),
    }
}

pub fn request(
    actor: &Principal,
    device: &Device,
    data: &CreateTransfer,
    now: DateTime<Utc>,
) -> Result<TransferTransition, Rejection> {
    actor.require(Action::RequestTransfer)?;
    if data.to_location.trim().is_empty() {
        return Err(Rejection::Invalid("Destination is required".to_string()));
    }
    if data.reason.trim().is_empty() {
        return Err(Rejection::Invalid("Reason is required".to_string()));
    }

    let transfer = EquipmentTransfer {
        id: Uuid::new_v4(),
        device_id: device.id,
        device_code: device.code.clone(),
        device_type: device.device_type.clone(),
        from_location: device.location.clone(),
        to_location: data.to_location.clone(),
        requested_by: actor.id,
        requested_by_name: actor.name.clone(),
        requested_at: now,
        reason: data.reason.clone(),
        status: TransferStatus::Pending,
        approved_by: None,
        approved_by_name: None,
        approved_at: None,
        rejection_reason: None,
        completed_at: None,
        version: 0,
    };

    let log = LogEntry::new(
        transfer.id,
        format!(
            "Transfer requested: {} from {} to {}",
            transfer.device_code, transfer.from_location, transfer.to_location
        ),
        actor,
        now,
    );
    Ok(TransferTransition {
        transfer,
        device: None,
        log,
    })
}

/// Approve and complete the move in one step.
pub fn approve(
    actor: &Principal,
    transfer: &EquipmentTransfer,
    device: &Device,
    now: DateTime<Utc>,
) -> Result<TransferTransition, Rejection> {
    actor.require(Action::ApproveTransfer)?;
    require_pending(transfer)?;

    let mut transfer = transfer.clone();
    transfer.approved_by = Some(actor.id);
    transfer.approved_by_name = Some(actor.name.clone());
    transfer.approved_at = Some(now);
    transfer.status = TransferStatus::Completed;
    transfer.completed_at = Some(now);
    transfer.version += 1;

    let mut device = device.clone();
    device.location = transfer.to_location.clone();
    device.version += 1;

    let log = LogEntry::new(
        transfer.id,
        format!("Transfer approved: {} moved to {}", device.code, device.location),
        actor,
        now,
    );
    Ok(TransferTransition {
        transfer,
        device: Some(device),
        log,
    })
}

pub fn reject(
    actor: &Principal,
    transfer: &EquipmentTransfer,
    data: &RejectTransfer,
    now: DateTime<Utc>,
) -> Result<TransferTransition, Rejection> {
    actor.require(Action::RejectTransfer)?;
    let reason = data.rejection_reason.trim();
    if reason.is_empty() {
        return Err(Rejection::Invalid("Rejection reason is required".to_string()));
    }
    require_pending(transfer)?;

    let mut transfer = transfer.clone();
    transfer.approved_by = Some(actor.id);
    transfer.approved_by_name = Some(actor.name.clone());
    transfer.approved_at = Some(now);
    transfer.rejection_reason = Some(reason.to_string());
    transfer.status = TransferStatus::Rejected;
    transfer.version += 1;

    let log = LogEntry::new(transfer.id, format!("Transfer rejected: {}", reason), actor, now);
    Ok(TransferTransition {
        transfer,
        device: None,
        log,
    })
}
