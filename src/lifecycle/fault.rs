//! Fault lifecycle: open -> in_progress -> closed.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    metrics::repair_hours_between,
    policy::{require_assignee, require_creator, Action},
    Rejection,
};
use crate::models::{
    CreateFault, Device, EndRepair, FaultRecord, FaultStatus, LogEntry, Principal, RepairCategory,
    Role, User,
};

/// Minimum length of the repair notes, in characters
pub const MIN_REPAIR_NOTES: usize = 20;

/// Result of an accepted fault transition
#[derive(Debug, Clone)]
pub struct FaultTransition {
    pub fault: FaultRecord,
    /// Device with updated counters, when the transition touches them
    pub device: Option<Device>,
    /// Technician whose successful repair count goes up by one
    pub credited_technician: Option<Uuid>,
    pub log: LogEntry,
}

impl FaultTransition {
    fn new(fault: FaultRecord, event: String, actor: &Principal, now: DateTime<Utc>) -> Self {
        let log = LogEntry::new(fault.id, event, actor, now);
        Self {
            fault,
            device: None,
            credited_technician: None,
            log,
        }
    }
}

/// Report a new fault against `device`.
pub fn create(
    actor: &Principal,
    device: &Device,
    data: &CreateFault,
    now: DateTime<Utc>,
) -> Result<FaultTransition, Rejection> {
    actor.require(Action::ReportFault)?;
    if data.description.trim().is_empty() {
        return Err(Rejection::Invalid("Description is required".to_string()));
    }

    let mut device = device.clone();
    let breakdown_iteration = device.record_failure();
    device.version += 1;

    let fault = FaultRecord {
        id: Uuid::new_v4(),
        device_id: device.id,
        device_code: device.code.clone(),
        device_type: device.device_type.clone(),
        created_by: actor.id,
        created_by_name: actor.name.clone(),
        created_at: now,
        description: data.description.clone(),
        status: FaultStatus::Open,
        assigned_to: None,
        assigned_to_name: None,
        repair_start: None,
        repair_end: None,
        repair_duration: 0.0,
        repair_notes: String::new(),
        repair_category: None,
        breakdown_iteration,
        confirmed_by: None,
        confirmed_at: None,
        version: 0,
    };

    let event = format!("Fault reported: {}", fault.description);
    let mut transition = FaultTransition::new(fault, event, actor, now);
    transition.device = Some(device);
    Ok(transition)
}

/// Assign the fault to a technician. `technician` is the looked-up target
/// user, `None` when no such user exists.
pub fn assign(
    actor: &Principal,
    fault: &FaultRecord,
    technician: Option<&User>,
    now: DateTime<Utc>,
) -> Result<FaultTransition, Rejection> {
    actor.require(Action::AssignFault)?;
    let technician = technician.ok_or(Rejection::NotFound("Technician"))?;
    if technician.role != Role::Technician {
        return Err(Rejection::InvalidAssignee);
    }
    if fault.status == FaultStatus::Closed {
        return Err(Rejection::AlreadyClosed);
    }

    let mut fault = fault.clone();
    fault.assigned_to = Some(technician.id);
    fault.assigned_to_name = Some(technician.name.clone());
    fault.status = FaultStatus::InProgress;
    fault.version += 1;

    let event = format!("Assigned to technician: {}", technician.name);
    Ok(FaultTransition::new(fault, event, actor, now))
}

pub fn start_repair(
    actor: &Principal,
    fault: &FaultRecord,
    now: DateTime<Utc>,
) -> Result<FaultTransition, Rejection> {
    actor.require(Action::StartRepair)?;
    require_assignee(actor, fault.assigned_to)?;
    if fault.repair_start.is_some() {
        return Err(Rejection::AlreadyStarted);
    }

    let mut fault = fault.clone();
    fault.repair_start = Some(now);
    fault.version += 1;

    Ok(FaultTransition::new(fault, "Repair started".to_string(), actor, now))
}

/// Check the repair report and parse its category.
pub fn validate_repair_report(data: &EndRepair) -> Result<RepairCategory, Rejection> {
    let category = match data.repair_category.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => c,
        _ => return Err(Rejection::Invalid("Repair category is required".to_string())),
    };
    let category = category.parse::<RepairCategory>().map_err(Rejection::Invalid)?;

    if data.repair_notes.chars().count() < MIN_REPAIR_NOTES {
        return Err(Rejection::Invalid(format!(
            "Repair notes must be at least {} characters",
            MIN_REPAIR_NOTES
        )));
    }
    Ok(category)
}

/// Finish the repair and add its duration to the device downtime.
pub fn end_repair(
    actor: &Principal,
    fault: &FaultRecord,
    device: &Device,
    data: &EndRepair,
    now: DateTime<Utc>,
) -> Result<FaultTransition, Rejection> {
    actor.require(Action::EndRepair)?;
    let category = validate_repair_report(data)?;
    require_assignee(actor, fault.assigned_to)?;
    let started = fault.repair_start.ok_or(Rejection::NotStarted)?;
    if fault.repair_end.is_some() {
        return Err(Rejection::AlreadyEnded);
    }

    let duration = repair_hours_between(started, now);

    let mut fault = fault.clone();
    fault.repair_end = Some(now);
    fault.repair_duration = duration;
    fault.repair_notes = data.repair_notes.clone();
    fault.repair_category = Some(category);
    fault.version += 1;

    let mut device = device.clone();
    device.record_repair(duration);
    device.version += 1;

    let event = format!("Repair completed ({:.2} hours)", duration);
    let mut transition = FaultTransition::new(fault, event, actor, now);
    transition.device = Some(device);
    Ok(transition)
}

/// Close the fault. Only the reporter may confirm, and doing so credits the
/// assigned technician.
pub fn confirm(
    actor: &Principal,
    fault: &FaultRecord,
    now: DateTime<Utc>,
) -> Result<FaultTransition, Rejection> {
    actor.require(Action::ConfirmFault)?;
    require_creator(actor, fault.created_by)?;
    if fault.status == FaultStatus::Closed {
        return Err(Rejection::AlreadyClosed);
    }
    if fault.repair_end.is_none() {
        return Err(Rejection::NotRepaired);
    }

    let mut fault = fault.clone();
    fault.status = FaultStatus::Closed;
    fault.confirmed_by = Some(actor.id);
    fault.confirmed_at = Some(now);
    fault.version += 1;

    let credited = fault.assigned_to;
    let mut transition = FaultTransition::new(
        fault,
        "Repair confirmed and record closed".to_string(),
        actor,
        now,
    );
    transition.credited_technician = credited;
    Ok(transition)
}
