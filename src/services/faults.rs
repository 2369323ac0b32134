//! Fault service: loads entities, runs the fault lifecycle and commits the
//! result.

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    lifecycle::{
        fault::{self, FaultTransition},
        policy::{fault_scope, FaultScope},
        Action, Rejection,
    },
    models::{AssignFault, CreateFault, Device, EndRepair, FaultRecord, FaultStatus, Principal},
    repository::{FaultFilter, SharedStore},
};

use super::rejected;

#[derive(Clone)]
pub struct FaultsService {
    store: SharedStore,
}

impl FaultsService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    async fn load_fault(&self, actor: &Principal, action: Action, id: Uuid) -> AppResult<FaultRecord> {
        self.store
            .get_fault(id)
            .await?
            .ok_or_else(|| rejected(action, actor, Rejection::NotFound("Fault")))
    }

    async fn load_device(&self, actor: &Principal, action: Action, id: Uuid) -> AppResult<Device> {
        self.store
            .get_device(id)
            .await?
            .ok_or_else(|| rejected(action, actor, Rejection::NotFound("Device")))
    }

    async fn apply(
        &self,
        action: Action,
        actor: &Principal,
        outcome: Result<FaultTransition, Rejection>,
    ) -> AppResult<FaultRecord> {
        let transition = outcome.map_err(|r| rejected(action, actor, r))?;
        let fault = transition.fault.clone();
        self.store.commit(transition.into()).await?;

        tracing::info!(
            fault_id = %fault.id,
            device_id = %fault.device_id,
            status = %fault.status,
            user_id = %actor.id,
            "Committed: {}",
            action.description()
        );
        Ok(fault)
    }

    fn authorize(actor: &Principal, action: Action) -> AppResult<()> {
        actor.require(action).map_err(|r| rejected(action, actor, r))
    }

    /// Report a fault on a device
    pub async fn create(&self, actor: &Principal, data: CreateFault) -> AppResult<FaultRecord> {
        let action = Action::ReportFault;
        Self::authorize(actor, action)?;
        data.validate()?;

        let device = self.load_device(actor, action, data.device_id).await?;
        let outcome = fault::create(actor, &device, &data, Utc::now());
        self.apply(action, actor, outcome).await
    }

    pub async fn assign(&self, actor: &Principal, id: Uuid, data: AssignFault) -> AppResult<FaultRecord> {
        let action = Action::AssignFault;
        Self::authorize(actor, action)?;

        let record = self.load_fault(actor, action, id).await?;
        let technician = self.store.get_user(data.assigned_to).await?;
        let outcome = fault::assign(actor, &record, technician.as_ref(), Utc::now());
        self.apply(action, actor, outcome).await
    }

    pub async fn start_repair(&self, actor: &Principal, id: Uuid) -> AppResult<FaultRecord> {
        let action = Action::StartRepair;
        Self::authorize(actor, action)?;

        let record = self.load_fault(actor, action, id).await?;
        let outcome = fault::start_repair(actor, &record, Utc::now());
        self.apply(action, actor, outcome).await
    }

    pub async fn end_repair(&self, actor: &Principal, id: Uuid, data: EndRepair) -> AppResult<FaultRecord> {
        let action = Action::EndRepair;
        Self::authorize(actor, action)?;
        fault::validate_repair_report(&data).map_err(|r| rejected(action, actor, r))?;

        let record = self.load_fault(actor, action, id).await?;
        let device = self.load_device(actor, action, record.device_id).await?;
        let outcome = fault::end_repair(actor, &record, &device, &data, Utc::now());
        self.apply(action, actor, outcome).await
    }

    pub async fn confirm(&self, actor: &Principal, id: Uuid) -> AppResult<FaultRecord> {
        let action = Action::ConfirmFault;
        Self::authorize(actor, action)?;

        let record = self.load_fault(actor, action, id).await?;
        let outcome = fault::confirm(actor, &record, Utc::now());
        self.apply(action, actor, outcome).await
    }

    /// Faults visible to the caller: technicians see their assignments,
    /// health staff their own reports, managers and quality everything.
    pub async fn list(&self, actor: &Principal, status: Option<FaultStatus>) -> AppResult<Vec<FaultRecord>> {
        let mut filter = FaultFilter {
            status,
            ..Default::default()
        };
        match fault_scope(actor) {
            FaultScope::All => {}
            FaultScope::AssignedTo(id) => filter.assigned_to = Some(id),
            FaultScope::CreatedBy(id) => filter.created_by = Some(id),
        }
        self.store.list_faults(&filter).await
    }

    pub async fn list_all(&self, actor: &Principal, status: Option<FaultStatus>) -> AppResult<Vec<FaultRecord>> {
        Self::authorize(actor, Action::ViewAllFaults)?;
        let filter = FaultFilter {
            status,
            ..Default::default()
        };
        self.store.list_faults(&filter).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<FaultRecord> {
        self.store
            .get_fault(id)
            .await?
            .ok_or_else(|| AppError::Rejected(Rejection::NotFound("Fault")))
    }
}
