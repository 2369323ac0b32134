//! Equipment transfer service

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    lifecycle::{
        transfer::{self, TransferTransition},
        Action, Rejection,
    },
    models::{CreateTransfer, Device, EquipmentTransfer, Principal, RejectTransfer, TransferStatus},
    repository::SharedStore,
};

use super::rejected;

#[derive(Clone)]
pub struct TransfersService {
    store: SharedStore,
}

impl TransfersService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    async fn load_transfer(&self, actor: &Principal, action: Action, id: Uuid) -> AppResult<EquipmentTransfer> {
        self.store
            .get_transfer(id)
            .await?
            .ok_or_else(|| rejected(action, actor, Rejection::NotFound("Transfer")))
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
        outcome: Result<TransferTransition, Rejection>,
    ) -> AppResult<EquipmentTransfer> {
        let transition = outcome.map_err(|r| rejected(action, actor, r))?;
        let transfer = transition.transfer.clone();
        self.store.commit(transition.into()).await?;

        tracing::info!(
            transfer_id = %transfer.id,
            device_id = %transfer.device_id,
            status = %transfer.status,
            user_id = %actor.id,
            "Committed: {}",
            action.description()
        );
        Ok(transfer)
    }

    pub async fn create(&self, actor: &Principal, data: CreateTransfer) -> AppResult<EquipmentTransfer> {
        let action = Action::RequestTransfer;
        actor.require(action).map_err(|r| rejected(action, actor, r))?;
        data.validate()?;

        let device = self.load_device(actor, action, data.device_id).await?;
        let outcome = transfer::request(actor, &device, &data, Utc::now());
        self.apply(action, actor, outcome).await
    }

    /// Approve a pending transfer and move the device
    pub async fn approve(&self, actor: &Principal, id: Uuid) -> AppResult<EquipmentTransfer> {
        let action = Action::ApproveTransfer;
        actor.require(action).map_err(|r| rejected(action, actor, r))?;

        let record = self.load_transfer(actor, action, id).await?;
        let device = self.load_device(actor, action, record.device_id).await?;
        let outcome = transfer::approve(actor, &record, &device, Utc::now());
        self.apply(action, actor, outcome).await
    }

    pub async fn reject(&self, actor: &Principal, id: Uuid, data: RejectTransfer) -> AppResult<EquipmentTransfer> {
        let action = Action::RejectTransfer;
        actor.require(action).map_err(|r| rejected(action, actor, r))?;
        if data.rejection_reason.trim().is_empty() {
            return Err(rejected(
                action,
                actor,
                Rejection::Invalid("Rejection reason is required".to_string()),
            ));
        }

        let record = self.load_transfer(actor, action, id).await?;
        let outcome = transfer::reject(actor, &record, &data, Utc::now());
        self.apply(action, actor, outcome).await
    }

    pub async fn list(&self, status: Option<TransferStatus>) -> AppResult<Vec<EquipmentTransfer>> {
        self.store.list_transfers(status).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<EquipmentTransfer> {
        self.store
            .get_transfer(id)
            .await?
            .ok_or_else(|| AppError::Rejected(Rejection::NotFound("Transfer")))
    }
}
