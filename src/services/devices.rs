//! Device inventory service

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    lifecycle::Action,
    models::{CreateDevice, Device, FaultRecord, Principal},
    repository::{ChangeSet, FaultFilter, SharedStore},
};

use super::rejected;

#[derive(Clone)]
pub struct DevicesService {
    store: SharedStore,
    default_operating_hours: f64,
}

impl DevicesService {
    pub fn new(store: SharedStore, default_operating_hours: f64) -> Self {
        Self {
            store,
            default_operating_hours,
        }
    }

    pub async fn create(&self, actor: &Principal, data: CreateDevice) -> AppResult<Device> {
        actor
            .require(Action::CreateDevice)
            .map_err(|r| rejected(Action::CreateDevice, actor, r))?;
        data.validate()?;

        let code = data.code.trim();
        if self.store.find_device_by_code(code).await?.is_some() {
            return Err(AppError::Conflict(format!("Device code {} already exists", code)));
        }

        let device = Device::new(&data, self.default_operating_hours, Utc::now());
        self.store.commit(ChangeSet::device(device.clone())).await?;

        tracing::info!(device_id = %device.id, code = %device.code, "Device created");
        Ok(device)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Device> {
        self.store
            .get_device(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Device with id {} not found", id)))
    }

    pub async fn list(&self) -> AppResult<Vec<Device>> {
        self.store.list_devices().await
    }

    /// Fault history of one device, newest first
    pub async fn faults(&self, id: Uuid) -> AppResult<Vec<FaultRecord>> {
        let device = self.get(id).await?;
        let filter = FaultFilter {
            device_id: Some(device.id),
            ..Default::default()
        };
        self.store.list_faults(&filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testing::{new_device, principal};
    use crate::models::Role;
    use crate::repository::MemoryStore;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    fn service() -> DevicesService {
        DevicesService::new(Arc::new(MemoryStore::new()), 8760.0)
    }

    #[tokio::test]
    async fn test_create_device_defaults() {
        let devices = service();
        let manager = principal(Role::Manager, "Boss");
        let device = devices.create(&manager, new_device("ECG-01")).await.unwrap();

        assert_eq!(device.total_failures, 0);
        assert_eq!(device.total_operating_hours, 8760.0);
        assert_eq!(device.availability, 100.0);
        assert_eq!(device.quantity, 1);
        assert_eq!(devices.get(device.id).await.unwrap().code, "ECG-01");
    }

    #[tokio::test]
    async fn test_create_device_rules() {
        let devices = service();
        let tech = principal(Role::Technician, "Tech");
        devices.create(&tech, new_device("ECG-01")).await.unwrap();

        assert_matches!(
            devices.create(&tech, new_device("ECG-01")).await,
            Err(AppError::Conflict(_))
        );
        assert_matches!(
            devices.create(&principal(Role::HealthStaff, "Nurse"), new_device("ECG-02")).await,
            Err(AppError::Rejected(_))
        );

        let mut negative = new_device("ECG-03");
        negative.total_operating_hours = Some(-1.0);
        assert_matches!(devices.create(&tech, negative).await, Err(AppError::Validation(_)));
        assert_eq!(devices.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_device() {
        assert_matches!(service().faults(Uuid::new_v4()).await, Err(AppError::NotFound(_)));
    }
}
