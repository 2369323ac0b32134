//! In-memory store, used for development and tests

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ChangeSet, FaultFilter, Store, Versioned};
use crate::{
    error::{AppError, AppResult},
    models::{Device, EquipmentTransfer, FaultRecord, LogEntry, Role, TransferStatus, User},
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    devices: HashMap<Uuid, Device>,
    faults: HashMap<Uuid, FaultRecord>,
    transfers: HashMap<Uuid, EquipmentTransfer>,
    logs: Vec<LogEntry>,
}

/// Store keeping every table behind one lock, so a commit is a single
/// critical section.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_version<T: Versioned>(table: &HashMap<Uuid, T>, entity: &T, kind: &str) -> AppResult<()> {
    let current = table.get(&entity.id()).map(Versioned::version);
    if entity.follows(current) {
        Ok(())
    } else {
        Err(AppError::Conflict(format!(
            "{} {} was modified concurrently",
            kind,
            entity.id()
        )))
    }
}

fn newest_first<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_users(&self, role: Option<Role>) -> AppResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn create_user(&self, user: User) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }
        tables.users.insert(user.id, user);
        Ok(())
    }

    async fn get_device(&self, id: Uuid) -> AppResult<Option<Device>> {
        Ok(self.tables.read().await.devices.get(&id).cloned())
    }

    async fn find_device_by_code(&self, code: &str) -> AppResult<Option<Device>> {
        let tables = self.tables.read().await;
        Ok(tables.devices.values().find(|d| d.code == code).cloned())
    }

    async fn list_devices(&self) -> AppResult<Vec<Device>> {
        let tables = self.tables.read().await;
        let mut devices: Vec<Device> = tables.devices.values().cloned().collect();
        devices.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(devices)
    }

    async fn get_fault(&self, id: Uuid) -> AppResult<Option<FaultRecord>> {
        Ok(self.tables.read().await.faults.get(&id).cloned())
    }

    async fn list_faults(&self, filter: &FaultFilter) -> AppResult<Vec<FaultRecord>> {
        let tables = self.tables.read().await;
        let faults = tables
            .faults
            .values()
            .filter(|f| filter.matches(f))
            .cloned()
            .collect();
        Ok(newest_first(faults, |f| f.created_at))
    }

    async fn get_transfer(&self, id: Uuid) -> AppResult<Option<EquipmentTransfer>> {
        Ok(self.tables.read().await.transfers.get(&id).cloned())
    }

    async fn list_transfers(&self, status: Option<TransferStatus>) -> AppResult<Vec<EquipmentTransfer>> {
        let tables = self.tables.read().await;
        let transfers = tables
            .transfers
            .values()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect();
        Ok(newest_first(transfers, |t| t.requested_at))
    }

    async fn list_logs(&self, limit: i64) -> AppResult<Vec<LogEntry>> {
        let tables = self.tables.read().await;
        let logs = newest_first(tables.logs.clone(), |l| l.timestamp);
        Ok(logs.into_iter().take(limit.max(0) as usize).collect())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn commit(&self, changes: ChangeSet) -> AppResult<()> {
        let mut tables = self.tables.write().await;

        for device in &changes.devices {
            check_version(&tables.devices, device, "Device")?;
            let taken = tables
                .devices
                .values()
                .any(|d| d.id != device.id && d.code == device.code);
            if taken {
                return Err(AppError::Conflict(format!(
                    "Device code {} already exists",
                    device.code
                )));
            }
        }
        for fault in &changes.faults {
            check_version(&tables.faults, fault, "Fault")?;
        }
        for transfer in &changes.transfers {
            check_version(&tables.transfers, transfer, "Transfer")?;
        }

        for device in changes.devices {
            tables.devices.insert(device.id, device);
        }
        for fault in changes.faults {
            tables.faults.insert(fault.id, fault);
        }
        for transfer in changes.transfers {
            tables.transfers.insert(transfer.id, transfer);
        }
        for technician in changes.repair_credits {
            match tables.users.get_mut(&technician) {
                Some(user) => user.successful_repairs += 1,
                None => tracing::warn!("Repair credit for unknown user {}", technician),
            }
        }
        tables.logs.extend(changes.logs);

        Ok(())
    }
}
