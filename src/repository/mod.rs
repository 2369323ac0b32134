//! Repository layer: the `Store` trait and its adapters

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    lifecycle::{FaultTransition, TransferTransition},
    models::{
        Device, EquipmentTransfer, FaultRecord, FaultStatus, LogEntry, Role, TransferStatus, User,
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Filter for fault lists. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaultFilter {
    pub status: Option<FaultStatus>,
    pub assigned_to: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub device_id: Option<Uuid>,
}

impl FaultFilter {
    pub fn matches(&self, fault: &FaultRecord) -> bool {
        self.status.map_or(true, |s| fault.status == s)
            && self.assigned_to.map_or(true, |id| fault.assigned_to == Some(id))
            && self.created_by.map_or(true, |id| fault.created_by == id)
            && self.device_id.map_or(true, |id| fault.device_id == id)
    }
}

/// Entity writes produced by one operation, applied all-or-nothing.
///
/// Every entity carries the version it will have once written. A version of
/// zero inserts a new row; anything else requires the stored row to still be
/// at `version - 1`.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub devices: Vec<Device>,
    pub faults: Vec<FaultRecord>,
    pub transfers: Vec<EquipmentTransfer>,
    /// Technicians whose successful repair count goes up by one
    pub repair_credits: Vec<Uuid>,
    pub logs: Vec<LogEntry>,
}

impl ChangeSet {
    pub fn device(device: Device) -> Self {
        Self {
            devices: vec![device],
            ..Default::default()
        }
    }
}

impl From<FaultTransition> for ChangeSet {
    fn from(t: FaultTransition) -> Self {
        Self {
            devices: t.device.into_iter().collect(),
            faults: vec![t.fault],
            transfers: Vec::new(),
            repair_credits: t.credited_technician.into_iter().collect(),
            logs: vec![t.log],
        }
    }
}

impl From<TransferTransition> for ChangeSet {
    fn from(t: TransferTransition) -> Self {
        Self {
            devices: t.device.into_iter().collect(),
            faults: Vec::new(),
            transfers: vec![t.transfer],
            repair_credits: Vec::new(),
            logs: vec![t.log],
        }
    }
}

/// Entities guarded by an optimistic version
pub trait Versioned {
    fn id(&self) -> Uuid;
    fn version(&self) -> i64;

    /// Whether this write may replace the stored row (`None` when absent).
    ///
    /// Version 0 is an insert and needs no stored row; version `n > 0` needs
    /// the row at `n - 1`. Both stores apply this rule.
    fn follows(&self, stored: Option<i64>) -> bool {
        match self.version() {
            0 => stored.is_none(),
            v => stored == Some(v - 1),
        }
    }
}

macro_rules! versioned {
    ($($ty:ty),*) => {
        $(impl Versioned for $ty {
            fn id(&self) -> Uuid {
                self.id
            }

            fn version(&self) -> i64 {
                self.version
            }
        })*
    };
}

versioned!(Device, FaultRecord, EquipmentTransfer);

/// Persistence seam used by the services.
///
/// Lists are ordered: devices by code, faults, transfers and logs newest
/// first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn list_users(&self, role: Option<Role>) -> AppResult<Vec<User>>;
    /// Fails with `Conflict` when the email is taken
    async fn create_user(&self, user: User) -> AppResult<()>;

    async fn get_device(&self, id: Uuid) -> AppResult<Option<Device>>;
    async fn find_device_by_code(&self, code: &str) -> AppResult<Option<Device>>;
    async fn list_devices(&self) -> AppResult<Vec<Device>>;

    async fn get_fault(&self, id: Uuid) -> AppResult<Option<FaultRecord>>;
    async fn list_faults(&self, filter: &FaultFilter) -> AppResult<Vec<FaultRecord>>;

    async fn get_transfer(&self, id: Uuid) -> AppResult<Option<EquipmentTransfer>>;
    async fn list_transfers(&self, status: Option<TransferStatus>) -> AppResult<Vec<EquipmentTransfer>>;

    async fn list_logs(&self, limit: i64) -> AppResult<Vec<LogEntry>>;

    /// Check that the backend answers
    async fn ping(&self) -> AppResult<()>;

    /// Apply a change set atomically. A stale version or a duplicate unique
    /// field rejects the whole set with `Conflict`.
    async fn commit(&self, changes: ChangeSet) -> AppResult<()>;
}

pub type SharedStore = Arc<dyn Store>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testing::{at, device, principal};
    use crate::models::Principal;

    fn fault(creator: &Principal, status: FaultStatus, assigned_to: Option<Uuid>) -> FaultRecord {
        let dev = device("X-1");
        FaultRecord {
            id: Uuid::new_v4(),
            device_id: dev.id,
            device_code: dev.code,
            device_type: dev.device_type,
            created_by: creator.id,
            created_by_name: creator.name.clone(),
            created_at: at(8, 0),
            description: "Broken".to_string(),
            status,
            assigned_to,
            assigned_to_name: None,
            repair_start: None,
            repair_end: None,
            repair_duration: 0.0,
            repair_notes: String::new(),
            repair_category: None,
            breakdown_iteration: 1,
            confirmed_by: None,
            confirmed_at: None,
            version: 0,
        }
    }

    #[test]
    fn test_fault_filter() {
        let staff = principal(Role::HealthStaff, "s");
        let tech = Uuid::new_v4();
        let f = fault(&staff, FaultStatus::InProgress, Some(tech));

        assert!(FaultFilter::default().matches(&f));
        assert!(FaultFilter {
            assigned_to: Some(tech),
            status: Some(FaultStatus::InProgress),
            ..Default::default()
        }
        .matches(&f));
        assert!(!FaultFilter {
            status: Some(FaultStatus::Open),
            ..Default::default()
        }
        .matches(&f));
        assert!(!FaultFilter {
            created_by: Some(tech),
            ..Default::default()
        }
        .matches(&f));
    }

    #[test]
    fn test_version_follows_stored_row() {
        let mut dev = device("X-1");
        assert!(dev.follows(None));
        assert!(!dev.follows(Some(0)));

        dev.version = 3;
        assert!(dev.follows(Some(2)));
        assert!(!dev.follows(Some(3)));
        // an update never creates the row
        assert!(!dev.follows(None));
    }
}
