//! Business logic services

pub mod devices;
pub mod faults;
pub mod reports;
pub mod transfers;
pub mod users;

use crate::{
    config::AppConfig,
    error::AppError,
    lifecycle::{Action, Rejection},
    models::Principal,
    repository::SharedStore,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub devices: devices::DevicesService,
    pub faults: faults::FaultsService,
    pub transfers: transfers::TransfersService,
    pub reports: reports::ReportsService,
    store: SharedStore,
}

impl Services {
    /// Create all services on top of the given store
    pub fn new(store: SharedStore, config: &AppConfig) -> Self {
        Self {
            users: users::UsersService::new(store.clone(), config.auth.clone()),
            devices: devices::DevicesService::new(store.clone(), config.devices.default_operating_hours),
            faults: faults::FaultsService::new(store.clone()),
            transfers: transfers::TransfersService::new(store.clone()),
            reports: reports::ReportsService::new(store.clone(), config.reports.clone()),
            store,
        }
    }

    /// Readiness probe on the storage backend
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.store.ping().await
    }
}

/// Log a refused operation and turn it into an application error
pub(crate) fn rejected(action: Action, actor: &Principal, rejection: Rejection) -> AppError {
    tracing::warn!(
        user_id = %actor.id,
        role = %actor.role,
        rule = rejection.rule(),
        "Rejected {}: {}",
        action.description(),
        rejection
    );
    AppError::Rejected(rejection)
}
