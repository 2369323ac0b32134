//! Audit log entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::Principal;

/// One line of the audit trail. Written once per transition, never read back
/// into any decision.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LogEntry {
    pub id: Uuid,
    /// Fault or transfer the event belongs to
    pub record_id: Uuid,
    pub event: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
}

impl LogEntry {
    pub fn new(record_id: Uuid, event: impl Into<String>, actor: &Principal, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            record_id,
            event: event.into(),
            timestamp: now,
            user_id: Some(actor.id),
            user_name: Some(actor.name.clone()),
        }
    }
}
