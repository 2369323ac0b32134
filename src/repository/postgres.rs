//! PostgreSQL store

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};
use uuid::Uuid;

use super::{ChangeSet, FaultFilter, Store, Versioned};
use crate::{
    error::{AppError, AppResult},
    models::{Device, EquipmentTransfer, FaultRecord, LogEntry, Role, TransferStatus, User},
};

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Unique violations surface as conflicts, everything else as database errors
fn map_write_error(error: sqlx::Error, what: &str) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("{} already exists", what))
        }
        _ => AppError::Database(error),
    }
}

fn stale(kind: &str, id: Uuid) -> AppError {
    AppError::Conflict(format!("{} {} was modified concurrently", kind, id))
}

/// Lock the stored row and check the write follows its version, so that an
/// update never falls through to an insert.
async fn check_version<T: Versioned>(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    entity: &T,
    kind: &str,
) -> AppResult<()> {
    let sql = format!("SELECT version FROM {} WHERE id = $1 FOR UPDATE", table);
    let current: Option<i64> = sqlx::query_scalar(&sql)
        .bind(entity.id())
        .fetch_optional(&mut **tx)
        .await?;

    if entity.follows(current) {
        Ok(())
    } else {
        Err(stale(kind, entity.id()))
    }
}

async fn upsert_device(tx: &mut Transaction<'_, Postgres>, device: &Device) -> AppResult<()> {
    check_version(tx, "devices", device, "Device").await?;
    let result = sqlx::query(
        r#"
        INSERT INTO devices (
            id, code, device_type, location, floor, asset_name, brand, model,
            serial_number, quantity, total_failures, total_operating_hours,
            total_repair_hours, mtbf, mttr, availability, created_at, version
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
        ON CONFLICT (id) DO UPDATE SET
            code = EXCLUDED.code,
            device_type = EXCLUDED.device_type,
            location = EXCLUDED.location,
            floor = EXCLUDED.floor,
            asset_name = EXCLUDED.asset_name,
            brand = EXCLUDED.brand,
            model = EXCLUDED.model,
            serial_number = EXCLUDED.serial_number,
            quantity = EXCLUDED.quantity,
            total_failures = EXCLUDED.total_failures,
            total_operating_hours = EXCLUDED.total_operating_hours,
            total_repair_hours = EXCLUDED.total_repair_hours,
            mtbf = EXCLUDED.mtbf,
            mttr = EXCLUDED.mttr,
            availability = EXCLUDED.availability,
            version = EXCLUDED.version
        WHERE devices.version = EXCLUDED.version - 1
        "#,
    )
    .bind(device.id)
    .bind(&device.code)
    .bind(&device.device_type)
    .bind(&device.location)
    .bind(&device.floor)
    .bind(&device.asset_name)
    .bind(&device.brand)
    .bind(&device.model)
    .bind(&device.serial_number)
    .bind(device.quantity)
    .bind(device.total_failures)
    .bind(device.total_operating_hours)
    .bind(device.total_repair_hours)
    .bind(device.mtbf)
    .bind(device.mttr)
    .bind(device.availability)
    .bind(device.created_at)
    .bind(device.version)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_write_error(e, "Device code"))?;

    if result.rows_affected() == 0 {
        return Err(stale("Device", device.id));
    }
    Ok(())
}

async fn upsert_fault(tx: &mut Transaction<'_, Postgres>, fault: &FaultRecord) -> AppResult<()> {
    check_version(tx, "fault_records", fault, "Fault").await?;
    let result = sqlx::query(
        r#"
        INSERT INTO fault_records (
            id, device_id, device_code, device_type, created_by, created_by_name,
            created_at, description, status, assigned_to, assigned_to_name,
            repair_start, repair_end, repair_duration, repair_notes, repair_category,
            breakdown_iteration, confirmed_by, confirmed_at, version
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
        ON CONFLICT (id) DO UPDATE SET
            status = EXCLUDED.status,
            assigned_to = EXCLUDED.assigned_to,
            assigned_to_name = EXCLUDED.assigned_to_name,
            repair_start = EXCLUDED.repair_start,
            repair_end = EXCLUDED.repair_end,
            repair_duration = EXCLUDED.repair_duration,
            repair_notes = EXCLUDED.repair_notes,
            repair_category = EXCLUDED.repair_category,
            confirmed_by = EXCLUDED.confirmed_by,
            confirmed_at = EXCLUDED.confirmed_at,
            version = EXCLUDED.version
        WHERE fault_records.version = EXCLUDED.version - 1
        "#,
    )
    .bind(fault.id)
    .bind(fault.device_id)
    .bind(&fault.device_code)
    .bind(&fault.device_type)
    .bind(fault.created_by)
    .bind(&fault.created_by_name)
    .bind(fault.created_at)
    .bind(&fault.description)
    .bind(fault.status)
    .bind(fault.assigned_to)
    .bind(&fault.assigned_to_name)
    .bind(fault.repair_start)
    .bind(fault.repair_end)
    .bind(fault.repair_duration)
    .bind(&fault.repair_notes)
    .bind(fault.repair_category)
    .bind(fault.breakdown_iteration)
    .bind(fault.confirmed_by)
    .bind(fault.confirmed_at)
    .bind(fault.version)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(stale("Fault", fault.id));
    }
    Ok(())
}

async fn upsert_transfer(
    tx: &mut Transaction<'_, Postgres>,
    transfer: &EquipmentTransfer,
) -> AppResult<()> {
    check_version(tx, "equipment_transfers", transfer, "Transfer").await?;
    let result = sqlx::query(
        r#"
        INSERT INTO equipment_transfers (
            id, device_id, device_code, device_type, from_location, to_location,
            requested_by, requested_by_name, requested_at, reason, status,
            approved_by, approved_by_name, approved_at, rejection_reason,
            completed_at, version
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        ON CONFLICT (id) DO UPDATE SET
            status = EXCLUDED.status,
            approved_by = EXCLUDED.approved_by,
            approved_by_name = EXCLUDED.approved_by_name,
            approved_at = EXCLUDED.approved_at,
            rejection_reason = EXCLUDED.rejection_reason,
            completed_at = EXCLUDED.completed_at,
            version = EXCLUDED.version
        WHERE equipment_transfers.version = EXCLUDED.version - 1
        "#,
    )
    .bind(transfer.id)
    .bind(transfer.device_id)
    .bind(&transfer.device_code)
    .bind(&transfer.device_type)
    .bind(&transfer.from_location)
    .bind(&transfer.to_location)
    .bind(transfer.requested_by)
    .bind(&transfer.requested_by_name)
    .bind(transfer.requested_at)
    .bind(&transfer.reason)
    .bind(transfer.status)
    .bind(transfer.approved_by)
    .bind(&transfer.approved_by_name)
    .bind(transfer.approved_at)
    .bind(&transfer.rejection_reason)
    .bind(transfer.completed_at)
    .bind(transfer.version)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(stale("Transfer", transfer.id));
    }
    Ok(())
}

#[async_trait]
impl Store for PgStore {
    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_users(&self, role: Option<Role>) -> AppResult<Vec<User>> {
        let users = match role {
            Some(role) => {
                sqlx::query_as::<_, User>("SELECT * FROM users WHERE role = $1 ORDER BY name")
                    .bind(role)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY name")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(users)
    }

    async fn create_user(&self, user: User) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password, role, successful_repairs, failed_repairs, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role)
        .bind(user.successful_repairs)
        .bind(user.failed_repairs)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Email"))?;
        Ok(())
    }

    async fn get_device(&self, id: Uuid) -> AppResult<Option<Device>> {
        let device = sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(device)
    }

    async fn find_device_by_code(&self, code: &str) -> AppResult<Option<Device>> {
        let device = sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(device)
    }

    async fn list_devices(&self) -> AppResult<Vec<Device>> {
        let devices = sqlx::query_as::<_, Device>("SELECT * FROM devices ORDER BY code")
            .fetch_all(&self.pool)
            .await?;
        Ok(devices)
    }

    async fn get_fault(&self, id: Uuid) -> AppResult<Option<FaultRecord>> {
        let fault = sqlx::query_as::<_, FaultRecord>("SELECT * FROM fault_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(fault)
    }

    async fn list_faults(&self, filter: &FaultFilter) -> AppResult<Vec<FaultRecord>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if filter.status.is_some() {
            conditions.push(format!("status = ${}", idx));
            idx += 1;
        }
        if filter.assigned_to.is_some() {
            conditions.push(format!("assigned_to = ${}", idx));
            idx += 1;
        }
        if filter.created_by.is_some() {
            conditions.push(format!("created_by = ${}", idx));
            idx += 1;
        }
        if filter.device_id.is_some() {
            conditions.push(format!("device_id = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let query = format!(
            "SELECT * FROM fault_records {} ORDER BY created_at DESC",
            where_clause
        );

        let mut builder = sqlx::query_as::<_, FaultRecord>(&query);
        if let Some(status) = filter.status {
            builder = builder.bind(status);
        }
        if let Some(assigned_to) = filter.assigned_to {
            builder = builder.bind(assigned_to);
        }
        if let Some(created_by) = filter.created_by {
            builder = builder.bind(created_by);
        }
        if let Some(device_id) = filter.device_id {
            builder = builder.bind(device_id);
        }

        let faults = builder.fetch_all(&self.pool).await?;
        Ok(faults)
    }

    async fn get_transfer(&self, id: Uuid) -> AppResult<Option<EquipmentTransfer>> {
        let transfer = sqlx::query_as::<_, EquipmentTransfer>(
            "SELECT * FROM equipment_transfers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(transfer)
    }

    async fn list_transfers(&self, status: Option<TransferStatus>) -> AppResult<Vec<EquipmentTransfer>> {
        let transfers = match status {
            Some(status) => {
                sqlx::query_as::<_, EquipmentTransfer>(
                    "SELECT * FROM equipment_transfers WHERE status = $1 ORDER BY requested_at DESC",
                )
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, EquipmentTransfer>(
                    "SELECT * FROM equipment_transfers ORDER BY requested_at DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(transfers)
    }

    async fn list_logs(&self, limit: i64) -> AppResult<Vec<LogEntry>> {
        let logs = sqlx::query_as::<_, LogEntry>("SELECT * FROM logs ORDER BY timestamp DESC LIMIT $1")
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(logs)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn commit(&self, changes: ChangeSet) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        for device in &changes.devices {
            upsert_device(&mut tx, device).await?;
        }
        for fault in &changes.faults {
            upsert_fault(&mut tx, fault).await?;
        }
        for transfer in &changes.transfers {
            upsert_transfer(&mut tx, transfer).await?;
        }

        for technician in &changes.repair_credits {
            let result = sqlx::query(
                "UPDATE users SET successful_repairs = successful_repairs + 1 WHERE id = $1",
            )
            .bind(technician)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                tracing::warn!("Repair credit for unknown user {}", technician);
            }
        }

        for log in &changes.logs {
            sqlx::query(
                "INSERT INTO logs (id, record_id, event, timestamp, user_id, user_name) VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(log.id)
            .bind(log.record_id)
            .bind(&log.event)
            .bind(log.timestamp)
            .bind(log.user_id)
            .bind(&log.user_name)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
