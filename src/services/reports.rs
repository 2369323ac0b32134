//! Dashboard and report aggregation

use std::collections::BTreeMap;

use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::{
    config::ReportsConfig,
    error::AppResult,
    lifecycle::{metrics::format_minutes_seconds, Action},
    models::{
        report::{
            BreakdownFrequencyRow, DashboardStats, DeviceReliability, FacilityIssuesMonth,
            FacilityIssuesReport, FailureFrequencyReport, FailureFrequencyRow,
            InterventionDurationRow, LocationInterventionReport, LocationInterventionRow,
            SystemStats, TechnicianPerformanceRow,
        },
        Device, FaultRecord, FaultStatus, LogEntry, Principal, Role, TransferStatus, User,
    },
    repository::{FaultFilter, SharedStore},
};

use super::rejected;

const RANKED_DEVICES: usize = 5;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

fn reliability(device: &Device) -> DeviceReliability {
    DeviceReliability {
        id: device.id,
        code: device.code.clone(),
        device_type: device.device_type.clone(),
        location: device.location.clone(),
        availability: device.availability,
        mtbf: device.mtbf,
    }
}

fn in_year(fault: &FaultRecord, year: i32) -> bool {
    fault.created_at.year() == year
}

pub fn dashboard(devices: &[Device], faults: &[FaultRecord]) -> DashboardStats {
    let count_status = |status: FaultStatus| faults.iter().filter(|f| f.status == status).count() as i64;

    let (avg_mtbf, avg_mttr, avg_availability) = if devices.is_empty() {
        (0.0, 0.0, 100.0)
    } else {
        let n = devices.len() as f64;
        (
            devices.iter().map(|d| d.mtbf).sum::<f64>() / n,
            devices.iter().map(|d| d.mttr).sum::<f64>() / n,
            devices.iter().map(|d| d.availability).sum::<f64>() / n,
        )
    };

    let mut ranked: Vec<&Device> = devices.iter().collect();
    ranked.sort_by(|a, b| b.availability.total_cmp(&a.availability));

    let most_reliable_devices = ranked.iter().take(RANKED_DEVICES).map(|d| reliability(d)).collect();
    let least_reliable_devices = if ranked.len() > RANKED_DEVICES {
        ranked[ranked.len() - RANKED_DEVICES..]
            .iter()
            .map(|d| reliability(d))
            .collect()
    } else {
        Vec::new()
    };

    DashboardStats {
        total_devices: devices.len() as i64,
        total_faults: faults.len() as i64,
        open_faults: count_status(FaultStatus::Open),
        in_progress_faults: count_status(FaultStatus::InProgress),
        closed_faults: count_status(FaultStatus::Closed),
        avg_mtbf: round2(avg_mtbf),
        avg_mttr: round2(avg_mttr),
        avg_availability: round2(avg_availability),
        most_reliable_devices,
        least_reliable_devices,
    }
}

pub fn breakdown_frequency(devices: &[Device]) -> Vec<BreakdownFrequencyRow> {
    devices
        .iter()
        .map(|d| {
            let frequency = if d.total_operating_hours > 0.0 && d.total_failures > 0 {
                d.total_operating_hours / f64::from(d.total_failures)
            } else {
                0.0
            };
            BreakdownFrequencyRow {
                device_code: d.code.clone(),
                device_type: d.device_type.clone(),
                location: d.location.clone(),
                total_failures: d.total_failures,
                operating_hours: d.total_operating_hours,
                breakdown_frequency: round2(frequency),
            }
        })
        .collect()
}

/// Closed faults grouped by device, ordered by device code
pub fn intervention_duration(faults: &[FaultRecord]) -> Vec<InterventionDurationRow> {
    let mut groups: BTreeMap<(String, Uuid), (String, usize, f64)> = BTreeMap::new();
    for fault in faults.iter().filter(|f| f.status == FaultStatus::Closed) {
        let entry = groups
            .entry((fault.device_code.clone(), fault.device_id))
            .or_insert_with(|| (fault.device_type.clone(), 0, 0.0));
        entry.1 += 1;
        entry.2 += fault.repair_duration;
    }

    groups
        .into_iter()
        .map(|((device_code, _), (device_type, count, total))| InterventionDurationRow {
            device_code,
            device_type,
            total_interventions: count as i64,
            average_duration_hours: round2(average(total, count)),
        })
        .collect()
}

pub fn technician_performance(technicians: &[User], faults: &[FaultRecord]) -> Vec<TechnicianPerformanceRow> {
    technicians
        .iter()
        .filter(|t| t.role == Role::Technician)
        .map(|tech| {
            let assigned: Vec<&FaultRecord> =
                faults.iter().filter(|f| f.assigned_to == Some(tech.id)).collect();
            let completed = assigned.iter().filter(|f| f.status == FaultStatus::Closed).count();
            let success_rate = if assigned.is_empty() {
                0.0
            } else {
                completed as f64 / assigned.len() as f64 * 100.0
            };
            TechnicianPerformanceRow {
                technician_id: tech.id,
                name: tech.name.clone(),
                email: tech.email.clone(),
                total_assigned: assigned.len() as i64,
                completed: completed as i64,
                successful_repairs: tech.successful_repairs,
                failed_repairs: tech.failed_repairs,
                success_rate: round2(success_rate),
            }
        })
        .collect()
}

/// Faults reported per device and calendar month
pub fn failure_frequency(devices: &[Device], faults: &[FaultRecord], year: i32) -> FailureFrequencyReport {
    let rows = devices
        .iter()
        .map(|device| {
            let mut monthly = vec![0i64; 12];
            for fault in faults.iter().filter(|f| f.device_id == device.id && in_year(f, year)) {
                monthly[fault.created_at.month0() as usize] += 1;
            }
            FailureFrequencyRow {
                device_code: device.code.clone(),
                device_type: device.device_type.clone(),
                location: device.location.clone(),
                total: monthly.iter().sum(),
                monthly,
            }
        })
        .collect();

    FailureFrequencyReport { year, rows }
}

/// Average repair duration of closed faults per device location and quarter.
///
/// Faults are attributed to the device's current location.
pub fn intervention_duration_by_location(
    devices: &[Device],
    faults: &[FaultRecord],
    year: i32,
) -> LocationInterventionReport {
    let mut locations: BTreeMap<&str, [Vec<f64>; 4]> = BTreeMap::new();
    for device in devices {
        let quarters = locations.entry(device.location.as_str()).or_default();
        for fault in faults.iter().filter(|f| {
            f.device_id == device.id && f.status == FaultStatus::Closed && in_year(f, year)
        }) {
            quarters[(fault.created_at.month0() / 3) as usize].push(fault.repair_duration);
        }
    }

    let rows = locations
        .into_iter()
        .map(|(location, quarters)| {
            let quarter_average_hours: Vec<f64> = quarters
                .iter()
                .map(|q| average(q.iter().sum(), q.len()))
                .collect();
            let total_faults: usize = quarters.iter().map(Vec::len).sum();
            let total_hours: f64 = quarters.iter().flatten().sum();
            let yearly_average_hours = average(total_hours, total_faults);

            LocationInterventionRow {
                location: location.to_string(),
                quarter_average: quarter_average_hours
                    .iter()
                    .map(|h| format_minutes_seconds(*h))
                    .collect(),
                quarter_average_hours,
                yearly_average: format_minutes_seconds(yearly_average_hours),
                yearly_average_hours,
                total_faults: total_faults as i64,
            }
        })
        .collect();

    LocationInterventionReport { year, rows }
}

fn is_facility_issue(fault: &FaultRecord, keywords: &[String]) -> bool {
    let description = fault.description.to_lowercase();
    keywords
        .iter()
        .any(|k| !k.is_empty() && description.contains(&k.to_lowercase()))
}

/// Closed faults caused by the building (power, infrastructure...) per month
pub fn facility_issues(faults: &[FaultRecord], year: i32, keywords: &[String]) -> FacilityIssuesReport {
    let mut buckets = [(0usize, 0.0f64); 12];
    for fault in faults.iter().filter(|f| {
        f.status == FaultStatus::Closed && in_year(f, year) && is_facility_issue(f, keywords)
    }) {
        let bucket = &mut buckets[fault.created_at.month0() as usize];
        bucket.0 += 1;
        bucket.1 += fault.repair_duration;
    }

    let months = buckets
        .iter()
        .zip(1u32..)
        .map(|(&(count, total), month)| {
            let avg = average(total, count);
            FacilityIssuesMonth {
                month,
                fault_count: count as i64,
                total_duration_hours: total,
                total_duration: format_minutes_seconds(total),
                average_duration_hours: avg,
                average_duration: format_minutes_seconds(avg),
            }
        })
        .collect();

    let total_faults: usize = buckets.iter().map(|b| b.0).sum();
    let total_hours: f64 = buckets.iter().map(|b| b.1).sum();
    let avg = average(total_hours, total_faults);

    FacilityIssuesReport {
        year,
        months,
        total_faults: total_faults as i64,
        total_duration_hours: total_hours,
        total_duration: format_minutes_seconds(total_hours),
        average_duration_hours: avg,
        average_duration: format_minutes_seconds(avg),
    }
}

#[derive(Clone)]
pub struct ReportsService {
    store: SharedStore,
    config: ReportsConfig,
}

impl ReportsService {
    pub fn new(store: SharedStore, config: ReportsConfig) -> Self {
        Self { store, config }
    }

    fn authorize(actor: &Principal, action: Action) -> AppResult<()> {
        actor.require(action).map_err(|r| rejected(action, actor, r))
    }

    async fn all_faults(&self) -> AppResult<Vec<FaultRecord>> {
        self.store.list_faults(&FaultFilter::default()).await
    }

    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let devices = self.store.list_devices().await?;
        let faults = self.all_faults().await?;
        Ok(dashboard(&devices, &faults))
    }

    pub async fn breakdown_frequency(&self, actor: &Principal) -> AppResult<Vec<BreakdownFrequencyRow>> {
        Self::authorize(actor, Action::ViewReports)?;
        Ok(breakdown_frequency(&self.store.list_devices().await?))
    }

    pub async fn intervention_duration(&self, actor: &Principal) -> AppResult<Vec<InterventionDurationRow>> {
        Self::authorize(actor, Action::ViewReports)?;
        let closed = self
            .store
            .list_faults(&FaultFilter {
                status: Some(FaultStatus::Closed),
                ..Default::default()
            })
            .await?;
        Ok(intervention_duration(&closed))
    }

    pub async fn technician_performance(&self, actor: &Principal) -> AppResult<Vec<TechnicianPerformanceRow>> {
        Self::authorize(actor, Action::ViewReports)?;
        let technicians = self.store.list_users(Some(Role::Technician)).await?;
        Ok(technician_performance(&technicians, &self.all_faults().await?))
    }

    pub async fn failure_frequency(&self, actor: &Principal, year: Option<i32>) -> AppResult<FailureFrequencyReport> {
        Self::authorize(actor, Action::ViewAnnualReports)?;
        let year = year.unwrap_or_else(|| Utc::now().year());
        let devices = self.store.list_devices().await?;
        Ok(failure_frequency(&devices, &self.all_faults().await?, year))
    }

    pub async fn intervention_duration_by_location(
        &self,
        actor: &Principal,
        year: Option<i32>,
    ) -> AppResult<LocationInterventionReport> {
        Self::authorize(actor, Action::ViewAnnualReports)?;
        let year = year.unwrap_or_else(|| Utc::now().year());
        let devices = self.store.list_devices().await?;
        Ok(intervention_duration_by_location(&devices, &self.all_faults().await?, year))
    }

    pub async fn facility_issues(&self, actor: &Principal, year: Option<i32>) -> AppResult<FacilityIssuesReport> {
        Self::authorize(actor, Action::ViewAnnualReports)?;
        let year = year.unwrap_or_else(|| Utc::now().year());
        let faults = self.all_faults().await?;
        Ok(facility_issues(&faults, year, &self.config.facility_keywords))
    }

    pub async fn audit_log(&self, actor: &Principal) -> AppResult<Vec<LogEntry>> {
        Self::authorize(actor, Action::ViewAuditLog)?;
        self.store.list_logs(self.config.audit_log_limit).await
    }

    pub async fn system_stats(&self, actor: &Principal) -> AppResult<SystemStats> {
        Self::authorize(actor, Action::ViewSystemStats)?;
        let transfers = self.store.list_transfers(None).await?;
        Ok(SystemStats {
            total_users: self.store.list_users(None).await?.len() as i64,
            total_devices: self.store.list_devices().await?.len() as i64,
            total_faults: self.all_faults().await?.len() as i64,
            total_transfers: transfers.len() as i64,
            pending_transfers: transfers
                .iter()
                .filter(|t| t.status == TransferStatus::Pending)
                .count() as i64,
        })
    }
}
