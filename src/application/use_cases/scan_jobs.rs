use crate::application::dto::{
    BatchScanResponse, ScanDetails, ScanListQuery, ScanPage, SkippedDevice,
};
use crate::application::use_cases::{BatchScanUseCase, DeviceScanOutcome, RecordScanUseCase};
use crate::ports::outbound::{
    CveRepository, DeviceRepository, KnowledgeService, ProgressReporter, ScanFilter,
    ScanRepository, WebSearchService,
};
use crate::shared::error::VulnTrackError;
use crate::shared::Result;
use crate::vulnerability_scanning::domain::{
    Device, Scan, ScanStatus, ScanTarget, ScanType,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use uuid::Uuid;

/// Largest page a scan listing may request
pub const MAX_SCAN_PAGE_SIZE: usize = 100;

/// Batch scanner over trait objects, as held by the HTTP state
pub type DynBatchScanner = BatchScanUseCase<
    dyn CveRepository,
    dyn WebSearchService,
    dyn KnowledgeService,
    dyn ProgressReporter,
>;

/// Parses `value` as an RFC 3339 timestamp or a `YYYY-MM-DD` day. Days
/// expand to their first second, or their last one when `end_of_day` is set.
fn parse_date_bound(field: &str, value: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    let invalid = || {
        VulnTrackError::validation(format!(
            "{} must be an RFC 3339 timestamp or a YYYY-MM-DD date, got '{}'",
            field, value
        ))
    };
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
    let time = if end_of_day {
        day.and_hms_opt(23, 59, 59)
    } else {
        day.and_hms_opt(0, 0, 0)
    };
    Ok(time.ok_or_else(invalid)?.and_utc())
}

/// `None` and `all` disable a filter
fn optional_filter<T>(value: Option<&str>) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = VulnTrackError>,
{
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("all") => Ok(None),
        Some(v) => Ok(Some(v.parse::<T>()?)),
    }
}

/// ScanJobsUseCase - Triggers background scans and serves scan history
///
/// Triggered scans are created `in_progress` and run on spawned tasks. A
/// semaphore bounds how many scans may be in flight; triggering beyond it
/// fails with `TooManyPendingScans`.
#[derive(Clone)]
pub struct ScanJobsUseCase {
    devices: Arc<dyn DeviceRepository>,
    scans: Arc<dyn ScanRepository>,
    scanner: Arc<DynBatchScanner>,
    recorder: RecordScanUseCase<dyn ScanRepository>,
    permits: Arc<Semaphore>,
    max_pending: usize,
}

impl ScanJobsUseCase {
    pub fn new(
        devices: Arc<dyn DeviceRepository>,
        scans: Arc<dyn ScanRepository>,
        scanner: Arc<DynBatchScanner>,
        max_pending: usize,
    ) -> Self {
        Self {
            devices,
            recorder: RecordScanUseCase::new(Arc::clone(&scans)),
            scans,
            scanner,
            permits: Arc::new(Semaphore::new(max_pending)),
            max_pending,
        }
    }

    /// Number of scans currently running
    pub fn pending_scans(&self) -> usize {
        self.max_pending - self.permits.available_permits()
    }

    pub async fn trigger(&self, device_id: Uuid) -> Result<Scan> {
        let device = self.scannable_device(device_id).await?;
        let permit = self.acquire_permits(1)?.into_iter().next();

        let scan = self
            .scans
            .create_scan(Scan::start(device.id, ScanType::WebAi, Utc::now()))
            .await?;
        tracing::info!(scan_id = %scan.id, device_id = %device.id, "Scan triggered");

        let jobs = self.clone();
        let running = scan.clone();
        tokio::spawn(async move {
            let outcome = jobs.scanner.scan_one(ScanTarget::from(&device)).await;
            jobs.record(running, &device, outcome).await;
            drop(permit);
        });

        Ok(scan)
    }

    /// Starts one background job scanning every eligible device.
    ///
    /// Unknown and inactive devices are reported as skipped.
    pub async fn trigger_batch(&self, device_ids: &[Uuid]) -> Result<BatchScanResponse> {
        if device_ids.is_empty() {
            return Err(VulnTrackError::InvalidRequest {
                message: "device_ids must be a non-empty list of UUIDs".to_string(),
            }
            .into());
        }

        let mut unique_ids: Vec<Uuid> = Vec::with_capacity(device_ids.len());
        for &device_id in device_ids {
            if !unique_ids.contains(&device_id) {
                unique_ids.push(device_id);
            }
        }

        let mut eligible: Vec<Device> = Vec::new();
        let mut skipped: Vec<SkippedDevice> = Vec::new();
        for device_id in unique_ids {
            match self.devices.get(device_id).await? {
                Some(device) if device.is_active => eligible.push(device),
                Some(_) => skipped.push(SkippedDevice {
                    device_id,
                    reason: "Device is inactive".to_string(),
                }),
                None => skipped.push(SkippedDevice {
                    device_id,
                    reason: "Device not found".to_string(),
                }),
            }
        }

        let permits = self.acquire_permits(eligible.len())?;
        let job_id = Uuid::new_v4();

        let mut initiated: Vec<Scan> = Vec::with_capacity(eligible.len());
        for device in &eligible {
            match self
                .scans
                .create_scan(Scan::start(device.id, ScanType::WebAi, Utc::now()))
                .await
            {
                Ok(scan) => initiated.push(scan),
                Err(e) => {
                    // No job will run the scans created so far
                    let reason = format!("Batch scan could not be started: {}", e);
                    for scan in initiated {
                        let scan_id = scan.id;
                        if let Err(record_err) = self.recorder.record_failure(scan, &reason).await {
                            tracing::error!(
                                scan_id = %scan_id,
                                error = %record_err,
                                "Failed to record scan outcome"
                            );
                        }
                    }
                    return Err(e);
                }
            }
        }
        tracing::info!(
            job_id = %job_id,
            initiated = initiated.len(),
            skipped = skipped.len(),
            "Batch scan triggered"
        );

        if !eligible.is_empty() {
            let jobs = self.clone();
            let scans = initiated.clone();
            tokio::spawn(async move {
                let targets = eligible.iter().map(ScanTarget::from).collect();
                let outcomes = jobs.scanner.execute(targets).await;
                for ((scan, device), outcome) in scans.into_iter().zip(&eligible).zip(outcomes) {
                    jobs.record(scan, device, outcome).await;
                }
                drop(permits);
                tracing::info!(job_id = %job_id, "Batch scan finished");
            });
        }

        Ok(BatchScanResponse {
            job_id,
            message: format!("{} scans initiated.", initiated.len()),
            initiated_scans: initiated,
            skipped,
        })
    }

    pub async fn list(&self, query: &ScanListQuery) -> Result<ScanPage> {
        if query.page == 0 {
            return Err(VulnTrackError::validation("page must be at least 1").into());
        }
        if query.limit == 0 || query.limit > MAX_SCAN_PAGE_SIZE {
            return Err(VulnTrackError::validation(format!(
                "limit must be between 1 and {}",
                MAX_SCAN_PAGE_SIZE
            ))
            .into());
        }

        let offset = (query.page - 1)
            .checked_mul(query.limit)
            .filter(|offset| i64::try_from(*offset).is_ok())
            .ok_or_else(|| {
                VulnTrackError::validation(format!("page {} is out of range", query.page))
            })?;

        let filter = ScanFilter {
            device_id: query.device_id,
            status: optional_filter::<ScanStatus>(query.status.as_deref())?,
            scan_type: optional_filter::<ScanType>(query.scan_type.as_deref())?,
            completed_from: query
                .start_date
                .as_deref()
                .map(|d| parse_date_bound("startDate", d, false))
                .transpose()?,
            completed_to: query
                .end_date
                .as_deref()
                .map(|d| parse_date_bound("endDate", d, true))
                .transpose()?,
            offset,
            limit: query.limit,
        };

        let (data, total) = self.scans.list_scans(&filter).await?;
        Ok(ScanPage {
            data,
            current_page: query.page,
            total_pages: total.div_ceil(query.limit),
            total_items: total,
            items_per_page: query.limit,
        })
    }

    pub async fn get(&self, scan_id: Uuid) -> Result<ScanDetails> {
        let scan = self
            .scans
            .get_scan(scan_id)
            .await?
            .ok_or_else(|| VulnTrackError::not_found("Scan", scan_id))?;
        let results = self.scans.results_for_scan(scan_id).await?;
        Ok(ScanDetails { scan, results })
    }

    async fn scannable_device(&self, device_id: Uuid) -> Result<Device> {
        let device = self
            .devices
            .get(device_id)
            .await?
            .ok_or_else(|| VulnTrackError::not_found("Device", device_id))?;
        if !device.is_active {
            return Err(VulnTrackError::InvalidRequest {
                message: "Device is inactive".to_string(),
            }
            .into());
        }
        Ok(device)
    }

    fn acquire_permits(&self, count: usize) -> Result<Vec<OwnedSemaphorePermit>> {
        let mut permits = Vec::with_capacity(count);
        for _ in 0..count {
            match Arc::clone(&self.permits).try_acquire_owned() {
                Ok(permit) => permits.push(permit),
                Err(_) => {
                    return Err(VulnTrackError::TooManyPendingScans {
                        limit: self.max_pending,
                    }
                    .into())
                }
            }
        }
        Ok(permits)
    }

    async fn record(&self, scan: Scan, device: &Device, outcome: DeviceScanOutcome) {
        let scan_id = scan.id;
        let recorded = match outcome.result {
            Ok(report) => self.recorder.record_completion(scan, device, &report).await,
            Err(reason) => self.recorder.record_failure(scan, &reason).await,
        };
        if let Err(e) = recorded {
            tracing::error!(scan_id = %scan_id, error = %e, "Failed to record scan outcome");
        }
    }
}
