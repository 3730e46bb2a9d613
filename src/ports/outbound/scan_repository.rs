use crate::shared::Result;
use crate::vulnerability_scanning::domain::{
    CveId, Notification, Scan, ScanResult, ScanStatus, ScanType, VulnerabilityRecord,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Filtering and paging for scan listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFilter {
    pub device_id: Option<Uuid>,
    pub status: Option<ScanStatus>,
    pub scan_type: Option<ScanType>,
    /// Inclusive bounds on `completed_at`
    pub completed_from: Option<DateTime<Utc>>,
    pub completed_to: Option<DateTime<Utc>>,
    pub offset: usize,
    pub limit: usize,
}

impl Default for ScanFilter {
    fn default() -> Self {
        Self {
            device_id: None,
            status: None,
            scan_type: None,
            completed_from: None,
            completed_to: None,
            offset: 0,
            limit: 10,
        }
    }
}

impl ScanFilter {
    pub fn matches(&self, scan: &Scan) -> bool {
        let completed_in_range = |bound: Option<DateTime<Utc>>, after: bool| match bound {
            None => true,
            Some(bound) => scan
                .completed_at
                .is_some_and(|at| if after { at >= bound } else { at <= bound }),
        };

        self.device_id.is_none_or(|id| scan.device_id == id)
            && self.status.is_none_or(|status| scan.status == status)
            && self.scan_type.is_none_or(|kind| scan.scan_type == kind)
            && completed_in_range(self.completed_from, true)
            && completed_in_range(self.completed_to, false)
    }
}

/// ScanRepository port for scans, their results, the vulnerability catalog
/// and owner notifications
#[async_trait]
pub trait ScanRepository: Send + Sync {
    async fn create_scan(&self, scan: Scan) -> Result<Scan>;

    async fn get_scan(&self, id: Uuid) -> Result<Option<Scan>>;

    async fn update_scan(&self, scan: Scan) -> Result<Scan>;

    /// One page of scans (newest first) and the total number of matches
    async fn list_scans(&self, filter: &ScanFilter) -> Result<(Vec<Scan>, usize)>;

    async fn find_vulnerability(&self, cve_id: &CveId) -> Result<Option<VulnerabilityRecord>>;

    async fn insert_vulnerability(&self, record: VulnerabilityRecord) -> Result<VulnerabilityRecord>;

    async fn insert_result(&self, result: ScanResult) -> Result<ScanResult>;

    async fn results_for_scan(&self, scan_id: Uuid) -> Result<Vec<ScanResult>>;

    async fn insert_notification(&self, notification: Notification) -> Result<()>;
}
