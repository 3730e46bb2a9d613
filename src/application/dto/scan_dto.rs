use crate::vulnerability_scanning::domain::{Scan, ScanResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub device_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchScanRequest {
    pub device_ids: Vec<Uuid>,
}

/// A batch entry that did not get a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedDevice {
    pub device_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchScanResponse {
    pub job_id: Uuid,
    pub message: String,
    pub initiated_scans: Vec<Scan>,
    pub skipped: Vec<SkippedDevice>,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    10
}

/// Query parameters for listing scans.
///
/// `status` and `scanType` accept `all` to disable the filter. Dates accept
/// RFC 3339 timestamps or plain `YYYY-MM-DD` days.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanListQuery {
    pub device_id: Option<Uuid>,
    pub status: Option<String>,
    pub scan_type: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub limit: usize,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl Default for ScanListQuery {
    fn default() -> Self {
        Self {
            device_id: None,
            status: None,
            scan_type: None,
            page: default_page(),
            limit: default_page_size(),
            start_date: None,
            end_date: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanPage {
    pub data: Vec<Scan>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
}

/// A scan together with its per-vulnerability results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanDetails {
    #[serde(flatten)]
    pub scan: Scan,
    pub results: Vec<ScanResult>,
}
