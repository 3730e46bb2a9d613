/// Use cases module containing application business logic orchestration
mod batch_scan;
mod manage_devices;
mod record_scan;
mod scan_device;
mod scan_jobs;

pub use batch_scan::{BatchScanConfig, BatchScanUseCase, DeviceScanOutcome};
pub use manage_devices::{ManageDevicesUseCase, MAX_PAGE_SIZE};
pub use record_scan::{RecordScanUseCase, NOTIFICATION_SCAN_COMPLETED, RESULT_STATUS_OPEN};
pub use scan_device::{
    ScanDeviceUseCase, SOURCE_AI_ANALYSIS, SOURCE_LOCAL_DATABASE, SOURCE_WEB_SEARCH,
};
pub use scan_jobs::{DynBatchScanner, ScanJobsUseCase, MAX_SCAN_PAGE_SIZE};
