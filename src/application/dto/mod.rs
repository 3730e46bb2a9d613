/// Data Transfer Objects for application layer
///
/// DTOs are used to transfer data between the application layer
/// and adapters, keeping the domain layer isolated.
mod device_dto;
mod scan_dto;

pub use device_dto::{
    DeviceList, DeviceListQuery, DeviceVersionInfo, VersionSummary, VersionSummaryEntry,
};
pub use scan_dto::{
    BatchScanRequest, BatchScanResponse, ScanDetails, ScanListQuery, ScanPage, ScanRequest,
    SkippedDevice,
};
