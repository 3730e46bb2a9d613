pub mod device;
pub mod evidence;
pub mod scan;
pub mod vulnerability;

pub use device::{Device, DevicePatch, NewDevice, ScanTarget};
pub use evidence::{AiAnalysis, AiFinding, CveRecord, WebHit};
pub use scan::{
    Notification, Scan, ScanMethod, ScanReport, ScanResult, ScanStatus, ScanType,
    VulnerabilityRecord,
};
pub use vulnerability::{CveId, CvssScore, FindingSource, Severity, Vulnerability};
