use crate::application::use_cases::{ManageDevicesUseCase, ScanJobsUseCase};
use crate::ports::outbound::DeviceRepository;
use std::sync::Arc;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub devices: ManageDevicesUseCase<dyn DeviceRepository>,
    pub scans: ScanJobsUseCase,
    /// Name of the persistence backend, reported by `/health`
    pub storage: &'static str,
    /// Origins allowed by CORS; `*` allows any
    pub cors_allowed_origins: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(
        devices: ManageDevicesUseCase<dyn DeviceRepository>,
        scans: ScanJobsUseCase,
        storage: &'static str,
        cors_allowed_origins: Vec<String>,
    ) -> Self {
        Self {
            devices,
            scans,
            storage,
            cors_allowed_origins: Arc::new(cors_allowed_origins),
        }
    }

    pub(crate) fn allows_origin(&self, origin: &str) -> bool {
        self.cors_allowed_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed == origin)
    }
}
