use crate::shared::Result;
use crate::vulnerability_scanning::domain::Device;
use async_trait::async_trait;
use uuid::Uuid;

/// Paging and filtering for device listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceFilter {
    pub skip: usize,
    /// `None` returns every remaining device
    pub limit: Option<usize>,
    pub is_active: Option<bool>,
    pub user_id: Option<Uuid>,
}

impl DeviceFilter {
    pub fn active_only() -> Self {
        Self {
            is_active: Some(true),
            ..Default::default()
        }
    }

    pub fn matches(&self, device: &Device) -> bool {
        self.is_active.is_none_or(|active| device.is_active == active)
            && self.user_id.is_none_or(|user| device.user_id == user)
    }
}

/// Device search modes. Text matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSearch {
    /// Partial match on name
    ByName(String),
    /// Exact match on version
    ByVersion(String),
    /// Partial match on brand, optionally narrowed by a partial model match
    ByBrand { brand: String, model: Option<String> },
    /// Partial match on name, hostname, brand, model, location or serial number
    General(String),
}

impl DeviceSearch {
    pub fn matches(&self, device: &Device) -> bool {
        let contains = |field: &str, term: &str| field.to_lowercase().contains(&term.to_lowercase());
        match self {
            DeviceSearch::ByName(name) => contains(&device.name, name),
            DeviceSearch::ByVersion(version) => device.version.eq_ignore_ascii_case(version.trim()),
            DeviceSearch::ByBrand { brand, model } => {
                contains(&device.brand, brand)
                    && model.as_deref().is_none_or(|m| contains(&device.model, m))
            }
            DeviceSearch::General(term) => [
                &device.name,
                &device.hostname,
                &device.brand,
                &device.model,
                &device.location,
                &device.serial_number,
            ]
            .iter()
            .any(|field| contains(field, term)),
        }
    }
}

/// DeviceRepository port for device persistence
///
/// Hostname and serial number are unique; `insert` and `update` report a
/// violation as `VulnTrackError::Conflict`.
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    async fn insert(&self, device: Device) -> Result<Device>;

    async fn get(&self, id: Uuid) -> Result<Option<Device>>;

    async fn find_by_hostname(&self, hostname: &str) -> Result<Option<Device>>;

    async fn find_by_serial_number(&self, serial_number: &str) -> Result<Option<Device>>;

    /// Devices matching the filter, newest first
    async fn list(&self, filter: &DeviceFilter) -> Result<Vec<Device>>;

    /// Number of devices matching the filter, ignoring `skip` and `limit`
    async fn count(&self, filter: &DeviceFilter) -> Result<usize>;

    /// Replaces a stored device. Fails with `NotFound` if it does not exist.
    async fn update(&self, device: Device) -> Result<Device>;

    /// Returns false if the device did not exist
    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn search(&self, search: &DeviceSearch) -> Result<Vec<Device>>;
}
