use crate::application::dto::{
    DeviceList, DeviceListQuery, DeviceVersionInfo, VersionSummary, VersionSummaryEntry,
};
use crate::ports::outbound::{DeviceFilter, DeviceRepository, DeviceSearch};
use crate::shared::error::VulnTrackError;
use crate::shared::Result;
use crate::vulnerability_scanning::domain::{Device, DevicePatch, NewDevice};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Largest page a device listing may request
pub const MAX_PAGE_SIZE: usize = 1000;

fn require_term(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(VulnTrackError::validation(format!("{} must not be empty", field)).into());
    }
    Ok(trimmed.to_string())
}

/// ManageDevicesUseCase - Device registry operations
///
/// Validation and normalization happen here, before the repository is
/// touched. Uniqueness of hostname and serial number is checked up front so
/// the caller gets a readable conflict message; the repository enforces it
/// again on write.
///
/// # Type Parameters
/// * `R` - DeviceRepository implementation (may be `dyn DeviceRepository`)
pub struct ManageDevicesUseCase<R: ?Sized> {
    repository: Arc<R>,
}

impl<R: ?Sized> Clone for ManageDevicesUseCase<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: DeviceRepository + ?Sized> ManageDevicesUseCase<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, new_device: NewDevice) -> Result<Device> {
        let new_device = new_device.normalized()?;
        self.ensure_unique(&new_device.hostname, &new_device.serial_number, None)
            .await?;

        let device = self
            .repository
            .insert(Device::create(new_device, Utc::now()))
            .await?;
        tracing::info!(device_id = %device.id, hostname = %device.hostname, "Device created");
        Ok(device)
    }

    pub async fn get(&self, id: Uuid) -> Result<Device> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| VulnTrackError::not_found("Device", id).into())
    }

    pub async fn list(&self, query: &DeviceListQuery) -> Result<DeviceList> {
        if query.limit == 0 || query.limit > MAX_PAGE_SIZE {
            return Err(VulnTrackError::validation(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            ))
            .into());
        }

        let filter = DeviceFilter {
            skip: query.skip,
            limit: Some(query.limit),
            is_active: query.is_active,
            user_id: query.user_id,
        };
        let devices = self.repository.list(&filter).await?;
        let total = self.repository.count(&filter).await?;

        Ok(DeviceList {
            size: devices.len(),
            devices,
            total,
            page: query.skip / query.limit + 1,
            pages: total.div_ceil(query.limit),
        })
    }

    pub async fn update(&self, id: Uuid, patch: DevicePatch) -> Result<Device> {
        let mut device = self.get(id).await?;
        let patch = patch.normalized()?;

        let hostname = patch.hostname.as_deref().unwrap_or(&device.hostname);
        let serial_number = patch
            .serial_number
            .as_deref()
            .unwrap_or(&device.serial_number);
        self.ensure_unique(hostname, serial_number, Some(id)).await?;

        patch.apply_to(&mut device, Utc::now());
        let device = self.repository.update(device).await?;
        tracing::info!(device_id = %device.id, "Device updated");
        Ok(device)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.repository.delete(id).await? {
            return Err(VulnTrackError::not_found("Device", id).into());
        }
        tracing::info!(device_id = %id, "Device deleted");
        Ok(())
    }

    /// Soft delete: the device stays listed but can no longer be scanned
    pub async fn deactivate(&self, id: Uuid) -> Result<Device> {
        let mut device = self.get(id).await?;
        device.deactivate(Utc::now());
        let device = self.repository.update(device).await?;
        tracing::info!(device_id = %device.id, "Device deactivated");
        Ok(device)
    }

    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Device>> {
        let name = require_term("name", name)?;
        self.repository.search(&DeviceSearch::ByName(name)).await
    }

    pub async fn search_by_version(&self, version: &str) -> Result<Vec<Device>> {
        let version = require_term("version", version)?;
        self.repository
            .search(&DeviceSearch::ByVersion(version))
            .await
    }

    pub async fn search_by_brand(&self, brand: &str, model: Option<&str>) -> Result<Vec<Device>> {
        let brand = require_term("brand", brand)?;
        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        self.repository
            .search(&DeviceSearch::ByBrand { brand, model })
            .await
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Device>> {
        let term = require_term("q", term)?;
        self.repository.search(&DeviceSearch::General(term)).await
    }

    /// Active devices grouped by (brand, version), ordered by brand then version
    pub async fn version_summary(&self) -> Result<VersionSummary> {
        let devices = self.repository.list(&DeviceFilter::active_only()).await?;

        let mut groups: BTreeMap<(String, String), usize> = BTreeMap::new();
        for device in devices {
            *groups.entry((device.brand, device.version)).or_default() += 1;
        }

        Ok(VersionSummary {
            version_summary: groups
                .into_iter()
                .map(|((brand, version), device_count)| VersionSummaryEntry {
                    version,
                    brand,
                    device_count,
                })
                .collect(),
        })
    }

    pub async fn version_list(&self) -> Result<Vec<DeviceVersionInfo>> {
        let devices = self.repository.list(&DeviceFilter::active_only()).await?;
        Ok(devices.iter().map(DeviceVersionInfo::from).collect())
    }

    async fn ensure_unique(
        &self,
        hostname: &str,
        serial_number: &str,
        current: Option<Uuid>,
    ) -> Result<()> {
        let is_other = |device: &Device| Some(device.id) != current;

        if let Some(existing) = self.repository.find_by_hostname(hostname).await? {
            if is_other(&existing) {
                return Err(VulnTrackError::Conflict {
                    message: format!("Device with hostname '{}' already exists", hostname),
                }
                .into());
            }
        }
        if let Some(existing) = self.repository.find_by_serial_number(serial_number).await? {
            if is_other(&existing) {
                return Err(VulnTrackError::Conflict {
                    message: format!(
                        "Device with serial number '{}' already exists",
                        serial_number
                    ),
                }
                .into());
            }
        }
        Ok(())
    }
}
