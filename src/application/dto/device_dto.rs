use crate::vulnerability_scanning::domain::Device;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_limit() -> usize {
    100
}

/// Query parameters for listing devices
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceListQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub is_active: Option<bool>,
    pub user_id: Option<Uuid>,
}

impl Default for DeviceListQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
            is_active: None,
            user_id: None,
        }
    }
}

/// One page of devices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceList {
    pub devices: Vec<Device>,
    pub total: usize,
    pub page: usize,
    pub size: usize,
    pub pages: usize,
}

/// Active device count per (brand, version)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummaryEntry {
    pub version: String,
    pub brand: String,
    pub device_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionSummary {
    pub version_summary: Vec<VersionSummaryEntry>,
}

/// Firmware version details of an active device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceVersionInfo {
    pub device_id: Uuid,
    pub device_name: String,
    pub current_version: String,
    pub brand: String,
    pub model: String,
    pub hostname: String,
    pub location: String,
    pub is_active: bool,
    pub last_updated: DateTime<Utc>,
}

impl From<&Device> for DeviceVersionInfo {
    fn from(device: &Device) -> Self {
        Self {
            device_id: device.id,
            device_name: device.name.clone(),
            current_version: device.version.clone(),
            brand: device.brand.clone(),
            model: device.model.clone(),
            hostname: device.hostname.clone(),
            location: device.location.clone(),
            is_active: device.is_active,
            last_updated: device.updated_at,
        }
    }
}
