use crate::shared::error::VulnTrackError;
use crate::shared::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length for names, hostnames and locations
const MAX_LONG_FIELD_LENGTH: usize = 255;

/// Maximum length for version, brand, model and serial number
const MAX_SHORT_FIELD_LENGTH: usize = 100;

/// Validates a required text field and returns it unchanged.
fn require_text(field: &str, value: String, max_len: usize) -> Result<String> {
    if value.trim().is_empty() {
        return Err(VulnTrackError::validation(format!("{} cannot be empty", field)).into());
    }
    if value.chars().count() > max_len {
        return Err(VulnTrackError::validation(format!(
            "{} is too long ({} characters). Maximum allowed: {} characters",
            field,
            value.chars().count(),
            max_len
        ))
        .into());
    }
    Ok(value)
}

/// NewType wrapper for a hostname: trimmed and lower-cased
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hostname(String);

impl Hostname {
    pub fn new(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(VulnTrackError::validation("Hostname cannot be empty").into());
        }
        let normalized = require_text("Hostname", normalized, MAX_LONG_FIELD_LENGTH)?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// NewType wrapper for a serial number: trimmed and upper-cased
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SerialNumber(String);

impl SerialNumber {
    pub fn new(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(VulnTrackError::validation("Serial number cannot be empty").into());
        }
        let normalized = require_text("Serial number", normalized, MAX_SHORT_FIELD_LENGTH)?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// A tracked network device, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub name: String,
    pub hostname: String,
    pub version: String,
    pub brand: String,
    pub model: String,
    pub serial_number: String,
    pub location: String,
    pub user_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Device {
    /// Builds a fresh device from a validated creation payload.
    pub fn create(new_device: NewDevice, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: new_device.name,
            hostname: new_device.hostname,
            version: new_device.version,
            brand: new_device.brand,
            model: new_device.model,
            serial_number: new_device.serial_number,
            location: new_device.location,
            user_id: new_device.user_id,
            is_active: new_device.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }

    /// Display label used in notifications and logs
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.hostname
        } else {
            &self.name
        }
    }
}

fn default_active() -> bool {
    true
}

/// Payload for registering a device
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewDevice {
    pub name: String,
    pub hostname: String,
    pub version: String,
    pub brand: String,
    pub model: String,
    pub serial_number: String,
    pub location: String,
    pub user_id: Uuid,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl NewDevice {
    /// Validates every field and normalizes hostname and serial number.
    pub fn normalized(self) -> Result<Self> {
        Ok(Self {
            name: require_text("Name", self.name, MAX_LONG_FIELD_LENGTH)?,
            hostname: Hostname::new(&self.hostname)?.into_inner(),
            version: require_text("Version", self.version, MAX_SHORT_FIELD_LENGTH)?,
            brand: require_text("Brand", self.brand, MAX_SHORT_FIELD_LENGTH)?,
            model: require_text("Model", self.model, MAX_SHORT_FIELD_LENGTH)?,
            serial_number: SerialNumber::new(&self.serial_number)?.into_inner(),
            location: require_text("Location", self.location, MAX_LONG_FIELD_LENGTH)?,
            user_id: self.user_id,
            is_active: self.is_active,
        })
    }
}

/// Partial update payload. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DevicePatch {
    pub name: Option<String>,
    pub hostname: Option<String>,
    pub version: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub user_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

impl DevicePatch {
    pub fn normalized(self) -> Result<Self> {
        let long = |field: &str, value: Option<String>| {
            value
                .map(|v| require_text(field, v, MAX_LONG_FIELD_LENGTH))
                .transpose()
        };
        let short = |field: &str, value: Option<String>| {
            value
                .map(|v| require_text(field, v, MAX_SHORT_FIELD_LENGTH))
                .transpose()
        };

        Ok(Self {
            name: long("Name", self.name)?,
            hostname: self
                .hostname
                .map(|h| Hostname::new(&h).map(Hostname::into_inner))
                .transpose()?,
            version: short("Version", self.version)?,
            brand: short("Brand", self.brand)?,
            model: short("Model", self.model)?,
            serial_number: self
                .serial_number
                .map(|s| SerialNumber::new(&s).map(SerialNumber::into_inner))
                .transpose()?,
            location: long("Location", self.location)?,
            user_id: self.user_id,
            is_active: self.is_active,
        })
    }

    /// Applies the set fields to `device` and bumps `updated_at`.
    pub fn apply_to(self, device: &mut Device, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            device.name = name;
        }
        if let Some(hostname) = self.hostname {
            device.hostname = hostname;
        }
        if let Some(version) = self.version {
            device.version = version;
        }
        if let Some(brand) = self.brand {
            device.brand = brand;
        }
        if let Some(model) = self.model {
            device.model = model;
        }
        if let Some(serial_number) = self.serial_number {
            device.serial_number = serial_number;
        }
        if let Some(location) = self.location {
            device.location = location;
        }
        if let Some(user_id) = self.user_id {
            device.user_id = user_id;
        }
        if let Some(is_active) = self.is_active {
            device.is_active = is_active;
        }
        device.updated_at = now;
    }
}

/// What the scanning pipeline needs to know about a device.
///
/// Decoupled from `Device` so ad-hoc scans (CLI, batch files) can run
/// without a registered device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub brand: String,
    pub model: String,
    pub version: String,
}

impl ScanTarget {
    pub fn new(brand: &str, model: &str, version: &str) -> Result<Self> {
        Ok(Self {
            device_id: None,
            name: None,
            brand: require_text("Brand", brand.trim().to_string(), MAX_SHORT_FIELD_LENGTH)?,
            model: require_text("Model", model.trim().to_string(), MAX_SHORT_FIELD_LENGTH)?,
            version: require_text("Version", version.trim().to_string(), MAX_SHORT_FIELD_LENGTH)?,
        })
    }

    /// "brand model version", used for logging and progress messages
    pub fn label(&self) -> String {
        format!("{} {} {}", self.brand, self.model, self.version)
    }
}

impl From<&Device> for ScanTarget {
    fn from(device: &Device) -> Self {
        Self {
            device_id: Some(device.id),
            name: Some(device.name.clone()),
            brand: device.brand.clone(),
            model: device.model.clone(),
            version: device.version.clone(),
        }
    }
}
