use crate::ports::outbound::DeviceListReader;
use crate::shared::error::VulnTrackError;
use crate::shared::security::{read_trusted_file, MAX_CONFIG_FILE_SIZE};
use crate::shared::Result;
use crate::vulnerability_scanning::domain::ScanTarget;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeviceEntry {
    name: Option<String>,
    brand: String,
    model: String,
    version: String,
}

/// Either `devices: [...]` or a bare list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DeviceListFile {
    Wrapped { devices: Vec<DeviceEntry> },
    Bare(Vec<DeviceEntry>),
}

impl DeviceListFile {
    fn into_entries(self) -> Vec<DeviceEntry> {
        match self {
            DeviceListFile::Wrapped { devices } => devices,
            DeviceListFile::Bare(devices) => devices,
        }
    }
}

/// FileSystemReader adapter for reading device lists from the file system
///
/// Device lists are YAML (or JSON) files. Symlinks and files above
/// `MAX_CONFIG_FILE_SIZE` are rejected before parsing.
pub struct FileSystemReader;

impl FileSystemReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemReader {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceListReader for FileSystemReader {
    fn read_device_list(&self, path: &Path) -> Result<Vec<ScanTarget>> {
        let content = read_trusted_file(path, "device list", MAX_CONFIG_FILE_SIZE)?;

        let file: DeviceListFile = serde_yml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse device list: {}\n\n💡 Hint: Expected a YAML list of devices with brand, model and version fields.",
                path.display()
            )
        })?;

        let entries = file.into_entries();
        if entries.is_empty() {
            return Err(VulnTrackError::validation(format!(
                "Device list {} contains no devices",
                path.display()
            ))
            .into());
        }

        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let mut target = ScanTarget::new(&entry.brand, &entry.model, &entry.version)
                    .with_context(|| format!("Invalid device at index {}", index))?;
                target.name = entry
                    .name
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty());
                Ok(target)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("devices.yml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_wrapped_list() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(
            &temp_dir,
            r#"
devices:
  - name: Edge firewall
    brand: Fortinet
    model: FortiGate 60F
    version: "7.0.12"
  - brand: " Cisco "
    model: Catalyst 2960
    version: "15.2"
"#,
        );

        let targets = FileSystemReader::new().read_device_list(&path).unwrap();

        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].name.as_deref(), Some("Edge firewall"));
        assert_eq!(targets[0].label(), "Fortinet FortiGate 60F 7.0.12");
        assert_eq!(targets[1].brand, "Cisco");
        assert!(targets[1].name.is_none());
        assert!(targets.iter().all(|t| t.device_id.is_none()));
    }

    #[test]
    fn test_read_bare_json_list() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(
            &temp_dir,
            r#"[{"brand": "MikroTik", "model": "hEX S", "version": "6.48"}]"#,
        );

        let targets = FileSystemReader::new().read_device_list(&path).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].model, "hEX S");
    }

    #[test]
    fn test_empty_list_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "devices: []\n");

        let err = FileSystemReader::new().read_device_list(&path).unwrap_err();
        assert!(err.to_string().contains("contains no devices"));
    }

    #[test]
    fn test_blank_version_reports_index() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(
            &temp_dir,
            "- {brand: Cisco, model: ASA 5505, version: \"9.8\"}\n- {brand: Cisco, model: ASA 5506, version: \"  \"}\n",
        );

        let err = FileSystemReader::new().read_device_list(&path).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Invalid device at index 1"));
        assert!(message.contains("Version cannot be empty"));
    }

    #[test]
    fn test_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "devices:\n  - brand: Cisco\n");

        let err = FileSystemReader::new().read_device_list(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse device list"));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileSystemReader::new().read_device_list(&temp_dir.path().join("none.yml"));
        assert!(result.is_err());
    }
}
