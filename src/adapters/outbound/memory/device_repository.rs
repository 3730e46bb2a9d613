use crate::ports::outbound::{DeviceFilter, DeviceRepository, DeviceSearch};
use crate::shared::error::VulnTrackError;
use crate::shared::Result;
use crate::vulnerability_scanning::domain::Device;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredDevice {
    /// Insertion order, breaks `created_at` ties when sorting
    seq: u64,
    device: Device,
}

/// InMemoryDeviceRepository adapter implementing the DeviceRepository port
///
/// Devices live in a `DashMap`. Writes are serialized through a mutex so the
/// hostname and serial number uniqueness check and the write happen together.
pub struct InMemoryDeviceRepository {
    devices: DashMap<Uuid, StoredDevice>,
    next_seq: AtomicU64,
    write_lock: Mutex<()>,
}

impl InMemoryDeviceRepository {
    pub fn new() -> Self {
        Self {
            devices: DashMap::new(),
            next_seq: AtomicU64::new(0),
            write_lock: Mutex::new(()),
        }
    }

    fn find_by(&self, predicate: impl Fn(&Device) -> bool) -> Option<Device> {
        self.devices
            .iter()
            .find(|entry| predicate(&entry.device))
            .map(|entry| entry.device.clone())
    }

    /// Fails if another device already uses the hostname or serial number
    fn check_unique(&self, device: &Device) -> Result<()> {
        for entry in self.devices.iter() {
            let other = &entry.device;
            if other.id == device.id {
                continue;
            }
            if other.hostname == device.hostname {
                return Err(VulnTrackError::Conflict {
                    message: format!("Device with hostname '{}' already exists", device.hostname),
                }
                .into());
            }
            if other.serial_number == device.serial_number {
                return Err(VulnTrackError::Conflict {
                    message: format!(
                        "Device with serial number '{}' already exists",
                        device.serial_number
                    ),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Matching devices, newest first
    fn sorted(&self, predicate: impl Fn(&Device) -> bool) -> Vec<Device> {
        let mut matches: Vec<StoredDevice> = self
            .devices
            .iter()
            .filter(|entry| predicate(&entry.device))
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by(|a, b| {
            b.device
                .created_at
                .cmp(&a.device.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        matches.into_iter().map(|stored| stored.device).collect()
    }
}

impl Default for InMemoryDeviceRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceRepository for InMemoryDeviceRepository {
    async fn insert(&self, device: Device) -> Result<Device> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        if self.devices.contains_key(&device.id) {
            return Err(VulnTrackError::Conflict {
                message: format!("Device with ID {} already exists", device.id),
            }
            .into());
        }
        self.check_unique(&device)?;

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.devices.insert(
            device.id,
            StoredDevice {
                seq,
                device: device.clone(),
            },
        );
        Ok(device)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Device>> {
        Ok(self.devices.get(&id).map(|entry| entry.device.clone()))
    }

    async fn find_by_hostname(&self, hostname: &str) -> Result<Option<Device>> {
        Ok(self.find_by(|d| d.hostname == hostname))
    }

    async fn find_by_serial_number(&self, serial_number: &str) -> Result<Option<Device>> {
        Ok(self.find_by(|d| d.serial_number == serial_number))
    }

    async fn list(&self, filter: &DeviceFilter) -> Result<Vec<Device>> {
        let devices = self
            .sorted(|d| filter.matches(d))
            .into_iter()
            .skip(filter.skip);
        Ok(match filter.limit {
            Some(limit) => devices.take(limit).collect(),
            None => devices.collect(),
        })
    }

    async fn count(&self, filter: &DeviceFilter) -> Result<usize> {
        Ok(self
            .devices
            .iter()
            .filter(|entry| filter.matches(&entry.device))
            .count())
    }

    async fn update(&self, device: Device) -> Result<Device> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.check_unique(&device)?;

        let mut stored = self
            .devices
            .get_mut(&device.id)
            .ok_or_else(|| VulnTrackError::not_found("Device", device.id))?;
        stored.device = device.clone();
        Ok(device)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.devices.remove(&id).is_some())
    }

    async fn search(&self, search: &DeviceSearch) -> Result<Vec<Device>> {
        Ok(self.sorted(|d| search.matches(d)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn device(hostname: &str, serial: &str) -> Device {
        Device {
            id: Uuid::new_v4(),
            name: hostname.to_string(),
            hostname: hostname.to_string(),
            version: "1.0".to_string(),
            brand: "Juniper".to_string(),
            model: "SRX300".to_string(),
            serial_number: serial.to_string(),
            location: "Lab".to_string(),
            user_id: Uuid::new_v4(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_enforces_uniqueness() {
        let repository = InMemoryDeviceRepository::new();
        repository.insert(device("srx-1", "A1")).await.unwrap();

        let err = repository.insert(device("srx-1", "A2")).await.unwrap_err();
        assert!(err.to_string().contains("hostname 'srx-1'"));
        let err = repository.insert(device("srx-2", "A1")).await.unwrap_err();
        assert!(err.to_string().contains("serial number 'A1'"));
        assert_eq!(repository.count(&DeviceFilter::default()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let repository = InMemoryDeviceRepository::new();
        let mut old = device("old", "O1");
        old.created_at = Utc::now() - Duration::days(1);
        repository.insert(old).await.unwrap();
        repository.insert(device("a", "A1")).await.unwrap();
        repository.insert(device("b", "B1")).await.unwrap();

        let hostnames: Vec<String> = repository
            .list(&DeviceFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.hostname)
            .collect();
        assert_eq!(hostnames.last().map(String::as_str), Some("old"));
        assert_eq!(hostnames.len(), 3);
    }

    #[tokio::test]
    async fn test_update_unknown_device_is_not_found() {
        let repository = InMemoryDeviceRepository::new();
        let err = repository.update(device("x", "X1")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VulnTrackError>(),
            Some(VulnTrackError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_filter_by_owner_and_state() {
        let repository = InMemoryDeviceRepository::new();
        let owned = repository.insert(device("a", "A1")).await.unwrap();
        let mut inactive = device("b", "B1");
        inactive.is_active = false;
        repository.insert(inactive).await.unwrap();

        let by_owner = DeviceFilter {
            user_id: Some(owned.user_id),
            ..Default::default()
        };
        assert_eq!(repository.list(&by_owner).await.unwrap(), vec![owned]);
        assert_eq!(
            repository.count(&DeviceFilter::active_only()).await.unwrap(),
            1
        );
    }
}
