use crate::ports::outbound::{ScanFilter, ScanRepository};
use crate::shared::error::VulnTrackError;
use crate::shared::Result;
use crate::vulnerability_scanning::domain::{
    CveId, Notification, Scan, ScanResult, VulnerabilityRecord,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// InMemoryScanRepository adapter implementing the ScanRepository port
pub struct InMemoryScanRepository {
    scans: DashMap<Uuid, Scan>,
    results: DashMap<Uuid, Vec<ScanResult>>,
    /// Catalog keyed by CVE id
    vulnerabilities: DashMap<String, VulnerabilityRecord>,
    notifications: Mutex<Vec<Notification>>,
}

impl InMemoryScanRepository {
    pub fn new() -> Self {
        Self {
            scans: DashMap::new(),
            results: DashMap::new(),
            vulnerabilities: DashMap::new(),
            notifications: Mutex::new(Vec::new()),
        }
    }

    /// Notifications sent so far, oldest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for InMemoryScanRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScanRepository for InMemoryScanRepository {
    async fn create_scan(&self, scan: Scan) -> Result<Scan> {
        self.scans.insert(scan.id, scan.clone());
        Ok(scan)
    }

    async fn get_scan(&self, id: Uuid) -> Result<Option<Scan>> {
        Ok(self.scans.get(&id).map(|entry| entry.clone()))
    }

    async fn update_scan(&self, scan: Scan) -> Result<Scan> {
        let mut stored = self
            .scans
            .get_mut(&scan.id)
            .ok_or_else(|| VulnTrackError::not_found("Scan", scan.id))?;
        *stored = scan.clone();
        Ok(scan)
    }

    async fn list_scans(&self, filter: &ScanFilter) -> Result<(Vec<Scan>, usize)> {
        let mut matches: Vec<Scan> = self
            .scans
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(a.id.cmp(&b.id)));

        let total = matches.len();
        let page = matches
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect();
        Ok((page, total))
    }

    async fn find_vulnerability(&self, cve_id: &CveId) -> Result<Option<VulnerabilityRecord>> {
        Ok(self
            .vulnerabilities
            .get(cve_id.as_str())
            .map(|entry| entry.clone()))
    }

    async fn insert_vulnerability(&self, record: VulnerabilityRecord) -> Result<VulnerabilityRecord> {
        // First writer wins, like the unique constraint on cve_id
        let stored = self
            .vulnerabilities
            .entry(record.cve_id.as_str().to_string())
            .or_insert(record)
            .clone();
        Ok(stored)
    }

    async fn insert_result(&self, result: ScanResult) -> Result<ScanResult> {
        self.results
            .entry(result.scan_id)
            .or_default()
            .push(result.clone());
        Ok(result)
    }

    async fn results_for_scan(&self, scan_id: Uuid) -> Result<Vec<ScanResult>> {
        Ok(self
            .results
            .get(&scan_id)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }

    async fn insert_notification(&self, notification: Notification) -> Result<()> {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
        Ok(())
    }
}
