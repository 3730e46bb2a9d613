use super::postgrest_client::{eq, Params, PostgrestClient};
use crate::ports::outbound::{ScanFilter, ScanRepository};
use crate::shared::error::VulnTrackError;
use crate::shared::Result;
use crate::vulnerability_scanning::domain::{
    CveId, Notification, Scan, ScanResult, VulnerabilityRecord,
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

const SCANS: &str = "scans";
const SCAN_RESULTS: &str = "scan_results";
const VULNERABILITIES: &str = "vulnerabilities";
const NOTIFICATIONS: &str = "notifications";

/// SupabaseScanRepository adapter implementing the ScanRepository port
/// against the `scans`, `scan_results`, `vulnerabilities` and
/// `notifications` tables.
pub struct SupabaseScanRepository {
    client: Arc<PostgrestClient>,
}

impl SupabaseScanRepository {
    pub fn new(client: Arc<PostgrestClient>) -> Self {
        Self { client }
    }

    fn list_params(filter: &ScanFilter) -> Params {
        let mut params = Params::new();
        if let Some(device_id) = filter.device_id {
            params.push(eq("device_id", device_id));
        }
        if let Some(status) = filter.status {
            params.push(eq("status", status.as_str()));
        }
        if let Some(scan_type) = filter.scan_type {
            params.push(eq("scan_type", scan_type.as_str()));
        }
        if let Some(from) = filter.completed_from {
            params.push(("completed_at".to_string(), format!("gte.{}", from.to_rfc3339())));
        }
        if let Some(to) = filter.completed_to {
            params.push(("completed_at".to_string(), format!("lte.{}", to.to_rfc3339())));
        }
        params.push(("order".to_string(), "started_at.desc".to_string()));
        params.push(("offset".to_string(), filter.offset.to_string()));
        params.push(("limit".to_string(), filter.limit.to_string()));
        params
    }
}

#[async_trait]
impl ScanRepository for SupabaseScanRepository {
    async fn create_scan(&self, scan: Scan) -> Result<Scan> {
        self.client.insert(SCANS, &scan).await
    }

    async fn get_scan(&self, id: Uuid) -> Result<Option<Scan>> {
        let rows: Vec<Scan> = self.client.select(SCANS, &vec![eq("id", id)]).await?;
        Ok(rows.into_iter().next())
    }

    async fn update_scan(&self, scan: Scan) -> Result<Scan> {
        let id = scan.id;
        let rows: Vec<Scan> = self.client.update(SCANS, &vec![eq("id", id)], &scan).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| VulnTrackError::not_found("Scan", id).into())
    }

    async fn list_scans(&self, filter: &ScanFilter) -> Result<(Vec<Scan>, usize)> {
        self.client
            .select_with_count(SCANS, &Self::list_params(filter))
            .await
    }

    async fn find_vulnerability(&self, cve_id: &CveId) -> Result<Option<VulnerabilityRecord>> {
        let rows: Vec<VulnerabilityRecord> = self
            .client
            .select(VULNERABILITIES, &vec![eq("cve_id", cve_id)])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_vulnerability(&self, record: VulnerabilityRecord) -> Result<VulnerabilityRecord> {
        self.client.insert(VULNERABILITIES, &record).await
    }

    async fn insert_result(&self, result: ScanResult) -> Result<ScanResult> {
        self.client.insert(SCAN_RESULTS, &result).await
    }

    async fn results_for_scan(&self, scan_id: Uuid) -> Result<Vec<ScanResult>> {
        let params = vec![
            eq("scan_id", scan_id),
            ("order".to_string(), "created_at.asc".to_string()),
        ];
        self.client.select(SCAN_RESULTS, &params).await
    }

    async fn insert_notification(&self, notification: Notification) -> Result<()> {
        let _: Notification = self.client.insert(NOTIFICATIONS, &notification).await?;
        Ok(())
    }
}
