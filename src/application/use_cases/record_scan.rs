use crate::ports::outbound::ScanRepository;
use crate::shared::Result;
use crate::vulnerability_scanning::domain::{
    Device, Notification, Scan, ScanReport, ScanResult, Vulnerability, VulnerabilityRecord,
};
use crate::vulnerability_scanning::policies::FindingDefaults;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Status given to every newly recorded finding
pub const RESULT_STATUS_OPEN: &str = "open";

pub const NOTIFICATION_SCAN_COMPLETED: &str = "scan_completed";

/// RecordScanUseCase - Persists the outcome of a scan
///
/// On success the scan is completed, each CVE is upserted into the
/// vulnerability catalog, one result row is stored per finding and the
/// device owner is notified. On failure the scan is marked failed with the
/// error as its summary.
pub struct RecordScanUseCase<S: ?Sized> {
    repository: Arc<S>,
}

impl<S: ?Sized> Clone for RecordScanUseCase<S> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<S: ScanRepository + ?Sized> RecordScanUseCase<S> {
    pub fn new(repository: Arc<S>) -> Self {
        Self { repository }
    }

    pub async fn record_completion(
        &self,
        mut scan: Scan,
        device: &Device,
        report: &ScanReport,
    ) -> Result<Scan> {
        let now = Utc::now();
        scan.complete(report, now);
        let scan = self.repository.update_scan(scan).await?;

        for vulnerability in &report.vulnerabilities {
            let vulnerability_id = self.upsert_catalog_entry(vulnerability).await?;
            self.repository
                .insert_result(ScanResult {
                    id: Uuid::new_v4(),
                    scan_id: scan.id,
                    vulnerability_id,
                    finding: vulnerability.label().to_string(),
                    details: FindingDefaults::description(vulnerability),
                    severity: vulnerability.severity,
                    status: RESULT_STATUS_OPEN.to_string(),
                    ai_confidence_score: vulnerability.confidence,
                    ai_suggested_remediation: FindingDefaults::remediation(vulnerability),
                    created_at: now,
                })
                .await?;
        }

        self.repository
            .insert_notification(Notification {
                id: Uuid::new_v4(),
                user_id: device.user_id,
                kind: NOTIFICATION_SCAN_COMPLETED.to_string(),
                title: format!("Scan completed for {}", device.display_name()),
                message: format!(
                    "{} vulnerabilities found. {}",
                    report.vulnerabilities.len(),
                    report.summary
                ),
                is_read: false,
                link: format!("/scans/{}", scan.id),
                created_at: now,
            })
            .await?;

        tracing::info!(
            scan_id = %scan.id,
            device_id = %device.id,
            vulnerabilities = scan.vulnerabilities_found,
            "Scan recorded"
        );
        Ok(scan)
    }

    pub async fn record_failure(&self, mut scan: Scan, reason: &str) -> Result<Scan> {
        scan.fail(reason, Utc::now());
        let scan = self.repository.update_scan(scan).await?;
        tracing::warn!(scan_id = %scan.id, reason, "Scan failed");
        Ok(scan)
    }

    /// Returns the catalog id for findings with a CVE id, inserting the entry
    /// on first sight. Findings without one are not catalogued.
    async fn upsert_catalog_entry(&self, vulnerability: &Vulnerability) -> Result<Option<Uuid>> {
        let Some(cve_id) = vulnerability.cve_id.as_ref() else {
            return Ok(None);
        };

        if let Some(existing) = self.repository.find_vulnerability(cve_id).await? {
            return Ok(Some(existing.id));
        }

        let record = self
            .repository
            .insert_vulnerability(VulnerabilityRecord {
                id: Uuid::new_v4(),
                cve_id: cve_id.clone(),
                name: vulnerability.name.clone(),
                description: FindingDefaults::description(vulnerability),
                severity: vulnerability.severity,
                cvss_score: vulnerability.cvss_score.map(|s| s.value()),
                affected_software: FindingDefaults::affected_software(vulnerability),
                remediation: FindingDefaults::remediation(vulnerability),
                reference_links: vulnerability.reference_links.clone(),
                created_at: Utc::now(),
            })
            .await?;
        Ok(Some(record.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::memory::InMemoryScanRepository;
    use crate::ports::outbound::ScanFilter;
    use crate::vulnerability_scanning::domain::{
        CveId, FindingSource, ScanMethod, ScanStatus, ScanType, Severity,
    };
    use std::collections::BTreeSet;

    fn device() -> Device {
        Device {
            id: Uuid::new_v4(),
            name: "Core switch".to_string(),
            hostname: "sw-core".to_string(),
            version: "15.2".to_string(),
            brand: "Cisco".to_string(),
            model: "Catalyst 2960".to_string(),
            serial_number: "FOC1234".to_string(),
            location: "HQ".to_string(),
            user_id: Uuid::new_v4(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn finding(cve: Option<&str>, severity: Severity) -> Vulnerability {
        Vulnerability {
            cve_id: cve.map(|c| CveId::new(c).unwrap()),
            name: cve.unwrap_or("Weak SNMP community").to_string(),
            description: "Details".to_string(),
            severity,
            cvss_score: None,
            remediation: None,
            affected_software: None,
            reference_links: Vec::new(),
            sources: BTreeSet::from([FindingSource::AiAnalysis]),
            confidence: 0.6,
        }
    }

    fn report(vulnerabilities: Vec<Vulnerability>) -> ScanReport {
        ScanReport {
            device_id: None,
            vulnerabilities,
            confidence_score: 0.6,
            method: ScanMethod::WebAi,
            summary: "Two issues".to_string(),
            recommendations: vec!["Upgrade IOS".to_string()],
            degraded_sources: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_completion_persists_everything() {
        let repository = Arc::new(InMemoryScanRepository::new());
        let use_case = RecordScanUseCase::new(Arc::clone(&repository));
        let device = device();
        let scan = repository
            .create_scan(Scan::start(device.id, ScanType::WebAi, Utc::now()))
            .await
            .unwrap();

        let report = report(vec![
            finding(Some("CVE-2017-3881"), Severity::Critical),
            finding(None, Severity::Medium),
        ]);
        let scan = use_case
            .record_completion(scan, &device, &report)
            .await
            .unwrap();

        assert_eq!(scan.status, ScanStatus::Completed);
        assert_eq!(scan.vulnerabilities_found, 2);

        let results = repository.results_for_scan(scan.id).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.status == "open"));
        assert!(results
            .iter()
            .all(|r| r.ai_suggested_remediation == "No remediation provided."));
        assert_eq!(
            results.iter().filter(|r| r.vulnerability_id.is_some()).count(),
            1
        );

        let notifications = repository.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].user_id, device.user_id);
        assert_eq!(notifications[0].title, "Scan completed for Core switch");
        assert_eq!(notifications[0].link, format!("/scans/{}", scan.id));
    }

    #[tokio::test]
    async fn test_catalog_entry_reused_across_scans() {
        let repository = Arc::new(InMemoryScanRepository::new());
        let use_case = RecordScanUseCase::new(Arc::clone(&repository));
        let device = device();
        let report = report(vec![finding(Some("CVE-2017-3881"), Severity::Critical)]);

        let mut catalog_ids = Vec::new();
        for _ in 0..2 {
            let scan = repository
                .create_scan(Scan::start(device.id, ScanType::WebAi, Utc::now()))
                .await
                .unwrap();
            let scan = use_case
                .record_completion(scan, &device, &report)
                .await
                .unwrap();
            let results = repository.results_for_scan(scan.id).await.unwrap();
            catalog_ids.push(results[0].vulnerability_id);
        }
        assert_eq!(catalog_ids[0], catalog_ids[1]);
    }

    #[tokio::test]
    async fn test_record_failure() {
        let repository = Arc::new(InMemoryScanRepository::new());
        let use_case = RecordScanUseCase::new(Arc::clone(&repository));
        let scan = repository
            .create_scan(Scan::start(Uuid::new_v4(), ScanType::WebAi, Utc::now()))
            .await
            .unwrap();

        use_case
            .record_failure(scan, "all sources failed")
            .await
            .unwrap();

        let (scans, total) = repository
            .list_scans(&ScanFilter {
                status: Some(ScanStatus::Failed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(scans[0].summary.as_deref(), Some("all sources failed"));
    }
}
