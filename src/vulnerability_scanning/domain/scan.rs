use super::vulnerability::{CveId, Severity, Vulnerability};
use crate::shared::error::VulnTrackError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    WebAi,
    LocalDatabase,
    Hybrid,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::WebAi => "web_ai",
            ScanType::LocalDatabase => "local_database",
            ScanType::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanType {
    type Err = VulnTrackError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "web_ai" => Ok(ScanType::WebAi),
            "local_database" => Ok(ScanType::LocalDatabase),
            "hybrid" => Ok(ScanType::Hybrid),
            other => Err(VulnTrackError::validation(format!(
                "Unknown scan type '{}'. Expected one of: web_ai, local_database, hybrid",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::InProgress => "in_progress",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, ScanStatus::Completed | ScanStatus::Failed)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanStatus {
    type Err = VulnTrackError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ScanStatus::Pending),
            "in_progress" => Ok(ScanStatus::InProgress),
            "completed" => Ok(ScanStatus::Completed),
            "failed" => Ok(ScanStatus::Failed),
            other => Err(VulnTrackError::validation(format!(
                "Unknown scan status '{}'. Expected one of: pending, in_progress, completed, failed",
                other
            ))),
        }
    }
}

/// A scan run against one device, as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub id: Uuid,
    pub device_id: Uuid,
    pub scan_type: ScanType,
    pub status: ScanStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub ai_recommendations: Option<String>,
    pub ai_confidence_score: Option<f64>,
    pub vulnerabilities_found: u32,
}

impl Scan {
    /// A freshly triggered scan, already running.
    pub fn start(device_id: Uuid, scan_type: ScanType, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            device_id,
            scan_type,
            status: ScanStatus::InProgress,
            started_at: now,
            completed_at: None,
            summary: None,
            ai_recommendations: None,
            ai_confidence_score: None,
            vulnerabilities_found: 0,
        }
    }

    pub fn complete(&mut self, report: &ScanReport, now: DateTime<Utc>) {
        self.status = ScanStatus::Completed;
        self.completed_at = Some(now);
        self.summary = Some(report.summary.clone());
        self.ai_recommendations = if report.recommendations.is_empty() {
            None
        } else {
            Some(report.recommendations.join("\n"))
        };
        self.ai_confidence_score = Some(report.confidence_score);
        self.vulnerabilities_found = report.vulnerabilities.len() as u32;
    }

    pub fn fail(&mut self, reason: &str, now: DateTime<Utc>) {
        self.status = ScanStatus::Failed;
        self.completed_at = Some(now);
        self.summary = Some(reason.to_string());
    }
}

/// One finding attached to a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub id: Uuid,
    pub scan_id: Uuid,
    pub vulnerability_id: Option<Uuid>,
    pub finding: String,
    pub details: String,
    pub severity: Severity,
    pub status: String,
    pub ai_confidence_score: f64,
    pub ai_suggested_remediation: String,
    pub created_at: DateTime<Utc>,
}

/// Catalog entry, one per CVE id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    pub id: Uuid,
    pub cve_id: CveId,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub cvss_score: Option<f32>,
    pub affected_software: String,
    pub remediation: String,
    pub reference_links: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub link: String,
    pub created_at: DateTime<Utc>,
}

/// Which sources contributed findings to a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMethod {
    None,
    LocalDatabase,
    WebAi,
    Hybrid,
}

impl fmt::Display for ScanMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScanMethod::None => "none",
            ScanMethod::LocalDatabase => "local_database",
            ScanMethod::WebAi => "web_ai",
            ScanMethod::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

/// Output of the scanning pipeline for one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub device_id: Option<Uuid>,
    pub vulnerabilities: Vec<Vulnerability>,
    pub confidence_score: f64,
    pub method: ScanMethod,
    pub summary: String,
    pub recommendations: Vec<String>,
    pub degraded_sources: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn has_vulnerabilities(&self) -> bool {
        !self.vulnerabilities.is_empty()
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        self.vulnerabilities.iter().map(|v| v.severity).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_report(confidence: f64) -> ScanReport {
        ScanReport {
            device_id: None,
            vulnerabilities: Vec::new(),
            confidence_score: confidence,
            method: ScanMethod::None,
            summary: "No vulnerabilities found".to_string(),
            recommendations: vec!["Keep firmware updated".to_string()],
            degraded_sources: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_scan_type_round_trip_strings() {
        assert_eq!("web_ai".parse::<ScanType>().unwrap(), ScanType::WebAi);
        assert_eq!("HYBRID".parse::<ScanType>().unwrap(), ScanType::Hybrid);
        assert!("full".parse::<ScanType>().is_err());
        assert_eq!(ScanType::LocalDatabase.to_string(), "local_database");
    }

    #[test]
    fn test_scan_status_serde() {
        let json = serde_json::to_string(&ScanStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert!("done".parse::<ScanStatus>().is_err());
    }

    #[test]
    fn test_scan_start_is_in_progress() {
        let scan = Scan::start(Uuid::new_v4(), ScanType::WebAi, Utc::now());
        assert_eq!(scan.status, ScanStatus::InProgress);
        assert!(scan.completed_at.is_none());
        assert!(!scan.status.is_finished());
    }

    #[test]
    fn test_scan_complete_copies_report() {
        let mut scan = Scan::start(Uuid::new_v4(), ScanType::WebAi, Utc::now());
        scan.complete(&empty_report(0.4), Utc::now());
        assert_eq!(scan.status, ScanStatus::Completed);
        assert_eq!(scan.ai_confidence_score, Some(0.4));
        assert_eq!(scan.ai_recommendations.as_deref(), Some("Keep firmware updated"));
        assert_eq!(scan.vulnerabilities_found, 0);
    }

    #[test]
    fn test_scan_fail_records_reason() {
        let mut scan = Scan::start(Uuid::new_v4(), ScanType::WebAi, Utc::now());
        scan.fail("all sources failed", Utc::now());
        assert_eq!(scan.status, ScanStatus::Failed);
        assert_eq!(scan.summary.as_deref(), Some("all sources failed"));
        assert!(scan.completed_at.is_some());
    }

    #[test]
    fn test_notification_kind_serialized_as_type() {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: "scan_completed".to_string(),
            title: "Scan completed".to_string(),
            message: "0 vulnerabilities".to_string(),
            is_read: false,
            link: "/scans/1".to_string(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["type"], "scan_completed");
    }

    #[test]
    fn test_empty_report_has_no_severity() {
        let report = empty_report(0.0);
        assert!(!report.has_vulnerabilities());
        assert_eq!(report.highest_severity(), None);
    }
}
