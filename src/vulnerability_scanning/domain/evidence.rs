//! Raw evidence gathered by the three scan sources, before merging.

use super::vulnerability::{CveId, CvssScore, Severity};
use serde::{Deserialize, Serialize};

/// A CVE entry from the local store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CveRecord {
    pub cve_id: CveId,
    pub description: String,
    pub vendors: Vec<String>,
    pub products: Vec<String>,
    pub versions: Vec<String>,
    pub cvss_score: Option<CvssScore>,
    pub severity: Severity,
    pub references: Vec<String>,
}

/// One web search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebHit {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// A single vulnerability as reported by the AI model
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiFinding {
    pub cve_id: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub source_url: Option<String>,
    pub remediation: Option<String>,
}

/// The AI model's structured answer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiAnalysis {
    pub vulnerability_found: bool,
    pub confidence_score: Option<f64>,
    pub vulnerabilities: Vec<AiFinding>,
    pub summary: Option<String>,
    pub recommendations: Vec<String>,
    pub false_positives_filtered: Option<u32>,
}
