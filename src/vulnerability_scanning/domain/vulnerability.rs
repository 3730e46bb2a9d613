use crate::shared::error::VulnTrackError;
use crate::shared::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// NewType wrapper for a CVE identifier (`CVE-YYYY-NNNN`, four or more digits in the sequence)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CveId(String);

impl CveId {
    pub fn new(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_uppercase();
        if !Self::is_well_formed(&normalized) {
            return Err(VulnTrackError::validation(format!(
                "'{}' is not a valid CVE identifier (expected CVE-YYYY-NNNN)",
                raw.trim()
            ))
            .into());
        }
        Ok(Self(normalized))
    }

    fn is_well_formed(value: &str) -> bool {
        let mut parts = value.splitn(3, '-');
        let (Some(prefix), Some(year), Some(sequence)) = (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        prefix == "CVE"
            && year.len() == 4
            && year.chars().all(|c| c.is_ascii_digit())
            && sequence.len() >= 4
            && sequence.chars().all(|c| c.is_ascii_digit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CveId {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<CveId> for String {
    fn from(id: CveId) -> Self {
        id.0
    }
}

/// Severity of a finding. Declared least to most severe so `Ord` ranks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Informational,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parses free-form severity text coming from feeds or the AI model.
    ///
    /// Anything unrecognized (including the common "uknown" misspelling)
    /// maps to `Informational`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" | "moderate" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Informational,
        }
    }

    /// CVSS v3 qualitative rating bands
    pub fn from_cvss_score(score: CvssScore) -> Self {
        match score.value() {
            s if s >= 9.0 => Severity::Critical,
            s if s >= 7.0 => Severity::High,
            s if s >= 4.0 => Severity::Medium,
            s if s > 0.0 => Severity::Low,
            _ => Severity::Informational,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Informational => "informational",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

/// CVSS base score in the range 0.0 to 10.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct CvssScore(f32);

impl CvssScore {
    pub fn new(score: f32) -> Result<Self> {
        if !(0.0..=10.0).contains(&score) {
            return Err(VulnTrackError::validation(format!(
                "CVSS score must be between 0.0 and 10.0, got {}",
                score
            ))
            .into());
        }
        Ok(Self(score))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl TryFrom<f32> for CvssScore {
    type Error = anyhow::Error;

    fn try_from(value: f32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<CvssScore> for f32 {
    fn from(score: CvssScore) -> Self {
        score.0
    }
}

/// Where a finding came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSource {
    LocalDatabase,
    WebSearch,
    AiAnalysis,
}

impl fmt::Display for FindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FindingSource::LocalDatabase => "local_database",
            FindingSource::WebSearch => "web_search",
            FindingSource::AiAnalysis => "ai_analysis",
        };
        f.write_str(name)
    }
}

/// A merged, scored vulnerability finding for one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub cve_id: Option<CveId>,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub cvss_score: Option<CvssScore>,
    pub remediation: Option<String>,
    pub affected_software: Option<String>,
    pub reference_links: Vec<String>,
    pub sources: BTreeSet<FindingSource>,
    pub confidence: f64,
}

impl Vulnerability {
    pub fn is_from(&self, source: FindingSource) -> bool {
        self.sources.contains(&source)
    }

    /// Display name: the CVE id when known, else the stored name
    pub fn label(&self) -> &str {
        self.cve_id.as_ref().map(CveId::as_str).unwrap_or(&self.name)
    }
}
