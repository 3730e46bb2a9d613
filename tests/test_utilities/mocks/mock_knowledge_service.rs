use async_trait::async_trait;
use vulntrack::prelude::*;
use vulntrack::vulnerability_scanning::domain::{AiAnalysis, AiFinding, WebHit};

/// Mock KnowledgeService answering with a fixed analysis
pub struct MockKnowledgeService {
    pub analysis: AiAnalysis,
    pub should_fail: bool,
}

impl MockKnowledgeService {
    pub fn new() -> Self {
        Self {
            analysis: AiAnalysis::default(),
            should_fail: false,
        }
    }

    pub fn with_finding(mut self, cve_id: Option<&str>, severity: &str, description: &str) -> Self {
        self.analysis.vulnerability_found = true;
        self.analysis.vulnerabilities.push(AiFinding {
            cve_id: cve_id.map(str::to_string),
            severity: Some(severity.to_string()),
            description: Some(description.to_string()),
            source_url: None,
            remediation: Some("Upgrade to the latest firmware".to_string()),
        });
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.analysis.confidence_score = Some(confidence);
        self
    }

    pub fn with_failure() -> Self {
        Self {
            analysis: AiAnalysis::default(),
            should_fail: true,
        }
    }
}

impl Default for MockKnowledgeService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeService for MockKnowledgeService {
    async fn analyze(&self, _target: &ScanTarget, _hits: &[WebHit]) -> Result<AiAnalysis> {
        if self.should_fail {
            anyhow::bail!("Mock knowledge service failure");
        }
        Ok(self.analysis.clone())
    }
}
