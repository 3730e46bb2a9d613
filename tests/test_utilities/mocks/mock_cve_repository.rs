use async_trait::async_trait;
use vulntrack::prelude::*;
use vulntrack::vulnerability_scanning::domain::{CveRecord, CvssScore};

/// Mock CveRepository returning fixed records for every lookup
pub struct MockCveRepository {
    pub records: Vec<CveRecord>,
    pub should_fail: bool,
}

impl MockCveRepository {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            should_fail: false,
        }
    }

    pub fn with_record(mut self, cve_id: &str, severity: Severity, cvss: f32) -> Self {
        self.records.push(CveRecord {
            cve_id: CveId::new(cve_id).unwrap(),
            description: format!("Known issue {}", cve_id),
            vendors: Vec::new(),
            products: Vec::new(),
            versions: Vec::new(),
            cvss_score: Some(CvssScore::new(cvss).unwrap()),
            severity,
            references: vec![format!("https://nvd.nist.gov/vuln/detail/{}", cve_id)],
        });
        self
    }

    pub fn with_failure() -> Self {
        Self {
            records: Vec::new(),
            should_fail: true,
        }
    }
}

impl Default for MockCveRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CveRepository for MockCveRepository {
    async fn search_by_device(&self, _target: &ScanTarget) -> Result<Vec<CveRecord>> {
        if self.should_fail {
            anyhow::bail!("Mock CVE store failure");
        }
        Ok(self.records.clone())
    }

    async fn search_by_keywords(&self, _keywords: &[String]) -> Result<Vec<CveRecord>> {
        if self.should_fail {
            anyhow::bail!("Mock CVE store failure");
        }
        Ok(Vec::new())
    }
}
