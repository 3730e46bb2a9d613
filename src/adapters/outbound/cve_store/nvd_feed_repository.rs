use crate::ports::outbound::CveRepository;
use crate::shared::security::{read_trusted_file, MAX_CVE_FEED_SIZE};
use crate::shared::Result;
use crate::vulnerability_scanning::domain::{CveId, CveRecord, CvssScore, ScanTarget, Severity};
use crate::vulnerability_scanning::services::CveMatcher;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

// NVD JSON 1.0/1.1 feed layout. Only the fields used for matching are read.

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedFile {
    Nvd {
        #[serde(rename = "CVE_Items")]
        items: Vec<NvdItem>,
    },
    Flat(Vec<CveRecord>),
}

#[derive(Debug, Deserialize)]
struct NvdItem {
    cve: NvdCve,
    #[serde(default)]
    configurations: Option<NvdConfigurations>,
    #[serde(default)]
    impact: Option<NvdImpact>,
}

#[derive(Debug, Deserialize)]
struct NvdCve {
    #[serde(rename = "CVE_data_meta")]
    meta: NvdMeta,
    #[serde(default)]
    affects: Option<NvdAffects>,
    #[serde(default)]
    description: Option<NvdDescription>,
    #[serde(default)]
    references: Option<NvdReferences>,
}

#[derive(Debug, Deserialize)]
struct NvdMeta {
    #[serde(rename = "ID")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct NvdAffects {
    vendor: NvdVendors,
}

#[derive(Debug, Deserialize)]
struct NvdVendors {
    #[serde(default)]
    vendor_data: Vec<NvdVendor>,
}

#[derive(Debug, Deserialize)]
struct NvdVendor {
    vendor_name: String,
    #[serde(default)]
    product: Option<NvdProducts>,
}

#[derive(Debug, Deserialize)]
struct NvdProducts {
    #[serde(default)]
    product_data: Vec<NvdProduct>,
}

#[derive(Debug, Deserialize)]
struct NvdProduct {
    product_name: String,
    #[serde(default)]
    version: Option<NvdVersions>,
}

#[derive(Debug, Deserialize)]
struct NvdVersions {
    #[serde(default)]
    version_data: Vec<NvdVersion>,
}

#[derive(Debug, Deserialize)]
struct NvdVersion {
    version_value: String,
}

#[derive(Debug, Deserialize)]
struct NvdDescription {
    #[serde(default)]
    description_data: Vec<NvdText>,
}

#[derive(Debug, Deserialize)]
struct NvdText {
    value: String,
}

#[derive(Debug, Deserialize)]
struct NvdReferences {
    #[serde(default)]
    reference_data: Vec<NvdReference>,
}

#[derive(Debug, Deserialize)]
struct NvdReference {
    url: String,
}

#[derive(Debug, Deserialize)]
struct NvdConfigurations {
    #[serde(default)]
    nodes: Vec<NvdNode>,
}

#[derive(Debug, Deserialize)]
struct NvdNode {
    #[serde(default)]
    cpe_match: Vec<NvdCpeMatch>,
    #[serde(default)]
    children: Vec<NvdNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdCpeMatch {
    cpe23_uri: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdImpact {
    #[serde(default)]
    base_metric_v3: Option<NvdMetricV3>,
    #[serde(default)]
    base_metric_v2: Option<NvdMetricV2>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdMetricV3 {
    cvss_v3: NvdCvssV3,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdCvssV3 {
    base_score: f32,
    #[serde(default)]
    base_severity: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdMetricV2 {
    cvss_v2: NvdCvssV2,
    #[serde(default)]
    severity: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdCvssV2 {
    base_score: f32,
}

/// Collected vendor/product/version names, deduplicated in first-seen order
#[derive(Default)]
struct Affected {
    vendors: Vec<String>,
    products: Vec<String>,
    versions: Vec<String>,
    seen: BTreeSet<(u8, String)>,
}

impl Affected {
    fn push(&mut self, kind: u8, value: &str) {
        let value = value.trim();
        if value.is_empty() || value == "*" || value == "-" {
            return;
        }
        if !self.seen.insert((kind, value.to_lowercase())) {
            return;
        }
        let list = match kind {
            0 => &mut self.vendors,
            1 => &mut self.products,
            _ => &mut self.versions,
        };
        list.push(value.to_string());
    }

    /// `cpe:2.3:<part>:<vendor>:<product>:<version>:...`
    fn push_cpe(&mut self, uri: &str) {
        let fields: Vec<&str> = uri.split(':').collect();
        if fields.len() < 6 {
            return;
        }
        self.push(0, fields[3]);
        self.push(1, fields[4]);
        self.push(2, fields[5]);
    }

    fn walk(&mut self, nodes: &[NvdNode]) {
        for node in nodes {
            for cpe in &node.cpe_match {
                self.push_cpe(&cpe.cpe23_uri);
            }
            self.walk(&node.children);
        }
    }
}

impl NvdItem {
    fn into_record(self) -> Result<CveRecord> {
        let cve_id = CveId::new(&self.cve.meta.id)?;

        let mut affected = Affected::default();
        if let Some(affects) = &self.cve.affects {
            for vendor in &affects.vendor.vendor_data {
                affected.push(0, &vendor.vendor_name);
                for product in vendor.product.iter().flat_map(|p| &p.product_data) {
                    affected.push(1, &product.product_name);
                    for version in product.version.iter().flat_map(|v| &v.version_data) {
                        affected.push(2, &version.version_value);
                    }
                }
            }
        }
        if let Some(configurations) = &self.configurations {
            affected.walk(&configurations.nodes);
        }

        let description = self
            .cve
            .description
            .map(|d| {
                d.description_data
                    .into_iter()
                    .map(|t| t.value)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        let references = self
            .cve
            .references
            .map(|r| r.reference_data.into_iter().map(|r| r.url).collect())
            .unwrap_or_default();

        let (score, severity_text) = match self.impact {
            Some(NvdImpact {
                base_metric_v3: Some(v3),
                ..
            }) => (Some(v3.cvss_v3.base_score), v3.cvss_v3.base_severity),
            Some(NvdImpact {
                base_metric_v2: Some(v2),
                ..
            }) => (Some(v2.cvss_v2.base_score), v2.severity),
            _ => (None, None),
        };
        let cvss_score = score.and_then(|s| CvssScore::new(s).ok());
        let severity = match (severity_text, cvss_score) {
            (Some(text), _) => Severity::parse_lenient(&text),
            (None, Some(score)) => Severity::from_cvss_score(score),
            (None, None) => Severity::Informational,
        };

        Ok(CveRecord {
            cve_id,
            description,
            vendors: affected.vendors,
            products: affected.products,
            versions: affected.versions,
            cvss_score,
            severity,
            references,
        })
    }
}

/// NvdFeedCveRepository adapter implementing the CveRepository port
///
/// Loads an NVD JSON feed (or a flat JSON array of records) into memory once
/// and matches against it with [`CveMatcher`]. Entries whose id is not a
/// valid CVE id are skipped.
pub struct NvdFeedCveRepository {
    records: Vec<CveRecord>,
}

impl NvdFeedCveRepository {
    /// A store with no records. Scans then rely on the web and AI sources.
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn from_records(records: Vec<CveRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = read_trusted_file(path, "CVE feed", MAX_CVE_FEED_SIZE)?;
        let store = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            records = store.len(),
            "Loaded CVE feed"
        );
        Ok(store)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let records = match serde_json::from_str::<FeedFile>(content)? {
            FeedFile::Flat(records) => records,
            FeedFile::Nvd { items } => {
                let total = items.len();
                let records: Vec<CveRecord> = items
                    .into_iter()
                    .filter_map(|item| item.into_record().ok())
                    .collect();
                if records.len() < total {
                    tracing::warn!(
                        skipped = total - records.len(),
                        "Skipped CVE feed entries with invalid ids"
                    );
                }
                records
            }
        };
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CveRepository for NvdFeedCveRepository {
    async fn search_by_device(&self, target: &ScanTarget) -> Result<Vec<CveRecord>> {
        let matches = CveMatcher::match_device(target, &self.records)?;
        tracing::debug!(device = %target.label(), matches = matches.len(), "CVE store device lookup");
        Ok(matches)
    }

    async fn search_by_keywords(&self, keywords: &[String]) -> Result<Vec<CveRecord>> {
        CveMatcher::match_keywords(keywords, &self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const NVD_FEED: &str = r#"{
        "CVE_data_type": "CVE",
        "CVE_Items": [
            {
                "cve": {
                    "CVE_data_meta": {"ID": "CVE-2018-0101"},
                    "affects": {"vendor": {"vendor_data": [{
                        "vendor_name": "cisco",
                        "product": {"product_data": [{
                            "product_name": "adaptive_security_appliance",
                            "version": {"version_data": [{"version_value": "9.8"}]}
                        }]}
                    }]}},
                    "description": {"description_data": [{"lang": "en", "value": "A vulnerability in the XML parser of Cisco ASA Software."}]},
                    "references": {"reference_data": [{"url": "https://tools.cisco.com/security/center"}]}
                },
                "impact": {"baseMetricV3": {"cvssV3": {"baseScore": 10.0, "baseSeverity": "CRITICAL"}}}
            },
            {
                "cve": {
                    "CVE_data_meta": {"ID": "CVE-2023-27997"},
                    "description": {"description_data": [{"value": "Heap overflow in FortiOS SSL-VPN."}]}
                },
                "configurations": {"nodes": [{
                    "operator": "OR",
                    "children": [{"cpe_match": [{"vulnerable": true, "cpe23Uri": "cpe:2.3:o:fortinet:fortios:7.0.11:*:*:*:*:*:*:*"}]}]
                }]},
                "impact": {"baseMetricV2": {"cvssV2": {"baseScore": 6.5}, "severity": "MEDIUM"}}
            },
            {
                "cve": {"CVE_data_meta": {"ID": "not-a-cve"}}
            }
        ]
    }"#;

    #[test]
    fn test_parse_nvd_feed() {
        let store = NvdFeedCveRepository::parse(NVD_FEED).unwrap();
        assert_eq!(store.len(), 2);

        let asa = &store.records[0];
        assert_eq!(asa.cve_id.as_str(), "CVE-2018-0101");
        assert_eq!(asa.vendors, vec!["cisco"]);
        assert_eq!(asa.versions, vec!["9.8"]);
        assert_eq!(asa.severity, Severity::Critical);
        assert_eq!(asa.references.len(), 1);

        let fortios = &store.records[1];
        assert_eq!(fortios.products, vec!["fortios"]);
        assert_eq!(fortios.versions, vec!["7.0.11"]);
        assert_eq!(fortios.severity, Severity::Medium);
        assert_eq!(fortios.cvss_score.map(|s| s.value()), Some(6.5));
    }

    #[test]
    fn test_parse_flat_records() {
        let json = r#"[{
            "cve_id": "CVE-2024-3400",
            "description": "PAN-OS GlobalProtect command injection",
            "vendors": ["paloaltonetworks"],
            "products": ["pan-os"],
            "versions": ["10.2.9"],
            "cvss_score": 10.0,
            "severity": "critical",
            "references": []
        }]"#;
        let store = NvdFeedCveRepository::parse(json).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(NvdFeedCveRepository::parse("{\"foo\": 1}").is_err());
    }

    #[tokio::test]
    async fn test_search_by_device_uses_vendor_fields() {
        let store = NvdFeedCveRepository::parse(NVD_FEED).unwrap();

        let target = ScanTarget::new("Cisco", "adaptive security appliance", "9.8").unwrap();
        let found = store.search_by_device(&target).await.unwrap();
        assert_eq!(found.len(), 1);

        let other_version = ScanTarget::new("Cisco", "adaptive security appliance", "9.9").unwrap();
        assert!(store.search_by_device(&other_version).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_by_keywords() {
        let store = NvdFeedCveRepository::parse(NVD_FEED).unwrap();
        let found = store
            .search_by_keywords(&["fortios ssl-vpn".to_string()])
            .await
            .unwrap();
        assert_eq!(found[0].cve_id.as_str(), "CVE-2023-27997");
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nvdcve.json");
        fs::write(&path, NVD_FEED).unwrap();

        let store = NvdFeedCveRepository::load(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert!(NvdFeedCveRepository::empty().is_empty());
    }
}
