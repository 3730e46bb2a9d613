use crate::vulnerability_scanning::domain::{
    AiAnalysis, AiFinding, CveId, CveRecord, FindingSource, ScanMethod, ScanReport, ScanTarget,
    Severity, Vulnerability,
};
use crate::vulnerability_scanning::policies::FindingDefaults;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};

/// Confidence of a finding backed by the local CVE store
pub const LOCAL_CONFIDENCE: f64 = 0.9;

/// Confidence assumed when the AI omits one
pub const DEFAULT_AI_CONFIDENCE: f64 = 0.5;

/// Confidence of a finding reported by both the local store and the AI
pub const CORROBORATED_CONFIDENCE: f64 = 1.0;

/// Bonus for a CVE id also cited by a kept web hit
pub const WEB_CORROBORATION_BONUS: f64 = 0.1;

/// Everything the three sources produced for one device
#[derive(Debug, Clone, Default)]
pub struct ScanEvidence {
    pub local: Vec<CveRecord>,
    pub ai: Option<AiAnalysis>,
    pub web_cve_ids: BTreeSet<CveId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum FindingKey {
    Cve(CveId),
    Description(String),
}

fn normalize_description(description: &str) -> String {
    description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// ResultMerger - Combines local records, AI findings and web corroboration
/// into one deduplicated, scored report.
pub struct ResultMerger;

impl ResultMerger {
    pub fn merge(
        target: &ScanTarget,
        evidence: ScanEvidence,
        degraded_sources: Vec<String>,
        now: DateTime<Utc>,
    ) -> ScanReport {
        let mut findings: Vec<Vulnerability> = Vec::new();
        let mut index: HashMap<FindingKey, usize> = HashMap::new();

        for record in evidence.local {
            let key = FindingKey::Cve(record.cve_id.clone());
            if index.contains_key(&key) {
                continue;
            }
            index.insert(key, findings.len());
            findings.push(Self::from_local(record));
        }

        let ai_confidence = evidence
            .ai
            .as_ref()
            .map(|a| a.confidence_score.unwrap_or(DEFAULT_AI_CONFIDENCE).clamp(0.0, 1.0));

        if let (Some(analysis), Some(confidence)) = (evidence.ai.as_ref(), ai_confidence) {
            if analysis.vulnerability_found {
                for finding in &analysis.vulnerabilities {
                    Self::add_ai_finding(&mut findings, &mut index, finding, confidence);
                }
            }
        }

        for finding in &mut findings {
            let corroborated = finding
                .cve_id
                .as_ref()
                .is_some_and(|id| evidence.web_cve_ids.contains(id));
            if corroborated {
                finding.sources.insert(FindingSource::WebSearch);
                finding.confidence += WEB_CORROBORATION_BONUS;
            }
            finding.confidence = finding.confidence.clamp(0.0, 1.0);
        }

        findings.sort_by(|a, b| {
            b.severity.cmp(&a.severity).then_with(|| match (&a.cve_id, &b.cve_id) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.name.cmp(&b.name),
            })
        });

        let method = Self::method(&findings);
        let confidence_score = findings
            .iter()
            .map(|f| f.confidence)
            .reduce(f64::max)
            .or(ai_confidence)
            .unwrap_or(0.0);

        let summary = evidence
            .ai
            .as_ref()
            .and_then(|a| non_blank(a.summary.as_ref()))
            .unwrap_or_else(|| FindingDefaults::summary(&target.label(), &findings, method));

        let mut report = ScanReport {
            device_id: target.device_id,
            vulnerabilities: findings,
            confidence_score,
            method,
            summary,
            recommendations: evidence
                .ai
                .map(|a| a.recommendations)
                .unwrap_or_default(),
            degraded_sources,
            generated_at: now,
        };
        if report.recommendations.is_empty() {
            report.recommendations = FindingDefaults::recommendations(&report);
        }
        report
    }

    fn from_local(record: CveRecord) -> Vulnerability {
        let severity = match (record.severity, record.cvss_score) {
            (Severity::Informational, Some(score)) => Severity::from_cvss_score(score),
            (severity, _) => severity,
        };
        let affected_software = if record.products.is_empty() {
            None
        } else {
            Some(record.products.join(", "))
        };

        Vulnerability {
            name: record.cve_id.to_string(),
            cve_id: Some(record.cve_id),
            description: record.description,
            severity,
            cvss_score: record.cvss_score,
            remediation: None,
            affected_software,
            reference_links: record.references,
            sources: BTreeSet::from([FindingSource::LocalDatabase]),
            confidence: LOCAL_CONFIDENCE,
        }
    }

    fn add_ai_finding(
        findings: &mut Vec<Vulnerability>,
        index: &mut HashMap<FindingKey, usize>,
        finding: &AiFinding,
        confidence: f64,
    ) {
        let cve_id = finding
            .cve_id
            .as_deref()
            .and_then(|raw| CveId::new(raw).ok());
        let description = non_blank(finding.description.as_ref());
        let severity = Severity::parse_lenient(finding.severity.as_deref().unwrap_or_default());

        let (key, name) = match (&cve_id, &description) {
            (Some(id), _) => (FindingKey::Cve(id.clone()), id.to_string()),
            (None, Some(text)) => (
                FindingKey::Description(normalize_description(text)),
                text.chars().take(80).collect(),
            ),
            // Nothing to identify or describe the finding by
            (None, None) => return,
        };

        if let Some(&position) = index.get(&key) {
            let existing = &mut findings[position];
            existing.severity = existing.severity.max(severity);
            if existing.description.trim().is_empty() {
                if let Some(text) = description {
                    existing.description = text;
                }
            }
            if existing.remediation.is_none() {
                existing.remediation = non_blank(finding.remediation.as_ref());
            }
            if let Some(url) = non_blank(finding.source_url.as_ref()) {
                if !existing.reference_links.contains(&url) {
                    existing.reference_links.push(url);
                }
            }
            existing.confidence = if existing.is_from(FindingSource::LocalDatabase) {
                CORROBORATED_CONFIDENCE
            } else {
                existing.confidence.max(confidence)
            };
            existing.sources.insert(FindingSource::AiAnalysis);
            return;
        }

        index.insert(key, findings.len());
        findings.push(Vulnerability {
            cve_id,
            name,
            description: description.unwrap_or_default(),
            severity,
            cvss_score: None,
            remediation: non_blank(finding.remediation.as_ref()),
            affected_software: None,
            reference_links: non_blank(finding.source_url.as_ref()).into_iter().collect(),
            sources: BTreeSet::from([FindingSource::AiAnalysis]),
            confidence,
        });
    }

    fn method(findings: &[Vulnerability]) -> ScanMethod {
        let local = findings
            .iter()
            .any(|f| f.is_from(FindingSource::LocalDatabase));
        let ai = findings.iter().any(|f| f.is_from(FindingSource::AiAnalysis));
        match (local, ai) {
            (true, true) => ScanMethod::Hybrid,
            (true, false) => ScanMethod::LocalDatabase,
            (false, true) => ScanMethod::WebAi,
            (false, false) => ScanMethod::None,
        }
    }
}
