use crate::vulnerability_scanning::domain::{CveId, ScanTarget, WebHit};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Terms that mark a hit as shopping or marketing material
const MARKETING_TERMS: &[&str] = &[
    "buy now",
    "best price",
    "free shipping",
    "add to cart",
    "datasheet",
    "unboxing",
    "in stock",
];

/// Terms that make a hit security-relevant even when it reads like marketing
const SECURITY_TERMS: &[&str] = &[
    "vulnerab",
    "exploit",
    "advisory",
    "security",
    "patch",
    "cve",
];

fn cve_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\bCVE-\d{4}-\d{4,}\b").expect("CVE pattern is a valid regex")
    })
}

/// Extracts every CVE identifier mentioned in `text`
pub fn extract_cve_ids(text: &str) -> BTreeSet<CveId> {
    cve_pattern()
        .find_iter(text)
        .filter_map(|m| CveId::new(m.as_str()).ok())
        .collect()
}

/// Web hits that survived filtering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredHits {
    pub kept: Vec<WebHit>,
    pub cve_ids: BTreeSet<CveId>,
    pub discarded: usize,
}

impl FilteredHits {
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}

/// WebHitFilter - Builds the search query for a device and discards
/// irrelevant results.
pub struct WebHitFilter;

impl WebHitFilter {
    pub fn build_query(target: &ScanTarget) -> String {
        format!(
            "\"{}\" \"{}\" \"{}\" vulnerability CVE security exploit",
            target.brand.trim(),
            target.model.trim(),
            target.version.trim()
        )
    }

    /// Keeps hits that mention the model or version or cite a CVE id.
    /// Marketing pages are dropped unless they also carry security content.
    pub fn filter(target: &ScanTarget, hits: Vec<WebHit>) -> FilteredHits {
        let model = target.model.trim().to_lowercase();
        let version = target.version.trim().to_lowercase();

        let mut filtered = FilteredHits::default();
        for hit in hits {
            let text = format!("{} {}", hit.title, hit.description);
            let lowered = text.to_lowercase();
            let cve_ids = extract_cve_ids(&text);

            let mentions_device = lowered.contains(&model) || lowered.contains(&version);
            let is_marketing = MARKETING_TERMS.iter().any(|t| lowered.contains(t));
            let is_security = SECURITY_TERMS.iter().any(|t| lowered.contains(t));

            let keep = !cve_ids.is_empty() || (mentions_device && (!is_marketing || is_security));
            if keep {
                filtered.cve_ids.extend(cve_ids);
                filtered.kept.push(hit);
            } else {
                filtered.discarded += 1;
            }
        }

        tracing::debug!(
            kept = filtered.kept.len(),
            discarded = filtered.discarded,
            cve_ids = filtered.cve_ids.len(),
            "Filtered web search hits"
        );
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, description: &str) -> WebHit {
        WebHit {
            title: title.to_string(),
            url: "https://example.com".to_string(),
            description: description.to_string(),
        }
    }

    fn target() -> ScanTarget {
        ScanTarget::new("Fortinet", "FortiGate 60F", "7.0.12").unwrap()
    }

    #[test]
    fn test_build_query() {
        assert_eq!(
            WebHitFilter::build_query(&target()),
            "\"Fortinet\" \"FortiGate 60F\" \"7.0.12\" vulnerability CVE security exploit"
        );
    }

    #[test]
    fn test_extract_cve_ids() {
        let ids = extract_cve_ids("See cve-2023-27997 and CVE-2024-21762, not CVE-24-1");
        let ids: Vec<&str> = ids.iter().map(CveId::as_str).collect();
        assert_eq!(ids, vec!["CVE-2023-27997", "CVE-2024-21762"]);
    }

    #[test]
    fn test_keeps_hits_mentioning_model_or_version() {
        let hits = vec![
            hit("FortiGate 60F SSL VPN flaw", ""),
            hit("Release notes", "FortiOS 7.0.12 fixes a heap overflow"),
            hit("Best routers of the year", "Our favorite home routers"),
        ];
        let filtered = WebHitFilter::filter(&target(), hits);
        assert_eq!(filtered.kept.len(), 2);
        assert_eq!(filtered.discarded, 1);
    }

    #[test]
    fn test_keeps_hits_citing_cve_and_collects_ids() {
        let hits = vec![hit("Critical flaw", "Tracked as CVE-2023-27997")];
        let filtered = WebHitFilter::filter(&target(), hits);
        assert_eq!(filtered.kept.len(), 1);
        assert!(filtered
            .cve_ids
            .contains(&CveId::new("CVE-2023-27997").unwrap()));
    }

    #[test]
    fn test_drops_marketing_only_hits() {
        let hits = vec![
            hit("FortiGate 60F - Best Price", "Buy now with free shipping"),
            hit("FortiGate 60F datasheet", "Security advisory links inside"),
        ];
        let filtered = WebHitFilter::filter(&target(), hits);
        assert_eq!(filtered.kept.len(), 1);
        assert_eq!(filtered.kept[0].title, "FortiGate 60F datasheet");
    }

    #[test]
    fn test_empty_input() {
        let filtered = WebHitFilter::filter(&target(), Vec::new());
        assert!(filtered.is_empty());
        assert_eq!(filtered.discarded, 0);
    }
}
