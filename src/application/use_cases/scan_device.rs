use crate::ports::outbound::{CveRepository, KnowledgeService, WebSearchService};
use crate::shared::error::VulnTrackError;
use crate::shared::Result;
use crate::vulnerability_scanning::domain::{CveRecord, ScanReport, ScanTarget};
use crate::vulnerability_scanning::services::{ResultMerger, ScanEvidence, WebHitFilter};
use chrono::Utc;
use std::sync::Arc;

/// Source names used in `ScanReport::degraded_sources` and logs
pub const SOURCE_LOCAL_DATABASE: &str = "local_database";
pub const SOURCE_WEB_SEARCH: &str = "web_search";
pub const SOURCE_AI_ANALYSIS: &str = "ai_analysis";

/// ScanDeviceUseCase - The vulnerability scanning pipeline for one device
///
/// Steps:
/// 1. Local CVE store lookup, falling back to a "brand model" keyword search
/// 2. Web search, filtered down to relevant hits
/// 3. AI analysis of the kept hits (skipped when there are none)
/// 4. Merge and score
///
/// A failing source degrades the report instead of failing the scan. The scan
/// fails only when every source that was attempted failed.
///
/// # Type Parameters
/// * `C` - CveRepository implementation
/// * `W` - WebSearchService implementation
/// * `K` - KnowledgeService implementation
pub struct ScanDeviceUseCase<C: ?Sized, W: ?Sized, K: ?Sized> {
    cve_repository: Arc<C>,
    web_search: Arc<W>,
    knowledge: Arc<K>,
}

impl<C: ?Sized, W: ?Sized, K: ?Sized> Clone for ScanDeviceUseCase<C, W, K> {
    fn clone(&self) -> Self {
        Self {
            cve_repository: Arc::clone(&self.cve_repository),
            web_search: Arc::clone(&self.web_search),
            knowledge: Arc::clone(&self.knowledge),
        }
    }
}

impl<C, W, K> ScanDeviceUseCase<C, W, K>
where
    C: CveRepository + ?Sized,
    W: WebSearchService + ?Sized,
    K: KnowledgeService + ?Sized,
{
    pub fn new(cve_repository: Arc<C>, web_search: Arc<W>, knowledge: Arc<K>) -> Self {
        Self {
            cve_repository,
            web_search,
            knowledge,
        }
    }

    pub async fn execute(&self, target: &ScanTarget) -> Result<ScanReport> {
        let mut evidence = ScanEvidence::default();
        let mut degraded: Vec<String> = Vec::new();
        let mut failures: Vec<String> = Vec::new();
        let mut attempted = 0usize;

        // Step 1: Local CVE store
        attempted += 1;
        match self.lookup_local(target).await {
            Ok(records) => evidence.local = records,
            Err(e) => {
                tracing::warn!(
                    source = SOURCE_LOCAL_DATABASE,
                    device = %target.label(),
                    error = %e,
                    "CVE store lookup failed"
                );
                degraded.push(SOURCE_LOCAL_DATABASE.to_string());
                failures.push(format!("{}: {}", SOURCE_LOCAL_DATABASE, e));
            }
        }

        // Step 2: Web search
        attempted += 1;
        let filtered = match self.web_search.search_vulnerabilities(target).await {
            Ok(hits) => Some(WebHitFilter::filter(target, hits)),
            Err(e) => {
                tracing::warn!(
                    source = SOURCE_WEB_SEARCH,
                    device = %target.label(),
                    error = %e,
                    "Web search failed"
                );
                degraded.push(SOURCE_WEB_SEARCH.to_string());
                failures.push(format!("{}: {}", SOURCE_WEB_SEARCH, e));
                None
            }
        };

        // Step 3: AI analysis, only with usable hits
        if let Some(filtered) = filtered {
            if filtered.is_empty() {
                tracing::debug!(
                    device = %target.label(),
                    "No relevant web hits, skipping AI analysis"
                );
            } else {
                attempted += 1;
                match self.knowledge.analyze(target, &filtered.kept).await {
                    Ok(analysis) => evidence.ai = Some(analysis),
                    Err(e) => {
                        tracing::warn!(
                            source = SOURCE_AI_ANALYSIS,
                            device = %target.label(),
                            error = %e,
                            "AI analysis failed"
                        );
                        degraded.push(SOURCE_AI_ANALYSIS.to_string());
                        failures.push(format!("{}: {}", SOURCE_AI_ANALYSIS, e));
                    }
                }
            }
            evidence.web_cve_ids = filtered.cve_ids;
        }

        if failures.len() == attempted {
            return Err(VulnTrackError::external(
                "Vulnerability scan",
                format!("all sources failed ({})", failures.join("; ")),
            )
            .into());
        }

        // Step 4: Merge and score
        let report = ResultMerger::merge(target, evidence, degraded, Utc::now());
        tracing::info!(
            device = %target.label(),
            vulnerabilities = report.vulnerabilities.len(),
            confidence = report.confidence_score,
            method = %report.method,
            "Scan finished"
        );
        Ok(report)
    }

    async fn lookup_local(&self, target: &ScanTarget) -> Result<Vec<CveRecord>> {
        let records = self.cve_repository.search_by_device(target).await?;
        if !records.is_empty() {
            return Ok(records);
        }

        let keywords = vec![format!("{} {}", target.brand.trim(), target.model.trim())];
        self.cve_repository.search_by_keywords(&keywords).await
    }
}
