use crate::shared::Result;
use crate::vulnerability_scanning::domain::{ScanTarget, WebHit};
use async_trait::async_trait;

/// WebSearchService port for looking up public vulnerability reports
///
/// Implementations build their query from the target and return raw,
/// unfiltered hits.
#[async_trait]
pub trait WebSearchService: Send + Sync {
    async fn search_vulnerabilities(&self, target: &ScanTarget) -> Result<Vec<WebHit>>;
}
