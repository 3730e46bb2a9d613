use crate::shared::Result;
use crate::vulnerability_scanning::domain::{CveRecord, ScanTarget};
use async_trait::async_trait;

/// CveRepository port for the local CVE store
///
/// Implementations must be `Send + Sync` so one store can serve concurrent scans.
#[async_trait]
pub trait CveRepository: Send + Sync {
    /// Records whose brand, model and version all match the target
    async fn search_by_device(&self, target: &ScanTarget) -> Result<Vec<CveRecord>>;

    /// Records whose description mentions any of the keywords
    async fn search_by_keywords(&self, keywords: &[String]) -> Result<Vec<CveRecord>>;
}
