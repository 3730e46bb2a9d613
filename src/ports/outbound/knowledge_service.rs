use crate::shared::Result;
use crate::vulnerability_scanning::domain::{AiAnalysis, ScanTarget, WebHit};
use async_trait::async_trait;

/// KnowledgeService port for AI analysis of search evidence
#[async_trait]
pub trait KnowledgeService: Send + Sync {
    /// Asks the model which of the hits describe real vulnerabilities of the target
    ///
    /// # Errors
    /// Returns an error if the service is unreachable or its answer cannot be parsed
    async fn analyze(&self, target: &ScanTarget, hits: &[WebHit]) -> Result<AiAnalysis>;
}
