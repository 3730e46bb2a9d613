use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use vulntrack::prelude::*;
use vulntrack::vulnerability_scanning::domain::WebHit;

/// Mock WebSearchService returning fixed hits and counting calls
#[derive(Default)]
pub struct MockWebSearch {
    pub hits: Vec<WebHit>,
    pub should_fail: bool,
    calls: AtomicUsize,
}

impl MockWebSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hit(mut self, title: &str, description: &str) -> Self {
        self.hits.push(WebHit {
            title: title.to_string(),
            url: format!("https://example.com/{}", self.hits.len()),
            description: description.to_string(),
        });
        self
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebSearchService for MockWebSearch {
    async fn search_vulnerabilities(&self, _target: &ScanTarget) -> Result<Vec<WebHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            anyhow::bail!("Mock web search failure");
        }
        Ok(self.hits.clone())
    }
}
