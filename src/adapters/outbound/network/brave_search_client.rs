use super::rate_limiter::MinIntervalLimiter;
use super::retry::RetryPolicy;
use crate::ports::outbound::WebSearchService;
use crate::shared::error::VulnTrackError;
use crate::shared::Result;
use crate::vulnerability_scanning::domain::{ScanTarget, WebHit};
use crate::vulnerability_scanning::services::WebHitFilter;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const SERVICE: &str = "Brave Search";

/// Connection settings for the Brave Search API
#[derive(Debug, Clone, PartialEq)]
pub struct BraveSearchSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub count: u32,
    pub country: String,
    pub search_lang: String,
    pub ui_lang: String,
    pub timeout: Duration,
    pub min_interval: Duration,
}

impl Default for BraveSearchSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.search.brave.com/res/v1".to_string(),
            count: 10,
            country: "US".to_string(),
            search_lang: "en".to_string(),
            ui_lang: "en-US".to_string(),
            timeout: Duration::from_secs(30),
            min_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWebResults>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResults {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

/// BraveSearchClient adapter implementing the WebSearchService port
///
/// Requests are spaced by a shared [`MinIntervalLimiter`] and retried per
/// [`RetryPolicy`]. Only the `web` result section is used.
pub struct BraveSearchClient {
    client: reqwest::Client,
    settings: BraveSearchSettings,
    limiter: MinIntervalLimiter,
    retry: RetryPolicy,
}

impl BraveSearchClient {
    pub fn new(settings: BraveSearchSettings, retry: RetryPolicy) -> Result<Self> {
        let user_agent = format!("vulntrack/{}", env!("CARGO_PKG_VERSION"));
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            limiter: MinIntervalLimiter::new(settings.min_interval),
            settings,
            retry,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/web/search", self.settings.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl WebSearchService for BraveSearchClient {
    async fn search_vulnerabilities(&self, target: &ScanTarget) -> Result<Vec<WebHit>> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| VulnTrackError::external(SERVICE, "BRAVE_SEARCH_API_KEY is not set"))?;

        let query = WebHitFilter::build_query(target);
        let url = self.endpoint();
        let count = self.settings.count.to_string();

        self.limiter.acquire().await;
        let response = self
            .retry
            .send(SERVICE, || {
                self.client
                    .get(&url)
                    .header("Accept", "application/json")
                    .header("X-Subscription-Token", api_key)
                    .query(&[
                        ("q", query.as_str()),
                        ("count", count.as_str()),
                        ("country", self.settings.country.as_str()),
                        ("search_lang", self.settings.search_lang.as_str()),
                        ("ui_lang", self.settings.ui_lang.as_str()),
                        ("freshness", "py"),
                        ("result_filter", "web"),
                        ("spellcheck", "1"),
                    ])
            })
            .await?;

        let body: BraveResponse = response
            .json()
            .await
            .map_err(|e| VulnTrackError::external(SERVICE, format!("invalid response: {}", e)))?;

        let hits: Vec<WebHit> = body
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .filter(|r| !r.url.is_empty() || !r.title.is_empty())
            .map(|r| WebHit {
                title: r.title,
                url: r.url,
                description: r.description,
            })
            .collect();

        tracing::info!(device = %target.label(), hits = hits.len(), "Brave Search returned results");
        Ok(hits)
    }
}
