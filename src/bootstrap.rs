//! Wires adapters into use cases from a resolved `AppConfig`.

use std::sync::Arc;

use crate::adapters::inbound::http::AppState;
use crate::adapters::outbound::cve_store::NvdFeedCveRepository;
use crate::adapters::outbound::memory::{InMemoryDeviceRepository, InMemoryScanRepository};
use crate::adapters::outbound::network::{
    BraveSearchClient, CachingWebSearch, GeminiClient, PostgrestClient, SupabaseDeviceRepository,
    SupabaseScanRepository,
};
use crate::application::use_cases::{
    BatchScanUseCase, DynBatchScanner, ManageDevicesUseCase, ScanDeviceUseCase, ScanJobsUseCase,
};
use crate::config::{AppConfig, StorageBackend};
use crate::ports::outbound::{
    CveRepository, DeviceRepository, KnowledgeService, ProgressReporter, ScanRepository,
    WebSearchService,
};
use crate::shared::Result;

/// The three evidence sources of the scan pipeline
#[derive(Clone)]
pub struct ScanSources {
    pub cve_repository: Arc<dyn CveRepository>,
    pub web_search: Arc<dyn WebSearchService>,
    pub knowledge: Arc<dyn KnowledgeService>,
}

impl ScanSources {
    /// Loads the CVE feed and builds the Brave Search and Gemini clients.
    ///
    /// Missing API keys are not fatal here: the affected source fails at
    /// scan time and the report is marked degraded.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let cve_repository = match config.cve_feed_path.as_deref() {
            Some(path) => NvdFeedCveRepository::load(path)?,
            None => {
                tracing::warn!("No CVE feed configured (CVE_FEED_PATH), local lookups return nothing");
                NvdFeedCveRepository::empty()
            }
        };

        if config.brave_search.api_key.is_none() {
            tracing::warn!("BRAVE_SEARCH_API_KEY is not set, web search will be unavailable");
        }
        if config.gemini.api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set, AI analysis will be unavailable");
        }

        let brave = BraveSearchClient::new(config.brave_search.clone(), config.retry.clone())?;
        let gemini = GeminiClient::new(config.gemini.clone(), config.retry.clone())?;

        Ok(Self {
            cve_repository: Arc::new(cve_repository),
            web_search: Arc::new(CachingWebSearch::new(Arc::new(brave), config.web_cache_ttl)),
            knowledge: Arc::new(gemini),
        })
    }

    pub fn scanner(
        &self,
    ) -> ScanDeviceUseCase<dyn CveRepository, dyn WebSearchService, dyn KnowledgeService> {
        ScanDeviceUseCase::new(
            Arc::clone(&self.cve_repository),
            Arc::clone(&self.web_search),
            Arc::clone(&self.knowledge),
        )
    }

    pub fn batch_scanner(
        &self,
        progress_reporter: Arc<dyn ProgressReporter>,
        config: &AppConfig,
    ) -> DynBatchScanner {
        BatchScanUseCase::new(self.scanner(), progress_reporter, config.batch.clone())
    }
}

/// Device and scan repositories for the configured backend
pub fn build_repositories(
    config: &AppConfig,
) -> Result<(Arc<dyn DeviceRepository>, Arc<dyn ScanRepository>)> {
    match &config.storage {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory storage, data is lost on restart");
            Ok((
                Arc::new(InMemoryDeviceRepository::new()),
                Arc::new(InMemoryScanRepository::new()),
            ))
        }
        StorageBackend::Supabase(settings) => {
            tracing::info!(url = %settings.url, "Using Supabase storage");
            let client = Arc::new(PostgrestClient::new(settings, config.retry.clone())?);
            Ok((
                Arc::new(SupabaseDeviceRepository::new(Arc::clone(&client))),
                Arc::new(SupabaseScanRepository::new(client)),
            ))
        }
    }
}

/// Builds the HTTP state: repositories, scan sources and the job runner.
pub fn build_app_state(
    config: &AppConfig,
    sources: &ScanSources,
    progress_reporter: Arc<dyn ProgressReporter>,
) -> Result<AppState> {
    let (devices, scans) = build_repositories(config)?;
    let scanner = Arc::new(sources.batch_scanner(progress_reporter, config));

    Ok(AppState::new(
        ManageDevicesUseCase::new(Arc::clone(&devices)),
        ScanJobsUseCase::new(devices, scans, scanner, config.max_pending_scans),
        config.storage.name(),
        config.cors_allowed_origins.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::console::TracingProgressReporter;
    use crate::config::ConfigFile;
    use crate::vulnerability_scanning::domain::ScanTarget;
    use std::fs;
    use tempfile::TempDir;

    fn config(env: &[(&str, &str)]) -> AppConfig {
        let vars: Vec<(String, String)> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::resolve(ConfigFile::default(), move |name: &str| {
            vars.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_sources_load_configured_feed() {
        let dir = TempDir::new().unwrap();
        let feed = dir.path().join("feed.json");
        fs::write(
            &feed,
            r#"[{"cve_id": "CVE-2023-27997", "description": "Heap overflow",
                "vendors": ["fortinet"], "products": ["fortigate 60f"], "versions": ["7.0.12"],
                "cvss_score": 9.8, "severity": "critical", "references": []}]"#,
        )
        .unwrap();
        let config = config(&[("CVE_FEED_PATH", feed.to_str().unwrap())]);

        let sources = ScanSources::from_config(&config).unwrap();
        let target = ScanTarget::new("Fortinet", "FortiGate 60F", "7.0.12").unwrap();
        let records = sources.cve_repository.search_by_device(&target).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_missing_feed_is_an_error() {
        let config = config(&[("CVE_FEED_PATH", "/nonexistent/feed.json")]);
        assert!(ScanSources::from_config(&config).is_err());
    }

    #[test]
    fn test_app_state_uses_memory_by_default() {
        let config = config(&[]);
        let sources = ScanSources::from_config(&config).unwrap();
        let state =
            build_app_state(&config, &sources, Arc::new(TracingProgressReporter)).unwrap();
        assert_eq!(state.storage, "memory");
        assert_eq!(state.scans.pending_scans(), 0);
    }

    #[test]
    fn test_app_state_with_supabase() {
        let config = config(&[
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_KEY", "service-key"),
        ]);
        let sources = ScanSources::from_config(&config).unwrap();
        let state =
            build_app_state(&config, &sources, Arc::new(TracingProgressReporter)).unwrap();
        assert_eq!(state.storage, "supabase");
    }
}
