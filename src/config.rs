//! Configuration file support for vulntrack.
//!
//! Settings come from an optional `vulntrack.config.yml` file and are then
//! overridden by environment variables. Secrets (API keys, the Supabase
//! key) are only ever read from the environment.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::adapters::outbound::network::{
    BraveSearchSettings, GeminiSettings, RetryPolicy, SupabaseSettings,
};
use crate::application::use_cases::BatchScanConfig;
use crate::logging::{LogFormat, DEFAULT_LOG_FILTER};
use crate::shared::error::VulnTrackError;
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "vulntrack.config.yml";

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_MAX_PENDING_SCANS: usize = 20;
const DEFAULT_WEB_CACHE_TTL_SECS: u64 = 3600;
const DEFAULT_SUPABASE_TIMEOUT_SECS: u64 = 30;
const MAX_SEARCH_COUNT: u32 = 20;

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub server: Option<ServerSection>,
    pub storage: Option<StorageSection>,
    pub cve_feed_path: Option<PathBuf>,
    pub brave_search: Option<BraveSearchSection>,
    pub gemini: Option<GeminiSection>,
    pub scan: Option<ScanSection>,
    pub logging: Option<LoggingSection>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yml::Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub max_pending_scans: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    /// `auto`, `memory` or `supabase`
    pub backend: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BraveSearchSection {
    pub base_url: Option<String>,
    pub count: Option<u32>,
    pub country: Option<String>,
    pub min_interval_ms: Option<u64>,
    pub cache_ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct GeminiSection {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ScanSection {
    pub timeout_secs: Option<u64>,
    pub batch_size: Option<usize>,
    pub rate_limit_delay_ms: Option<u64>,
    pub retry_count: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    pub format: Option<String>,
    /// `EnvFilter` directives, used when `RUST_LOG` is unset
    pub level: Option<String>,
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yml::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the values that can be checked without the environment.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Some(backend) = config.storage.as_ref().and_then(|s| s.backend.as_deref()) {
        if backend.parse::<StorageChoice>().is_err() {
            bail!(
                "Invalid config: storage.backend '{}' is not supported.\n\n\
                 💡 Hint: Use one of: auto, memory, supabase.",
                backend
            );
        }
    }

    if let Some(format) = config.logging.as_ref().and_then(|l| l.format.as_deref()) {
        if let Err(e) = format.parse::<LogFormat>() {
            bail!(
                "Invalid config: logging.format: {}\n\n💡 Hint: Use 'text' or 'json'.",
                e
            );
        }
    }

    if let Some(bind) = config.server.as_ref().and_then(|s| s.bind.as_deref()) {
        if bind.parse::<SocketAddr>().is_err() {
            bail!(
                "Invalid config: server.bind '{}' is not a socket address.\n\n\
                 💡 Hint: Use the form HOST:PORT (e.g., \"127.0.0.1:8000\").",
                bind
            );
        }
    }

    if let Some(origins) = config
        .server
        .as_ref()
        .and_then(|s| s.cors_allowed_origins.as_ref())
    {
        for (i, origin) in origins.iter().enumerate() {
            if origin.trim().is_empty() {
                bail!(
                    "Invalid config: server.cors_allowed_origins[{}] must not be empty.\n\n\
                     💡 Hint: Use \"*\" to allow every origin.",
                    i
                );
            }
        }
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StorageChoice {
    Auto,
    Memory,
    Supabase,
}

impl FromStr for StorageChoice {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(StorageChoice::Auto),
            "memory" => Ok(StorageChoice::Memory),
            "supabase" => Ok(StorageChoice::Supabase),
            _ => Err(()),
        }
    }
}

/// Where devices and scans are persisted
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    Memory,
    Supabase(SupabaseSettings),
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Supabase(_) => "supabase",
        }
    }
}

/// Fully resolved settings: file values, environment overrides and defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub cors_allowed_origins: Vec<String>,
    pub max_pending_scans: usize,
    pub storage: StorageBackend,
    pub cve_feed_path: Option<PathBuf>,
    pub brave_search: BraveSearchSettings,
    pub web_cache_ttl: Duration,
    pub gemini: GeminiSettings,
    pub batch: BatchScanConfig,
    pub retry: RetryPolicy,
    pub log_format: LogFormat,
    pub log_filter: String,
}

fn config_error(message: impl Into<String>, hint: impl Into<String>) -> anyhow::Error {
    VulnTrackError::Config {
        message: message.into(),
        hint: hint.into(),
    }
    .into()
}

/// Non-blank environment value
fn env_value<E>(env: &E, name: &str) -> Option<String>
where
    E: Fn(&str) -> Option<String>,
{
    env(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<E, T>(env: &E, name: &str) -> Result<Option<T>>
where
    E: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match env_value(env, name) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|_| {
            config_error(
                format!("{} has an invalid value '{}'", name, raw),
                format!("Unset {} or give it a numeric value", name),
            )
        }),
    }
}

impl AppConfig {
    /// Resolves against the process environment.
    pub fn from_env(file: ConfigFile) -> Result<Self> {
        Self::resolve(file, |name: &str| std::env::var(name).ok())
    }

    /// Resolves `file` with `env` as the variable lookup. Environment values
    /// win over file values.
    pub fn resolve<E>(file: ConfigFile, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let server = file.server.unwrap_or_default();
        let brave_section = file.brave_search.unwrap_or_default();
        let gemini_section = file.gemini.unwrap_or_default();
        let scan = file.scan.unwrap_or_default();
        let logging = file.logging.unwrap_or_default();

        let bind_raw = server.bind.unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.parse::<SocketAddr>().map_err(|_| {
            config_error(
                format!("server.bind '{}' is not a socket address", bind_raw),
                "Use the form HOST:PORT (e.g., \"127.0.0.1:8000\")",
            )
        })?;

        let max_pending_scans = server
            .max_pending_scans
            .unwrap_or(DEFAULT_MAX_PENDING_SCANS);
        if max_pending_scans == 0 {
            return Err(config_error(
                "server.max_pending_scans must be at least 1",
                "Remove the setting to use the default of 20",
            ));
        }

        let storage = Self::resolve_storage(file.storage.unwrap_or_default(), &env)?;

        let timeout_secs = env_parse::<_, u64>(&env, "VULN_SCAN_TIMEOUT")?
            .or(scan.timeout_secs)
            .unwrap_or(30);
        if timeout_secs == 0 {
            return Err(config_error(
                "scan timeout must be at least 1 second",
                "Set VULN_SCAN_TIMEOUT or scan.timeout_secs to a positive number",
            ));
        }
        let timeout = Duration::from_secs(timeout_secs);

        let defaults = BatchScanConfig::default();
        let batch = BatchScanConfig {
            batch_size: scan.batch_size.unwrap_or(defaults.batch_size),
            rate_limit_delay: scan
                .rate_limit_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.rate_limit_delay),
            timeout,
            retry_count: scan.retry_count.unwrap_or(defaults.retry_count),
            retry_backoff: defaults.retry_backoff,
        };
        if batch.batch_size == 0 {
            return Err(config_error(
                "scan.batch_size must be at least 1",
                "Remove the setting to use the default of 5",
            ));
        }

        let brave_defaults = BraveSearchSettings::default();
        let brave_search = BraveSearchSettings {
            api_key: env_value(&env, "BRAVE_SEARCH_API_KEY"),
            base_url: env_value(&env, "BRAVE_SEARCH_BASE_URL")
                .or(brave_section.base_url)
                .unwrap_or(brave_defaults.base_url),
            count: env_parse(&env, "BRAVE_SEARCH_COUNT")?
                .or(brave_section.count)
                .unwrap_or(brave_defaults.count),
            country: brave_section.country.unwrap_or(brave_defaults.country),
            min_interval: brave_section
                .min_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(brave_defaults.min_interval),
            timeout,
            ..brave_defaults
        };
        if !(1..=MAX_SEARCH_COUNT).contains(&brave_search.count) {
            return Err(config_error(
                format!(
                    "Brave Search result count must be between 1 and {}, got {}",
                    MAX_SEARCH_COUNT, brave_search.count
                ),
                "Adjust BRAVE_SEARCH_COUNT or brave_search.count",
            ));
        }

        let gemini_defaults = GeminiSettings::default();
        let gemini = GeminiSettings {
            api_key: env_value(&env, "GEMINI_API_KEY"),
            base_url: env_value(&env, "GEMINI_BASE_URL")
                .or(gemini_section.base_url)
                .unwrap_or(gemini_defaults.base_url),
            model: env_value(&env, "GEMINI_MODEL")
                .or(gemini_section.model)
                .unwrap_or(gemini_defaults.model),
            temperature: env_parse(&env, "GEMINI_TEMPERATURE")?
                .or(gemini_section.temperature)
                .unwrap_or(gemini_defaults.temperature),
            max_output_tokens: env_parse(&env, "GEMINI_MAX_TOKENS")?
                .or(gemini_section.max_output_tokens)
                .unwrap_or(gemini_defaults.max_output_tokens),
            timeout,
        };
        if !(0.0..=2.0).contains(&gemini.temperature) {
            return Err(config_error(
                format!(
                    "Gemini temperature must be between 0.0 and 2.0, got {}",
                    gemini.temperature
                ),
                "Adjust GEMINI_TEMPERATURE or gemini.temperature",
            ));
        }
        if gemini.max_output_tokens == 0 {
            return Err(config_error(
                "Gemini max output tokens must be at least 1",
                "Adjust GEMINI_MAX_TOKENS or gemini.max_output_tokens",
            ));
        }

        let log_format = match logging.format.as_deref() {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| config_error(e, "Use 'text' or 'json'"))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind,
            cors_allowed_origins: server
                .cors_allowed_origins
                .unwrap_or_else(|| vec!["*".to_string()]),
            max_pending_scans,
            storage,
            cve_feed_path: env_value(&env, "CVE_FEED_PATH")
                .map(PathBuf::from)
                .or(file.cve_feed_path),
            brave_search,
            web_cache_ttl: Duration::from_secs(
                brave_section
                    .cache_ttl_secs
                    .unwrap_or(DEFAULT_WEB_CACHE_TTL_SECS),
            ),
            gemini,
            batch,
            retry: RetryPolicy::default(),
            log_format,
            log_filter: logging
                .level
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    /// `auto` picks Supabase when both credentials are present.
    fn resolve_storage<E>(section: StorageSection, env: &E) -> Result<StorageBackend>
    where
        E: Fn(&str) -> Option<String>,
    {
        let choice = match section.backend.as_deref() {
            None => StorageChoice::Auto,
            Some(raw) => raw.parse::<StorageChoice>().map_err(|_| {
                config_error(
                    format!("storage.backend '{}' is not supported", raw),
                    "Use one of: auto, memory, supabase",
                )
            })?,
        };

        let url = env_value(env, "SUPABASE_URL");
        let key = env_value(env, "SUPABASE_KEY");
        let settings = |url: String, key: String| {
            StorageBackend::Supabase(SupabaseSettings {
                url,
                key,
                timeout: Duration::from_secs(DEFAULT_SUPABASE_TIMEOUT_SECS),
            })
        };

        match (choice, url, key) {
            (StorageChoice::Memory, _, _) => Ok(StorageBackend::Memory),
            (_, Some(url), Some(key)) => Ok(settings(url, key)),
            (StorageChoice::Auto, _, _) => Ok(StorageBackend::Memory),
            (StorageChoice::Supabase, None, _) => Err(config_error(
                "storage.backend is supabase but SUPABASE_URL is not set",
                "Export SUPABASE_URL and SUPABASE_KEY",
            )),
            (StorageChoice::Supabase, Some(_), None) => Err(config_error(
                "storage.backend is supabase but SUPABASE_KEY is not set",
                "Export SUPABASE_URL and SUPABASE_KEY",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "config.yml",
            r#"
server:
  bind: "127.0.0.1:9000"
  cors_allowed_origins:
    - https://dashboard.example.com
  max_pending_scans: 5
storage:
  backend: memory
cve_feed_path: ./feeds/nvdcve-1.1-2024.json
brave_search:
  count: 15
  cache_ttl_secs: 60
gemini:
  model: gemini-1.5-flash
  temperature: 0.4
scan:
  timeout_secs: 10
  batch_size: 3
  rate_limit_delay_ms: 250
  retry_count: 1
logging:
  format: json
  level: vulntrack=debug
"#,
        );

        let file = load_config_from_path(&path).unwrap();
        let config = AppConfig::resolve(file, env_from(&[])).unwrap();

        assert_eq!(config.bind, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://dashboard.example.com".to_string()]
        );
        assert_eq!(config.max_pending_scans, 5);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(
            config.cve_feed_path,
            Some(PathBuf::from("./feeds/nvdcve-1.1-2024.json"))
        );
        assert_eq!(config.brave_search.count, 15);
        assert_eq!(config.web_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.gemini.temperature, 0.4);
        assert_eq!(config.batch.batch_size, 3);
        assert_eq!(config.batch.rate_limit_delay, Duration::from_millis(250));
        assert_eq!(config.batch.retry_count, 1);
        assert_eq!(config.batch.timeout, Duration::from_secs(10));
        assert_eq!(config.gemini.timeout, Duration::from_secs(10));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_filter, "vulntrack=debug");
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = AppConfig::resolve(ConfigFile::default(), env_from(&[])).unwrap();

        assert_eq!(config.bind, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.cors_allowed_origins, vec!["*".to_string()]);
        assert_eq!(config.max_pending_scans, 20);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.cve_feed_path.is_none());
        assert!(config.brave_search.api_key.is_none());
        assert_eq!(config.brave_search.count, 10);
        assert_eq!(config.gemini.model, "gemini-pro");
        assert_eq!(config.batch.batch_size, 5);
        assert_eq!(config.batch.timeout, Duration::from_secs(30));
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file: ConfigFile = serde_yml::from_str(
            r#"
brave_search:
  count: 5
gemini:
  model: from-file
"#,
        )
        .unwrap();
        let env = env_from(&[
            ("BRAVE_SEARCH_API_KEY", "brave-key"),
            ("BRAVE_SEARCH_COUNT", "12"),
            ("BRAVE_SEARCH_BASE_URL", "http://localhost:9999"),
            ("GEMINI_API_KEY", "gemini-key"),
            ("GEMINI_MODEL", "from-env"),
            ("GEMINI_TEMPERATURE", "0.9"),
            ("GEMINI_MAX_TOKENS", "2048"),
            ("VULN_SCAN_TIMEOUT", "45"),
            ("CVE_FEED_PATH", "/data/nvd.json"),
        ]);

        let config = AppConfig::resolve(file, env).unwrap();

        assert_eq!(config.brave_search.api_key.as_deref(), Some("brave-key"));
        assert_eq!(config.brave_search.count, 12);
        assert_eq!(config.brave_search.base_url, "http://localhost:9999");
        assert_eq!(config.gemini.api_key.as_deref(), Some("gemini-key"));
        assert_eq!(config.gemini.model, "from-env");
        assert_eq!(config.gemini.temperature, 0.9);
        assert_eq!(config.gemini.max_output_tokens, 2048);
        assert_eq!(config.batch.timeout, Duration::from_secs(45));
        assert_eq!(config.cve_feed_path, Some(PathBuf::from("/data/nvd.json")));
    }

    #[test]
    fn test_storage_auto_selects_supabase_with_credentials() {
        let env = env_from(&[
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_KEY", "service-key"),
        ]);
        let config = AppConfig::resolve(ConfigFile::default(), env).unwrap();

        match config.storage {
            StorageBackend::Supabase(settings) => {
                assert_eq!(settings.url, "https://project.supabase.co");
                assert_eq!(settings.key, "service-key");
            }
            other => panic!("expected supabase, got {:?}", other),
        }
    }

    #[test]
    fn test_storage_memory_ignores_credentials() {
        let file: ConfigFile = serde_yml::from_str("storage:\n  backend: memory\n").unwrap();
        let env = env_from(&[
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_KEY", "service-key"),
        ]);
        let config = AppConfig::resolve(file, env).unwrap();
        assert_eq!(config.storage.name(), "memory");
    }

    #[test]
    fn test_storage_supabase_requires_credentials() {
        let file: ConfigFile = serde_yml::from_str("storage:\n  backend: supabase\n").unwrap();
        let err = AppConfig::resolve(file, env_from(&[])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("SUPABASE_URL is not set"));
        assert!(message.contains("💡 Hint"));
    }

    #[test]
    fn test_invalid_numeric_environment_value() {
        let env = env_from(&[("BRAVE_SEARCH_COUNT", "many")]);
        let err = AppConfig::resolve(ConfigFile::default(), env).unwrap_err();
        assert!(err
            .to_string()
            .contains("BRAVE_SEARCH_COUNT has an invalid value 'many'"));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        for env in [
            env_from(&[("BRAVE_SEARCH_COUNT", "21")]),
            env_from(&[("GEMINI_TEMPERATURE", "2.5")]),
            env_from(&[("VULN_SCAN_TIMEOUT", "0")]),
            env_from(&[("GEMINI_MAX_TOKENS", "0")]),
        ] {
            assert!(AppConfig::resolve(ConfigFile::default(), env).is_err());
        }

        let file: ConfigFile = serde_yml::from_str("scan:\n  batch_size: 0\n").unwrap();
        assert!(AppConfig::resolve(file, env_from(&[])).is_err());
    }

    #[test]
    fn test_blank_environment_values_ignored() {
        let env = env_from(&[("GEMINI_API_KEY", "   "), ("GEMINI_MODEL", "")]);
        let config = AppConfig::resolve(ConfigFile::default(), env).unwrap();
        assert!(config.gemini.api_key.is_none());
        assert_eq!(config.gemini.model, "gemini-pro");
    }

    #[test]
    fn test_discover_config_found() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, CONFIG_FILENAME, "logging:\n  format: text\n");

        let config = discover_config(dir.path()).unwrap();
        assert!(config.is_some());
        let logging = config.unwrap().logging.unwrap();
        assert_eq!(logging.format.as_deref(), Some("text"));
    }

    #[test]
    fn test_discover_config_not_found() {
        let dir = TempDir::new().unwrap();
        let config = discover_config(dir.path()).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config_from_path(Path::new("/nonexistent/config.yml"));
        assert!(result.is_err());
        let err = format!("{}", result.unwrap_err());
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "bad.yml", "invalid: yaml: [[[broken");

        let err = format!("{}", load_config_from_path(&path).unwrap_err());
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_unknown_section_field_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "config.yml", "server:\n  port: 8000\n");
        assert!(load_config_from_path(&path).is_err());
    }

    #[test]
    fn test_invalid_values_rejected_on_load() {
        let dir = TempDir::new().unwrap();
        for (content, expected) in [
            ("storage:\n  backend: sqlite\n", "storage.backend 'sqlite'"),
            ("logging:\n  format: xml\n", "logging.format"),
            ("server:\n  bind: localhost\n", "server.bind 'localhost'"),
            (
                "server:\n  cors_allowed_origins: [\"\"]\n",
                "cors_allowed_origins[0] must not be empty",
            ),
        ] {
            let path = write_config(&dir, "config.yml", content);
            let err = format!("{}", load_config_from_path(&path).unwrap_err());
            assert!(err.contains(expected), "{} did not contain {}", err, expected);
        }
    }

    #[test]
    fn test_unknown_fields_warning() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "config.yml",
            r#"
cve_feed_path: nvd.json
unknown_field: true
another_unknown: value
"#,
        );

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.unknown_fields.len(), 2);
        assert!(config.unknown_fields.contains_key("unknown_field"));
        assert!(config.unknown_fields.contains_key("another_unknown"));
    }
}
