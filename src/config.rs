use crate::scheduler::SchedulerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Document store configuration
    pub store: StoreConfig,

    /// Pipeline pool sizes and join timeouts
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,

    /// Cron trigger configuration
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        Self::load_from(&config_path)
    }

    /// Load configuration layering the embedded defaults, the file at `path`
    /// (if present) and `KEYWORD_TRENDS__*` environment variables
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::from(path.as_ref()).required(false))
            // Override with environment variables (KEYWORD_TRENDS__SECTION__KEY)
            .add_source(
                config::Environment::with_prefix("KEYWORD_TRENDS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            pipeline: PipelineConfig::default(),
            observability: ObservabilityConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store backend type
    #[serde(default)]
    pub backend: StoreBackend,

    /// Base URL of the search cluster
    pub url: Option<String>,

    /// Basic auth username
    pub username: Option<String>,

    /// Basic auth password (from env var)
    pub password_env: Option<String>,

    /// API key (from env var); takes precedence over basic auth
    pub api_key_env: Option<String>,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Document field holding the free-text body
    #[serde(default = "default_text_field")]
    pub text_field: String,

    /// Document field holding the publication date
    #[serde(default = "default_date_field")]
    pub date_field: String,

    /// Maximum documents returned by the single keyword query
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: Some("http://localhost:9200".to_string()),
            username: None,
            password_env: None,
            api_key_env: None,
            request_timeout_secs: default_request_timeout(),
            text_field: default_text_field(),
            date_field: default_date_field(),
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Elasticsearch,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Concurrent keyword aggregation jobs
    #[serde(default = "default_keyword_workers")]
    pub keyword_workers: usize,

    /// Concurrent document workers per keyword
    #[serde(default = "default_document_workers")]
    pub document_workers: usize,

    /// Upper bound on concurrent writes per keyword (also capped by CPU count)
    #[serde(default = "default_max_write_workers")]
    pub max_write_workers: usize,

    /// Wait for document workers before cancelling (seconds)
    #[serde(default = "default_join_timeout")]
    pub document_timeout_secs: u64,

    /// Wait for writes before cancelling (seconds)
    #[serde(default = "default_join_timeout")]
    pub write_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            keyword_workers: default_keyword_workers(),
            document_workers: default_document_workers(),
            max_write_workers: default_max_write_workers(),
            document_timeout_secs: default_join_timeout(),
            write_timeout_secs: default_join_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Recorded on the root span of every command
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
            prometheus_enabled: true,
        }
    }
}

// Default value functions
fn default_request_timeout() -> u64 {
    30
}

fn default_text_field() -> String {
    "text".to_string()
}

fn default_date_field() -> String {
    "published_date".to_string()
}

fn default_page_size() -> usize {
    1000
}

fn default_keyword_workers() -> usize {
    4
}

fn default_document_workers() -> usize {
    4
}

fn default_max_write_workers() -> usize {
    10
}

fn default_join_timeout() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "keyword-trends".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_page_size(), 1000);
        assert_eq!(default_keyword_workers(), 4);
        assert_eq!(default_document_workers(), 4);
        assert_eq!(default_max_write_workers(), 10);
        assert_eq!(default_join_timeout(), 60);
        assert_eq!(default_log_level(), "info");
        assert!(default_true());
    }

    #[test]
    fn test_store_backend() {
        assert_eq!(StoreBackend::default(), StoreBackend::Elasticsearch);
    }

    #[test]
    fn test_embedded_defaults_deserialize() {
        let config = Config::load_from("does/not/exist.toml").unwrap();
        assert_eq!(config.store.text_field, "text");
        assert_eq!(config.store.date_field, "published_date");
        assert_eq!(config.store.page_size, 1000);
        assert_eq!(config.pipeline.keyword_workers, 4);
        assert_eq!(config.observability.service_name, "keyword-trends");
        assert!(!config.scheduler.enabled);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[store]
backend = "memory"
page_size = 50

[pipeline]
document_workers = 8

[observability]
service_name = "trends-nightly"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.page_size, 50);
        assert_eq!(config.pipeline.document_workers, 8);
        assert_eq!(config.pipeline.keyword_workers, 4);
        assert_eq!(config.observability.service_name, "trends-nightly");
    }
}
