//! Configuration management for ScholarGraph services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{APP_ENV}.toml)
//! - Default values

use crate::retry::RetryPolicy;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

/// Citation threshold applied by the relevance filter
pub const DEFAULT_MIN_CITATIONS: u64 = 10;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct AppConfig {
    /// Search API configuration
    #[serde(default)]
    #[validate(nested)]
    pub api: ApiConfig,

    /// Rate-limit retry configuration
    #[serde(default)]
    #[validate(nested)]
    pub retry: RetryConfig,

    /// Intermediate record files
    #[serde(default)]
    pub storage: StorageConfig,

    /// Relevance filter configuration
    #[serde(default)]
    #[validate(nested)]
    pub cleaning: CleaningConfig,

    /// Graph store configuration
    #[serde(default)]
    #[validate(nested)]
    pub graph: GraphConfig,

    /// Aggregation report configuration
    #[serde(default)]
    #[validate(nested)]
    pub analytics: AnalyticsConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ApiConfig {
    /// Paper search endpoint
    #[serde(default = "default_api_url")]
    #[validate(length(min = 1))]
    pub url: String,

    /// Optional API key, sent as `x-api-key`
    pub api_key: Option<String>,

    /// Search query
    #[serde(default = "default_query")]
    #[validate(length(min = 1))]
    pub query: String,

    /// Number of pages to request (clamped to the pagination ceiling)
    #[serde(default = "default_pages")]
    #[validate(range(min = 1))]
    pub pages: u32,

    /// Records per page
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1))]
    pub page_size: u32,

    /// Comma-separated field selector
    #[serde(default = "default_fields")]
    pub fields: String,

    /// Request timeout in seconds
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,

    /// Pause after every page in seconds
    #[serde(default = "default_page_pause")]
    pub page_pause_secs: u64,

    /// Fetch fresh data before cleaning instead of re-cleaning the raw file
    #[serde(default)]
    pub fetch_on_start: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct RetryConfig {
    /// Attempts per page before it is abandoned
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1))]
    pub max_attempts: u32,

    /// First wait after a rate-limit response, in seconds
    #[serde(default = "default_initial_delay")]
    pub initial_delay_secs: u64,

    /// Growth factor applied to the wait after each rate-limit response
    #[serde(default = "default_multiplier")]
    #[validate(range(min = 1.0, max = 10.0))]
    pub multiplier: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Raw fetched records
    #[serde(default = "default_raw_path")]
    pub raw_path: PathBuf,

    /// Cleaned and downsampled records
    #[serde(default = "default_clean_path")]
    pub clean_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CleaningConfig {
    /// Minimum citation count (missing counts as 0)
    #[serde(default = "default_min_citations")]
    pub min_citations: u64,

    /// Maximum number of records kept after ranking
    #[serde(default = "default_target")]
    #[validate(range(min = 1))]
    pub target: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct GraphConfig {
    /// Neo4j HTTP endpoint
    #[serde(default = "default_graph_uri")]
    #[validate(length(min = 1))]
    pub uri: String,

    #[serde(default = "default_graph_user")]
    pub user: String,

    pub password: Option<String>,

    /// Database name
    #[serde(default = "default_graph_database")]
    pub database: String,

    /// Query timeout in seconds
    #[serde(default = "default_graph_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AnalyticsConfig {
    /// Size of the overall top-datasets ranking
    #[serde(default = "default_top_k")]
    #[validate(range(min = 1))]
    pub top_k: usize,

    /// How many of the top datasets restrict the downstream queries
    #[serde(default = "default_focus_datasets")]
    pub focus_datasets: usize,

    /// Where to write the JSON report (none to skip)
    pub report_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,
}

// Default value functions
fn default_api_url() -> String { "https://api.semanticscholar.org/graph/v1/paper/search".to_string() }
fn default_query() -> String { "machine learning".to_string() }
fn default_pages() -> u32 { 50 }
fn default_page_size() -> u32 { 100 }
fn default_fields() -> String {
    "paperId,title,abstract,year,authors,citationCount,referenceCount,venue,fieldsOfStudy".to_string()
}
fn default_api_timeout() -> u64 { 30 }
fn default_page_pause() -> u64 { 3 }
fn default_max_attempts() -> u32 { 5 }
fn default_initial_delay() -> u64 { 5 }
fn default_multiplier() -> f64 { 2.0 }
fn default_raw_path() -> PathBuf { PathBuf::from("data/raw/papers_semanticscholar.json") }
fn default_clean_path() -> PathBuf { PathBuf::from("data/processed/papers_semanticscholar_clean.json") }
fn default_min_citations() -> u64 { DEFAULT_MIN_CITATIONS }
fn default_target() -> usize { 500 }
fn default_graph_uri() -> String { "http://localhost:7474".to_string() }
fn default_graph_user() -> String { "neo4j".to_string() }
fn default_graph_database() -> String { "neo4j".to_string() }
fn default_graph_timeout() -> u64 { 60 }
fn default_top_k() -> usize { 10 }
fn default_focus_datasets() -> usize { 5 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            api_key: None,
            query: default_query(),
            pages: default_pages(),
            page_size: default_page_size(),
            fields: default_fields(),
            timeout_secs: default_api_timeout(),
            page_pause_secs: default_page_pause(),
            fetch_on_start: false,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_secs: default_initial_delay(),
            multiplier: default_multiplier(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            raw_path: default_raw_path(),
            clean_path: default_clean_path(),
        }
    }
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            min_citations: default_min_citations(),
            target: default_target(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: default_graph_uri(),
            user: default_graph_user(),
            password: None,
            database: default_graph_database(),
            timeout_secs: default_graph_timeout(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            focus_datasets: default_focus_datasets(),
            report_path: None,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__CLEANING__TARGET=300
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Retry policy for rate-limited page requests
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            initial_delay: Duration::from_secs(self.retry.initial_delay_secs),
            multiplier: self.retry.multiplier,
        }
    }

    /// Pause between pages as Duration
    pub fn page_pause(&self) -> Duration {
        Duration::from_secs(self.api.page_pause_secs)
    }

    /// API request timeout as Duration
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Graph query timeout as Duration
    pub fn graph_timeout(&self) -> Duration {
        Duration::from_secs(self.graph.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api.page_size, 100);
        assert_eq!(config.cleaning.min_citations, 10);
        assert_eq!(config.cleaning.target, 500);
        assert_eq!(config.analytics.top_k, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_policy_from_config() {
        let policy = AppConfig::default().retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_delay, Duration::from_secs(5));
        assert_eq!(policy.multiplier, 2.0);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut config = AppConfig::default();
        config.api.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shrinking_multiplier_rejected() {
        let mut config = AppConfig::default();
        config.retry.multiplier = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_runaway_multiplier_rejected() {
        let mut config = AppConfig::default();
        config.retry.multiplier = 1e30;
        assert!(config.validate().is_err());

        config.retry.multiplier = f64::INFINITY;
        assert!(config.validate().is_err());

        config.retry.multiplier = 10.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scholargraph.toml");
        std::fs::write(
            &path,
            "[cleaning]\ntarget = 42\n\n[graph]\nuri = \"http://graph:7474\"\n",
        )
        .unwrap();

        let config = AppConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.cleaning.target, 42);
        assert_eq!(config.cleaning.min_citations, 10);
        assert_eq!(config.graph.uri, "http://graph:7474");
        assert_eq!(config.api.pages, 50);
    }
}
