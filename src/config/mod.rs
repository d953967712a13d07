//! Configuration management.
//!
//! Settings come from an optional TOML file layered with `COVER_FINDER_*`
//! environment variables (nested keys use `__`, e.g.
//! `COVER_FINDER_RETRY__MAX_ATTEMPTS=5`). Every field has a default, so an
//! empty file or no file at all is a valid configuration.

mod file_config;

pub use file_config::ConfigFileError;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::extract::ExtractionMode;
use crate::utils::RetryConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "COVER_FINDER";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "cover-finder.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Catalog endpoints and search scoping
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Backoff on throttled responses
    #[serde(default)]
    pub retry: RetrySettings,

    /// Extraction pipeline settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// MCP server bind address
    #[serde(default)]
    pub server: ServerConfig,
}

/// Catalog endpoints and search scoping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Scheme and host of the catalog, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the search page
    #[serde(default = "default_search_path")]
    pub search_path: String,

    /// Search index (`i` parameter), scoped to books
    #[serde(default = "default_category")]
    pub category: String,

    /// Browse node refinement (`rh` parameter)
    #[serde(default = "default_node")]
    pub node: String,

    /// Referral tag (`ref` parameter)
    #[serde(default = "default_ref_tag")]
    pub ref_tag: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            search_path: default_search_path(),
            category: default_category(),
            node: default_node(),
            ref_tag: default_ref_tag(),
        }
    }
}

impl CatalogConfig {
    /// Full URL of the search page
    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.search_path)
    }
}

fn default_base_url() -> String {
    "https://www.amazon.co.jp".to_string()
}

fn default_search_path() -> String {
    "/s".to_string()
}

fn default_category() -> String {
    "stripbooks".to_string()
}

fn default_node() -> String {
    "n:465392".to_string()
}

fn default_ref_tag() -> String {
    "sr_pg_1".to_string()
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Browser user agent presented to the catalog
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language header
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Timeout for search page requests (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Timeout for product page requests (seconds)
    #[serde(default = "default_timeout")]
    pub product_timeout_secs: u64,

    /// Connect timeout (seconds)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            timeout_secs: default_timeout(),
            product_timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn product_timeout(&self) -> Duration {
        Duration::from_secs(self.product_timeout_secs)
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_accept_language() -> String {
    "ja-JP,ja;q=0.9,en-US;q=0.8,en;q=0.7".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Backoff on throttled responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Attempts per search fetch, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait before the second attempt; doubles after each further attempt
    #[serde(default = "default_base_delay")]
    pub base_delay_secs: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay(),
        }
    }
}

impl RetrySettings {
    /// Convert to the retry policy used by the HTTP client
    ///
    /// Fails when `base_delay_secs` is not representable as a duration.
    pub fn to_retry_config(&self) -> Result<RetryConfig, config::ConfigError> {
        let delay = Duration::try_from_secs_f64(self.base_delay_secs.max(0.0)).map_err(|e| {
            config::ConfigError::Message(format!(
                "retry.base_delay_secs = {}: {}",
                self.base_delay_secs, e
            ))
        })?;

        Ok(RetryConfig::default()
            .max_attempts(self.max_attempts)
            .initial_delay(delay))
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> f64 {
    5.0
}

/// Extraction pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// `structured` (DOM) or `regex` (link scan fallback)
    #[serde(default)]
    pub mode: ExtractionMode,

    /// Raw candidates collected per requested result, to survive deduplication
    #[serde(default = "default_overfetch")]
    pub overfetch_factor: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::default(),
            overfetch_factor: default_overfetch(),
        }
    }
}

fn default_overfetch() -> usize {
    3
}

/// MCP server bind address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(env_source())
        .build()?
        .try_deserialize()
        .and_then(validate)
}

/// Configuration from environment variables and defaults only
pub fn get_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(env_source())
        .build()?
        .try_deserialize()
        .and_then(validate)
}

fn validate(config: Config) -> Result<Config, config::ConfigError> {
    config.retry.to_retry_config()?;
    Ok(config)
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Find a config file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    let user = default_config_path()?;
    user.is_file().then_some(user)
}

/// `<config dir>/cover-finder/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cover-finder").join("config.toml"))
}
