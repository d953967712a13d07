//! Reading and writing the TOML configuration file.
//!
//! # Configuration File Format
//!
//! ```toml
//! [catalog]
//! base_url = "https://www.amazon.co.jp"
//! search_path = "/s"
//! category = "stripbooks"
//! node = "n:465392"
//! ref_tag = "sr_pg_1"
//!
//! [http]
//! accept_language = "ja-JP,ja;q=0.9,en-US;q=0.8,en;q=0.7"
//! timeout_secs = 30
//! product_timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [retry]
//! max_attempts = 3
//! base_delay_secs = 5.0
//!
//! [extraction]
//! mode = "structured"
//! overfetch_factor = 3
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//! ```

use std::path::Path;

use super::Config;

impl Config {
    /// Load configuration from a TOML file without environment overrides
    pub fn load_toml(path: &Path) -> Result<Self, ConfigFileError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigFileError::Parse(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }

        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}
