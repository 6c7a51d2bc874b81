//! # Host Configuration
//!
//! Settings for the widget host: where revised calculator definitions live,
//! whether calculations are reported to analytics, and how the text
//! breakdown renders money.
//!
//! ## Configuration Sources (in priority order)
//! 1. Environment variables (highest priority)
//! 2. Config file (`equicost.toml`)
//! 3. Default values (lowest priority)
//!
//! ## Example Config File
//! ```toml
//! catalog_dir = "/etc/equicost/calculators"
//!
//! [analytics]
//! enabled = true
//!
//! [output]
//! currency_symbol = "£"
//! ```
//!
//! ## Environment Variables
//! - `EQUICOST_CATALOG_DIR`: Directory of replacement calculator TOML files
//! - `EQUICOST_ANALYTICS`: `true`/`false`, `1`/`0`, `on`/`off`
//! - `EQUICOST_CURRENCY_SYMBOL`: Symbol for the text breakdown

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from loading host configuration.
#[derive(Debug, Error)]
pub enum HostConfigError {
    /// Config file could not be read.
    #[error("Failed to read config {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Config file is not valid TOML for [`HostConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Config parsed but failed validation.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Catalog directory could not be listed or a file in it read.
    #[error("Failed to read catalog directory {path}: {message}")]
    CatalogDir { path: PathBuf, message: String },
}

impl From<toml::de::Error> for HostConfigError {
    fn from(err: toml::de::Error) -> Self {
        HostConfigError::Parse(err.to_string())
    }
}

// =============================================================================
// Configuration Structs
// =============================================================================

/// Complete host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Directory of `*.toml` calculator definitions replacing built-ins of
    /// the same name.
    #[serde(default)]
    pub catalog_dir: Option<PathBuf>,

    #[serde(default)]
    pub analytics: AnalyticsConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_analytics_enabled")]
    pub enabled: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: default_analytics_enabled(),
        }
    }
}

fn default_analytics_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Only the plain-text breakdown uses this; JSON stays numeric.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
        }
    }
}

fn default_currency_symbol() -> String {
    "£".to_string()
}

// =============================================================================
// Loading
// =============================================================================

impl HostConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Load from `config_path`, or the platform config dir, if it exists
    /// 3. Override with environment variables
    /// 4. Validate
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, HostConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading host config from file");
                let contents =
                    std::fs::read_to_string(&path).map_err(|e| HostConfigError::Read {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load host config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn validate(&self) -> Result<(), HostConfigError> {
        if let Some(dir) = &self.catalog_dir {
            if dir.as_os_str().is_empty() {
                return Err(HostConfigError::Invalid(
                    "catalog_dir must not be empty".into(),
                ));
            }
        }

        if self.output.currency_symbol.chars().count() > 3 {
            return Err(HostConfigError::Invalid(format!(
                "currency_symbol must be at most 3 characters, got: {}",
                self.output.currency_symbol
            )));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("EQUICOST_CATALOG_DIR") {
            debug!(catalog_dir = %dir, "Overriding catalog dir from environment");
            self.catalog_dir = if dir.is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }

        if let Ok(flag) = std::env::var("EQUICOST_ANALYTICS") {
            if let Some(enabled) = parse_flag(&flag) {
                debug!(enabled, "Overriding analytics from environment");
                self.analytics.enabled = enabled;
            }
        }

        if let Ok(symbol) = std::env::var("EQUICOST_CURRENCY_SYMBOL") {
            self.output.currency_symbol = symbol;
        }
    }

    /// `equicost.toml` in the platform config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "equicost", "equicost")
            .map(|dirs| dirs.config_dir().join("equicost.toml"))
    }
}

/// `true`/`false`, `1`/`0`, `on`/`off`, `yes`/`no`.
pub(crate) fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}
