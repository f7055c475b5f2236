//! Configuration management for certscope.
//!
//! This module provides:
//! - Loading from YAML files
//! - Environment variable overrides (`CERTSCOPE__SECTION__KEY`)
//! - Validation of all settings
//! - Decoder limits, hex dump layout, chain depth, and logging configuration

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Largest content length the decoder accepts by default (2^31 - 1 bytes).
pub const DEFAULT_MAX_CONTENT_LENGTH: u64 = i32::MAX as u64;

/// Upper bound for `decoder.max_nesting_depth`; the decoder recurses per level.
pub const MAX_NESTING_DEPTH_LIMIT: usize = 256;

/// Main application configuration.
///
/// # Examples
///
/// ```no_run
/// use certscope_core::config::AppConfig;
///
/// let config = AppConfig::from_file("certscope.yaml").unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// TLV decoder limits
    #[serde(default)]
    pub decoder: DecoderConfig,

    /// Hex dump layout
    #[serde(default)]
    pub hex_dump: HexDumpConfig,

    /// Text renderer options
    #[serde(default)]
    pub render: RenderConfig,

    /// Chain resolver options
    #[serde(default)]
    pub chain: ChainConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Settings store location
    #[serde(default)]
    pub settings: SettingsConfig,
}

impl AppConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path.display().to_string()).into());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_yaml(&contents)
    }

    /// Loads configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Loads configuration using the `config` crate, layering an optional
    /// file under `CERTSCOPE__*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or merged.
    pub fn from_config_builder(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("CERTSCOPE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::LoadFailed {
                path: path
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<environment>".to_string()),
                reason: e.to_string(),
            })?;

        config.try_deserialize().map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<()> {
        self.decoder.validate()?;
        self.hex_dump.validate()?;
        self.chain.validate()?;
        self.logging.parse_level()?;
        Ok(())
    }
}

/// TLV decoder limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Maximum nesting of constructed nodes
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,

    /// Maximum declared content length in bytes
    #[serde(default = "default_max_content_length")]
    pub max_content_length: u64,
}

fn default_max_nesting_depth() -> usize {
    64
}

fn default_max_content_length() -> u64 {
    DEFAULT_MAX_CONTENT_LENGTH
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: default_max_nesting_depth(),
            max_content_length: default_max_content_length(),
        }
    }
}

impl DecoderConfig {
    /// Validates the decoder limits.
    pub fn validate(&self) -> Result<()> {
        if self.max_nesting_depth == 0 || self.max_nesting_depth > MAX_NESTING_DEPTH_LIMIT {
            return Err(ConfigError::invalid_value(
                "decoder.max_nesting_depth",
                format!("must be between 1 and {}", MAX_NESTING_DEPTH_LIMIT),
            )
            .into());
        }
        if self.max_content_length == 0 || self.max_content_length > DEFAULT_MAX_CONTENT_LENGTH {
            return Err(ConfigError::invalid_value(
                "decoder.max_content_length",
                format!("must be between 1 and {}", DEFAULT_MAX_CONTENT_LENGTH),
            )
            .into());
        }
        Ok(())
    }
}

/// Hex dump layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HexDumpConfig {
    /// Bytes per row
    #[serde(default = "default_row_width")]
    pub row_width: usize,

    /// Whether to append an ASCII gutter to each row
    #[serde(default = "default_true")]
    pub ascii: bool,
}

fn default_row_width() -> usize {
    16
}

fn default_true() -> bool {
    true
}

impl Default for HexDumpConfig {
    fn default() -> Self {
        Self {
            row_width: default_row_width(),
            ascii: true,
        }
    }
}

impl HexDumpConfig {
    /// Validates the hex dump layout.
    pub fn validate(&self) -> Result<()> {
        if self.row_width == 0 || self.row_width > 64 {
            return Err(
                ConfigError::invalid_value("hex_dump.row_width", "must be between 1 and 64").into(),
            );
        }
        Ok(())
    }
}

/// Text renderer options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Hex values longer than this many characters are shortened when trimming is on
    #[serde(default = "default_trim_threshold")]
    pub trim_threshold: usize,
}

fn default_trim_threshold() -> usize {
    64
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            trim_threshold: default_trim_threshold(),
        }
    }
}

/// Chain resolver options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Maximum number of issuer hops before the walk stops
    #[serde(default = "default_chain_max_depth")]
    pub max_depth: usize,
}

fn default_chain_max_depth() -> usize {
    10
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_depth: default_chain_max_depth(),
        }
    }
}

impl ChainConfig {
    /// Validates the chain options.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(ConfigError::invalid_value("chain.max_depth", "must be at least 1").into());
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Text
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Parses the log level string to a tracing Level.
    pub fn parse_level(&self) -> Result<Level> {
        self.level.parse().map_err(|_| {
            ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Invalid log level: {}", self.level),
            }
            .into()
        })
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    Text,
    /// JSON format for structured logging
    Json,
}

/// Settings store location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// JSON file holding persisted display options; in-memory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}
