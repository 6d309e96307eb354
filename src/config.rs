//! Configuration - `gsubr.toml` with environment overrides
//!
//! ```toml
//! [runtime]
//! max_params = 16
//! warn_on_redefine = true
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! file = "logs/gsubr.log"
//! ```

use crate::error::{BridgeError, BridgeResult};
use crate::logging::{LogConfig, LogFormat, LogOutput};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

/// Name of the configuration file looked up by [`Config::discover`]
pub const CONFIG_FILE: &str = "gsubr.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Upper bound on `required + optional + rest` per procedure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_params: Option<usize>,

    /// Warn when a global binding is replaced
    #[serde(default = "default_true")]
    pub warn_on_redefine: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: FormatName,

    /// Log to this file instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    #[serde(default)]
    pub spans: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatName {
    Pretty,
    #[default]
    Compact,
    Json,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_params: None,
            warn_on_redefine: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: FormatName::default(),
            file: None,
            spans: false,
            filter: None,
        }
    }
}

fn default_true() -> bool { true }
fn default_level() -> String { "info".to_string() }

impl RuntimeConfig {
    /// Apply `GSUBR_MAX_PARAMS` and `GSUBR_WARN_REDEFINE`
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(limit) = std::env::var("GSUBR_MAX_PARAMS") {
            self.max_params = match limit.trim() {
                "" | "none" | "unlimited" => None,
                value => value.parse().ok().or(self.max_params),
            };
        }

        if let Ok(flag) = std::env::var("GSUBR_WARN_REDEFINE") {
            self.warn_on_redefine = parse_flag(&flag).unwrap_or(self.warn_on_redefine);
        }

        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl LoggingConfig {
    /// Subscriber settings for [`init_logging`](crate::logging::init_logging)
    pub fn to_log_config(&self) -> LogConfig {
        let mut config = LogConfig::new()
            .with_level(self.level.parse().unwrap_or(Level::INFO))
            .with_format(match self.format {
                FormatName::Pretty => LogFormat::Pretty,
                FormatName::Compact => LogFormat::Compact,
                FormatName::Json => LogFormat::Json,
            })
            .with_span_events(self.spans);

        if let Some(file) = &self.file {
            config = config.with_output(LogOutput::file(file));
        }
        if let Some(filter) = &self.filter {
            config = config.with_filter(filter.clone());
        }

        config
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> BridgeResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> BridgeResult<Self> {
        toml::from_str(content)
            .map_err(|e| BridgeError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Find and load `gsubr.toml` from the current directory or its parents
    pub fn discover() -> Self {
        std::env::current_dir()
            .ok()
            .and_then(|dir| Self::discover_from(&dir))
            .unwrap_or_default()
    }

    /// Walk from `start` towards the root, loading the first readable config
    pub fn discover_from(start: &Path) -> Option<Self> {
        start.ancestors().find_map(|dir| {
            let config_path = dir.join(CONFIG_FILE);
            if !config_path.is_file() {
                return None;
            }
            match Self::load(&config_path) {
                Ok(config) => Some(config),
                Err(err) => {
                    tracing::warn!("Ignoring {}: {}", config_path.display(), err);
                    None
                }
            }
        })
    }

    /// Apply environment overrides on top of file settings
    pub fn with_env_overrides(mut self) -> Self {
        self.runtime = self.runtime.with_env_overrides();
        self
    }

    /// Generate default configuration file content
    pub fn generate_default() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate config"))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> BridgeResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| BridgeError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| BridgeError::Config(format!("Failed to write {}: {}", path.display(), e)))
    }
}
