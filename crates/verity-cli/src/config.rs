// crates/verity-cli/src/config.rs
//
// Runtime configuration for the verity CLI.
// Loaded from a TOML file or populated with sensible defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use verity_core::{EngineConfig, VerityError};

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Lifetime of cached consensus results, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: f64,

    /// Deadline for a single evaluation. No deadline when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_timeout_ms: Option<u64>,

    /// Scoring policy handed to the engine.
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cache_ttl_secs() -> f64 {
    3_600.0
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            cache_ttl_secs: default_cache_ttl_secs(),
            evaluation_timeout_ms: None,
            engine: EngineConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: CliConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Check the engine policy and the CLI's own knobs.
    pub fn validate(&self) -> Result<(), VerityError> {
        self.engine.validate()?;
        if !self.cache_ttl_secs.is_finite() || self.cache_ttl_secs < 0.0 {
            return Err(VerityError::Config(format!(
                "cache_ttl_secs must be a non-negative number, got {}",
                self.cache_ttl_secs
            )));
        }
        if self.evaluation_timeout_ms == Some(0) {
            return Err(VerityError::Config("evaluation_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    /// Render as TOML, the same shape `load` accepts.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// `~/.verity/config.toml`, or a relative fallback when there is no home.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".verity")
        .join("config.toml")
}
