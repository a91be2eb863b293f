//! Layered configuration using Figment
//!
//! Sources, later overriding earlier:
//! 1. Built-in defaults
//! 2. `sand-rocket.toml` / `sand-rocket.yaml` / `sand-rocket.json` in the
//!    working directory, or an explicit file
//! 3. `SAND_ROCKET_` environment variables, nested keys split on `__`
//!    (`SAND_ROCKET_DATABASE__PATH=/var/lib/sr.db`)

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SAND_ROCKET_";

/// Base name of discovered config files
pub const CONFIG_FILE_STEM: &str = "sand-rocket";

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicit configuration file not found
    #[error("configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Configuration parsing failed
    #[error("failed to parse configuration: {source}")]
    ParseError {
        #[source]
        source: Box<figment::Error>,
    },

    /// Configuration validation failed
    #[error("configuration validation failed: {message}")]
    ValidationError { message: String },

    /// Configuration file format not supported
    #[error("unsupported configuration file format: {format}")]
    UnsupportedFormat { format: String },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError {
            source: Box::new(error),
        }
    }
}

/// Database settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path
    pub path: PathBuf,
    /// How long a writer waits for another connection's lock
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sand-rocket.db"),
            busy_timeout_ms: 5_000,
        }
    }
}

/// Task behaviour switches, fixed for the lifetime of a context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSettings {
    /// Whether a move may carry a task into a different epic
    pub allow_epic_reassignment: bool,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            allow_epic_reassignment: true,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub database: DatabaseConfig,
    pub tasks: TaskSettings,
    /// Default user id operations are attributed to
    pub actor: Option<String>,
}

impl TrackerConfig {
    /// Load from defaults, the discovered or explicit file, and environment
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config: TrackerConfig = Self::figment(explicit)?.extract()?;
        config.validate()?;
        debug!(
            database = %config.database.path.display(),
            allow_epic_reassignment = config.tasks.allow_epic_reassignment,
            "loaded configuration"
        );
        Ok(config)
    }

    /// Build the layered figment without extracting
    pub fn figment(explicit: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(TrackerConfig::default()));

        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.to_path_buf(),
                    });
                }
                figment = merge_file(figment, path)?;
            }
            None => {
                for ext in ["toml", "yaml", "yml", "json"] {
                    let candidate = PathBuf::from(format!("{}.{}", CONFIG_FILE_STEM, ext));
                    if candidate.exists() {
                        trace!("found config file {}", candidate.display());
                        figment = merge_file(figment, &candidate)?;
                    }
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Reject values that would make the tracker unusable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "database.path must not be empty".into(),
            });
        }
        if self.actor.as_deref().is_some_and(|a| a.trim().is_empty()) {
            return Err(ConfigError::ValidationError {
                message: "actor must not be blank".into(),
            });
        }
        Ok(())
    }
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment, ConfigError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "toml" => Ok(figment.merge(Toml::file(path))),
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        "json" => Ok(figment.merge(Json::file(path))),
        other => Err(ConfigError::UnsupportedFormat {
            format: other.to_string(),
        }),
    }
}
