//! Configuration System
//!
//! Layered configuration for the `snaptree` binary and the snapshot store:
//! built-in defaults, then the global config file, then the workspace file,
//! then `SNAPTREE__*` environment variables. The tree API itself takes no
//! configuration.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod global_file;
    pub mod workspace_file;
}

pub use sources::global_file::global_config_path;
pub use sources::workspace_file::WORKSPACE_CONFIG_FILE;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnaptreeConfig {
    /// Snapshot store settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Snapshot store location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the sled database. Relative paths are resolved against
    /// the workspace root.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

pub(crate) fn default_store_path() -> PathBuf {
    PathBuf::from(".snaptree/store")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

impl StorageConfig {
    /// Store path resolved against `workspace_root`
    pub fn resolve(&self, workspace_root: &Path) -> PathBuf {
        if self.store_path.is_absolute() {
            self.store_path.clone()
        } else {
            workspace_root.join(&self.store_path)
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Storage(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

impl SnaptreeConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.storage.store_path.as_os_str().is_empty() {
            errors.push(ValidationError::Storage(
                "Store path cannot be empty".to_string(),
            ));
        }

        let logging = &self.logging;
        if !LOG_LEVELS.contains(&logging.level.as_str()) {
            errors.push(ValidationError::Logging(format!(
                "Unknown level '{}'",
                logging.level
            )));
        }
        if logging.format != "text" && logging.format != "json" {
            errors.push(ValidationError::Logging(format!(
                "Unknown format '{}'",
                logging.format
            )));
        }
        if !["stdout", "stderr", "file"].contains(&logging.output.as_str()) {
            errors.push(ValidationError::Logging(format!(
                "Unknown output '{}'",
                logging.output
            )));
        }
        for (module, level) in &logging.modules {
            if !LOG_LEVELS.contains(&level.as_str()) {
                errors.push(ValidationError::Logging(format!(
                    "Unknown level '{}' for module '{}'",
                    level, module
                )));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding all problems into one `ApiError`
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })
    }
}

/// Loads `SnaptreeConfig` from the layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global file, `<workspace>/snaptree.toml`,
    /// `SNAPTREE__SECTION__KEY` environment variables.
    pub fn load(workspace_root: &Path) -> Result<SnaptreeConfig, ApiError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = builder.add_source(environment());

        let config: SnaptreeConfig = builder.build()?.try_deserialize()?;
        config.ensure_valid()?;
        Ok(config)
    }

    /// Load configuration from one explicit file, skipping the global and
    /// workspace files. Environment overrides still apply.
    pub fn load_from_file(path: &Path) -> Result<SnaptreeConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config: SnaptreeConfig = merge::merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .add_source(environment())
            .build()?
            .try_deserialize()?;
        config.ensure_valid()?;
        Ok(config)
    }

    /// Built-in defaults only
    pub fn default() -> Result<SnaptreeConfig, ApiError> {
        let config: Config = merge::merge_policy::builder_with_defaults()?.build()?;
        Ok(config.try_deserialize()?)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("SNAPTREE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
