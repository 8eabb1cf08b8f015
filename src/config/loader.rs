//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the service
//! configuration from a YAML file and applying environment overrides.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::EngineConfig;

/// Overrides `database.url`.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Overrides `server.port`.
pub const SERVER_PORT_VAR: &str = "SERVER_PORT";
/// Overrides `logging.filter`.
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

/// Loads and provides access to the service configuration.
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/payroll.yaml")?.with_env_overrides()?;
/// println!("Listening on {}", loader.config().server.bind_address());
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from a YAML file.
    ///
    /// Returns [`EngineError::ConfigNotFound`] if the file cannot be read and
    /// [`EngineError::ConfigParseError`] if it is not valid YAML for
    /// [`EngineConfig`].
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let config = Self::load_yaml::<EngineConfig>(path)?;
        Ok(Self { config })
    }

    /// Uses built-in defaults only.
    pub fn defaults() -> Self {
        Self::default()
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> EngineResult<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value. Empty values are ignored.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> EngineResult<Self> {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = lookup(DATABASE_URL_VAR) {
            self.config.database.url = url;
        }
        if let Some(port) = lookup(SERVER_PORT_VAR) {
            self.config.server.port = port.trim().parse::<u16>().map_err(|e| {
                EngineError::ConfigParseError {
                    path: SERVER_PORT_VAR.to_string(),
                    message: format!("'{}': {}", port, e),
                }
            })?;
        }
        if let Some(filter) = lookup(LOG_FILTER_VAR) {
            self.config.logging.filter = filter;
        }
        Ok(self)
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }
}
