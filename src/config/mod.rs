//! Configuration loading and management for the payroll engine service.
//!
//! This module loads database, HTTP and logging settings from a YAML file
//! and lets environment variables override them.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/payroll.yaml").unwrap();
//! println!("Database: {}", config.config().database.url);
//! ```

mod loader;
mod types;

pub use loader::{ConfigLoader, DATABASE_URL_VAR, LOG_FILTER_VAR, SERVER_PORT_VAR};
pub use types::{DEFAULT_DATABASE_URL, DatabaseConfig, EngineConfig, LoggingConfig, ServerConfig};
