//! Application configuration
//!
//! Split into focused sub-modules:
//! - `application`: identity stamped onto records
//! - `capture`: header include/exclude lists
//! - `database`: SQLite database settings
//! - `resilience`: retry budget and backoff
//! - `endpoints`: static service endpoint table
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `faultline.{toml,yaml,json}` file, then `FAULTLINE_*` environment variables
//! with `__` separating nested keys (e.g. `FAULTLINE_RETRY__MAX_RETRY_COUNT=3`).

mod application;
mod capture;
mod database;
mod endpoints;
mod resilience;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use application::ApplicationSection;
pub use capture::CaptureConfig;
pub use database::DatabaseConfig;
pub use endpoints::EndpointConfig;
pub use resilience::RetryAppConfig;

use crate::logging::LoggingConfig;

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application identity
    #[serde(default)]
    pub application: ApplicationSection,

    /// Header capture configuration
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Retry configuration for remote calls
    #[serde(default)]
    pub retry: RetryAppConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Static endpoint table
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("faultline").required(false))
            .add_source(environment());

        Self::build(builder)
    }

    /// Load configuration from an explicit file, then the environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(true))
            .add_source(environment());

        Self::build(builder)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!(
            application = %config.application.name,
            endpoints = config.endpoints.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        self.capture
            .header_filter()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;

        for endpoint in &self.endpoints {
            endpoint
                .service_uri()
                .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        }

        if self.retry.multiplier < 1.0 {
            return Err(config::ConfigError::Message(format!(
                "retry.multiplier must be at least 1.0, got {}",
                self.retry.multiplier
            )));
        }

        Ok(())
    }
}

// Override with environment variables (e.g., FAULTLINE_DATABASE__URL)
fn environment() -> config::Environment {
    config::Environment::with_prefix("FAULTLINE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("capture.include_headers")
        .with_list_parse_key("capture.exclude_headers")
}
