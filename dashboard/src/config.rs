//! Configuration management for the Krishi Mitra dashboard
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with KRISHI_ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main dashboard configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Back-end API configuration
    pub api: ApiConfig,

    /// Orchestrator behaviour
    pub workflow: WorkflowConfig,

    /// Log output configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL serving /weather, /predict and /ask
    pub base_url: String,

    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkflowConfig {
    /// Upper bound on any single request, in seconds
    pub request_timeout_secs: u64,

    /// How overlapping responses of the same operation are applied
    pub response_ordering: ResponseOrdering,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// tracing EnvFilter directive, used when RUST_LOG is unset
    pub filter: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

/// Policy for overlapping requests of the same operation family
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrdering {
    /// Every response is applied as it arrives; the last to settle wins
    #[default]
    LastSettled,
    /// Only the most recently issued request may apply its response
    LatestIssued,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("KRISHI_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("api.base_url", "http://127.0.0.1:8000")?
            .set_default("api.connect_timeout_secs", 10)?
            .set_default("workflow.request_timeout_secs", 30)?
            .set_default("workflow.response_ordering", "last_settled")?
            .set_default("logging.filter", "krishi_dashboard=info,dashboard=info")?
            .set_default("logging.json", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (KRISHI_ prefix)
            .add_source(
                Environment::with_prefix("KRISHI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl ApiConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl WorkflowConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            response_ordering: ResponseOrdering::LastSettled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_uses_defaults() {
        let config = Config::load().unwrap();
        assert_eq!(config.environment, "development");
        assert!(config.workflow.request_timeout_secs > 0);
        assert!(!config.api.base_url.is_empty());
    }

    #[test]
    fn test_response_ordering_parses_snake_case() {
        let ordering: ResponseOrdering = serde_json::from_str("\"latest_issued\"").unwrap();
        assert_eq!(ordering, ResponseOrdering::LatestIssued);
    }
}
