//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Approval engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Approval engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of retries on a detected write conflict before the
    /// conflict is surfaced to the caller.
    #[serde(default = "default_max_decide_retries")]
    pub max_decide_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_decide_retries: default_max_decide_retries(),
        }
    }
}

fn default_max_decide_retries() -> u32 {
    3
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CLAIMFLOW").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
