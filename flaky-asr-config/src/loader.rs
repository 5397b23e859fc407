//! Configuration loading and environment variable handling

use crate::domains::FlakyAsrConfig;
use crate::error::{ConfigError, ConfigResult};
use log::debug;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "FLAKY_ASR".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML or JSON file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<FlakyAsrConfig> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let mut config: FlakyAsrConfig = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<FlakyAsrConfig> {
        let mut config = FlakyAsrConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<FlakyAsrConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut FlakyAsrConfig) -> ConfigResult<()> {
        self.apply_server_overrides(&mut config.server)?;
        self.apply_simulation_overrides(&mut config.simulation)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Apply server config overrides
    fn apply_server_overrides(
        &self,
        config: &mut crate::domains::server::ServerConfig,
    ) -> ConfigResult<()> {
        if let Ok(bind) = self.get_env_var("SERVER_BIND_ADDRESS") {
            config.bind_address = bind;
        }

        if let Some(port) = self.parse_env_var("SERVER_PORT")? {
            config.port = port;
        }

        Ok(())
    }

    /// Apply simulation config overrides
    fn apply_simulation_overrides(
        &self,
        config: &mut crate::domains::simulation::SimulationConfig,
    ) -> ConfigResult<()> {
        if let Some(millis) = self.parse_env_var::<u64>("BASE_DELAY_MS")? {
            config.base_delay = Duration::from_millis(millis);
        }

        if let Some(millis) = self.parse_env_var::<u64>("DELAY_JITTER_MS")? {
            config.delay_jitter = Duration::from_millis(millis);
        }

        if let Some(probability) = self.parse_env_var("FAILURE_PROBABILITY")? {
            config.failure_probability = probability;
        }

        if let Some(max) = self.parse_env_var("MAX_CONCURRENT_REQUESTS")? {
            config.max_concurrent_requests = max;
        }

        if let Some(seed) = self.parse_env_var("SEED")? {
            config.seed = Some(seed);
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Some(level) = self.parse_env_var("LOG_LEVEL")? {
            config.level = level;
        }

        if let Some(format) = self.parse_env_var("LOG_FORMAT")? {
            config.format = format;
        }

        Ok(())
    }

    /// Parse an optional prefixed environment variable
    fn parse_env_var<T>(&self, name: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_env_var(name) {
            Ok(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| ConfigError::EnvError(format!("Invalid {}_{}: {}", self.prefix, name, e))),
            Err(_) => Ok(None),
        }
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
