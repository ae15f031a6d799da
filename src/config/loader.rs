//! Configuration Loader
//!
//! Environment-aware configuration loading. Layers built-in defaults, a TOML
//! file, an optional per-environment TOML override and `TOUCHSTREAM__`
//! environment variables, then validates the merged result.

use super::error::{ConfigResult, ConfigurationError};
use super::OrchestratorConfig;
use crate::constants::{CONFIG_ENV_PREFIX, ENVIRONMENT_VAR};
use config::{Config, Environment, File, FileFormat, Map};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const CONFIG_FILE_STEM: &str = "touchstream";
const ENV_SEPARATOR: &str = "__";

/// Loaded and validated orchestrator configuration
#[derive(Debug)]
pub struct ConfigManager {
    config: OrchestratorConfig,
    environment: String,
    config_file: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection from `config/`
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment.
    /// A missing directory or file just leaves the defaults in place.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));
        let base = directory.join(format!("{CONFIG_FILE_STEM}.toml"));
        let overrides = directory.join(format!("{CONFIG_FILE_STEM}.{environment}.toml"));

        Self::build(Some(&base), false, Some(&overrides), environment, None)
    }

    /// Load a specific configuration file, which must exist
    pub fn load_from_file(path: &Path) -> ConfigResult<Arc<ConfigManager>> {
        if !path.is_file() {
            return Err(ConfigurationError::config_file_not_found(path));
        }
        let environment = Self::detect_environment();
        Self::build(Some(path), true, None, &environment, None)
    }

    /// Load with an explicit set of environment variables instead of the process environment
    pub fn load_with_overrides(
        path: Option<&Path>,
        environment: &str,
        variables: Map<String, String>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::build(path, false, None, environment, Some(variables))
    }

    fn build(
        base: Option<&Path>,
        base_required: bool,
        overrides: Option<&Path>,
        environment: &str,
        variables: Option<Map<String, String>>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        debug!(
            environment = %environment,
            base = ?base,
            overrides = ?overrides,
            "Loading configuration"
        );

        let defaults = Config::try_from(&OrchestratorConfig::default())
            .map_err(|e| ConfigurationError::load_error("defaults", e))?;

        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = base {
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(base_required),
            );
        }
        if let Some(path) = overrides {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix(CONFIG_ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(variables),
        );

        let merged = builder
            .build()
            .map_err(|e| ConfigurationError::load_error(Self::describe(base), e))?;
        let config: OrchestratorConfig = merged
            .try_deserialize()
            .map_err(ConfigurationError::deserialization_error)?;

        config.validate()?;

        info!(
            environment = %environment,
            poll_timeout_seconds = config.polling.timeout_seconds,
            poll_interval_seconds = config.polling.interval_seconds,
            failure_policy = ?config.failure_policy,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_file: base.filter(|path| path.is_file()).map(Path::to_path_buf),
        }))
    }

    fn describe(base: Option<&Path>) -> String {
        base.map(|path| path.display().to_string())
            .unwrap_or_else(|| "defaults".to_string())
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Base file that contributed values, if one existed
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Detect current environment from `TOUCHSTREAM_ENV`, defaulting to development
    pub fn detect_environment() -> String {
        env::var(ENVIRONMENT_VAR)
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }
}
