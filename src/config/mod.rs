//! # Orchestrator Configuration
//!
//! Typed configuration for polling, element addressing, manifest handling,
//! request construction, callbacks and failure reporting.
//!
//! ## Sources
//!
//! Values are layered by [`ConfigManager`], later sources winning:
//!
//! 1. Built-in defaults ([`OrchestratorConfig::default`])
//! 2. `config/touchstream.toml` (or an explicit file)
//! 3. `config/touchstream.<environment>.toml`, when present
//! 4. `TOUCHSTREAM__<SECTION>__<KEY>` environment variables
//!
//! ## Usage
//!
//! ```rust,no_run
//! use touchstream_orchestrator::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let interval = manager.config().polling.interval();
//! # let _ = interval;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::defaults;
use crate::orchestration::outcome::FailurePolicy;
use crate::resilience::PollConfig;
use crate::utils::BooleanCoercion;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub polling: PollingConfig,
    pub gateway: GatewayConfig,
    pub manifests: ManifestConfig,
    pub requests: RequestConfig,
    pub callbacks: CallbackConfig,
    pub failure_policy: FailurePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    pub timeout_seconds: u64,
    pub interval_seconds: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: defaults::POLL_TIMEOUT_SECONDS,
            interval_seconds: defaults::POLL_INTERVAL_SECONDS,
        }
    }
}

impl PollingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            timeout: self.timeout(),
            interval: self.interval(),
        }
    }
}

/// Identifiers of the parameters and tables exposed by the external elements
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Touchstream provisioning-result table
    pub provision_table_id: u32,
    /// Touchstream JSON request parameter
    pub request_parameter_id: u32,
    /// MediaTailor JSON request parameter
    pub manifest_request_parameter_id: u32,
    /// MediaTailor manifest-event table
    pub manifest_events_table_id: u32,
    /// Event id column of the manifest-event table
    pub manifest_event_id_column: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            provision_table_id: defaults::PROVISION_TABLE_ID,
            request_parameter_id: defaults::REQUEST_PARAMETER_ID,
            manifest_request_parameter_id: defaults::MANIFEST_REQUEST_PARAMETER_ID,
            manifest_events_table_id: defaults::MANIFEST_EVENTS_TABLE_ID,
            manifest_event_id_column: defaults::MANIFEST_EVENT_ID_COLUMN,
        }
    }
}

/// What happens to a record whose manifests never all resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestTimeoutPolicy {
    #[default]
    MoveToError,
    RemainReady,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Value an element writes to a result URL it has not generated yet
    pub result_url_sentinel: String,
    /// Token in URL templates replaced by the manifest's event id
    pub event_id_placeholder: String,
    pub timeout_policy: ManifestTimeoutPolicy,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            result_url_sentinel: defaults::RESULT_URL_SENTINEL.to_string(),
            event_id_placeholder: defaults::EVENT_ID_PLACEHOLDER.to_string(),
            timeout_policy: ManifestTimeoutPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestConfig {
    pub boolean_coercion: BooleanCoercion,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CallbackConfig {
    pub enabled: bool,
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl OrchestratorConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.polling.interval_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "polling.interval_seconds",
                "0",
                "interval must be greater than 0",
            ));
        }

        if self.polling.timeout_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "polling.timeout_seconds",
                "0",
                "timeout must be greater than 0",
            ));
        }

        if self.polling.interval_seconds > self.polling.timeout_seconds {
            return Err(ConfigurationError::invalid_value(
                "polling.interval_seconds",
                self.polling.interval_seconds.to_string(),
                format!(
                    "interval must not exceed timeout ({}s)",
                    self.polling.timeout_seconds
                ),
            ));
        }

        if self.manifests.result_url_sentinel.trim().is_empty() {
            return Err(ConfigurationError::invalid_value(
                "manifests.result_url_sentinel",
                &self.manifests.result_url_sentinel,
                "sentinel must not be blank",
            ));
        }

        if self.manifests.event_id_placeholder.trim().is_empty() {
            return Err(ConfigurationError::invalid_value(
                "manifests.event_id_placeholder",
                &self.manifests.event_id_placeholder,
                "placeholder must not be blank",
            ));
        }

        Ok(())
    }
}
