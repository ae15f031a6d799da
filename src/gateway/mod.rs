//! # External Gateway
//!
//! Boundary to the Touchstream and MediaTailor elements. A gateway writes
//! request payloads to a named element, reads back the element's
//! provisioning-result and manifest-event tables, and delivers callbacks to
//! the element that created a record.
//!
//! Submissions are fire-and-forget: the element picks the request up
//! asynchronously and reports progress only through its tables.

pub mod memory;

pub use memory::{InMemoryGateway, Notification, Submission};

use crate::constants::provision_results;
use crate::error::OrchestratorError;
use crate::models::{ExternalPayload, ExternalResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Unknown target element: {0}")]
    UnknownTarget(String),

    #[error("Transport error talking to {target}: {reason}")]
    Transport { target: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid source address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Serialization(err.to_string())
    }
}

impl From<GatewayError> for OrchestratorError {
    fn from(err: GatewayError) -> Self {
        OrchestratorError::Gateway(err.to_string())
    }
}

/// Row of a Touchstream element's provisioning-result table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionResultRow {
    /// Instance id the request was booked under
    pub instance_id: String,
    /// Free-text result column
    pub result: String,
}

impl ProvisionResultRow {
    pub fn new(instance_id: Uuid, result: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.to_string(),
            result: result.into(),
        }
    }

    pub fn classify(&self) -> ProvisionResult {
        ProvisionResult::from_result_text(&self.result)
    }
}

/// Meaning of a provisioning-result row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionResult {
    InProgress,
    NotProvisioned,
    Completed,
    CompletedWithErrors,
    /// Any other result text; the element rejected the request
    Failed(String),
}

impl ProvisionResult {
    pub fn from_result_text(text: &str) -> Self {
        match text {
            provision_results::IN_PROGRESS => Self::InProgress,
            provision_results::NOT_PROVISIONED => Self::NotProvisioned,
            provision_results::COMPLETED => Self::Completed,
            provision_results::COMPLETED_WITH_ERRORS => Self::CompletedWithErrors,
            other => Self::Failed(other.to_string()),
        }
    }

    /// Whether the element is still working on the request
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::InProgress | Self::NotProvisioned)
    }
}

/// Row of a MediaTailor element's manifest-event table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEventRow {
    pub event_id: String,
    #[serde(default)]
    pub manifest_url: Option<String>,
}

impl ManifestEventRow {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            manifest_url: None,
        }
    }
}

/// `dmaid/elementid/parameterid` address of a callback parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceAddress {
    pub dma_id: u32,
    pub element_id: u32,
    pub parameter_id: u32,
}

impl FromStr for SourceAddress {
    type Err = GatewayError;

    fn from_str(address: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| GatewayError::InvalidAddress {
            address: address.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = address.trim().split('/').collect();
        if parts.len() != 3 {
            return Err(invalid("expected three '/'-separated components"));
        }

        let mut ids = [0u32; 3];
        for (slot, part) in ids.iter_mut().zip(&parts) {
            *slot = part
                .trim()
                .parse()
                .map_err(|_| invalid("components must be unsigned integers"))?;
        }

        Ok(Self {
            dma_id: ids[0],
            element_id: ids[1],
            parameter_id: ids[2],
        })
    }
}

impl SourceAddress {
    pub fn parse(address: &str) -> GatewayResult<Self> {
        address.parse()
    }
}

impl fmt::Display for SourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.dma_id, self.element_id, self.parameter_id)
    }
}

#[async_trait]
pub trait ExternalGateway: Send + Sync {
    /// Write `payload` to the request parameter of `target`
    async fn submit(&self, target: &str, payload: ExternalPayload) -> GatewayResult<()>;

    /// Rows of the provisioning-result table of `target` booked under `instance_id`
    async fn query_provision_results(
        &self,
        target: &str,
        instance_id: Uuid,
    ) -> GatewayResult<Vec<ProvisionResultRow>>;

    /// Rows of the manifest-event table of `target` for `event_id`
    async fn query_manifest_events(
        &self,
        target: &str,
        event_id: &str,
    ) -> GatewayResult<Vec<ManifestEventRow>>;

    /// Deliver a callback to the parameter at `address`
    async fn notify_source(
        &self,
        address: SourceAddress,
        response: ExternalResponse,
    ) -> GatewayResult<()>;
}
