use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a Touchstream provisioning record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningStatus {
    /// Initial state when the record is created or recycled
    Draft,
    /// Record submitted for provisioning, manifests not yet resolved
    Ready,
    /// Touchstream provisioning request submitted or about to be
    InProgress,
    /// Touchstream reported the event as fully provisioned
    Active,
    /// Touchstream provisioned the event but reported errors
    ActiveWithErrors,
    /// Operator asked for the event to be torn down and provisioned again
    Reprovision,
    /// Operator asked for the event to be torn down
    Deactivate,
    /// Teardown submitted, waiting for the external systems to converge
    Deactivating,
    /// Teardown finished
    Complete,
    /// A step failed; the record needs operator attention
    Error,
}

impl ProvisioningStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [ProvisioningStatus; 10] = [
        Self::Draft,
        Self::Ready,
        Self::InProgress,
        Self::Active,
        Self::ActiveWithErrors,
        Self::Reprovision,
        Self::Deactivate,
        Self::Deactivating,
        Self::Complete,
        Self::Error,
    ];

    /// Statuses in which an orchestrator step may be running against the record.
    /// Only these may move to [`ProvisioningStatus::Error`].
    pub const IN_FLIGHT: [ProvisioningStatus; 5] = [
        Self::Ready,
        Self::InProgress,
        Self::Reprovision,
        Self::Deactivate,
        Self::Deactivating,
    ];

    /// Identifier used by the instance store and the transition names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Ready => "ready",
            Self::InProgress => "in_progress",
            Self::Active => "active",
            Self::ActiveWithErrors => "active_with_errors",
            Self::Reprovision => "reprovision",
            Self::Deactivate => "deactivate",
            Self::Deactivating => "deactivating",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }

    /// Check if the external event is live for this record
    pub fn is_provisioned(&self) -> bool {
        matches!(self, Self::Active | Self::ActiveWithErrors)
    }

    /// Check if an orchestrator step may currently be working on this record
    pub fn is_in_flight(&self) -> bool {
        Self::IN_FLIGHT.contains(self)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for ProvisioningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProvisioningStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid provisioning status: {s}"))
    }
}

impl Default for ProvisioningStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// Lifecycle status of a MediaTailor manifest record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestStatus {
    /// Manifest definition is usable by provisioning records
    Ready,
    /// Manifest definition has been retired
    Complete,
}

impl ManifestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for ManifestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ManifestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready" => Ok(Self::Ready),
            "complete" => Ok(Self::Complete),
            _ => Err(format!("Invalid manifest status: {s}")),
        }
    }
}

impl Default for ManifestStatus {
    fn default() -> Self {
        Self::Ready
    }
}
