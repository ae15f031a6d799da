use super::states::ProvisioningStatus;
use crate::store::{InstanceStore, StoreResult};
use async_trait::async_trait;
use uuid::Uuid;

/// Result of checking a step's status precondition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Current status is in the expected set; the step may run
    Proceed(ProvisioningStatus),
    /// Current status is outside the expected set; the step must not touch anything
    Skip(ProvisioningStatus),
}

impl GuardDecision {
    pub fn status(&self) -> ProvisioningStatus {
        match self {
            Self::Proceed(status) | Self::Skip(status) => *status,
        }
    }

    pub fn should_proceed(&self) -> bool {
        matches!(self, Self::Proceed(_))
    }
}

/// Trait for implementing the status precondition of an orchestrator step
#[async_trait]
pub trait StateGuard: Send + Sync {
    /// Statuses in which the guarded step is allowed to run
    fn expected(&self) -> &'static [ProvisioningStatus];

    /// Get a description of this guard for logging
    fn description(&self) -> &'static str;

    /// Decide against a status that has already been read
    fn evaluate(&self, current: ProvisioningStatus) -> GuardDecision {
        if self.expected().contains(&current) {
            GuardDecision::Proceed(current)
        } else {
            GuardDecision::Skip(current)
        }
    }

    /// Read the current status from the store and decide
    async fn check(
        &self,
        instance_id: Uuid,
        store: &dyn InstanceStore,
    ) -> StoreResult<GuardDecision> {
        let current = store.read_status(instance_id).await?;
        Ok(self.evaluate(current))
    }
}

/// Guard for submitting the Touchstream provisioning request
pub struct ProvisionGuard;

#[async_trait]
impl StateGuard for ProvisionGuard {
    fn expected(&self) -> &'static [ProvisioningStatus] {
        &[ProvisioningStatus::InProgress]
    }

    fn description(&self) -> &'static str {
        "Record must be in progress to be provisioned"
    }
}

/// Guard for tearing down a provisioned event
pub struct DeactivationGuard;

#[async_trait]
impl StateGuard for DeactivationGuard {
    fn expected(&self) -> &'static [ProvisioningStatus] {
        &[ProvisioningStatus::Deactivate, ProvisioningStatus::Reprovision]
    }

    fn description(&self) -> &'static str {
        "Record must be marked for deactivation or reprovisioning"
    }
}

/// Guard for fanning out MediaTailor manifest requests
pub struct ManifestResolutionGuard;

#[async_trait]
impl StateGuard for ManifestResolutionGuard {
    fn expected(&self) -> &'static [ProvisioningStatus] {
        &[ProvisioningStatus::Ready]
    }

    fn description(&self) -> &'static str {
        "Record must be ready before manifests are requested"
    }
}
