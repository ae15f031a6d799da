//! # Instance Store
//!
//! Persistence boundary for provisioning and manifest records. The store owns
//! every persisted value; orchestrator steps read snapshots from it and change
//! status only through [`InstanceStore::transition_status`], which checks the
//! current status and writes the new one as a single atomic operation.

pub mod memory;

pub use memory::InMemoryInstanceStore;

use crate::error::OrchestratorError;
use crate::models::{MediaTailor, Touchstream};
use crate::state_machine::{ManifestStatus, ProvisioningStatus};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Instance {0} not found")]
    NotFound(Uuid),

    #[error("Transition rejected: instance is {current}, expected one of {expected:?}")]
    Rejected {
        current: String,
        expected: Vec<String>,
    },

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn rejected<S: ToString>(current: S, expected: &[S]) -> Self {
        Self::Rejected {
            current: current.to_string(),
            expected: expected.iter().map(ToString::to_string).collect(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for OrchestratorError {
    fn from(err: StoreError) -> Self {
        OrchestratorError::Store(err.to_string())
    }
}

/// Typed access to provisioning and manifest records
#[async_trait]
pub trait InstanceStore: Send + Sync {
    async fn read_status(&self, instance_id: Uuid) -> StoreResult<ProvisioningStatus>;

    async fn read_entity(&self, instance_id: Uuid) -> StoreResult<Touchstream>;

    async fn read_manifest(&self, instance_id: Uuid) -> StoreResult<MediaTailor>;

    /// Move a provisioning record to `to` if its current status is one of `from`.
    ///
    /// Returns the status the record held before the write.
    async fn transition_status(
        &self,
        instance_id: Uuid,
        from: &[ProvisioningStatus],
        to: ProvisioningStatus,
    ) -> StoreResult<ProvisioningStatus>;

    async fn insert_entity(&self, entity: Touchstream) -> StoreResult<()>;

    async fn insert_manifest(&self, manifest: MediaTailor) -> StoreResult<()>;

    /// Record the URL an external MediaTailor element generated for a manifest
    async fn update_manifest_result_url(
        &self,
        instance_id: Uuid,
        result_url: String,
    ) -> StoreResult<()>;

    async fn transition_manifest_status(
        &self,
        instance_id: Uuid,
        from: ManifestStatus,
        to: ManifestStatus,
    ) -> StoreResult<ManifestStatus>;
}
