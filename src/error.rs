//! Error types for the orchestrator.

use crate::orchestration::outcome::{FailureCause, StepKind};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrchestratorError {
    #[error("Store error: {0}")]
    Store(String),
    #[error("Gateway error: {0}")]
    Gateway(String),
    #[error("State transition error: {0}")]
    StateTransition(String),
    #[error("Request build error: {0}")]
    RequestBuild(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("{step} failed for {instance_id}: {cause}")]
    StepFailed {
        step: StepKind,
        instance_id: Uuid,
        cause: FailureCause,
    },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for OrchestratorError {
    fn from(error: serde_json::Error) -> Self {
        OrchestratorError::RequestBuild(format!("JSON serialization error: {error}"))
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
