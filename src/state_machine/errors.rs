use crate::error::OrchestratorError;
use thiserror::Error;

/// Error types for status model operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateMachineError {
    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidTransition { from: Option<String>, to: String },
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;

impl From<StateMachineError> for OrchestratorError {
    fn from(err: StateMachineError) -> Self {
        OrchestratorError::StateTransition(err.to_string())
    }
}
