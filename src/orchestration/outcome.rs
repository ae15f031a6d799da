//! Step kinds, failure causes and the outcomes reported to callers.

use crate::constants::error_codes;
use crate::gateway::GatewayError;
use crate::logging::Severity;
use crate::orchestration::request_builder::RequestBuildError;
use crate::state_machine::{ProvisioningStatus, StateMachineError};
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The orchestrator operation being run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Provision,
    Deactivate,
    ResolveManifests,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provision => "provision",
            Self::Deactivate => "deactivate",
            Self::ResolveManifests => "resolve_manifests",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a step failed, or why it succeeded in a degraded way
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The Touchstream element rejected the request
    TemplateError { result: String },
    /// The element reported completion with errors
    CompletedWithErrors,
    TimedOut { attempts: u32, elapsed_secs: u64 },
    Cancelled { attempts: u32 },
    /// The record was in a status the step cannot finish from
    UnknownStatus { status: ProvisioningStatus },
    /// Another run of the step moved the record first
    Superseded { status: ProvisioningStatus },
    /// Store, gateway or serialization failure
    Fault { message: String },
}

impl FailureCause {
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TemplateError { .. } => error_codes::PROVISION_TEMPLATE_ERROR,
            Self::CompletedWithErrors => error_codes::PROVISION_COMPLETED_WITH_ERRORS,
            Self::TimedOut { .. } => error_codes::RETRY_TIMEOUT,
            Self::Cancelled { .. } => error_codes::POLL_CANCELLED,
            Self::UnknownStatus { .. } => error_codes::DEACTIVATION_FAILED_UNKNOWN_STATUS,
            Self::Superseded { .. } => error_codes::CHECK_STATUS_RETURNED_FALSE,
            Self::Fault { .. } => error_codes::EXCEPTION_THROWN,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::CompletedWithErrors
            | Self::TimedOut { .. }
            | Self::Cancelled { .. }
            | Self::Superseded { .. } => Severity::Warning,
            Self::TemplateError { .. } | Self::UnknownStatus { .. } | Self::Fault { .. } => {
                Severity::Major
            }
        }
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TemplateError { result } => {
                write!(f, "element rejected the request with result {result:?}")
            }
            Self::CompletedWithErrors => write!(f, "provisioned with errors"),
            Self::TimedOut {
                attempts,
                elapsed_secs,
            } => write!(
                f,
                "no convergence within the timeout ({attempts} attempts over {elapsed_secs}s)"
            ),
            Self::Cancelled { attempts } => write!(f, "cancelled after {attempts} attempts"),
            Self::UnknownStatus { status } => {
                write!(f, "cannot finish deactivation from status {status}")
            }
            Self::Superseded { status } => {
                write!(f, "record was moved to {status} by another run")
            }
            Self::Fault { message } => write!(f, "{message}"),
        }
    }
}

impl From<StoreError> for FailureCause {
    fn from(err: StoreError) -> Self {
        if let StoreError::Rejected { current, .. } = &err {
            if let Ok(status) = current.parse() {
                return Self::Superseded { status };
            }
        }
        Self::fault(err.to_string())
    }
}

impl From<GatewayError> for FailureCause {
    fn from(err: GatewayError) -> Self {
        Self::fault(err.to_string())
    }
}

impl From<RequestBuildError> for FailureCause {
    fn from(err: RequestBuildError) -> Self {
        Self::fault(err.to_string())
    }
}

impl From<StateMachineError> for FailureCause {
    fn from(err: StateMachineError) -> Self {
        Self::fault(err.to_string())
    }
}

/// What a step reports back to its caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The guard did not match; nothing was touched
    Skipped { status: ProvisioningStatus },
    Succeeded {
        status: ProvisioningStatus,
        warning: Option<FailureCause>,
    },
    /// Only returned under [`FailurePolicy::Report`]
    Failed { cause: FailureCause },
}

impl StepOutcome {
    pub fn succeeded(status: ProvisioningStatus) -> Self {
        Self::Succeeded {
            status,
            warning: None,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// How a failed step is surfaced to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// `Ok(StepOutcome::Failed { .. })`
    #[default]
    Report,
    /// `Err(OrchestratorError::StepFailed { .. })`
    Propagate,
}
