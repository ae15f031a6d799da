use super::errors::{StateMachineError, StateMachineResult};
use super::states::{ManifestStatus, ProvisioningStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named status transitions of a provisioning record.
///
/// The identifiers match the transition names registered in the process
/// automation behavior, so they can be handed to an external status engine
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusTransition {
    DraftToReady,
    ReadyToInProgress,
    InProgressToActive,
    InProgressToActiveWithErrors,
    ActiveToReprovision,
    ActiveWithErrorsToReprovision,
    ActiveToDeactivate,
    ActiveWithErrorsToDeactivate,
    ReprovisionToInProgress,
    ReprovisionToReady,
    DeactivateToDeactivating,
    DeactivatingToComplete,
    CompleteToDraft,
    /// Error path out of any in-flight status
    ToError(ProvisioningStatus),
    /// Recycle a failed record
    ErrorToDraft,
}

impl StatusTransition {
    /// Every transition the provisioning lifecycle allows
    pub fn all() -> Vec<StatusTransition> {
        let mut transitions = vec![
            Self::DraftToReady,
            Self::ReadyToInProgress,
            Self::InProgressToActive,
            Self::InProgressToActiveWithErrors,
            Self::ActiveToReprovision,
            Self::ActiveWithErrorsToReprovision,
            Self::ActiveToDeactivate,
            Self::ActiveWithErrorsToDeactivate,
            Self::ReprovisionToInProgress,
            Self::ReprovisionToReady,
            Self::DeactivateToDeactivating,
            Self::DeactivatingToComplete,
            Self::CompleteToDraft,
            Self::ErrorToDraft,
        ];
        transitions.extend(ProvisioningStatus::IN_FLIGHT.into_iter().map(Self::ToError));
        transitions
    }

    /// Look up the transition between two statuses
    pub fn between(
        from: ProvisioningStatus,
        to: ProvisioningStatus,
    ) -> StateMachineResult<StatusTransition> {
        use ProvisioningStatus as S;

        let transition = match (from, to) {
            (S::Draft, S::Ready) => Self::DraftToReady,
            (S::Ready, S::InProgress) => Self::ReadyToInProgress,
            (S::InProgress, S::Active) => Self::InProgressToActive,
            (S::InProgress, S::ActiveWithErrors) => Self::InProgressToActiveWithErrors,
            (S::Active, S::Reprovision) => Self::ActiveToReprovision,
            (S::ActiveWithErrors, S::Reprovision) => Self::ActiveWithErrorsToReprovision,
            (S::Active, S::Deactivate) => Self::ActiveToDeactivate,
            (S::ActiveWithErrors, S::Deactivate) => Self::ActiveWithErrorsToDeactivate,
            (S::Reprovision, S::InProgress) => Self::ReprovisionToInProgress,
            (S::Reprovision, S::Ready) => Self::ReprovisionToReady,
            (S::Deactivate, S::Deactivating) => Self::DeactivateToDeactivating,
            (S::Deactivating, S::Complete) => Self::DeactivatingToComplete,
            (S::Complete, S::Draft) => Self::CompleteToDraft,
            (S::Error, S::Draft) => Self::ErrorToDraft,
            (from, S::Error) if from.is_in_flight() => Self::ToError(from),
            (from, to) => {
                return Err(StateMachineError::InvalidTransition {
                    from: Some(from.to_string()),
                    to: to.to_string(),
                })
            }
        };

        Ok(transition)
    }

    pub fn from_status(&self) -> ProvisioningStatus {
        use ProvisioningStatus as S;

        match self {
            Self::DraftToReady => S::Draft,
            Self::ReadyToInProgress => S::Ready,
            Self::InProgressToActive | Self::InProgressToActiveWithErrors => S::InProgress,
            Self::ActiveToReprovision | Self::ActiveToDeactivate => S::Active,
            Self::ActiveWithErrorsToReprovision | Self::ActiveWithErrorsToDeactivate => {
                S::ActiveWithErrors
            }
            Self::ReprovisionToInProgress | Self::ReprovisionToReady => S::Reprovision,
            Self::DeactivateToDeactivating => S::Deactivate,
            Self::DeactivatingToComplete => S::Deactivating,
            Self::CompleteToDraft => S::Complete,
            Self::ToError(from) => *from,
            Self::ErrorToDraft => S::Error,
        }
    }

    pub fn to_status(&self) -> ProvisioningStatus {
        use ProvisioningStatus as S;

        match self {
            Self::DraftToReady => S::Ready,
            Self::ReadyToInProgress | Self::ReprovisionToInProgress => S::InProgress,
            Self::InProgressToActive => S::Active,
            Self::InProgressToActiveWithErrors => S::ActiveWithErrors,
            Self::ActiveToReprovision | Self::ActiveWithErrorsToReprovision => S::Reprovision,
            Self::ActiveToDeactivate | Self::ActiveWithErrorsToDeactivate => S::Deactivate,
            Self::ReprovisionToReady => S::Ready,
            Self::DeactivateToDeactivating => S::Deactivating,
            Self::DeactivatingToComplete => S::Complete,
            Self::CompleteToDraft | Self::ErrorToDraft => S::Draft,
            Self::ToError(_) => S::Error,
        }
    }

    /// Transition name as registered in the behavior definition
    pub fn id(&self) -> String {
        match self {
            Self::ToError(from) => format!("{}_to_error", compact(*from)),
            other => format!(
                "{}_to_{}",
                compact(other.from_status()),
                compact(other.to_status())
            ),
        }
    }
}

/// Status names drop their underscores inside transition ids ("inprogress_to_active")
fn compact(status: ProvisioningStatus) -> String {
    status.as_str().replace('_', "")
}

impl fmt::Display for StatusTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Named status transitions of a manifest record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManifestTransition {
    ReadyToComplete,
    CompleteToReady,
}

impl ManifestTransition {
    pub fn from_status(&self) -> ManifestStatus {
        match self {
            Self::ReadyToComplete => ManifestStatus::Ready,
            Self::CompleteToReady => ManifestStatus::Complete,
        }
    }

    pub fn to_status(&self) -> ManifestStatus {
        match self {
            Self::ReadyToComplete => ManifestStatus::Complete,
            Self::CompleteToReady => ManifestStatus::Ready,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::ReadyToComplete => "ready_to_complete",
            Self::CompleteToReady => "complete_to_ready",
        }
    }
}
