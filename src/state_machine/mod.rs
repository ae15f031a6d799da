// Status model for Touchstream provisioning records
//
// Statuses, the named transitions between them, and the guards each
// orchestrator step checks before it touches a record.

pub mod errors;
pub mod events;
pub mod guards;
pub mod states;

pub use errors::{StateMachineError, StateMachineResult};
pub use events::{ManifestTransition, StatusTransition};
pub use guards::{
    DeactivationGuard, GuardDecision, ManifestResolutionGuard, ProvisionGuard, StateGuard,
};
pub use states::{ManifestStatus, ProvisioningStatus};
