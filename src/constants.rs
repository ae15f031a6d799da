//! # System Constants
//!
//! Wire values and defaults shared with the external Touchstream and
//! MediaTailor elements. These strings are part of the external contract and
//! must not be changed without a matching change on the element side.

// Re-export status types for convenience
pub use crate::state_machine::{ManifestStatus, ProvisioningStatus};

/// Values of the `Result` column in the Touchstream provisioning table
pub mod provision_results {
    pub const IN_PROGRESS: &str = "In Progress";
    pub const NOT_PROVISIONED: &str = "Not Provisioned";
    pub const COMPLETED: &str = "Completed";
    pub const COMPLETED_WITH_ERRORS: &str = "Completed with Errors";
}

/// `Type` values of requests sent to a MediaTailor element
pub mod manifest_request_types {
    pub const MANIFEST_REQUEST: &str = "ManifestRequest";
    pub const MANIFEST_DELETE: &str = "ManifestDelete";
}

/// Stable codes attached to structured error records
pub mod error_codes {
    pub const CHECK_STATUS_RETURNED_FALSE: &str = "CheckStatusReturnedFalse";
    pub const PROVISION_COMPLETED_WITH_ERRORS: &str = "ProvisionCompletedWithErrors";
    pub const PROVISION_TEMPLATE_ERROR: &str = "ProvisionTemplateError";
    pub const RETRY_TIMEOUT: &str = "RetryTimeout";
    pub const POLL_CANCELLED: &str = "PollCancelled";
    pub const EXCEPTION_THROWN: &str = "ExceptionThrown";
    pub const DEACTIVATION_FAILED_UNKNOWN_STATUS: &str = "DeactivationFailedEventUnknownStatus";
}

/// Lifecycle event names published by the orchestrator
pub mod events {
    pub const STEP_STARTED: &str = "step.started";
    pub const STEP_SKIPPED: &str = "step.skipped";
    pub const STEP_SUCCEEDED: &str = "step.succeeded";
    pub const STEP_FAILED: &str = "step.failed";
    pub const STATUS_TRANSITIONED: &str = "status.transitioned";
}

/// Callback payload constants
pub mod callback {
    pub const RESPONSE_TYPE: &str = "Process Automation";
    pub const STATUS_ACTIVE: &str = "Active";
    pub const STATUS_COMPLETE: &str = "Complete";
}

/// Built-in defaults for configuration values
pub mod defaults {
    pub const POLL_TIMEOUT_SECONDS: u64 = 300;
    pub const POLL_INTERVAL_SECONDS: u64 = 3;

    pub const PROVISION_TABLE_ID: u32 = 6400;
    pub const REQUEST_PARAMETER_ID: u32 = 20000;
    pub const MANIFEST_REQUEST_PARAMETER_ID: u32 = 20;
    pub const MANIFEST_EVENTS_TABLE_ID: u32 = 1000;
    pub const MANIFEST_EVENT_ID_COLUMN: u32 = 1004;

    pub const RESULT_URL_SENTINEL: &str = "_";
    pub const EVENT_ID_PLACEHOLDER: &str = "{{eventid}}";

    pub const EVENT_CHANNEL_CAPACITY: usize = 1000;
}

/// Environment variable naming the deployment environment
pub const ENVIRONMENT_VAR: &str = "TOUCHSTREAM_ENV";

/// Prefix of environment variables overriding configuration values
pub const CONFIG_ENV_PREFIX: &str = "TOUCHSTREAM";
