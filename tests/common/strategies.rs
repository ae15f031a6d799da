//! Proptest strategies over the status model.

#![allow(dead_code)]

use proptest::prelude::*;
use touchstream_orchestrator::ProvisioningStatus;

/// Any provisioning status
pub fn status_strategy() -> impl Strategy<Value = ProvisioningStatus> {
    prop::sample::select(ProvisioningStatus::ALL.to_vec())
}

/// Free-text boolean values as operators type them
pub fn boolean_text_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("true".to_string()),
        Just("True".to_string()),
        Just("FALSE".to_string()),
        Just(" false ".to_string()),
        Just(String::new()),
        "[a-zA-Z0-9]{1,8}",
    ]
}
