//! Callback payload sent back to the element that created a provisioning record.

use crate::constants::callback;
use crate::state_machine::ProvisioningStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalResponse {
    #[serde(rename = "type")]
    pub response_type: String,
    pub process_response: ProcessResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    /// Identifier the source element matches the callback on
    pub event_name: String,
    pub touchstream: TouchstreamResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchstreamResponse {
    #[serde(rename = "Status")]
    pub status: String,
}

impl ExternalResponse {
    /// Callback reporting `status` for the record known to the source as `source_id`.
    ///
    /// Provisioned statuses (with or without errors) are reported as `Active`,
    /// everything else as `Complete`.
    pub fn for_status(source_id: impl Into<String>, status: ProvisioningStatus) -> Self {
        let reported = if status.is_provisioned() {
            callback::STATUS_ACTIVE
        } else {
            callback::STATUS_COMPLETE
        };

        Self {
            response_type: callback::RESPONSE_TYPE.to_string(),
            process_response: ProcessResponse {
                event_name: source_id.into(),
                touchstream: TouchstreamResponse {
                    status: reported.to_string(),
                },
            },
        }
    }
}
