use crate::state_machine::ManifestStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// MediaTailor manifest definition linked from provisioning records.
///
/// `result_url` is filled in by the MediaTailor element once it has generated
/// the manifest; until then it is empty or holds the configured sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTailor {
    pub instance_id: Uuid,
    #[serde(default)]
    pub status: ManifestStatus,
    /// Name of the MediaTailor element that generates the manifest
    pub element: String,
    pub cdn: String,
    pub format: String,
    pub event_id: String,
    pub domain_url: String,
    /// URL path with an event id placeholder
    pub url_template: String,
    pub product: String,
    #[serde(default)]
    pub payload_template: String,
    #[serde(default)]
    pub result_url: String,
}

impl MediaTailor {
    pub fn new(
        element: impl Into<String>,
        event_id: impl Into<String>,
        cdn: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            status: ManifestStatus::Ready,
            element: element.into(),
            cdn: cdn.into(),
            format: format.into(),
            event_id: event_id.into(),
            domain_url: String::new(),
            url_template: String::new(),
            product: String::new(),
            payload_template: String::new(),
            result_url: String::new(),
        }
    }

    /// URL template with every occurrence of `placeholder` replaced by the event id
    pub fn resolved_url(&self, placeholder: &str) -> String {
        self.url_template.replace(placeholder, &self.event_id)
    }

    /// The generated manifest URL, once the element has produced one
    pub fn populated_result_url(&self, sentinel: &str) -> Option<&str> {
        let url = self.result_url.trim();
        if url.is_empty() || url == sentinel {
            None
        } else {
            Some(url)
        }
    }

    pub fn has_result(&self, sentinel: &str) -> bool {
        self.populated_result_url(sentinel).is_some()
    }
}
