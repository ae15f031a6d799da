use crate::state_machine::ProvisioningStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Touchstream provisioning record as held by the instance store.
///
/// `reduced_template` and `forced_update` are kept as the free text the record
/// carries; they are coerced to booleans only when a request is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Touchstream {
    pub instance_id: Uuid,
    #[serde(default)]
    pub status: ProvisioningStatus,
    /// Name of the Touchstream element that receives the request
    pub element: String,
    pub asset_id: String,
    pub event_id: String,
    pub event_name: String,
    pub event_label: String,
    pub template_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub reduced_template: String,
    #[serde(default)]
    pub forced_update: String,
    #[serde(default)]
    pub yospace_stream_id_hls: String,
    #[serde(default)]
    pub yospace_stream_id_mpd: String,
    #[serde(default)]
    pub dynamic_group: Option<String>,
    /// `dmaid/elementid/parameterid` of the element that created the record
    #[serde(default)]
    pub source_element: Option<String>,
    /// Identifier the source element uses to match the callback
    #[serde(default)]
    pub source_id: Option<String>,
    /// Linked MediaTailor records, in link order
    #[serde(default)]
    pub media_tailor: Vec<Uuid>,
}

impl Touchstream {
    /// Create a draft record with a fresh instance id
    pub fn new(
        element: impl Into<String>,
        event_id: impl Into<String>,
        event_name: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            status: ProvisioningStatus::Draft,
            element: element.into(),
            asset_id: String::new(),
            event_id: event_id.into(),
            event_name: event_name.into(),
            event_label: String::new(),
            template_name: String::new(),
            start_date,
            end_date,
            reduced_template: String::new(),
            forced_update: String::new(),
            yospace_stream_id_hls: String::new(),
            yospace_stream_id_mpd: String::new(),
            dynamic_group: None,
            source_element: None,
            source_id: None,
            media_tailor: Vec::new(),
        }
    }

    pub fn has_manifests(&self) -> bool {
        !self.media_tailor.is_empty()
    }

    /// Dynamic group, if one is set to something other than whitespace
    pub fn dynamic_group(&self) -> Option<&str> {
        non_blank(self.dynamic_group.as_deref())
    }

    /// Callback address, if the record was created by a source element
    pub fn source_element(&self) -> Option<&str> {
        non_blank(self.source_element.as_deref())
    }

    pub fn source_id(&self) -> &str {
        self.source_id.as_deref().unwrap_or_default()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Touchstream {
        let now = Utc::now();
        Touchstream::new("TS Element", "E1", "Match of the Day", now, now)
    }

    #[test]
    fn test_new_record_is_draft() {
        let record = sample();
        assert_eq!(record.status, ProvisioningStatus::Draft);
        assert!(!record.has_manifests());
        assert_ne!(record.instance_id, Uuid::nil());
    }

    #[test]
    fn test_blank_optional_fields_read_as_absent() {
        let mut record = sample();
        record.dynamic_group = Some("  ".to_string());
        record.source_element = Some(String::new());
        assert_eq!(record.dynamic_group(), None);
        assert_eq!(record.source_element(), None);
        assert_eq!(record.source_id(), "");

        record.dynamic_group = Some("group-a".to_string());
        assert_eq!(record.dynamic_group(), Some("group-a"));
    }
}
