//! Wire formats of the requests written to Touchstream and MediaTailor elements.
//!
//! Field names and omission rules follow the JSON contract the elements
//! parse; absent optional values are left out of the payload entirely.

use crate::constants::manifest_request_types;
use crate::utils::serde::{deserialize_oa_date, serialize_oa_date};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `Action` code of a Touchstream request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ConfigurationAction {
    Provision = 0,
    Deactivate = 1,
    Follow = 2,
    Waiting = 3,
    Update = 4,
}

impl From<ConfigurationAction> for u8 {
    fn from(action: ConfigurationAction) -> Self {
        action as u8
    }
}

impl TryFrom<u8> for ConfigurationAction {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Provision),
            1 => Ok(Self::Deactivate),
            2 => Ok(Self::Follow),
            3 => Ok(Self::Waiting),
            4 => Ok(Self::Update),
            other => Err(format!("Unknown configuration action: {other}")),
        }
    }
}

/// `ConfigurationType` code of a Touchstream request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum StreamType {
    Regular = 0,
    Adobe = 1,
}

impl From<StreamType> for u8 {
    fn from(stream_type: StreamType) -> Self {
        stream_type as u8
    }
}

impl TryFrom<u8> for StreamType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Regular),
            1 => Ok(Self::Adobe),
            other => Err(format!("Unknown stream type: {other}")),
        }
    }
}

/// Provisioning or deactivation request for a Touchstream element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchstreamRequest {
    #[serde(rename = "Action", default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ConfigurationAction>,

    #[serde(rename = "AssetId")]
    pub asset_id: String,

    #[serde(rename = "BookingId", default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,

    #[serde(
        rename = "ConfigurationType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub configuration_type: Option<StreamType>,

    #[serde(rename = "EventId")]
    pub event_id: String,

    #[serde(rename = "EventLabel", default, skip_serializing_if = "Option::is_none")]
    pub event_label: Option<String>,

    #[serde(rename = "EventName", default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,

    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "Manifests", default, skip_serializing_if = "Option::is_none")]
    pub manifests: Option<Vec<MediaTailorManifest>>,

    /// Always written, `null` for new requests
    #[serde(rename = "RowId", default)]
    pub row_id: Option<String>,

    #[serde(rename = "TemplateName", default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,

    #[serde(
        rename = "YoSpaceStreamIdHls",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub yospace_stream_id_hls: Option<String>,

    #[serde(
        rename = "YoSpaceStreamIdMpd",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub yospace_stream_id_mpd: Option<String>,

    #[serde(rename = "DynamicGroup", default, skip_serializing_if = "Option::is_none")]
    pub dynamic_group: Option<String>,

    #[serde(rename = "ReducedTemplate", default)]
    pub reduced_template: bool,

    #[serde(
        rename = "EventStartDate",
        serialize_with = "serialize_oa_date",
        deserialize_with = "deserialize_oa_date"
    )]
    pub event_start_date: DateTime<Utc>,

    #[serde(
        rename = "EventEndDate",
        serialize_with = "serialize_oa_date",
        deserialize_with = "deserialize_oa_date"
    )]
    pub event_end_date: DateTime<Utc>,

    #[serde(rename = "ForceUpdate", default)]
    pub force_update: bool,
}

/// Manifest entry of a Touchstream provisioning request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTailorManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touchstream_provision_id: Option<String>,
}

/// Request written to a MediaTailor element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRequest {
    #[serde(rename = "Type")]
    pub request_type: String,
    #[serde(rename = "ManifestRequest")]
    pub manifest_request: Vec<ManifestRequest>,
}

impl ExternalRequest {
    /// Batch of manifest generation requests for one element
    pub fn manifest_request(requests: Vec<ManifestRequest>) -> Self {
        Self {
            request_type: manifest_request_types::MANIFEST_REQUEST.to_string(),
            manifest_request: requests,
        }
    }

    /// Deletion of every manifest generated for `event_id`
    pub fn manifest_delete(event_id: impl Into<String>) -> Self {
        Self {
            request_type: manifest_request_types::MANIFEST_DELETE.to_string(),
            manifest_request: vec![ManifestRequest {
                event_id: Some(event_id.into()),
                ..Default::default()
            }],
        }
    }
}

/// One manifest generation (or deletion) entry of an [`ExternalRequest`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_structure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touchstream_provision_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Anything the gateway can write to an external element
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalPayload {
    Touchstream(TouchstreamRequest),
    MediaTailor(ExternalRequest),
}

impl ExternalPayload {
    /// JSON text as written to the element's request parameter
    pub fn to_json(&self) -> serde_json::Result<String> {
        match self {
            Self::Touchstream(request) => serde_json::to_string(request),
            Self::MediaTailor(request) => serde_json::to_string(request),
        }
    }

    pub fn as_touchstream(&self) -> Option<&TouchstreamRequest> {
        match self {
            Self::Touchstream(request) => Some(request),
            Self::MediaTailor(_) => None,
        }
    }

    pub fn as_media_tailor(&self) -> Option<&ExternalRequest> {
        match self {
            Self::MediaTailor(request) => Some(request),
            Self::Touchstream(_) => None,
        }
    }
}
