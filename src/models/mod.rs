//! # Data Models
//!
//! Records held by the instance store and the payloads exchanged with the
//! external Touchstream and MediaTailor elements.
//!
//! ## Records
//!
//! - [`Touchstream`]: a provisioning record, linked to zero or more manifests
//! - [`MediaTailor`]: a manifest definition whose result URL is filled in externally
//!
//! ## Wire payloads
//!
//! - [`TouchstreamRequest`]: provisioning and deactivation requests
//! - [`ExternalRequest`]: manifest generation and deletion requests
//! - [`ExternalResponse`]: callback to the element that created a record

pub mod media_tailor;
pub mod request;
pub mod response;
pub mod touchstream;

pub use media_tailor::MediaTailor;
pub use request::{
    ConfigurationAction, ExternalPayload, ExternalRequest, ManifestRequest, MediaTailorManifest,
    StreamType, TouchstreamRequest,
};
pub use response::{ExternalResponse, ProcessResponse, TouchstreamResponse};
pub use touchstream::Touchstream;
