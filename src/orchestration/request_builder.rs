//! # Request Builder
//!
//! Builds the payloads each step submits. Every request is derived only from
//! the record snapshot handed in (plus the deactivation timestamp), so
//! rebuilding from the same snapshot yields the same request and a resubmitted
//! request is safe.

use crate::config::OrchestratorConfig;
use crate::error::OrchestratorError;
use crate::models::{
    ConfigurationAction, ExternalRequest, ManifestRequest, MediaTailor, MediaTailorManifest,
    StreamType, Touchstream, TouchstreamRequest,
};
use crate::utils::{BooleanCoercion, Coerced, CoercionError};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

const REDUCED_TEMPLATE_FIELD: &str = "reduced_template";
const FORCED_UPDATE_FIELD: &str = "forced_update";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestBuildError {
    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

impl From<RequestBuildError> for OrchestratorError {
    fn from(err: RequestBuildError) -> Self {
        OrchestratorError::RequestBuild(err.to_string())
    }
}

/// Manifest requests addressed to one MediaTailor element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestBatch {
    pub element: String,
    pub request: ExternalRequest,
}

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    coercion: BooleanCoercion,
    sentinel: String,
    placeholder: String,
}

impl RequestBuilder {
    pub fn new(config: &OrchestratorConfig) -> Self {
        Self {
            coercion: config.requests.boolean_coercion,
            sentinel: config.manifests.result_url_sentinel.clone(),
            placeholder: config.manifests.event_id_placeholder.clone(),
        }
    }

    /// Provisioning request for `entity`.
    ///
    /// `manifests` are the linked records in link order; only those with a
    /// generated result URL are carried. A record with links always gets a
    /// manifest list, possibly empty.
    pub fn provision_request(
        &self,
        entity: &Touchstream,
        manifests: &[MediaTailor],
    ) -> Result<TouchstreamRequest, RequestBuildError> {
        let reduced_template = self.flag(entity, REDUCED_TEMPLATE_FIELD, &entity.reduced_template)?;
        let force_update = self.flag(entity, FORCED_UPDATE_FIELD, &entity.forced_update)?;

        let manifests = entity.has_manifests().then(|| {
            manifests
                .iter()
                .filter_map(|manifest| {
                    manifest
                        .populated_result_url(&self.sentinel)
                        .map(|url| MediaTailorManifest {
                            url: Some(url.to_string()),
                            product: Some(manifest.product.clone()),
                            format: Some(manifest.format.clone()),
                            cdn: Some(manifest.cdn.clone()),
                            ..Default::default()
                        })
                })
                .collect()
        });

        Ok(TouchstreamRequest {
            action: Some(ConfigurationAction::Provision),
            reduced_template,
            force_update,
            event_end_date: entity.end_date,
            manifests,
            ..Self::base_request(entity)
        })
    }

    /// Deactivation request for `entity`, ending the event at `now`
    pub fn deactivation_request(&self, entity: &Touchstream, now: DateTime<Utc>) -> TouchstreamRequest {
        TouchstreamRequest {
            action: Some(ConfigurationAction::Deactivate),
            reduced_template: false,
            force_update: false,
            event_end_date: now,
            manifests: None,
            ..Self::base_request(entity)
        }
    }

    /// One `ManifestRequest` batch per MediaTailor element, in first-seen order
    pub fn manifest_batches(&self, manifests: &[MediaTailor]) -> Vec<ManifestBatch> {
        let mut batches: Vec<(String, Vec<ManifestRequest>)> = Vec::new();

        for manifest in manifests {
            let request = ManifestRequest {
                cdn: Some(manifest.cdn.clone()),
                event_id: Some(manifest.event_id.clone()),
                format: Some(manifest.format.clone()),
                json_structure: Some(manifest.payload_template.clone()),
                domain_url: Some(manifest.domain_url.clone()),
                product: Some(manifest.product.clone()),
                touchstream_provision_id: Some(manifest.instance_id.to_string()),
                url: Some(manifest.resolved_url(&self.placeholder)),
                ..Default::default()
            };

            match batches.iter_mut().find(|(element, _)| *element == manifest.element) {
                Some((_, requests)) => requests.push(request),
                None => batches.push((manifest.element.clone(), vec![request])),
            }
        }

        batches
            .into_iter()
            .map(|(element, requests)| ManifestBatch {
                element,
                request: ExternalRequest::manifest_request(requests),
            })
            .collect()
    }

    fn base_request(entity: &Touchstream) -> TouchstreamRequest {
        TouchstreamRequest {
            action: None,
            asset_id: entity.asset_id.clone(),
            booking_id: Some(entity.instance_id.to_string()),
            configuration_type: Some(StreamType::Regular),
            event_id: entity.event_id.clone(),
            event_label: Some(entity.event_label.clone()),
            event_name: Some(entity.event_name.clone()),
            id: None,
            manifests: None,
            row_id: None,
            template_name: Some(entity.template_name.clone()),
            yospace_stream_id_hls: Some(entity.yospace_stream_id_hls.clone()),
            yospace_stream_id_mpd: Some(entity.yospace_stream_id_mpd.clone()),
            dynamic_group: entity.dynamic_group().map(str::to_string),
            reduced_template: false,
            event_start_date: entity.start_date,
            event_end_date: entity.end_date,
            force_update: false,
        }
    }

    fn flag(
        &self,
        entity: &Touchstream,
        field: &'static str,
        raw: &str,
    ) -> Result<bool, RequestBuildError> {
        let coerced = self.coercion.coerce(field, raw)?;
        if coerced == Coerced::Defaulted {
            warn!(
                instance_id = %entity.instance_id,
                field = field,
                value = %raw,
                "Unrecognised boolean value, sending false"
            );
        }
        Ok(coerced.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entity() -> Touchstream {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap();
        let mut entity = Touchstream::new("TS Element", "E1", "Cup Final", start, end);
        entity.asset_id = "A1".to_string();
        entity.template_name = "T1".to_string();
        entity.reduced_template = "True".to_string();
        entity
    }

    fn manifest(element: &str, event_id: &str, result_url: &str) -> MediaTailor {
        let mut manifest = MediaTailor::new(element, event_id, "akamai", "hls");
        manifest.url_template = "/live/{{eventid}}.m3u8".to_string();
        manifest.product = "sports".to_string();
        manifest.result_url = result_url.to_string();
        manifest
    }

    fn builder() -> RequestBuilder {
        RequestBuilder::new(&OrchestratorConfig::default())
    }

    #[test]
    fn test_provision_request_preserves_fields() {
        let entity = entity();
        let request = builder().provision_request(&entity, &[]).unwrap();

        assert_eq!(request.action, Some(ConfigurationAction::Provision));
        assert_eq!(request.asset_id, "A1");
        assert_eq!(request.event_id, "E1");
        assert_eq!(request.template_name.as_deref(), Some("T1"));
        assert_eq!(request.booking_id, Some(entity.instance_id.to_string()));
        assert_eq!(request.event_end_date, entity.end_date);
        assert!(request.reduced_template);
        assert!(!request.force_update);
        assert_eq!(request.manifests, None);
        assert_eq!(request.row_id, None);
    }

    #[test]
    fn test_provision_request_is_deterministic() {
        let entity = entity();
        let manifests = [manifest("MT", "E1", "https://cdn/E1.m3u8")];
        let first = builder().provision_request(&entity, &manifests).unwrap();
        let second = builder().provision_request(&entity, &manifests).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unpopulated_manifests_are_skipped() {
        let mut entity = entity();
        let manifests = [
            manifest("MT", "E1", "https://cdn/E1.m3u8"),
            manifest("MT", "E1", "_"),
            manifest("MT", "E1", ""),
        ];
        entity.media_tailor = manifests.iter().map(|m| m.instance_id).collect();

        let request = builder().provision_request(&entity, &manifests).unwrap();
        let carried = request.manifests.unwrap();
        assert_eq!(carried.len(), 1);
        assert_eq!(carried[0].url.as_deref(), Some("https://cdn/E1.m3u8"));
        assert_eq!(carried[0].cdn.as_deref(), Some("akamai"));
        assert_eq!(carried[0].touchstream_provision_id, None);
    }

    #[test]
    fn test_linked_but_unresolved_manifests_send_empty_list() {
        let mut entity = entity();
        let manifests = [manifest("MT", "E1", "_")];
        entity.media_tailor = vec![manifests[0].instance_id];

        let request = builder().provision_request(&entity, &manifests).unwrap();
        assert_eq!(request.manifests, Some(Vec::new()));
    }

    #[test]
    fn test_strict_coercion_rejects_unknown_flags() {
        let mut config = OrchestratorConfig::default();
        config.requests.boolean_coercion = BooleanCoercion::Strict;
        let mut entity = entity();
        entity.forced_update = "sometimes".to_string();

        let err = RequestBuilder::new(&config)
            .provision_request(&entity, &[])
            .unwrap_err();
        assert!(err.to_string().contains("forced_update"));
    }

    #[test]
    fn test_deactivation_request() {
        let mut entity = entity();
        entity.dynamic_group = Some("   ".to_string());
        entity.forced_update = "true".to_string();
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 16, 30, 0).unwrap();

        let request = builder().deactivation_request(&entity, now);
        assert_eq!(request.action, Some(ConfigurationAction::Deactivate));
        assert_eq!(request.event_end_date, now);
        assert_eq!(request.event_start_date, entity.start_date);
        assert!(!request.reduced_template);
        assert!(!request.force_update);
        assert_eq!(request.dynamic_group, None);
        assert_eq!(request.manifests, None);
    }

    #[test]
    fn test_manifest_batches_group_by_element_in_first_seen_order() {
        let manifests = [
            manifest("MT-B", "E1", ""),
            manifest("MT-A", "E2", ""),
            manifest("MT-B", "E3", ""),
        ];

        let batches = builder().manifest_batches(&manifests);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].element, "MT-B");
        assert_eq!(batches[1].element, "MT-A");

        let first = &batches[0].request;
        assert_eq!(first.request_type, "ManifestRequest");
        assert_eq!(first.manifest_request.len(), 2);
        assert_eq!(first.manifest_request[0].url.as_deref(), Some("/live/E1.m3u8"));
        assert_eq!(first.manifest_request[1].url.as_deref(), Some("/live/E3.m3u8"));
        assert_eq!(
            first.manifest_request[1].touchstream_provision_id,
            Some(manifests[2].instance_id.to_string())
        );
    }
}
