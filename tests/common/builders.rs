//! Record builders and an orchestrator fixture wired to the scripted gateway.

#![allow(dead_code)]

use super::mocks::ScriptedGateway;
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use touchstream_orchestrator::config::OrchestratorConfig;
use touchstream_orchestrator::events::EventPublisher;
use touchstream_orchestrator::models::{MediaTailor, Touchstream};
use touchstream_orchestrator::store::{InMemoryInstanceStore, InstanceStore};
use touchstream_orchestrator::{Orchestrator, ProvisioningStatus};
use uuid::Uuid;

pub const TS_ELEMENT: &str = "TS Element";

/// Builder pattern for creating test provisioning records
pub struct TouchstreamBuilder {
    entity: Touchstream,
}

impl TouchstreamBuilder {
    pub fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap();
        Self {
            entity: Touchstream::new(TS_ELEMENT, "E1", "Cup Final", start, end),
        }
    }

    pub fn with_status(mut self, status: ProvisioningStatus) -> Self {
        self.entity.status = status;
        self
    }

    pub fn with_ids(mut self, asset_id: &str, event_id: &str, template_name: &str) -> Self {
        self.entity.asset_id = asset_id.to_string();
        self.entity.event_id = event_id.to_string();
        self.entity.template_name = template_name.to_string();
        self
    }

    pub fn with_manifests(mut self, manifests: &[&MediaTailor]) -> Self {
        self.entity.media_tailor = manifests.iter().map(|m| m.instance_id).collect();
        self
    }

    pub fn with_manifest_ids(mut self, ids: Vec<Uuid>) -> Self {
        self.entity.media_tailor = ids;
        self
    }

    pub fn with_source(mut self, source_element: &str, source_id: &str) -> Self {
        self.entity.source_element = Some(source_element.to_string());
        self.entity.source_id = Some(source_id.to_string());
        self
    }

    pub fn with_flags(mut self, reduced_template: &str, forced_update: &str) -> Self {
        self.entity.reduced_template = reduced_template.to_string();
        self.entity.forced_update = forced_update.to_string();
        self
    }

    pub fn build(self) -> Touchstream {
        self.entity
    }
}

impl Default for TouchstreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Manifest record on `element` for event `event_id`
pub fn manifest(element: &str, event_id: &str, result_url: &str) -> MediaTailor {
    let mut manifest = MediaTailor::new(element, event_id, "akamai", "hls");
    manifest.domain_url = "https://origin.example".to_string();
    manifest.url_template = "/live/{{eventid}}/master.m3u8".to_string();
    manifest.product = "sports".to_string();
    manifest.result_url = result_url.to_string();
    manifest
}

/// Store, scripted gateway and orchestrator sharing one config
pub struct Fixture {
    pub store: Arc<InMemoryInstanceStore>,
    pub gateway: ScriptedGateway,
    pub publisher: EventPublisher,
    pub cancellation: CancellationToken,
    pub orchestrator: Orchestrator,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(OrchestratorConfig::default())
    }

    pub fn with_config(config: OrchestratorConfig) -> Self {
        let store = Arc::new(InMemoryInstanceStore::new());
        let gateway = ScriptedGateway::new();
        let publisher = EventPublisher::default();
        let cancellation = CancellationToken::new();
        let orchestrator = Orchestrator::with_components(
            store.clone(),
            Arc::new(gateway.clone()),
            config,
            publisher.clone(),
            cancellation.clone(),
        );

        Self {
            store,
            gateway,
            publisher,
            cancellation,
            orchestrator,
        }
    }

    pub async fn insert(&self, entity: Touchstream) -> Uuid {
        let id = entity.instance_id;
        self.store.insert_entity(entity).await.unwrap();
        id
    }

    pub async fn insert_manifest(&self, manifest: MediaTailor) -> Uuid {
        let id = manifest.instance_id;
        self.store.insert_manifest(manifest).await.unwrap();
        id
    }

    pub async fn status(&self, instance_id: Uuid) -> ProvisioningStatus {
        self.store.read_status(instance_id).await.unwrap()
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
