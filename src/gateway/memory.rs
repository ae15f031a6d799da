use super::{
    ExternalGateway, GatewayError, GatewayResult, ManifestEventRow, ProvisionResultRow,
    SourceAddress,
};
use crate::config::GatewayConfig;
use crate::models::{ExternalPayload, ExternalResponse};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// A payload written to an element's request parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub target: String,
    pub parameter_id: u32,
    pub payload: ExternalPayload,
    /// Payload text exactly as written
    pub json: String,
}

/// A callback delivered to a source element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub address: SourceAddress,
    pub response: ExternalResponse,
}

#[derive(Debug, Default)]
struct GatewayState {
    elements: HashSet<String>,
    provision_rows: HashMap<String, Vec<ProvisionResultRow>>,
    manifest_events: HashMap<String, Vec<ManifestEventRow>>,
    submissions: Vec<Submission>,
    notifications: Vec<Notification>,
}

/// Gateway over in-process element tables.
///
/// Elements must be registered before they can be addressed. Tables are
/// edited directly by whoever plays the part of the external element.
#[derive(Debug, Clone)]
pub struct InMemoryGateway {
    config: GatewayConfig,
    state: Arc<Mutex<GatewayState>>,
}

impl InMemoryGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(GatewayState::default())),
        }
    }

    pub fn register_element(&self, name: impl Into<String>) {
        self.state.lock().elements.insert(name.into());
    }

    /// Replace the provisioning-result rows of `target`
    pub fn set_provision_rows(&self, target: &str, rows: Vec<ProvisionResultRow>) {
        self.state
            .lock()
            .provision_rows
            .insert(target.to_string(), rows);
    }

    /// Set the result of the row booked under `instance_id`, adding the row if needed
    pub fn upsert_provision_result(&self, target: &str, instance_id: Uuid, result: &str) {
        let mut state = self.state.lock();
        let rows = state.provision_rows.entry(target.to_string()).or_default();
        let key = instance_id.to_string();
        match rows.iter_mut().find(|row| row.instance_id == key) {
            Some(row) => row.result = result.to_string(),
            None => rows.push(ProvisionResultRow::new(instance_id, result)),
        }
    }

    pub fn remove_provision_rows(&self, target: &str, instance_id: Uuid) {
        let key = instance_id.to_string();
        if let Some(rows) = self.state.lock().provision_rows.get_mut(target) {
            rows.retain(|row| row.instance_id != key);
        }
    }

    pub fn set_manifest_events(&self, target: &str, rows: Vec<ManifestEventRow>) {
        self.state
            .lock()
            .manifest_events
            .insert(target.to_string(), rows);
    }

    pub fn remove_manifest_events(&self, target: &str, event_id: &str) {
        if let Some(rows) = self.state.lock().manifest_events.get_mut(target) {
            rows.retain(|row| row.event_id != event_id);
        }
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().submissions.clone()
    }

    pub fn submissions_to(&self, target: &str) -> Vec<Submission> {
        self.state
            .lock()
            .submissions
            .iter()
            .filter(|submission| submission.target == target)
            .cloned()
            .collect()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state.lock().notifications.clone()
    }

    fn ensure_known(state: &GatewayState, target: &str) -> GatewayResult<()> {
        if state.elements.contains(target) {
            Ok(())
        } else {
            Err(GatewayError::UnknownTarget(target.to_string()))
        }
    }

    fn parameter_for(&self, payload: &ExternalPayload) -> u32 {
        match payload {
            ExternalPayload::Touchstream(_) => self.config.request_parameter_id,
            ExternalPayload::MediaTailor(_) => self.config.manifest_request_parameter_id,
        }
    }
}

#[async_trait]
impl ExternalGateway for InMemoryGateway {
    async fn submit(&self, target: &str, payload: ExternalPayload) -> GatewayResult<()> {
        let json = payload.to_json()?;
        let parameter_id = self.parameter_for(&payload);

        let mut state = self.state.lock();
        Self::ensure_known(&state, target)?;

        debug!(
            target_element = %target,
            parameter_id = parameter_id,
            payload_bytes = json.len(),
            "Request written to element"
        );
        state.submissions.push(Submission {
            target: target.to_string(),
            parameter_id,
            payload,
            json,
        });
        Ok(())
    }

    async fn query_provision_results(
        &self,
        target: &str,
        instance_id: Uuid,
    ) -> GatewayResult<Vec<ProvisionResultRow>> {
        let state = self.state.lock();
        Self::ensure_known(&state, target)?;

        let key = instance_id.to_string();
        Ok(state
            .provision_rows
            .get(target)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row.instance_id == key)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query_manifest_events(
        &self,
        target: &str,
        event_id: &str,
    ) -> GatewayResult<Vec<ManifestEventRow>> {
        let state = self.state.lock();
        Self::ensure_known(&state, target)?;

        Ok(state
            .manifest_events
            .get(target)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row.event_id == event_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn notify_source(
        &self,
        address: SourceAddress,
        response: ExternalResponse,
    ) -> GatewayResult<()> {
        info!(
            source_address = %address,
            status = %response.process_response.touchstream.status,
            "Callback delivered"
        );
        self.state
            .lock()
            .notifications
            .push(Notification { address, response });
        Ok(())
    }
}
