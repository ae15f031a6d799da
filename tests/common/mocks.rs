//! Scripted gateway for driving orchestrator steps through precise sequences
//! of element responses.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;
use touchstream_orchestrator::gateway::{
    ExternalGateway, GatewayError, GatewayResult, ManifestEventRow, ProvisionResultRow,
    SourceAddress,
};
use touchstream_orchestrator::models::{ExternalPayload, ExternalResponse};
use uuid::Uuid;

/// Table responses replayed one per query; the last one repeats once the script runs out
#[derive(Debug, Default, Clone)]
struct Script<T: Clone> {
    pending: VecDeque<Vec<T>>,
    last: Vec<T>,
}

impl<T: Clone> Script<T> {
    fn next(&mut self) -> Vec<T> {
        if let Some(rows) = self.pending.pop_front() {
            self.last = rows;
        }
        self.last.clone()
    }
}

/// Which table a query read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    ProvisionResults { target: String },
    ManifestEvents { target: String, event_id: String },
}

#[derive(Debug, Default)]
pub struct ScriptedGatewayState {
    provision_scripts: HashMap<String, Script<ProvisionResultRow>>,
    manifest_scripts: HashMap<String, Script<ManifestEventRow>>,
    /// Every submitted payload, in submission order
    pub submissions: Vec<(String, ExternalPayload)>,
    /// Every query, with the (tokio) time it happened
    pub queries: Vec<(QueryKind, Instant)>,
    pub notifications: Vec<(SourceAddress, ExternalResponse)>,
    pub submit_error: Option<GatewayError>,
    pub notify_error: Option<GatewayError>,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedGateway {
    state: Arc<Mutex<ScriptedGatewayState>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results the provisioning table of `target` reports for `instance_id`, one per query
    pub fn script_provision_results(&self, target: &str, instance_id: Uuid, results: &[Option<&str>]) {
        let pending = results
            .iter()
            .map(|result| match result {
                Some(text) => vec![ProvisionResultRow::new(instance_id, *text)],
                None => Vec::new(),
            })
            .collect();
        self.state.lock().unwrap().provision_scripts.insert(
            target.to_string(),
            Script {
                pending,
                last: Vec::new(),
            },
        );
    }

    /// Number of manifest-event rows `target` reports, one entry per query
    pub fn script_manifest_events(&self, target: &str, event_id: &str, counts: &[usize]) {
        let pending = counts
            .iter()
            .map(|count| vec![ManifestEventRow::new(event_id); *count])
            .collect();
        self.state.lock().unwrap().manifest_scripts.insert(
            target.to_string(),
            Script {
                pending,
                last: Vec::new(),
            },
        );
    }

    pub fn fail_submissions(&self, error: GatewayError) {
        self.state.lock().unwrap().submit_error = Some(error);
    }

    pub fn fail_notifications(&self, error: GatewayError) {
        self.state.lock().unwrap().notify_error = Some(error);
    }

    pub fn submissions(&self) -> Vec<(String, ExternalPayload)> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn queries(&self) -> Vec<(QueryKind, Instant)> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn provision_query_count(&self) -> usize {
        self.queries()
            .iter()
            .filter(|(kind, _)| matches!(kind, QueryKind::ProvisionResults { .. }))
            .count()
    }

    pub fn notifications(&self) -> Vec<(SourceAddress, ExternalResponse)> {
        self.state.lock().unwrap().notifications.clone()
    }
}

#[async_trait]
impl ExternalGateway for ScriptedGateway {
    async fn submit(&self, target: &str, payload: ExternalPayload) -> GatewayResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.submit_error.clone() {
            return Err(error);
        }
        state.submissions.push((target.to_string(), payload));
        Ok(())
    }

    async fn query_provision_results(
        &self,
        target: &str,
        instance_id: Uuid,
    ) -> GatewayResult<Vec<ProvisionResultRow>> {
        let mut state = self.state.lock().unwrap();
        state.queries.push((
            QueryKind::ProvisionResults {
                target: target.to_string(),
            },
            Instant::now(),
        ));

        let key = instance_id.to_string();
        Ok(state
            .provision_scripts
            .get_mut(target)
            .map(Script::next)
            .unwrap_or_default()
            .into_iter()
            .filter(|row| row.instance_id == key)
            .collect())
    }

    async fn query_manifest_events(
        &self,
        target: &str,
        event_id: &str,
    ) -> GatewayResult<Vec<ManifestEventRow>> {
        let mut state = self.state.lock().unwrap();
        state.queries.push((
            QueryKind::ManifestEvents {
                target: target.to_string(),
                event_id: event_id.to_string(),
            },
            Instant::now(),
        ));

        Ok(state
            .manifest_scripts
            .get_mut(target)
            .map(Script::next)
            .unwrap_or_default()
            .into_iter()
            .filter(|row| row.event_id == event_id)
            .collect())
    }

    async fn notify_source(
        &self,
        address: SourceAddress,
        response: ExternalResponse,
    ) -> GatewayResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.notify_error.clone() {
            return Err(error);
        }
        state.notifications.push((address, response));
        Ok(())
    }
}
