//! # Orchestration Engine
//!
//! The three provisioning steps and the machinery they share.
//!
//! ## Core Components
//!
//! - **Orchestrator**: holds the injected store, gateway, publisher and config
//! - **Provision**: submit the Touchstream request and wait for a result row
//! - **Deactivate**: tear the event down and wait until its rows disappear
//! - **ResolveManifests**: fan manifest requests out and wait for every URL
//! - **RequestBuilder**: deterministic request snapshots from a record
//!
//! Every step checks its guard first and skips without side effects when the
//! record is in any other status. A step whose guarded transition loses to a
//! concurrent run of the same step also reports a skip. A failed step moves
//! the record to `error` from the status the step holds,
//! emits an [`ErrorRecord`](crate::logging::ErrorRecord), publishes a
//! lifecycle event and is then surfaced according to the configured
//! [`FailurePolicy`].

pub mod deactivation;
pub mod manifest_processing;
pub mod outcome;
pub mod provisioning;
pub mod request_builder;

pub use outcome::{FailureCause, FailurePolicy, StepKind, StepOutcome};
pub use request_builder::{ManifestBatch, RequestBuildError, RequestBuilder};

use crate::config::OrchestratorConfig;
use crate::constants::{error_codes, events};
use crate::error::{OrchestratorError, Result};
use crate::events::{EventPublisher, LifecycleEvent};
use crate::gateway::{ExternalGateway, SourceAddress};
use crate::logging::{log_error_record, log_step_operation, ErrorRecord, Severity};
use crate::models::{ExternalResponse, MediaTailor, Touchstream};
use crate::resilience::{PollError, Poller};
use crate::state_machine::{GuardDecision, ProvisioningStatus, StateGuard, StatusTransition};
use crate::store::InstanceStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Identity of one step run, carried into logs, events and error records
#[derive(Debug, Clone)]
pub(crate) struct StepScope {
    step: StepKind,
    instance_id: Uuid,
    element: String,
    event_name: String,
}

impl StepScope {
    fn new(step: StepKind, instance_id: Uuid) -> Self {
        Self {
            step,
            instance_id,
            element: String::new(),
            event_name: String::new(),
        }
    }

    fn for_entity(step: StepKind, entity: &Touchstream) -> Self {
        Self {
            step,
            instance_id: entity.instance_id,
            element: entity.element.clone(),
            event_name: entity.event_name.clone(),
        }
    }

    fn record(&self, code: &str, severity: Severity, description: impl Into<String>) -> ErrorRecord {
        ErrorRecord::new(code, severity, self.step.as_str(), description)
            .affecting(&self.element, &self.event_name)
            .for_instance(self.instance_id)
    }
}

/// Entry point for the provisioning steps.
///
/// Cheap to clone; clones share the store, gateway, publisher and
/// cancellation token.
#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<dyn InstanceStore>,
    gateway: Arc<dyn ExternalGateway>,
    config: Arc<OrchestratorConfig>,
    publisher: EventPublisher,
    cancellation: CancellationToken,
    requests: RequestBuilder,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn InstanceStore>,
        gateway: Arc<dyn ExternalGateway>,
        config: OrchestratorConfig,
    ) -> Self {
        Self::with_components(
            store,
            gateway,
            config,
            EventPublisher::default(),
            CancellationToken::new(),
        )
    }

    /// Create an orchestrator with an existing publisher and cancellation token
    pub fn with_components(
        store: Arc<dyn InstanceStore>,
        gateway: Arc<dyn ExternalGateway>,
        config: OrchestratorConfig,
        publisher: EventPublisher,
        cancellation: CancellationToken,
    ) -> Self {
        let requests = RequestBuilder::new(&config);
        Self {
            store,
            gateway,
            config: Arc::new(config),
            publisher,
            cancellation,
            requests,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn publisher(&self) -> &EventPublisher {
        &self.publisher
    }

    /// Token that stops every poll loop of this orchestrator and its clones
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    fn poller(&self) -> Poller {
        Poller::new(self.config.polling.poll_config(), self.cancellation.clone())
    }

    /// Announce a step run and check its guard
    async fn begin(
        &self,
        step: StepKind,
        instance_id: Uuid,
        guard: &dyn StateGuard,
    ) -> std::result::Result<GuardDecision, FailureCause> {
        log_step_operation(step.as_str(), instance_id, None, "started", None);
        self.publisher
            .publish(LifecycleEvent::new(events::STEP_STARTED, instance_id).with_step(step));

        let decision = guard.check(instance_id, self.store.as_ref()).await?;
        debug!(
            step = %step,
            instance_id = %instance_id,
            status = %decision.status(),
            proceed = decision.should_proceed(),
            guard = guard.description(),
            "Guard evaluated"
        );
        Ok(decision)
    }

    /// Report a guard miss. `record` adds a `CheckStatusReturnedFalse` error record.
    fn skipped(&self, scope: &StepScope, status: ProvisioningStatus, record: bool) -> StepOutcome {
        if record {
            log_error_record(&scope.record(
                error_codes::CHECK_STATUS_RETURNED_FALSE,
                Severity::Warning,
                format!(
                    "Activity not executed: status {status} is not compatible with {}",
                    scope.step
                ),
            ));
        }
        log_step_operation(
            scope.step.as_str(),
            scope.instance_id,
            Some(scope.event_name.as_str()),
            "skipped",
            Some(status.as_str()),
        );
        self.publisher.publish(
            LifecycleEvent::new(events::STEP_SKIPPED, scope.instance_id)
                .with_step(scope.step)
                .with_detail(status.as_str()),
        );
        StepOutcome::Skipped { status }
    }

    fn succeeded(&self, scope: &StepScope, outcome: StepOutcome) -> StepOutcome {
        let status = match &outcome {
            StepOutcome::Succeeded { status, .. } | StepOutcome::Skipped { status } => {
                status.as_str()
            }
            StepOutcome::Failed { .. } => "failed",
        };
        log_step_operation(
            scope.step.as_str(),
            scope.instance_id,
            Some(scope.event_name.as_str()),
            "succeeded",
            Some(status),
        );
        self.publisher.publish(
            LifecycleEvent::new(events::STEP_SUCCEEDED, scope.instance_id)
                .with_step(scope.step)
                .with_detail(status),
        );
        outcome
    }

    /// Guarded transition along a named edge, published on success
    async fn transition(
        &self,
        scope: &StepScope,
        from: ProvisioningStatus,
        to: ProvisioningStatus,
    ) -> std::result::Result<(), FailureCause> {
        let transition = StatusTransition::between(from, to)?;
        self.store
            .transition_status(scope.instance_id, &[from], to)
            .await?;
        info!(
            step = %scope.step,
            instance_id = %scope.instance_id,
            transition = %transition.id(),
            "Status transitioned"
        );
        self.publisher.publish(LifecycleEvent::transitioned(
            scope.instance_id,
            scope.step,
            transition,
        ));
        Ok(())
    }

    /// Error path: move to `error` from `held`, record, publish, then apply the
    /// failure policy. A superseded run is reported as a skip instead.
    async fn fail(
        &self,
        scope: &StepScope,
        held: &[ProvisioningStatus],
        cause: FailureCause,
    ) -> Result<StepOutcome> {
        if let FailureCause::Superseded { status } = cause {
            info!(
                step = %scope.step,
                instance_id = %scope.instance_id,
                status = %status,
                "Record already moved by another run, standing down"
            );
            return Ok(self.skipped(scope, status, false));
        }
        self.move_to_error(scope, held).await;
        self.record_failure(scope, &cause);
        self.surface(scope, cause)
    }

    /// Like [`Self::fail`] but leaves the record's status alone
    fn fail_in_place(&self, scope: &StepScope, cause: FailureCause) -> Result<StepOutcome> {
        self.record_failure(scope, &cause);
        self.surface(scope, cause)
    }

    fn record_failure(&self, scope: &StepScope, cause: &FailureCause) {
        log_error_record(&scope.record(cause.error_code(), cause.severity(), cause.to_string()));
        self.publisher.publish(
            LifecycleEvent::new(events::STEP_FAILED, scope.instance_id)
                .with_step(scope.step)
                .with_detail(cause.error_code()),
        );
    }

    fn surface(&self, scope: &StepScope, cause: FailureCause) -> Result<StepOutcome> {
        match self.config.failure_policy {
            FailurePolicy::Report => Ok(StepOutcome::Failed { cause }),
            FailurePolicy::Propagate => Err(OrchestratorError::StepFailed {
                step: scope.step,
                instance_id: scope.instance_id,
                cause,
            }),
        }
    }

    /// Best-effort move to `error`, only out of a status this run holds
    async fn move_to_error(&self, scope: &StepScope, held: &[ProvisioningStatus]) {
        match self
            .store
            .transition_status(scope.instance_id, held, ProvisioningStatus::Error)
            .await
        {
            Ok(previous) => {
                info!(
                    step = %scope.step,
                    instance_id = %scope.instance_id,
                    from_status = %previous,
                    "Record moved to error"
                );
                self.publisher.publish(LifecycleEvent::transitioned(
                    scope.instance_id,
                    scope.step,
                    StatusTransition::ToError(previous),
                ));
            }
            Err(err) => warn!(
                step = %scope.step,
                instance_id = %scope.instance_id,
                error = %err,
                "Could not move record to error"
            ),
        }
    }

    /// Linked manifest records in link order
    async fn linked_manifests(
        &self,
        entity: &Touchstream,
    ) -> std::result::Result<Vec<MediaTailor>, FailureCause> {
        let mut manifests = Vec::with_capacity(entity.media_tailor.len());
        for manifest_id in &entity.media_tailor {
            manifests.push(self.store.read_manifest(*manifest_id).await?);
        }
        Ok(manifests)
    }

    /// Best-effort callback to the element that created the record
    async fn callback(&self, scope: &StepScope, entity: &Touchstream) {
        if !self.config.callbacks.enabled {
            return;
        }
        let Some(address) = entity.source_element() else {
            debug!(instance_id = %scope.instance_id, "No source element, callback skipped");
            return;
        };

        let delivery = async {
            let address = SourceAddress::parse(address)?;
            let status = self.store.read_status(scope.instance_id).await?;
            let response = ExternalResponse::for_status(entity.source_id(), status);
            self.gateway.notify_source(address, response).await?;
            Ok::<_, FailureCause>(())
        };

        if let Err(err) = delivery.await {
            warn!(
                step = %scope.step,
                instance_id = %scope.instance_id,
                source_element = %address,
                error = %err,
                "Callback to source element failed"
            );
        }
    }
}

impl<E: Into<FailureCause>> From<PollError<E>> for FailureCause {
    fn from(err: PollError<E>) -> Self {
        match err {
            PollError::TimedOut { attempts, elapsed } => FailureCause::TimedOut {
                attempts,
                elapsed_secs: elapsed.as_secs(),
            },
            PollError::Cancelled { attempts } => FailureCause::Cancelled { attempts },
            PollError::Aborted(cause) => cause.into(),
        }
    }
}
