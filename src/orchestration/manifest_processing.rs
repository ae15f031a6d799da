//! # Resolve Manifests
//!
//! Fans manifest generation requests out to the MediaTailor elements of a
//! `ready` record and waits until every linked manifest has a result URL.

use super::{FailureCause, Orchestrator, StepKind, StepOutcome, StepScope};
use crate::config::ManifestTimeoutPolicy;
use crate::error::Result;
use crate::models::{ExternalPayload, Touchstream};
use crate::resilience::Attempt;
use crate::state_machine::{
    GuardDecision, ManifestResolutionGuard, ProvisioningStatus, StateGuard,
};
use crate::store::StoreError;
use futures::future::join_all;
use tracing::{debug, info, instrument};
use uuid::Uuid;

impl Orchestrator {
    /// Request manifests for a `ready` record and move it to `in_progress`
    /// once all of them resolve. Records without manifests move on at once.
    #[instrument(skip(self), fields(step = "resolve_manifests"))]
    pub async fn resolve_manifests(&self, instance_id: Uuid) -> Result<StepOutcome> {
        let step = StepKind::ResolveManifests;
        let unscoped = StepScope::new(step, instance_id);

        let status = match self.begin(step, instance_id, &ManifestResolutionGuard).await {
            Ok(GuardDecision::Proceed(status)) => status,
            Ok(GuardDecision::Skip(status)) => return Ok(self.skipped(&unscoped, status, true)),
            Err(cause) => {
                return self
                    .fail(&unscoped, ManifestResolutionGuard.expected(), cause)
                    .await
            }
        };

        let entity = match self.store.read_entity(instance_id).await {
            Ok(entity) => entity,
            Err(err) => return self.fail(&unscoped, &[status], err.into()).await,
        };
        let scope = StepScope::for_entity(step, &entity);

        match self.run_manifest_resolution(&scope, status, &entity).await {
            Ok(outcome) => Ok(self.succeeded(&scope, outcome)),
            Err(cause @ (FailureCause::TimedOut { .. } | FailureCause::Cancelled { .. }))
                if self.config.manifests.timeout_policy == ManifestTimeoutPolicy::RemainReady =>
            {
                self.fail_in_place(&scope, cause)
            }
            Err(cause) => self.fail(&scope, &[status], cause).await,
        }
    }

    async fn run_manifest_resolution(
        &self,
        scope: &StepScope,
        status: ProvisioningStatus,
        entity: &Touchstream,
    ) -> std::result::Result<StepOutcome, FailureCause> {
        if !entity.has_manifests() {
            info!(instance_id = %scope.instance_id, "No manifests linked");
            self.transition(scope, status, ProvisioningStatus::InProgress)
                .await?;
            return Ok(StepOutcome::succeeded(ProvisioningStatus::InProgress));
        }

        let manifests = self.linked_manifests(entity).await?;
        for batch in self.requests.manifest_batches(&manifests) {
            let count = batch.request.manifest_request.len();
            self.gateway
                .submit(&batch.element, ExternalPayload::MediaTailor(batch.request))
                .await?;
            info!(
                instance_id = %scope.instance_id,
                element = %batch.element,
                manifests = count,
                "Manifest requests submitted"
            );
        }

        self.poller()
            .poll("manifest_resolution", || self.check_manifests_resolved(entity))
            .await?;
        info!(instance_id = %scope.instance_id, event_name = %entity.event_name, "Manifest URLs received");

        self.transition(scope, status, ProvisioningStatus::InProgress)
            .await?;
        Ok(StepOutcome::succeeded(ProvisioningStatus::InProgress))
    }

    /// Count linked manifests with a generated URL; missing records count as unresolved
    async fn check_manifests_resolved(
        &self,
        entity: &Touchstream,
    ) -> std::result::Result<Attempt<()>, FailureCause> {
        let sentinel = &self.config.manifests.result_url_sentinel;
        let mut resolved = 0;

        let reads = join_all(
            entity
                .media_tailor
                .iter()
                .map(|manifest_id| self.store.read_manifest(*manifest_id)),
        )
        .await;

        for read in reads {
            match read {
                Ok(manifest) if manifest.has_result(sentinel) => resolved += 1,
                Ok(_) => {}
                Err(StoreError::NotFound(id)) => {
                    debug!(manifest_id = %id, "Linked manifest record not found");
                }
                Err(err) => return Err(err.into()),
            }
        }

        debug!(
            instance_id = %entity.instance_id,
            resolved = resolved,
            total = entity.media_tailor.len(),
            "Manifest resolution check"
        );

        if resolved == entity.media_tailor.len() {
            Ok(Attempt::Done(()))
        } else {
            Ok(Attempt::Pending)
        }
    }
}
