//! # Deactivate
//!
//! Tears down a provisioned event. The Touchstream element is sent a
//! deactivation request and, when the record links manifests, the first
//! linked manifest's MediaTailor element is told to delete the event's
//! manifests. The step waits until both elements have dropped their rows.

use super::{FailureCause, Orchestrator, StepKind, StepOutcome, StepScope};
use crate::error::Result;
use crate::models::{ExternalPayload, ExternalRequest, Touchstream};
use crate::resilience::Attempt;
use crate::state_machine::{DeactivationGuard, GuardDecision, ProvisioningStatus, StateGuard};
use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

impl Orchestrator {
    /// Deactivate a record marked `deactivate` or `reprovision`.
    ///
    /// A `deactivate` record passes through `deactivating` and ends
    /// `complete`; a `reprovision` record returns to `ready`.
    #[instrument(skip(self), fields(step = "deactivate"))]
    pub async fn deactivate(&self, instance_id: Uuid) -> Result<StepOutcome> {
        let step = StepKind::Deactivate;
        let unscoped = StepScope::new(step, instance_id);

        let status = match self.begin(step, instance_id, &DeactivationGuard).await {
            Ok(GuardDecision::Proceed(status)) => status,
            Ok(GuardDecision::Skip(status)) => return Ok(self.skipped(&unscoped, status, false)),
            Err(cause) => {
                return self
                    .fail(&unscoped, DeactivationGuard.expected(), cause)
                    .await
            }
        };

        let entity = match self.store.read_entity(instance_id).await {
            Ok(entity) => entity,
            Err(err) => return self.fail(&unscoped, &[status], err.into()).await,
        };
        let scope = StepScope::for_entity(step, &entity);

        // From here on the run holds `deactivating` rather than `deactivate`
        let held = if status == ProvisioningStatus::Deactivate {
            let next = ProvisioningStatus::Deactivating;
            if let Err(cause) = self.transition(&scope, status, next).await {
                return self.fail(&scope, &[status], cause).await;
            }
            next
        } else {
            status
        };

        match self.run_deactivation(&scope, held, &entity).await {
            Ok(outcome) => {
                self.callback(&scope, &entity).await;
                Ok(self.succeeded(&scope, outcome))
            }
            Err(cause) => self.fail(&scope, &[held], cause).await,
        }
    }

    async fn run_deactivation(
        &self,
        scope: &StepScope,
        held: ProvisioningStatus,
        entity: &Touchstream,
    ) -> std::result::Result<StepOutcome, FailureCause> {
        let request = self.requests.deactivation_request(entity, Utc::now());
        self.gateway
            .submit(&entity.element, ExternalPayload::Touchstream(request))
            .await?;

        let manifest_element = self.send_manifest_delete(entity).await?;
        info!(
            instance_id = %scope.instance_id,
            element = %entity.element,
            manifest_element = ?manifest_element,
            "Deactivation requests submitted"
        );

        self.poller()
            .poll("deactivation", || {
                self.check_deactivated(entity, manifest_element.as_deref())
            })
            .await?;
        info!(instance_id = %scope.instance_id, event_name = %entity.event_name, "Event deactivated");

        let next = match held {
            ProvisioningStatus::Deactivating => ProvisioningStatus::Complete,
            ProvisioningStatus::Reprovision => ProvisioningStatus::Ready,
            other => return Err(FailureCause::UnknownStatus { status: other }),
        };
        self.transition(scope, held, next).await?;

        Ok(StepOutcome::succeeded(next))
    }

    /// Ask the first linked manifest's element to drop the event's manifests.
    ///
    /// Returns the element addressed, if any.
    async fn send_manifest_delete(
        &self,
        entity: &Touchstream,
    ) -> std::result::Result<Option<String>, FailureCause> {
        let Some(first) = entity.media_tailor.first() else {
            return Ok(None);
        };

        let manifest = self.store.read_manifest(*first).await?;
        self.gateway
            .submit(
                &manifest.element,
                ExternalPayload::MediaTailor(ExternalRequest::manifest_delete(&entity.event_id)),
            )
            .await?;
        Ok(Some(manifest.element))
    }

    /// Both halves must hold: no provisioning row for the record, and no
    /// manifest events left on the addressed MediaTailor element
    async fn check_deactivated(
        &self,
        entity: &Touchstream,
        manifest_element: Option<&str>,
    ) -> std::result::Result<Attempt<()>, FailureCause> {
        let provision_rows = self
            .gateway
            .query_provision_results(&entity.element, entity.instance_id)
            .await?;

        let manifest_rows = match manifest_element {
            Some(element) => self
                .gateway
                .query_manifest_events(element, &entity.event_id)
                .await?
                .len(),
            None => 0,
        };

        debug!(
            instance_id = %entity.instance_id,
            provision_rows = provision_rows.len(),
            manifest_rows = manifest_rows,
            "Deactivation check"
        );

        if provision_rows.is_empty() && manifest_rows == 0 {
            Ok(Attempt::Done(()))
        } else {
            Ok(Attempt::Pending)
        }
    }
}
