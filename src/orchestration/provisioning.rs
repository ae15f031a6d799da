//! # Provision
//!
//! Submits the Touchstream provisioning request for an in-progress record and
//! polls the element's provisioning-result table until the request settles.

use super::{FailureCause, Orchestrator, StepKind, StepOutcome, StepScope};
use crate::error::Result;
use crate::gateway::ProvisionResult;
use crate::logging::log_error_record;
use crate::models::{ExternalPayload, Touchstream};
use crate::resilience::Attempt;
use crate::state_machine::{GuardDecision, ProvisionGuard, ProvisioningStatus, StateGuard};
use tracing::{debug, info, instrument};
use uuid::Uuid;

impl Orchestrator {
    /// Provision the event of an `in_progress` record.
    ///
    /// Resolves to `active` or `active_with_errors` once the element reports
    /// completion. Any other status skips the step.
    #[instrument(skip(self), fields(step = "provision"))]
    pub async fn provision(&self, instance_id: Uuid) -> Result<StepOutcome> {
        let step = StepKind::Provision;
        let unscoped = StepScope::new(step, instance_id);

        let status = match self.begin(step, instance_id, &ProvisionGuard).await {
            Ok(GuardDecision::Proceed(status)) => status,
            Ok(GuardDecision::Skip(status)) => return Ok(self.skipped(&unscoped, status, true)),
            Err(cause) => {
                return self
                    .fail(&unscoped, ProvisionGuard.expected(), cause)
                    .await
            }
        };

        let entity = match self.store.read_entity(instance_id).await {
            Ok(entity) => entity,
            Err(err) => return self.fail(&unscoped, &[status], err.into()).await,
        };
        let scope = StepScope::for_entity(step, &entity);

        match self.run_provision(&scope, status, &entity).await {
            Ok(outcome) => {
                self.callback(&scope, &entity).await;
                Ok(self.succeeded(&scope, outcome))
            }
            Err(cause) => self.fail(&scope, &[status], cause).await,
        }
    }

    async fn run_provision(
        &self,
        scope: &StepScope,
        status: ProvisioningStatus,
        entity: &Touchstream,
    ) -> std::result::Result<StepOutcome, FailureCause> {
        let manifests = self.linked_manifests(entity).await?;
        let request = self.requests.provision_request(entity, &manifests)?;

        self.gateway
            .submit(&entity.element, ExternalPayload::Touchstream(request))
            .await?;
        info!(
            instance_id = %scope.instance_id,
            element = %entity.element,
            manifests = manifests.len(),
            "Provision request submitted"
        );

        let provisioned = self
            .poller()
            .poll("provision_result", || self.check_provisioned(entity))
            .await?;

        self.transition(scope, status, provisioned).await?;

        let warning = (provisioned == ProvisioningStatus::ActiveWithErrors)
            .then_some(FailureCause::CompletedWithErrors);
        if let Some(cause) = &warning {
            log_error_record(&scope.record(
                cause.error_code(),
                cause.severity(),
                format!("Event {} provisioned with errors", entity.event_name),
            ));
        } else {
            info!(instance_id = %scope.instance_id, event_name = %entity.event_name, "Event provisioned");
        }

        Ok(StepOutcome::Succeeded {
            status: provisioned,
            warning,
        })
    }

    /// One look at the provisioning-result table; the first row booked under the record decides
    async fn check_provisioned(
        &self,
        entity: &Touchstream,
    ) -> std::result::Result<Attempt<ProvisioningStatus>, FailureCause> {
        let rows = self
            .gateway
            .query_provision_results(&entity.element, entity.instance_id)
            .await?;

        let Some(row) = rows.first() else {
            debug!(instance_id = %entity.instance_id, "No provisioning row yet");
            return Ok(Attempt::Pending);
        };

        match row.classify() {
            ProvisionResult::InProgress | ProvisionResult::NotProvisioned => Ok(Attempt::Pending),
            ProvisionResult::Completed => Ok(Attempt::Done(ProvisioningStatus::Active)),
            ProvisionResult::CompletedWithErrors => {
                Ok(Attempt::Done(ProvisioningStatus::ActiveWithErrors))
            }
            ProvisionResult::Failed(result) => Err(FailureCause::TemplateError { result }),
        }
    }
}
