//! End-to-end lifecycle of one record through every step.

mod common;

use common::*;
use std::time::Duration;
use touchstream_orchestrator::events::LifecycleEvent;
use touchstream_orchestrator::orchestration::StepKind;
use touchstream_orchestrator::store::InstanceStore;
use touchstream_orchestrator::{ProvisioningStatus, StepOutcome};

fn drain(events: &mut tokio::sync::broadcast::Receiver<LifecycleEvent>) -> Vec<LifecycleEvent> {
    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    received
}

#[tokio::test(start_paused = true)]
async fn test_record_lifecycle_from_ready_to_complete() {
    let fx = Fixture::new();
    let mt = manifest("MT A", "E1", "https://cdn.example/E1.m3u8");
    let entity = TouchstreamBuilder::new()
        .with_status(ProvisioningStatus::Ready)
        .with_ids("A1", "E1", "T1")
        .with_manifests(&[&mt])
        .with_source("1/2/3", "SRC-9")
        .build();
    fx.insert_manifest(mt).await;
    let id = fx.insert(entity).await;
    let mut events = fx.publisher.subscribe();

    let outcome = fx.orchestrator.resolve_manifests(id).await.unwrap();
    assert_eq!(outcome, StepOutcome::succeeded(ProvisioningStatus::InProgress));

    fx.gateway
        .script_provision_results(TS_ELEMENT, id, &[Some("In Progress"), Some("Completed")]);
    let outcome = fx.orchestrator.provision(id).await.unwrap();
    assert_eq!(outcome, StepOutcome::succeeded(ProvisioningStatus::Active));

    // Operator marks the event for teardown
    fx.store
        .transition_status(id, &[ProvisioningStatus::Active], ProvisioningStatus::Deactivate)
        .await
        .unwrap();
    fx.gateway.script_provision_results(TS_ELEMENT, id, &[None]);
    fx.gateway.script_manifest_events("MT A", "E1", &[0]);

    let outcome = fx.orchestrator.deactivate(id).await.unwrap();
    assert_eq!(outcome, StepOutcome::succeeded(ProvisioningStatus::Complete));
    assert_eq!(fx.status(id).await, ProvisioningStatus::Complete);

    let received = drain(&mut events);
    let transitions: Vec<String> = received
        .iter()
        .filter(|e| e.name == "status.transitioned")
        .filter_map(|e| e.detail.clone())
        .collect();
    assert_eq!(
        transitions,
        vec![
            "ready_to_inprogress",
            "inprogress_to_active",
            "deactivate_to_deactivating",
            "deactivating_to_complete",
        ]
    );

    let succeeded: Vec<StepKind> = received
        .iter()
        .filter(|e| e.name == "step.succeeded")
        .filter_map(|e| e.step)
        .collect();
    assert_eq!(
        succeeded,
        vec![
            StepKind::ResolveManifests,
            StepKind::Provision,
            StepKind::Deactivate
        ]
    );
    assert!(received.iter().all(|e| e.instance_id == id));

    let statuses: Vec<String> = fx
        .gateway
        .notifications()
        .into_iter()
        .map(|(_, response)| response.process_response.touchstream.status)
        .collect();
    assert_eq!(statuses, vec!["Active", "Complete"]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_step_publishes_failure_and_error_transition() {
    let fx = Fixture::new();
    let id = fx
        .insert(
            TouchstreamBuilder::new()
                .with_status(ProvisioningStatus::InProgress)
                .build(),
        )
        .await;
    fx.gateway
        .script_provision_results(TS_ELEMENT, id, &[Some("Template Error")]);
    let mut events = fx.publisher.subscribe();

    fx.orchestrator.provision(id).await.unwrap();

    let received = drain(&mut events);
    let names: Vec<&str> = received.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["step.started", "status.transitioned", "step.failed"]
    );
    assert_eq!(received[1].detail.as_deref(), Some("inprogress_to_error"));
    assert_eq!(received[1].to_status, Some(ProvisioningStatus::Error));
    assert_eq!(
        received[2].detail.as_deref(),
        Some("ProvisionTemplateError")
    );
}

#[tokio::test(start_paused = true)]
async fn test_trigger_delivered_twice_in_a_row_runs_once() {
    let fx = Fixture::new();
    let id = fx
        .insert(
            TouchstreamBuilder::new()
                .with_status(ProvisioningStatus::Ready)
                .build(),
        )
        .await;

    let (first, second) = tokio::join!(
        fx.orchestrator.resolve_manifests(id),
        fx.orchestrator.resolve_manifests(id)
    );
    let outcomes = [first.unwrap(), second.unwrap()];

    let succeeded = outcomes
        .iter()
        .filter(|o| matches!(o, StepOutcome::Succeeded { .. }))
        .count();
    assert_eq!(succeeded, 1);
    assert!(outcomes.iter().any(StepOutcome::is_skipped));
    assert_eq!(fx.status(id).await, ProvisioningStatus::InProgress);
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_manifest_runs_leave_the_winner_in_place() {
    let fx = Fixture::new();
    let mt = manifest("MT A", "E1", "_");
    let mt_id = mt.instance_id;
    let entity = TouchstreamBuilder::new()
        .with_status(ProvisioningStatus::Ready)
        .with_manifests(&[&mt])
        .build();
    fx.insert_manifest(mt).await;
    let id = fx.insert(entity).await;

    let store = fx.store.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(4)).await;
        store
            .update_manifest_result_url(mt_id, "https://a.example/E1.m3u8".to_string())
            .await
            .unwrap();
    });

    // Both runs pass the guard and submit before either one transitions
    let (first, second) = tokio::join!(
        fx.orchestrator.resolve_manifests(id),
        fx.orchestrator.resolve_manifests(id)
    );

    assert_eq!(fx.gateway.submissions().len(), 2);
    assert_eq!(
        first.unwrap(),
        StepOutcome::succeeded(ProvisioningStatus::InProgress)
    );
    assert_eq!(
        second.unwrap(),
        StepOutcome::Skipped {
            status: ProvisioningStatus::InProgress
        }
    );
    assert_eq!(fx.status(id).await, ProvisioningStatus::InProgress);
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_reprovision_runs_leave_the_record_ready() {
    let fx = Fixture::new();
    let id = fx
        .insert(
            TouchstreamBuilder::new()
                .with_status(ProvisioningStatus::Reprovision)
                .build(),
        )
        .await;
    fx.gateway.script_provision_results(
        TS_ELEMENT,
        id,
        &[Some("Completed"), Some("Completed"), None],
    );
    let mut events = fx.publisher.subscribe();

    let (first, second) = tokio::join!(
        fx.orchestrator.deactivate(id),
        fx.orchestrator.deactivate(id)
    );

    assert_eq!(first.unwrap(), StepOutcome::succeeded(ProvisioningStatus::Ready));
    assert_eq!(
        second.unwrap(),
        StepOutcome::Skipped {
            status: ProvisioningStatus::Ready
        }
    );
    assert_eq!(fx.status(id).await, ProvisioningStatus::Ready);

    let received = drain(&mut events);
    assert!(received.iter().all(|e| e.name != "step.failed"));
    assert!(received
        .iter()
        .all(|e| e.to_status != Some(ProvisioningStatus::Error)));
}

#[tokio::test(start_paused = true)]
async fn test_provision_against_in_memory_element() {
    use std::sync::Arc;
    use touchstream_orchestrator::config::OrchestratorConfig;
    use touchstream_orchestrator::gateway::InMemoryGateway;
    use touchstream_orchestrator::store::InMemoryInstanceStore;
    use touchstream_orchestrator::Orchestrator;

    let config = OrchestratorConfig::default();
    let store = Arc::new(InMemoryInstanceStore::new());
    let gateway = Arc::new(InMemoryGateway::new(config.gateway.clone()));
    gateway.register_element(TS_ELEMENT);
    let orchestrator = Orchestrator::new(store.clone(), gateway.clone(), config);

    let entity = TouchstreamBuilder::new()
        .with_status(ProvisioningStatus::InProgress)
        .build();
    let id = entity.instance_id;
    store.insert_entity(entity).await.unwrap();

    // The element books the request, then finishes it a few polls later
    let element = gateway.clone();
    tokio::spawn(async move {
        element.upsert_provision_result(TS_ELEMENT, id, "In Progress");
        tokio::time::sleep(Duration::from_secs(5)).await;
        element.upsert_provision_result(TS_ELEMENT, id, "Completed");
    });

    let outcome = orchestrator.provision(id).await.unwrap();

    assert_eq!(outcome, StepOutcome::succeeded(ProvisioningStatus::Active));
    let submissions = gateway.submissions_to(TS_ELEMENT);
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].parameter_id, 20000);
    assert!(submissions[0].json.contains("\"AssetId\""));
}
