use crate::constants::{defaults, events};
use crate::orchestration::outcome::StepKind;
use crate::state_machine::{ProvisioningStatus, StatusTransition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Broadcast publisher for provisioning lifecycle events
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<LifecycleEvent>,
}

/// Event that has been published
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub name: String,
    pub instance_id: Uuid,
    pub step: Option<StepKind>,
    pub from_status: Option<ProvisioningStatus>,
    pub to_status: Option<ProvisioningStatus>,
    /// Transition id or failure description, depending on the event
    pub detail: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl LifecycleEvent {
    pub fn new(name: impl Into<String>, instance_id: Uuid) -> Self {
        Self {
            name: name.into(),
            instance_id,
            step: None,
            from_status: None,
            to_status: None,
            detail: None,
            published_at: Utc::now(),
        }
    }

    pub fn with_step(mut self, step: StepKind) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn transitioned(instance_id: Uuid, step: StepKind, transition: StatusTransition) -> Self {
        Self {
            from_status: Some(transition.from_status()),
            to_status: Some(transition.to_status()),
            ..Self::new(events::STATUS_TRANSITIONED, instance_id)
                .with_step(step)
                .with_detail(transition.id())
        }
    }
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event; events published with no subscribers are dropped
    pub fn publish(&self, event: LifecycleEvent) {
        // send() only fails when nobody is subscribed
        let _ = self.sender.send(event);
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(defaults::EVENT_CHANNEL_CAPACITY)
    }
}
