#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Touchstream Orchestrator
//!
//! Polling-based provisioning orchestrator for live streaming events.
//!
//! ## Overview
//!
//! Events are provisioned on a Touchstream element, whose manifests are
//! generated by one or more MediaTailor elements. Both elements work
//! asynchronously: a request is written to them and progress is read back
//! from tables they expose. This crate drives a provisioning record through
//! its lifecycle by submitting those requests, polling the tables until the
//! elements converge, and moving the record's status along named transitions.
//!
//! ## Module Organization
//!
//! - [`models`] - Provisioning and manifest records, wire payloads
//! - [`state_machine`] - Statuses, named transitions and step guards
//! - [`store`] - Instance store with guarded atomic status transitions
//! - [`gateway`] - Boundary to the external elements
//! - [`resilience`] - Bounded, cancellable polling
//! - [`orchestration`] - The provision, deactivate and manifest steps
//! - [`events`] - Lifecycle event broadcast
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging and error records
//! - [`error`] - Top-level error type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use touchstream_orchestrator::config::OrchestratorConfig;
//! use touchstream_orchestrator::gateway::InMemoryGateway;
//! use touchstream_orchestrator::store::InMemoryInstanceStore;
//! use touchstream_orchestrator::Orchestrator;
//!
//! # async fn example(instance_id: uuid::Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! let config = OrchestratorConfig::default();
//! let store = Arc::new(InMemoryInstanceStore::new());
//! let gateway = Arc::new(InMemoryGateway::new(config.gateway.clone()));
//!
//! let orchestrator = Orchestrator::new(store, gateway, config);
//! let outcome = orchestrator.resolve_manifests(instance_id).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod resilience;
pub mod state_machine;
pub mod store;
pub mod utils;

pub use config::{ConfigManager, OrchestratorConfig};
pub use error::{OrchestratorError, Result};
pub use orchestration::{FailureCause, FailurePolicy, Orchestrator, StepKind, StepOutcome};
pub use state_machine::{ManifestStatus, ProvisioningStatus};
