//! # Structured Logging Module
//!
//! Environment-aware structured logging for orchestrator steps, plus the
//! structured error records emitted whenever a step fails or degrades.

use crate::constants::ENVIRONMENT_VAR;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use tracing_subscriber::{fmt as subscriber_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// `RUST_LOG` takes precedence over the environment's default level.
/// Production output is JSON; everything else is human-readable.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);
        let filter = || {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
        };

        let layer = if environment == "production" {
            subscriber_fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .json()
                .with_filter(filter())
                .boxed()
        } else {
            subscriber_fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .with_filter(filter())
                .boxed()
        };

        // An embedding host may already have installed a subscriber
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %environment,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var(ENVIRONMENT_VAR)
        .unwrap_or_else(|_| "development".to_string())
        .to_lowercase()
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Major,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// Structured record of a failed or degraded orchestrator step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub code: String,
    pub severity: Severity,
    /// Operation that detected the problem
    pub source: String,
    pub description: String,
    /// Element or record the problem concerns
    pub affected_item: String,
    /// Event the problem concerns
    pub affected_service: String,
    pub instance_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(
        code: impl Into<String>,
        severity: Severity,
        source: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            source: source.into(),
            description: description.into(),
            affected_item: String::new(),
            affected_service: String::new(),
            instance_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn affecting(mut self, item: impl Into<String>, service: impl Into<String>) -> Self {
        self.affected_item = item.into();
        self.affected_service = service.into();
        self
    }

    pub fn for_instance(mut self, instance_id: Uuid) -> Self {
        self.instance_id = Some(instance_id);
        self
    }
}

/// Emit an error record at the level its severity calls for
pub fn log_error_record(record: &ErrorRecord) {
    match record.severity {
        Severity::Major => tracing::error!(
            code = %record.code,
            severity = %record.severity,
            source = %record.source,
            affected_item = %record.affected_item,
            affected_service = %record.affected_service,
            instance_id = ?record.instance_id,
            timestamp = %record.timestamp.to_rfc3339(),
            "❌ {}",
            record.description
        ),
        Severity::Warning => tracing::warn!(
            code = %record.code,
            severity = %record.severity,
            source = %record.source,
            affected_item = %record.affected_item,
            affected_service = %record.affected_service,
            instance_id = ?record.instance_id,
            timestamp = %record.timestamp.to_rfc3339(),
            "⚠️ {}",
            record.description
        ),
    }
}

/// Log structured data for step operations
pub fn log_step_operation(
    operation: &str,
    instance_id: Uuid,
    event_name: Option<&str>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        instance_id = %instance_id,
        event_name = event_name,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🔧 STEP_OPERATION"
    );
}
