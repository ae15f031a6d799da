//! # Bounded Poller
//!
//! Repeats an async check at a fixed interval until it reports a result, the
//! time bound passes, or the poller's cancellation token fires. The check is
//! always attempted at least once; the bound is measured from the first
//! attempt and tested after each interval, so the final attempt may start
//! exactly at the bound.

use crate::constants::defaults;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Outcome of a single poll attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// Not converged yet, try again after the interval
    Pending,
    Done(T),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError<E> {
    #[error("Polling timed out after {attempts} attempts ({elapsed:?})")]
    TimedOut { attempts: u32, elapsed: Duration },

    #[error("Polling cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },

    #[error("Polling aborted: {0}")]
    Aborted(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(defaults::POLL_TIMEOUT_SECONDS),
            interval: Duration::from_secs(defaults::POLL_INTERVAL_SECONDS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Poller {
    config: PollConfig,
    cancellation: CancellationToken,
}

impl Poller {
    pub fn new(config: PollConfig, cancellation: CancellationToken) -> Self {
        Self {
            config,
            cancellation,
        }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Run `check` until it returns [`Attempt::Done`].
    ///
    /// An `Err` from `check` stops polling immediately and is returned as
    /// [`PollError::Aborted`].
    pub async fn poll<T, E, F, Fut>(&self, operation: &str, mut check: F) -> Result<T, PollError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Attempt<T>, E>>,
    {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            if self.cancellation.is_cancelled() {
                warn!(operation = %operation, attempts = attempts, "Polling cancelled");
                return Err(PollError::Cancelled { attempts });
            }

            attempts += 1;
            match check().await {
                Ok(Attempt::Done(value)) => {
                    debug!(
                        operation = %operation,
                        attempts = attempts,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Polling converged"
                    );
                    return Ok(value);
                }
                Ok(Attempt::Pending) => {}
                Err(err) => return Err(PollError::Aborted(err)),
            }

            tokio::select! {
                _ = self.cancellation.cancelled() => {
                    warn!(operation = %operation, attempts = attempts, "Polling cancelled");
                    return Err(PollError::Cancelled { attempts });
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }

            let elapsed = started.elapsed();
            if elapsed > self.config.timeout {
                warn!(
                    operation = %operation,
                    attempts = attempts,
                    elapsed_secs = elapsed.as_secs(),
                    "Polling timed out"
                );
                return Err(PollError::TimedOut { attempts, elapsed });
            }
        }
    }
}
