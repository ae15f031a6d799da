//! # Resilience Module
//!
//! Bounded, cancellable polling used by every orchestrator step to wait for an
//! external element to converge.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use touchstream_orchestrator::resilience::{Attempt, PollConfig, Poller};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let poller = Poller::new(PollConfig::default(), CancellationToken::new());
//!
//! let result = poller
//!     .poll("wait_for_row", || async {
//!         // Read the element's table here
//!         Ok::<_, std::io::Error>(Attempt::Done(42))
//!     })
//!     .await;
//! # let _ = result;
//! # }
//! ```

pub mod poller;

pub use poller::{Attempt, PollConfig, PollError, Poller};
