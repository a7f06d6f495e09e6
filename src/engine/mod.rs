//! Polling and command engine.
//!
//! Pollers and commands run as tokio tasks. None of them touch dashboard
//! state directly: every result is sent back as an [`EngineEvent`] and applied
//! by the [`Dashboard`] that owns the state, one event at a time.
//!
//! ```text
//!  RosterPoller ──┐
//!  AdaptivePoller ┼──▶ mpsc<EngineEvent> ──▶ Dashboard::pump() ──▶ CardView
//!  CommandGateway ┘                              ▲
//!                                                │
//!                         commands (add, delete, toggle, click)
//! ```
//!
//! ## Submodules
//!
//! - [`poller`]: Per-service adaptive history poller (fast then slow cadence)
//! - [`roster`]: Fixed-cadence poller for the service list
//! - [`gateway`]: Validated add/delete commands against the status API
//! - [`interaction`]: Per-card expand and delete-confirmation state machines
//! - [`dashboard`]: The state container and its presentation boundary

pub mod dashboard;
pub mod gateway;
pub mod interaction;
pub mod poller;
pub mod roster;

#[cfg(test)]
pub(crate) mod testing;

pub use dashboard::{CardView, Dashboard, ErrorCategory, GlobalError, ROSTER_ERROR_MESSAGE};
pub use gateway::{is_http_url, validate, CommandGateway};
pub use interaction::{CardIntent, CardInteraction, ClickRegion, DeletePrompt, Expansion};
pub use poller::{AdaptivePoller, PollHandle, PollPhase, PollSchedule};
pub use roster::RosterPoller;

use std::time::Duration;

use tokio::sync::watch;

use crate::api::{HealthCheckRecord, Service, ServiceId};
use crate::data::HISTORY_LIMIT;
use crate::error::{ApiError, CommandError};

/// A result produced by a background task, waiting to be applied.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A history fetch resolved for the poller with this generation.
    History {
        service_id: ServiceId,
        generation: u64,
        result: Result<Vec<HealthCheckRecord>, ApiError>,
    },
    /// A roster fetch resolved for the roster poller with this generation.
    Roster {
        generation: u64,
        result: Result<Vec<Service>, ApiError>,
    },
    /// An add-service request resolved.
    Created { result: Result<Service, CommandError> },
    /// A delete request resolved.
    Deleted {
        service_id: ServiceId,
        result: Result<(), ApiError>,
    },
}

/// Timing and sizing knobs for the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Cadence of the per-service history pollers.
    pub schedule: PollSchedule,
    /// Cadence of the roster poller.
    pub roster_interval: Duration,
    /// Records requested per history fetch.
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schedule: PollSchedule::default(),
            roster_interval: Duration::from_secs(30),
            history_limit: HISTORY_LIMIT,
        }
    }
}

/// Owner side of a poller's stop signal.
///
/// Cancelling is idempotent. Dropping the handle cancels the poller.
#[derive(Debug)]
pub struct StopHandle {
    stop_tx: watch::Sender<bool>,
}

impl StopHandle {
    pub(crate) fn new() -> (Self, StopSignal) {
        let (stop_tx, stop_rx) = watch::channel(false);
        (Self { stop_tx }, StopSignal { stop_rx })
    }

    /// Stop the poller. No fetch is issued or emitted after this returns.
    pub fn cancel(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.stop_tx.borrow()
    }
}

impl Drop for StopHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Task side of a poller's stop signal.
#[derive(Debug)]
pub(crate) struct StopSignal {
    stop_rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Checked immediately before every emission.
    pub(crate) fn is_stopped(&self) -> bool {
        *self.stop_rx.borrow() || self.stop_rx.has_changed().is_err()
    }

    /// Resolves once the poller has been stopped or its handle dropped.
    pub(crate) async fn stopped(&mut self) {
        loop {
            if *self.stop_rx.borrow_and_update() {
                return;
            }
            if self.stop_rx.changed().await.is_err() {
                return;
            }
        }
    }
}
