//! Client-side health data and the metrics derived from it.
//!
//! ## Submodules
//!
//! - [`history`]: Per-service history records and fetch status ([`HistoryStore`])
//! - [`aggregate`]: Uptime, latency and severity derived from a history snapshot
//! - [`format`]: Display formatting for latencies, percentages and timestamps
//!
//! ## Data Flow
//!
//! ```text
//! history fetch (newest first)
//!        │
//!        ▼
//! HistoryStore::apply_success()
//!        │
//!        ▼
//! AggregateView::from_history()  (on every render)
//! ```

pub mod aggregate;
pub mod format;
pub mod history;

pub use aggregate::{AggregateView, Severity};
pub use history::{HistoryStore, ServiceHistory, HISTORY_LIMIT};
