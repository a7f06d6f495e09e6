//! Per-service health-check history with fetch status.

use std::collections::HashMap;
use std::time::Instant;

use crate::api::{HealthCheckRecord, ServiceId};

/// Number of records requested per history fetch.
///
/// The bound is enforced by the request, not by trimming locally.
pub const HISTORY_LIMIT: usize = 50;

/// History for a single service, plus the outcome of its most recent fetch.
///
/// Records are kept newest-first, exactly as delivered. A failed fetch never
/// clears them; it only marks the entry as stale.
#[derive(Debug, Clone)]
pub struct ServiceHistory {
    records: Vec<HealthCheckRecord>,
    loading: bool,
    error: Option<String>,
    fetched_at: Option<Instant>,
}

impl Default for ServiceHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceHistory {
    /// Create an empty entry that is waiting for its first fetch.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            loading: true,
            error: None,
            fetched_at: None,
        }
    }

    /// Records, newest first.
    pub fn records(&self) -> &[HealthCheckRecord] {
        &self.records
    }

    /// True until the first fetch for this service resolves.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True if the last fetch failed and the records shown are last-known-good.
    pub fn is_stale(&self) -> bool {
        self.error.is_some()
    }

    /// Error message from the last failed fetch, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// When the records were last replaced by a successful fetch.
    pub fn fetched_at(&self) -> Option<Instant> {
        self.fetched_at
    }

    /// Replace the records with a fresh fetch result and clear the error.
    pub fn replace(&mut self, records: Vec<HealthCheckRecord>) {
        self.records = records;
        self.loading = false;
        self.error = None;
        self.fetched_at = Some(Instant::now());
    }

    /// Record a failed fetch, keeping the previous records.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }
}

/// Histories for every service currently in the roster.
///
/// Entries only exist for tracked services: results for a service that is
/// not tracked are rejected rather than creating an entry.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: HashMap<ServiceId, ServiceHistory>,
}

impl HistoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a service. Existing entries are left untouched.
    pub fn track(&mut self, id: ServiceId) {
        self.entries.entry(id).or_default();
    }

    /// Stop tracking a service, discarding its history.
    pub fn remove(&mut self, id: ServiceId) -> Option<ServiceHistory> {
        self.entries.remove(&id)
    }

    /// Get the entry for a service.
    pub fn get(&self, id: ServiceId) -> Option<&ServiceHistory> {
        self.entries.get(&id)
    }

    /// Returns true if the service is tracked.
    pub fn contains(&self, id: ServiceId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of tracked services.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no service is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply a successful fetch. Returns false if the service is not tracked.
    pub fn apply_success(&mut self, id: ServiceId, records: Vec<HealthCheckRecord>) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.replace(records);
                true
            }
            None => false,
        }
    }

    /// Apply a failed fetch. Returns false if the service is not tracked.
    pub fn apply_failure(&mut self, id: ServiceId, message: impl Into<String>) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.mark_failed(message);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CheckStatus;
    use chrono::{TimeZone, Utc};

    fn record(status: CheckStatus, latency: f64, minute: u32) -> HealthCheckRecord {
        HealthCheckRecord {
            status,
            latency,
            status_code: Some(200),
            checked_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, minute, 0).unwrap(),
        }
    }

    #[test]
    fn test_new_entry_is_loading() {
        let mut store = HistoryStore::new();
        store.track(ServiceId(1));

        let entry = store.get(ServiceId(1)).unwrap();
        assert!(entry.is_loading());
        assert!(!entry.is_stale());
        assert!(entry.records().is_empty());
    }

    #[test]
    fn test_failure_keeps_last_known_good() {
        let mut store = HistoryStore::new();
        store.track(ServiceId(1));
        store.apply_success(ServiceId(1), vec![record(CheckStatus::Up, 0.2, 1)]);

        assert!(store.apply_failure(ServiceId(1), "503 Service Unavailable"));

        let entry = store.get(ServiceId(1)).unwrap();
        assert_eq!(entry.records().len(), 1);
        assert!(entry.is_stale());
        assert_eq!(entry.error(), Some("503 Service Unavailable"));
        assert!(!entry.is_loading());
    }

    #[test]
    fn test_success_clears_error_and_replaces() {
        let mut store = HistoryStore::new();
        store.track(ServiceId(1));
        store.apply_success(ServiceId(1), vec![record(CheckStatus::Up, 0.2, 1)]);
        store.apply_failure(ServiceId(1), "timeout");

        let fresh = vec![
            record(CheckStatus::Down, 0.0, 3),
            record(CheckStatus::Up, 0.3, 2),
        ];
        assert!(store.apply_success(ServiceId(1), fresh.clone()));

        let entry = store.get(ServiceId(1)).unwrap();
        assert!(!entry.is_stale());
        assert_eq!(entry.records(), fresh.as_slice());
        assert!(entry.fetched_at().is_some());
    }

    #[test]
    fn test_untracked_results_are_rejected() {
        let mut store = HistoryStore::new();
        assert!(!store.apply_success(ServiceId(5), vec![record(CheckStatus::Up, 0.1, 0)]));
        assert!(!store.apply_failure(ServiceId(5), "boom"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_track_is_idempotent() {
        let mut store = HistoryStore::new();
        store.track(ServiceId(1));
        store.apply_success(ServiceId(1), vec![record(CheckStatus::Up, 0.1, 0)]);
        store.track(ServiceId(1));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(ServiceId(1)).unwrap().records().len(), 1);
    }

    #[test]
    fn test_remove_discards_history() {
        let mut store = HistoryStore::new();
        store.track(ServiceId(1));
        store.apply_success(ServiceId(1), vec![record(CheckStatus::Up, 0.1, 0)]);

        assert!(store.remove(ServiceId(1)).is_some());
        assert!(!store.contains(ServiceId(1)));
        assert!(store.remove(ServiceId(1)).is_none());
    }
}
