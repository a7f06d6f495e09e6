//! In-memory status API for engine tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::time::Instant;

use crate::api::{CheckStatus, HealthCheckRecord, NewService, Service, ServiceId, StatusApi};
use crate::error::ApiError;

pub(crate) fn service(id: u64, name: &str) -> Service {
    Service {
        id: ServiceId(id),
        name: name.to_string(),
        url: format!("https://{}.example.com", name.to_lowercase()),
        created_at: None,
    }
}

/// `checks` are given newest first, as the server returns them.
pub(crate) fn records(checks: &[(CheckStatus, f64)]) -> Vec<HealthCheckRecord> {
    checks
        .iter()
        .enumerate()
        .map(|(i, (status, latency))| HealthCheckRecord {
            status: *status,
            latency: *latency,
            status_code: Some(200),
            checked_at: Utc
                .with_ymd_and_hms(2024, 3, 1, 12, 59 - i as u32 % 60, 0)
                .unwrap(),
        })
        .collect()
}

pub(crate) fn unavailable() -> ApiError {
    ApiError::Status {
        status: 503,
        reason: "Service Unavailable".to_string(),
    }
}

#[derive(Debug, Default)]
struct FakeState {
    services: Vec<Service>,
    histories: HashMap<ServiceId, Vec<HealthCheckRecord>>,
    failing_history: HashSet<ServiceId>,
    list_failing: bool,
    delete_failure: Option<ApiError>,
    create_failure: Option<ApiError>,
    history_delay: Duration,
    history_calls: Vec<(ServiceId, Instant)>,
    list_calls: Vec<Instant>,
    create_calls: usize,
    delete_calls: Vec<ServiceId>,
    in_flight: usize,
    max_in_flight: usize,
    next_id: u64,
}

/// Scriptable [`StatusApi`] that records every call with the (test) clock.
#[derive(Debug, Default)]
pub(crate) struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub(crate) fn with_services(services: Vec<Service>) -> Self {
        let api = Self::default();
        {
            let mut state = api.state.lock().unwrap();
            state.next_id = services.iter().map(|s| s.id.0).max().unwrap_or(0) + 1;
            state.services = services;
        }
        api
    }

    pub(crate) fn set_services(&self, services: Vec<Service>) {
        self.state.lock().unwrap().services = services;
    }

    pub(crate) fn set_history(&self, id: ServiceId, records: Vec<HealthCheckRecord>) {
        self.state.lock().unwrap().histories.insert(id, records);
    }

    pub(crate) fn fail_history(&self, id: ServiceId, failing: bool) {
        let mut state = self.state.lock().unwrap();
        if failing {
            state.failing_history.insert(id);
        } else {
            state.failing_history.remove(&id);
        }
    }

    pub(crate) fn fail_list(&self, failing: bool) {
        self.state.lock().unwrap().list_failing = failing;
    }

    pub(crate) fn fail_delete(&self, error: Option<ApiError>) {
        self.state.lock().unwrap().delete_failure = error;
    }

    pub(crate) fn fail_create(&self, error: Option<ApiError>) {
        self.state.lock().unwrap().create_failure = error;
    }

    pub(crate) fn delay_history(&self, delay: Duration) {
        self.state.lock().unwrap().history_delay = delay;
    }

    pub(crate) fn history_calls(&self, id: ServiceId) -> Vec<Instant> {
        let state = self.state.lock().unwrap();
        state
            .history_calls
            .iter()
            .filter(|(sid, _)| *sid == id)
            .map(|(_, at)| *at)
            .collect()
    }

    pub(crate) fn list_calls(&self) -> Vec<Instant> {
        self.state.lock().unwrap().list_calls.clone()
    }

    pub(crate) fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub(crate) fn delete_calls(&self) -> Vec<ServiceId> {
        self.state.lock().unwrap().delete_calls.clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }
}

#[async_trait]
impl StatusApi for FakeApi {
    async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls.push(Instant::now());
        if state.list_failing {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        Ok(state.services.clone())
    }

    async fn create_service(&self, new: &NewService) -> Result<Service, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        if let Some(err) = state.create_failure.clone() {
            return Err(err);
        }
        let service = Service {
            id: ServiceId(state.next_id),
            name: new.name.clone(),
            url: new.url.clone(),
            created_at: None,
        };
        state.next_id += 1;
        state.services.push(service.clone());
        Ok(service)
    }

    async fn delete_service(&self, id: ServiceId) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls.push(id);
        if let Some(err) = state.delete_failure.clone() {
            return Err(err);
        }
        state.services.retain(|s| s.id != id);
        state.histories.remove(&id);
        Ok(())
    }

    async fn history(
        &self,
        id: ServiceId,
        _limit: usize,
    ) -> Result<Vec<HealthCheckRecord>, ApiError> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.history_calls.push((id, Instant::now()));
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.history_delay
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        state.in_flight -= 1;
        if state.failing_history.contains(&id) {
            return Err(unavailable());
        }
        Ok(state.histories.get(&id).cloned().unwrap_or_default())
    }

    fn description(&self) -> &str {
        "fake"
    }
}
