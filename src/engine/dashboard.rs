//! The dashboard state container.
//!
//! [`Dashboard`] owns everything the UI shows: the roster, per-service
//! histories, card interaction state and the global error. Background tasks
//! report through the engine's event channel and only [`Dashboard::apply`]
//! mutates state.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::mpsc;

use super::{
    validate, AdaptivePoller, CardIntent, CardInteraction, ClickRegion, CommandGateway,
    DeletePrompt, EngineConfig, EngineEvent, Expansion, PollHandle, PollPhase, RosterPoller,
    StopHandle,
};
use crate::api::{HealthCheckRecord, NewService, Service, ServiceId, StatusApi};
use crate::data::{AggregateView, HistoryStore, ServiceHistory};
use crate::error::{ApiError, CommandError, ValidationError};

/// Shown while the roster cannot be fetched.
pub const ROSTER_ERROR_MESSAGE: &str = "Cannot reach API, is the status server running?";

/// Which operation raised the global error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Roster,
    Delete,
}

/// The single dashboard-wide error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalError {
    pub category: ErrorCategory,
    pub message: String,
}

/// Everything the UI needs to draw one service card.
#[derive(Debug, Clone)]
pub struct CardView<'a> {
    pub service: &'a Service,
    /// Newest first.
    pub history: &'a [HealthCheckRecord],
    pub aggregate: AggregateView,
    /// No history fetch has resolved yet.
    pub loading: bool,
    /// Message from the last failed history fetch. The records are then
    /// last-known-good.
    pub fetch_error: Option<&'a str>,
    pub interaction: CardInteraction,
    pub deleting: bool,
    pub phase: Option<PollPhase>,
}

impl CardView<'_> {
    pub fn is_stale(&self) -> bool {
        self.fetch_error.is_some()
    }
}

#[derive(Debug)]
pub struct Dashboard {
    api: Arc<dyn StatusApi>,
    config: EngineConfig,
    gateway: CommandGateway,
    poller: AdaptivePoller,
    roster_poller: RosterPoller,
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    events_rx: mpsc::UnboundedReceiver<EngineEvent>,
    roster: Vec<Service>,
    roster_loading: bool,
    roster_handle: Option<(u64, StopHandle)>,
    histories: HistoryStore,
    pollers: HashMap<ServiceId, PollHandle>,
    interactions: HashMap<ServiceId, CardInteraction>,
    deleting: HashSet<ServiceId>,
    adding: bool,
    add_outcome: Option<Result<Service, CommandError>>,
    global_error: Option<GlobalError>,
    next_generation: u64,
}

impl Dashboard {
    /// Create an idle dashboard. Nothing is fetched until [`start`](Self::start).
    pub fn new(api: Arc<dyn StatusApi>, config: EngineConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let poller = AdaptivePoller::new(
            api.clone(),
            config.schedule,
            config.history_limit,
            events_tx.clone(),
        );
        let roster_poller = RosterPoller::new(api.clone(), config.roster_interval, events_tx.clone());

        Self {
            gateway: CommandGateway::new(api.clone()),
            api,
            config,
            poller,
            roster_poller,
            events_tx,
            events_rx,
            roster: Vec::new(),
            roster_loading: true,
            roster_handle: None,
            histories: HistoryStore::new(),
            pollers: HashMap::new(),
            interactions: HashMap::new(),
            deleting: HashSet::new(),
            adding: false,
            add_outcome: None,
            global_error: None,
            next_generation: 0,
        }
    }

    /// Start the roster poller. History pollers follow as services arrive.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.roster_handle.is_some() {
            return;
        }
        let generation = self.bump_generation();
        tracing::info!(
            source = self.api.description(),
            interval_secs = self.roster_poller.interval().as_secs(),
            "Starting roster poller"
        );
        self.roster_handle = Some((generation, self.roster_poller.start(generation)));
    }

    /// Stop every poller. State is kept, but nothing refreshes it any more.
    pub fn stop(&mut self) {
        self.roster_handle = None;
        for (_, handle) in self.pollers.drain() {
            handle.cancel();
        }
        tracing::info!("Dashboard stopped");
    }

    pub fn is_running(&self) -> bool {
        self.roster_handle.is_some()
    }

    /// Apply every event that is ready. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next event and apply it.
    pub async fn next_event(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::History {
                service_id,
                generation,
                result,
            } => self.apply_history(service_id, generation, result),
            EngineEvent::Roster { generation, result } => self.apply_roster(generation, result),
            EngineEvent::Created { result } => self.apply_created(result),
            EngineEvent::Deleted { service_id, result } => self.apply_deleted(service_id, result),
        }
    }

    fn apply_history(
        &mut self,
        id: ServiceId,
        generation: u64,
        result: Result<Vec<HealthCheckRecord>, ApiError>,
    ) {
        match self.pollers.get(&id) {
            Some(handle) if handle.generation() == generation => {}
            _ => {
                tracing::trace!(service_id = %id, generation, "Dropping history from retired poller");
                return;
            }
        }

        match result {
            Ok(records) => {
                self.histories.apply_success(id, records);
            }
            Err(e) => {
                self.histories.apply_failure(id, e.to_string());
            }
        }
    }

    fn apply_roster(&mut self, generation: u64, result: Result<Vec<Service>, ApiError>) {
        if self.roster_handle.as_ref().map(|(g, _)| *g) != Some(generation) {
            return;
        }
        self.roster_loading = false;

        match result {
            Ok(services) => {
                self.reconcile(services);
                self.global_error = None;
            }
            Err(_) => {
                self.set_global_error(ErrorCategory::Roster, ROSTER_ERROR_MESSAGE.to_string());
            }
        }
    }

    fn apply_created(&mut self, result: Result<Service, CommandError>) {
        self.adding = false;
        if let Ok(service) = &result {
            if !self.roster.iter().any(|s| s.id == service.id) {
                self.roster.push(service.clone());
            }
            self.activate(service.id);
        }
        self.add_outcome = Some(result);
    }

    fn apply_deleted(&mut self, id: ServiceId, result: Result<(), ApiError>) {
        self.deleting.remove(&id);
        match result {
            Ok(()) => {
                self.roster.retain(|s| s.id != id);
                self.discard(id);
                if self.global_error_category() == Some(ErrorCategory::Delete) {
                    self.global_error = None;
                }
            }
            Err(e) => {
                self.set_global_error(ErrorCategory::Delete, format!("Delete failed: {}", e));
            }
        }
    }

    /// Replace the roster wholesale, keeping state for services that survive.
    fn reconcile(&mut self, services: Vec<Service>) {
        let incoming: HashSet<ServiceId> = services.iter().map(|s| s.id).collect();
        let removed: Vec<ServiceId> = self
            .pollers
            .keys()
            .chain(self.roster.iter().map(|s| &s.id))
            .filter(|id| !incoming.contains(id))
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        for id in removed {
            self.discard(id);
        }

        self.roster = services;
        let ids: Vec<ServiceId> = self.roster.iter().map(|s| s.id).collect();
        for id in ids {
            self.activate(id);
        }
    }

    fn activate(&mut self, id: ServiceId) {
        if self.pollers.contains_key(&id) {
            return;
        }
        self.histories.track(id);
        self.interactions.entry(id).or_default();
        let generation = self.bump_generation();
        self.pollers.insert(id, self.poller.start(id, generation));
    }

    fn discard(&mut self, id: ServiceId) {
        if let Some(handle) = self.pollers.remove(&id) {
            handle.cancel();
        }
        self.histories.remove(id);
        self.interactions.remove(&id);
        self.deleting.remove(&id);
        tracing::debug!(service_id = %id, "Service discarded");
    }

    fn bump_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn set_global_error(&mut self, category: ErrorCategory, message: String) {
        self.global_error = Some(GlobalError { category, message });
    }

    fn global_error_category(&self) -> Option<ErrorCategory> {
        self.global_error.as_ref().map(|e| e.category)
    }

    // Commands

    /// Validate and submit a new service. Validation failures return
    /// immediately and spawn nothing; the request outcome arrives later
    /// through [`take_add_outcome`](Self::take_add_outcome).
    pub fn add_service(&mut self, name: &str, url: &str) -> Result<(), ValidationError> {
        let NewService { name, url } = validate(name, url)?;
        self.adding = true;

        let gateway = self.gateway.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = gateway.add_service(&name, &url).await;
            let _ = events.send(EngineEvent::Created { result });
        });
        Ok(())
    }

    pub fn is_adding(&self) -> bool {
        self.adding
    }

    /// The result of the last add request, once it has resolved.
    pub fn take_add_outcome(&mut self) -> Option<Result<Service, CommandError>> {
        self.add_outcome.take()
    }

    /// Issue a delete. Returns false if the service is unknown or a delete
    /// for it is already in flight.
    pub fn delete_service(&mut self, id: ServiceId) -> bool {
        if !self.roster.iter().any(|s| s.id == id) || self.deleting.contains(&id) {
            return false;
        }
        if let Some(card) = self.interactions.get_mut(&id) {
            card.cancel_delete();
        }
        self.deleting.insert(id);

        let gateway = self.gateway.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = gateway.delete_service(id).await;
            let _ = events.send(EngineEvent::Deleted {
                service_id: id,
                result,
            });
        });
        true
    }

    pub fn toggle_expand(&mut self, id: ServiceId) -> Option<Expansion> {
        self.interactions.get_mut(&id).map(|card| card.toggle_expand())
    }

    /// Toggle the delete prompt on one card, dismissing it everywhere else.
    pub fn request_delete(&mut self, id: ServiceId) -> Option<DeletePrompt> {
        if !self.interactions.contains_key(&id) {
            return None;
        }
        self.dismiss_prompts(Some(id));
        self.interactions.get_mut(&id).map(|card| card.request_delete())
    }

    pub fn cancel_delete(&mut self, id: ServiceId) -> bool {
        self.interactions
            .get_mut(&id)
            .map(|card| card.cancel_delete())
            .unwrap_or(false)
    }

    /// Confirm a pending delete prompt and issue the delete.
    pub fn confirm_delete(&mut self, id: ServiceId) -> bool {
        let confirmed = self
            .interactions
            .get_mut(&id)
            .map(|card| card.confirm_delete())
            .unwrap_or(false);
        confirmed && self.delete_service(id)
    }

    /// Route a click on a card.
    ///
    /// A click that dismisses another card's pending prompt does nothing
    /// else.
    pub fn click(&mut self, id: ServiceId, region: ClickRegion) -> Option<CardIntent> {
        if self.dismiss_prompts(Some(id)) {
            return None;
        }
        let intent = self.interactions.get_mut(&id)?.click(region);
        if intent == Some(CardIntent::DeleteConfirmed) {
            self.delete_service(id);
        }
        intent
    }

    /// A click that landed on no card. Returns true if it dismissed a prompt.
    pub fn click_outside(&mut self) -> bool {
        self.dismiss_prompts(None)
    }

    fn dismiss_prompts(&mut self, except: Option<ServiceId>) -> bool {
        let mut dismissed = false;
        for (id, card) in self.interactions.iter_mut() {
            if Some(*id) != except && card.outside_click() {
                dismissed = true;
            }
        }
        dismissed
    }

    // Read side

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn source_description(&self) -> &str {
        self.api.description()
    }

    pub fn roster(&self) -> &[Service] {
        &self.roster
    }

    /// True until the first roster fetch resolves.
    pub fn is_roster_loading(&self) -> bool {
        self.roster_loading
    }

    pub fn global_error(&self) -> Option<&GlobalError> {
        self.global_error.as_ref()
    }

    pub fn history(&self, id: ServiceId) -> Option<&ServiceHistory> {
        self.histories.get(id)
    }

    pub fn interaction(&self, id: ServiceId) -> Option<CardInteraction> {
        self.interactions.get(&id).copied()
    }

    /// The card whose delete prompt is open, if any.
    pub fn pending_delete(&self) -> Option<ServiceId> {
        self.roster
            .iter()
            .map(|s| s.id)
            .find(|id| self.interactions.get(id).is_some_and(|c| c.is_delete_pending()))
    }

    pub fn is_deleting(&self, id: ServiceId) -> bool {
        self.deleting.contains(&id)
    }

    pub fn phase(&self, id: ServiceId) -> Option<PollPhase> {
        self.pollers.get(&id).map(|handle| handle.phase())
    }

    pub fn card(&self, id: ServiceId) -> Option<CardView<'_>> {
        let service = self.roster.iter().find(|s| s.id == id)?;
        Some(self.card_for(service))
    }

    /// Cards in roster order.
    pub fn cards(&self) -> Vec<CardView<'_>> {
        self.roster.iter().map(|s| self.card_for(s)).collect()
    }

    fn card_for<'a>(&'a self, service: &'a Service) -> CardView<'a> {
        let history = self.histories.get(service.id);
        let records = history.map(|h| h.records()).unwrap_or(&[]);

        CardView {
            service,
            history: records,
            aggregate: AggregateView::from_history(records),
            loading: history.map(|h| h.is_loading()).unwrap_or(true),
            fetch_error: history.and_then(|h| h.error()),
            interaction: self.interactions.get(&service.id).copied().unwrap_or_default(),
            deleting: self.deleting.contains(&service.id),
            phase: self.phase(service.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::api::CheckStatus;
    use crate::data::Severity;
    use crate::engine::testing::{records, service, FakeApi};

    const API: ServiceId = ServiceId(1);
    const WEB: ServiceId = ServiceId(2);

    fn fake() -> Arc<FakeApi> {
        let api = Arc::new(FakeApi::with_services(vec![service(1, "Api"), service(2, "Web")]));
        api.set_history(
            API,
            records(&[(CheckStatus::Up, 0.2), (CheckStatus::Up, 0.4)]),
        );
        api.set_history(WEB, records(&[(CheckStatus::Down, 0.0)]));
        api
    }

    fn dashboard(api: &Arc<FakeApi>) -> Dashboard {
        let api: Arc<dyn StatusApi> = api.clone();
        Dashboard::new(api, EngineConfig::default())
    }

    /// Let spawned tasks run and apply whatever they produced.
    async fn settle(dashboard: &mut Dashboard) {
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            dashboard.pump();
        }
    }

    async fn advance(dashboard: &mut Dashboard, secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
        settle(dashboard).await;
    }

    async fn started(api: &Arc<FakeApi>) -> Dashboard {
        let mut d = dashboard(api);
        d.start();
        settle(&mut d).await;
        d
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_loads_roster_and_histories() {
        let api = fake();
        let mut d = dashboard(&api);
        assert!(d.is_roster_loading());

        d.start();
        settle(&mut d).await;

        assert!(!d.is_roster_loading());
        assert!(d.global_error().is_none());

        let cards = d.cards();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].service.name, "Api");
        assert_eq!(cards[0].history.len(), 2);
        assert!(!cards[0].loading);
        assert_eq!(cards[0].aggregate.uptime_pct, Some(100.0));
        assert_eq!(cards[0].phase, Some(PollPhase::Fast));
        assert_eq!(cards[1].aggregate.severity, Some(Severity::Critical));
        assert_eq!(cards[1].aggregate.avg_latency, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_roster_failure_ends_loading() {
        let api = fake();
        api.fail_list(true);
        let d = started(&api).await;

        assert!(!d.is_roster_loading());
        assert!(d.roster().is_empty());
        assert_eq!(
            d.global_error(),
            Some(&GlobalError {
                category: ErrorCategory::Roster,
                message: ROSTER_ERROR_MESSAGE.to_string(),
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_roster_failure_keeps_roster_until_next_success() {
        let api = fake();
        let mut d = started(&api).await;

        api.fail_list(true);
        advance(&mut d, 30).await;
        assert_eq!(d.roster().len(), 2);
        assert_eq!(d.history(API).unwrap().records().len(), 2);
        assert_eq!(
            d.global_error().map(|e| e.message.as_str()),
            Some(ROSTER_ERROR_MESSAGE)
        );

        api.fail_list(false);
        advance(&mut d, 30).await;
        assert!(d.global_error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_failure_keeps_last_known_good() {
        let api = fake();
        let mut d = started(&api).await;

        api.fail_history(API, true);
        advance(&mut d, 3).await;
        let card = d.card(API).unwrap();
        assert!(card.is_stale());
        assert_eq!(card.history.len(), 2);
        assert!(d.global_error().is_none());

        api.fail_history(API, false);
        api.set_history(API, records(&[(CheckStatus::Down, 0.0)]));
        advance(&mut d, 3).await;
        let card = d.card(API).unwrap();
        assert!(!card.is_stale());
        assert_eq!(card.history.len(), 1);
        assert_eq!(card.aggregate.uptime_pct, Some(0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_removes_service_and_history_together() {
        let api = fake();
        let mut d = started(&api).await;

        assert_eq!(d.request_delete(API), Some(DeletePrompt::Pending));
        assert!(d.confirm_delete(API));
        assert!(d.is_deleting(API));
        assert_eq!(d.interaction(API).unwrap().prompt(), DeletePrompt::Idle);

        settle(&mut d).await;
        assert!(d.roster().iter().all(|s| s.id != API));
        assert!(d.history(API).is_none());
        assert!(d.phase(API).is_none());
        assert!(!d.is_deleting(API));

        let calls = api.history_calls(API).len();
        advance(&mut d, 60).await;
        assert_eq!(api.history_calls(API).len(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_delete_keeps_service_and_sets_error() {
        let api = fake();
        api.fail_delete(Some(ApiError::Status {
            status: 500,
            reason: "Internal Server Error".to_string(),
        }));
        let mut d = started(&api).await;

        d.request_delete(API);
        d.confirm_delete(API);
        settle(&mut d).await;

        assert!(d.roster().iter().any(|s| s.id == API));
        assert!(d.history(API).is_some());
        assert!(!d.is_deleting(API));
        assert_eq!(d.interaction(API).unwrap().prompt(), DeletePrompt::Idle);
        assert_eq!(
            d.global_error(),
            Some(&GlobalError {
                category: ErrorCategory::Delete,
                message: "Delete failed: 500 Internal Server Error".to_string(),
            })
        );

        api.fail_delete(None);
        d.request_delete(API);
        d.confirm_delete(API);
        settle(&mut d).await;
        assert!(d.global_error().is_none());
        assert!(d.history(API).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_without_prompt_does_nothing() {
        let api = fake();
        let mut d = started(&api).await;

        assert!(!d.confirm_delete(API));
        settle(&mut d).await;
        assert!(api.delete_calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_add_never_reaches_server() {
        let api = fake();
        let mut d = started(&api).await;

        assert_eq!(
            d.add_service("  ", "https://x.io"),
            Err(ValidationError::NameRequired)
        );
        assert_eq!(
            d.add_service("X", "example.com"),
            Err(ValidationError::InvalidUrl)
        );
        settle(&mut d).await;

        assert_eq!(api.create_calls(), 0);
        assert!(!d.is_adding());
        assert!(d.take_add_outcome().is_none());
        assert!(d.global_error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_service_appends_and_starts_polling() {
        let api = fake();
        let mut d = started(&api).await;

        d.add_service(" Billing ", "https://billing.example.com").unwrap();
        assert!(d.is_adding());
        settle(&mut d).await;

        assert!(!d.is_adding());
        let created = d.take_add_outcome().unwrap().unwrap();
        assert_eq!(created.name, "Billing");
        assert_eq!(d.roster().last().map(|s| s.id), Some(created.id));
        assert!(!d.history(created.id).unwrap().is_loading());
        assert_eq!(d.phase(created.id), Some(PollPhase::Fast));
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_service_network_error_stays_with_form() {
        let api = fake();
        api.fail_create(Some(ApiError::Status {
            status: 422,
            reason: "Unprocessable Entity".to_string(),
        }));
        let mut d = started(&api).await;

        d.add_service("Billing", "https://billing.example.com").unwrap();
        settle(&mut d).await;

        let err = d.take_add_outcome().unwrap().unwrap_err();
        assert!(matches!(err, CommandError::Network(ref e) if e.status() == Some(422)));
        assert_eq!(err.to_string(), "422 Unprocessable Entity");
        assert_eq!(api.create_calls(), 1);
        assert!(d.global_error().is_none());
        assert_eq!(d.roster().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_from_retired_pollers_are_dropped() {
        let api = fake();
        api.delay_history(Duration::from_secs(5));
        let mut d = started(&api).await;
        assert!(d.history(API).unwrap().is_loading());

        d.request_delete(API);
        d.confirm_delete(API);
        settle(&mut d).await;
        advance(&mut d, 10).await;
        assert!(d.history(API).is_none());

        d.apply(EngineEvent::History {
            service_id: WEB,
            generation: u64::MAX,
            result: Ok(Vec::new()),
        });
        assert_eq!(d.history(WEB).unwrap().records().len(), 1);

        d.apply(EngineEvent::History {
            service_id: ServiceId(99),
            generation: 1,
            result: Ok(Vec::new()),
        });
        assert!(d.history(ServiceId(99)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconcile_keeps_surviving_state() {
        let api = fake();
        let mut d = started(&api).await;
        d.toggle_expand(API);

        api.set_services(vec![service(1, "Api"), service(3, "Queue")]);
        advance(&mut d, 30).await;

        let ids: Vec<ServiceId> = d.roster().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![API, ServiceId(3)]);
        assert!(d.interaction(API).unwrap().is_expanded());
        assert_eq!(d.history(API).unwrap().records().len(), 2);
        assert!(d.history(WEB).is_none());
        assert!(d.phase(WEB).is_none());
        assert!(d.history(ServiceId(3)).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_on_other_card_only_dismisses_prompt() {
        let api = fake();
        let mut d = started(&api).await;

        d.click(API, ClickRegion::DeleteButton);
        assert!(d.interaction(API).unwrap().is_delete_pending());
        assert_eq!(d.pending_delete(), Some(API));

        assert_eq!(d.click(WEB, ClickRegion::Header), None);
        assert_eq!(d.pending_delete(), None);
        assert!(!d.interaction(API).unwrap().is_delete_pending());
        assert!(!d.interaction(WEB).unwrap().is_expanded());

        d.click(WEB, ClickRegion::Header);
        assert!(d.interaction(WEB).unwrap().is_expanded());

        d.click(API, ClickRegion::DeleteButton);
        assert!(d.click_outside());
        assert!(!d.click_outside());
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggling_expansion_leaves_prompt_alone() {
        let api = fake();
        let mut d = started(&api).await;

        d.request_delete(API);
        assert_eq!(d.toggle_expand(API), Some(Expansion::Expanded));
        assert_eq!(d.toggle_expand(API), Some(Expansion::Collapsed));
        assert_eq!(d.pending_delete(), Some(API));

        d.toggle_expand(WEB);
        assert_eq!(d.pending_delete(), Some(API));
        assert!(d.interaction(WEB).unwrap().is_expanded());
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_click_issues_delete() {
        let api = fake();
        let mut d = started(&api).await;

        d.click(WEB, ClickRegion::DeleteButton);
        assert_eq!(
            d.click(WEB, ClickRegion::ConfirmButton),
            Some(CardIntent::DeleteConfirmed)
        );
        assert!(d.is_deleting(WEB));
        settle(&mut d).await;
        assert_eq!(api.delete_calls(), vec![WEB]);
        assert!(d.card(WEB).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_all_pollers() {
        let api = fake();
        let mut d = started(&api).await;
        d.stop();
        assert!(!d.is_running());

        let roster_calls = api.list_calls().len();
        let history_calls = api.history_calls(API).len();
        advance(&mut d, 120).await;

        assert_eq!(api.list_calls().len(), roster_calls);
        assert_eq!(api.history_calls(API).len(), history_calls);
    }
}
