//! Adaptive per-service history poller.
//!
//! A freshly started poller fetches immediately, then every `fast_interval`
//! until `fast_window` has elapsed since it started. At that point it switches
//! to the slow phase, fetches once more straight away, and continues every
//! `slow_interval` until cancelled.
//!
//! At most one fetch per poller is in flight. Ticks that come due while a
//! fetch is still running are skipped, not queued. The phase switch is
//! driven by the clock alone: it happens at `fast_window` even mid-fetch,
//! and its fetch is issued as soon as the running one resolves.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};

use super::{EngineEvent, StopHandle, StopSignal};
use crate::api::{HealthCheckRecord, ServiceId, StatusApi};
use crate::error::ApiError;

/// Cadence of an [`AdaptivePoller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub fast_interval: Duration,
    pub fast_window: Duration,
    pub slow_interval: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            fast_interval: Duration::from_secs(3),
            fast_window: Duration::from_secs(20),
            slow_interval: Duration::from_secs(30),
        }
    }
}

/// Which cadence a poller is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Fast,
    Slow,
}

impl PollPhase {
    pub fn label(&self) -> &'static str {
        match self {
            PollPhase::Fast => "fast",
            PollPhase::Slow => "slow",
        }
    }
}

/// Spawns history pollers that report into the engine's event channel.
#[derive(Debug, Clone)]
pub struct AdaptivePoller {
    api: Arc<dyn StatusApi>,
    schedule: PollSchedule,
    history_limit: usize,
    events: mpsc::UnboundedSender<EngineEvent>,
}

impl AdaptivePoller {
    pub fn new(
        api: Arc<dyn StatusApi>,
        schedule: PollSchedule,
        history_limit: usize,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Self {
        Self {
            api,
            schedule,
            history_limit,
            events,
        }
    }

    pub fn schedule(&self) -> PollSchedule {
        self.schedule
    }

    /// Start polling `service_id`. Every event the poller emits carries
    /// `generation`, so results from a replaced poller can be told apart.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, service_id: ServiceId, generation: u64) -> PollHandle {
        let (stop, signal) = StopHandle::new();
        let (phase_tx, phase_rx) = watch::channel(PollPhase::Fast);
        let started = Instant::now();

        let task = PollTask {
            api: self.api.clone(),
            schedule: self.schedule,
            history_limit: self.history_limit,
            events: self.events.clone(),
            service_id,
            generation,
        };
        tokio::spawn(task.run(started, signal, phase_tx));

        PollHandle {
            stop,
            phase: phase_rx,
            generation,
            started,
        }
    }
}

/// Owner handle for a running poller. Dropping it cancels the poller.
#[derive(Debug)]
pub struct PollHandle {
    stop: StopHandle,
    phase: watch::Receiver<PollPhase>,
    generation: u64,
    started: Instant,
}

impl PollHandle {
    /// Stop the poller. Idempotent; a fetch already in flight is discarded.
    pub fn cancel(&self) {
        self.stop.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.stop.is_cancelled()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> PollPhase {
        *self.phase.borrow()
    }

    /// Time since the poller started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

struct PollTask {
    api: Arc<dyn StatusApi>,
    schedule: PollSchedule,
    history_limit: usize,
    events: mpsc::UnboundedSender<EngineEvent>,
    service_id: ServiceId,
    generation: u64,
}

type HistoryFetch = Pin<Box<dyn Future<Output = Result<Vec<HealthCheckRecord>, ApiError>> + Send>>;

impl PollTask {
    async fn run(
        self,
        started: Instant,
        mut signal: StopSignal,
        phase_tx: watch::Sender<PollPhase>,
    ) {
        let PollSchedule {
            fast_interval,
            fast_window,
            slow_interval,
        } = self.schedule;

        tracing::debug!(
            service_id = %self.service_id,
            generation = self.generation,
            "Poller started"
        );

        // Both cadences are anchored to the start time, never to when a
        // fetch happened to finish.
        let mut fast_ticker = interval_at(started + fast_interval, fast_interval);
        fast_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut slow_ticker = interval_at(started + fast_window + slow_interval, slow_interval);
        slow_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let switch = sleep_until(started + fast_window);
        tokio::pin!(switch);

        let mut phase = PollPhase::Fast;
        let mut in_flight: Option<HistoryFetch> = None;
        let mut due = true;

        loop {
            if due && in_flight.is_none() {
                in_flight = Some(self.request());
                due = false;
            }

            tokio::select! {
                biased;
                _ = signal.stopped() => return,
                _ = &mut switch, if phase == PollPhase::Fast => {
                    phase = PollPhase::Slow;
                    phase_tx.send_replace(phase);
                    tracing::info!(
                        service_id = %self.service_id,
                        interval_secs = slow_interval.as_secs(),
                        "Poller switched to slow cadence"
                    );
                    // Owed even when a fetch is running; it goes out once
                    // that one resolves.
                    due = true;
                }
                Some(result) = resolve(&mut in_flight), if in_flight.is_some() => {
                    in_flight = None;
                    if !self.emit(&signal, result) {
                        return;
                    }
                }
                _ = fast_ticker.tick(), if phase == PollPhase::Fast => {
                    due |= in_flight.is_none();
                }
                _ = slow_ticker.tick(), if phase == PollPhase::Slow => {
                    due |= in_flight.is_none();
                }
            }
        }
    }

    fn request(&self) -> HistoryFetch {
        let api = self.api.clone();
        let (id, limit) = (self.service_id, self.history_limit);
        Box::pin(async move { api.history(id, limit).await })
    }

    /// Emit a fetch result. Returns false once the poller should exit,
    /// either because it was stopped or nobody is listening.
    fn emit(
        &self,
        signal: &StopSignal,
        result: Result<Vec<HealthCheckRecord>, ApiError>,
    ) -> bool {
        if signal.is_stopped() {
            return false;
        }

        match &result {
            Ok(records) => tracing::debug!(
                service_id = %self.service_id,
                records = records.len(),
                "History fetched"
            ),
            Err(e) => tracing::warn!(
                service_id = %self.service_id,
                error = %e,
                "History fetch failed"
            ),
        }

        self.events
            .send(EngineEvent::History {
                service_id: self.service_id,
                generation: self.generation,
                result,
            })
            .is_ok()
    }
}

async fn resolve(
    fetch: &mut Option<HistoryFetch>,
) -> Option<Result<Vec<HealthCheckRecord>, ApiError>> {
    match fetch {
        Some(fetch) => Some(fetch.await),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CheckStatus;
    use crate::engine::testing::{records, FakeApi};

    const ID: ServiceId = ServiceId(1);

    fn poller(api: &Arc<FakeApi>) -> (AdaptivePoller, mpsc::UnboundedReceiver<EngineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let api: Arc<dyn StatusApi> = api.clone();
        (AdaptivePoller::new(api, PollSchedule::default(), 50, tx), rx)
    }

    fn offsets(api: &FakeApi, start: Instant) -> Vec<u64> {
        api.history_calls(ID)
            .iter()
            .map(|at| at.duration_since(start).as_secs())
            .collect()
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<EngineEvent>) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_then_slow_schedule() {
        let api = Arc::new(FakeApi::default());
        let (poller, mut rx) = poller(&api);
        let start = Instant::now();
        let handle = poller.start(ID, 7);

        tokio::time::sleep(Duration::from_secs(85)).await;

        assert_eq!(
            offsets(&api, start),
            vec![0, 3, 6, 9, 12, 15, 18, 20, 50, 80]
        );
        assert_eq!(handle.phase(), PollPhase::Slow);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 10);
        assert!(events.iter().all(|e| matches!(
            e,
            EngineEvent::History { service_id: ID, generation: 7, result: Ok(_) }
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_switches_after_fast_window() {
        let api = Arc::new(FakeApi::default());
        let (poller, _rx) = poller(&api);
        let handle = poller.start(ID, 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(handle.phase(), PollPhase::Fast);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(handle.phase(), PollPhase::Slow);
        assert!(handle.elapsed() >= Duration::from_secs(21));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_further_fetches() {
        let api = Arc::new(FakeApi::default());
        let (poller, mut rx) = poller(&api);
        let start = Instant::now();
        let handle = poller.start(ID, 1);

        tokio::time::sleep(Duration::from_secs(25)).await;
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());

        tokio::time::sleep(Duration::from_secs(200)).await;
        assert_eq!(offsets(&api, start), vec![0, 3, 6, 9, 12, 15, 18, 20]);
        assert_eq!(drain(&mut rx).len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels() {
        let api = Arc::new(FakeApi::default());
        let (poller, _rx) = poller(&api);
        let start = Instant::now();
        let handle = poller.start(ID, 1);

        tokio::time::sleep(Duration::from_secs(4)).await;
        drop(handle);
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(offsets(&api, start), vec![0, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_result_discarded_after_cancel() {
        let api = Arc::new(FakeApi::default());
        api.set_history(ID, records(&[(CheckStatus::Up, 0.1)]));
        api.delay_history(Duration::from_secs(5));
        let (poller, mut rx) = poller(&api);
        let handle = poller.start(ID, 1);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(api.history_calls(ID).len(), 1);
        handle.cancel();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(drain(&mut rx).is_empty());
        assert_eq!(api.history_calls(ID).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_reported_and_polling_continues() {
        let api = Arc::new(FakeApi::default());
        api.fail_history(ID, true);
        let (poller, mut rx) = poller(&api);
        let _handle = poller.start(ID, 1);

        tokio::time::sleep(Duration::from_secs(7)).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| matches!(
            e,
            EngineEvent::History { result: Err(_), .. }
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_switch_is_on_time_while_fetch_in_flight() {
        let api = Arc::new(FakeApi::default());
        api.delay_history(Duration::from_secs(7));
        let (poller, mut rx) = poller(&api);
        let start = Instant::now();
        let handle = poller.start(ID, 1);

        // Fetches run 0-7, 9-16 and 18-25; ticks at 3, 6, 12 and 15 land
        // mid-fetch and are skipped.
        tokio::time::sleep(Duration::from_millis(20_500)).await;
        assert_eq!(handle.phase(), PollPhase::Slow);
        assert_eq!(offsets(&api, start), vec![0, 9, 18]);

        // The switch fetch waits for the one in flight, and the slow cadence
        // stays anchored to the fast window.
        tokio::time::sleep(Duration::from_secs(67)).await;
        assert_eq!(offsets(&api, start), vec![0, 9, 18, 25, 50, 80]);
        assert_eq!(api.max_in_flight(), 1);
        assert_eq!(drain(&mut rx).len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetches_never_overlap() {
        let api = Arc::new(FakeApi::default());
        api.delay_history(Duration::from_secs(10));
        let (poller, _rx) = poller(&api);
        let _handle = poller.start(ID, 1);

        tokio::time::sleep(Duration::from_secs(120)).await;

        assert!(api.history_calls(ID).len() > 3);
        assert_eq!(api.max_in_flight(), 1);
    }
}
