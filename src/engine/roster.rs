//! Fixed-cadence poller for the service roster.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::{EngineEvent, StopHandle, StopSignal};
use crate::api::StatusApi;

/// Fetches the service list immediately and then every `interval`.
///
/// Like the history pollers, a roster poller never has more than one request
/// in flight and discards a response that arrives after it was stopped.
#[derive(Debug, Clone)]
pub struct RosterPoller {
    api: Arc<dyn StatusApi>,
    interval: Duration,
    events: mpsc::UnboundedSender<EngineEvent>,
}

impl RosterPoller {
    pub fn new(
        api: Arc<dyn StatusApi>,
        interval: Duration,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Self {
        Self {
            api,
            interval,
            events,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the polling task. Dropping the returned handle stops it.
    pub fn start(&self, generation: u64) -> StopHandle {
        let (stop, signal) = StopHandle::new();
        let task = RosterTask {
            api: self.api.clone(),
            interval: self.interval,
            events: self.events.clone(),
            generation,
        };
        tokio::spawn(task.run(signal));
        stop
    }
}

struct RosterTask {
    api: Arc<dyn StatusApi>,
    interval: Duration,
    events: mpsc::UnboundedSender<EngineEvent>,
    generation: u64,
}

impl RosterTask {
    async fn run(self, mut signal: StopSignal) {
        let mut ticker = interval_at(Instant::now(), self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = signal.stopped() => break,
                _ = ticker.tick() => {
                    if !self.fetch(&mut signal).await {
                        break;
                    }
                }
            }
        }

        tracing::debug!(generation = self.generation, "Roster poller stopped");
    }

    async fn fetch(&self, signal: &mut StopSignal) -> bool {
        let result = tokio::select! {
            biased;
            _ = signal.stopped() => return false,
            result = self.api.list_services() => result,
        };

        if signal.is_stopped() {
            return false;
        }

        match &result {
            Ok(services) => tracing::debug!(services = services.len(), "Roster fetched"),
            Err(e) => tracing::warn!(error = %e, source = self.api.description(), "Roster fetch failed"),
        }

        self.events
            .send(EngineEvent::Roster {
                generation: self.generation,
                result,
            })
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{service, FakeApi};

    fn roster_poller(api: &Arc<FakeApi>) -> (RosterPoller, mpsc::UnboundedReceiver<EngineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let api: Arc<dyn StatusApi> = api.clone();
        (RosterPoller::new(api, Duration::from_secs(30), tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_immediately_then_on_interval() {
        let api = Arc::new(FakeApi::with_services(vec![service(1, "Api")]));
        let (poller, mut rx) = roster_poller(&api);
        let start = Instant::now();
        let _handle = poller.start(3);

        tokio::time::sleep(Duration::from_secs(65)).await;

        let offsets: Vec<u64> = api
            .list_calls()
            .iter()
            .map(|at| at.duration_since(start).as_secs())
            .collect();
        assert_eq!(offsets, vec![0, 30, 60]);

        match rx.try_recv() {
            Ok(EngineEvent::Roster { generation, result }) => {
                assert_eq!(generation, 3);
                assert_eq!(result.unwrap().len(), 1);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_reported() {
        let api = Arc::new(FakeApi::default());
        api.fail_list(true);
        let (poller, mut rx) = roster_poller(&api);
        let _handle = poller.start(1);

        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(matches!(
            rx.try_recv(),
            Ok(EngineEvent::Roster { result: Err(_), .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_poller_goes_quiet() {
        let api = Arc::new(FakeApi::default());
        let (poller, mut rx) = roster_poller(&api);
        let handle = poller.start(1);

        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(handle);
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert_eq!(api.list_calls().len(), 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }
}
