//! The polling loop: probe every source, log the result, alert on outages.

mod tracker;

pub use tracker::{AlertTracker, StreamState, Transition};

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::checker::Probe;
use crate::data::{Observation, Source};
use crate::notify::{Alert, Notifier};
use crate::shutdown::Shutdown;
use crate::store::ObservationLog;

/// Default time between ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Owns the alert state and drives one check per source per tick.
pub struct Monitor {
    sources: Vec<Source>,
    probe: Arc<dyn Probe>,
    log: Arc<ObservationLog>,
    notifier: Arc<dyn Notifier>,
    tracker: AlertTracker,
    poll_interval: Duration,
}

impl Monitor {
    pub fn new(
        sources: Vec<Source>,
        probe: Arc<dyn Probe>,
        log: Arc<ObservationLog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            sources,
            probe,
            log,
            notifier,
            tracker: AlertTracker::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn tracker(&self) -> &AlertTracker {
        &self.tracker
    }

    /// Check every source once, in order, and return the new observations.
    pub async fn tick(&mut self) -> Vec<Observation> {
        let mut observations = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let status = self.probe.check(source).await;
            let observation = Observation::now(&source.name, status);
            debug!(
                source = %source.name,
                online = status.online,
                listeners = status.listeners,
                "checked"
            );

            if let Err(e) = self.log.append(&observation).await {
                error!(source = %source.name, "failed to record observation: {}", e);
            }

            let transition = self.tracker.observe(&source.name, status.online);
            if transition.should_alert() {
                warn!(source = %source.name, "stream went offline");
                let alert = Alert {
                    source: source.name.clone(),
                    listeners: status.listeners,
                    at: observation.timestamp,
                };
                self.notifier.notify(&alert).await;
            }
            match transition {
                Transition::WentOnline => {
                    info!(source = %source.name, listeners = status.listeners, "stream back online");
                }
                Transition::FirstOnline => {
                    info!(source = %source.name, listeners = status.listeners, "stream online");
                }
                _ => {}
            }

            observations.push(observation);
        }

        observations
    }

    /// Tick on the poll interval until `shutdown` fires.
    ///
    /// A tick that overruns the interval is followed immediately by the next
    /// one; ticks never overlap.
    pub async fn run(mut self, shutdown: Shutdown) {
        info!(
            sources = self.sources.len(),
            interval_ms = self.poll_interval.as_millis() as u64,
            notifier = self.notifier.name(),
            "Monitor started"
        );

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while shutdown.is_running() {
            tokio::select! {
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = self.tick() => {}
                        _ = shutdown.cancelled() => break,
                    }
                }
                _ = shutdown.cancelled() => break,
            }
        }

        info!("Monitor stopped");
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("sources", &self.sources)
            .field("poll_interval", &self.poll_interval)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}
