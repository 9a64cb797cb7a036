//! Chart feed: periodically reads the rolling window of every source from
//! the observation log and publishes it to the display.
//!
//! The feed is the only reader the display has; the TUI itself never waits
//! on the database.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::data::{ChartSnapshot, Source, SourceSeries};
use crate::shutdown::Shutdown;
use crate::source::ChannelSource;
use crate::store::ObservationLog;

/// Default number of observations per source on the chart.
pub const DEFAULT_WINDOW: usize = 20;

/// Reads the log on its own cadence and publishes [`ChartSnapshot`]s.
#[derive(Debug)]
pub struct ChartFeed {
    sources: Vec<Source>,
    log: Arc<ObservationLog>,
    window: usize,
    refresh: Duration,
    sender: watch::Sender<ChartSnapshot>,
}

impl ChartFeed {
    /// Create a feed and the display-side source it publishes to.
    pub fn create(
        sources: Vec<Source>,
        log: Arc<ObservationLog>,
        window: usize,
        refresh: Duration,
    ) -> (Self, ChannelSource) {
        let (sender, source) = ChannelSource::create("observation log");
        let feed = Self {
            sources,
            log,
            window,
            refresh,
            sender,
        };
        (feed, source)
    }

    /// Read the last `window` observations of every source.
    pub async fn snapshot(&self) -> Result<ChartSnapshot, crate::error::StoreError> {
        let mut series = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let observations = self.log.recent(&source.name, self.window).await?;
            series.push(SourceSeries::new(source.name.clone(), observations));
        }
        Ok(ChartSnapshot::new(series))
    }

    /// Publish a fresh snapshot every refresh period until `shutdown` fires
    /// or the display goes away.
    pub async fn run(self, shutdown: Shutdown) {
        info!(window = self.window, "Chart feed started");

        let mut ticker = interval(self.refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while shutdown.is_running() {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.cancelled() => break,
            }

            match self.snapshot().await {
                Ok(snapshot) => {
                    debug!(series = snapshot.series.len(), "publishing chart snapshot");
                    if self.sender.send(snapshot).is_err() {
                        info!("Display closed, stopping chart feed");
                        break;
                    }
                }
                // Keep showing the previous snapshot.
                Err(e) => warn!("failed to read observation log: {}", e),
            }
        }

        info!("Chart feed stopped");
    }
}
