//! Channel-based data source.
//!
//! Receives chart snapshots via a tokio watch channel fed by
//! [`ChartFeed`](crate::chart::ChartFeed).

use tokio::sync::watch;

use super::DataSource;
use crate::data::ChartSnapshot;

/// A data source that receives chart snapshots via a channel.
///
/// # Example
///
/// ```
/// use radiowatch::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("observation log");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<ChartSnapshot>,
    description: String,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
    closed: Option<String>,
}

impl ChannelSource {
    /// Create a new channel source over an existing receiver.
    pub fn new(receiver: watch::Receiver<ChartSnapshot>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            initial_returned: false,
            closed: None,
        }
    }

    /// Create a channel pair.
    ///
    /// Returns (sender, source): the producer publishes through the sender
    /// and the TUI polls the source.
    pub fn create(source_description: &str) -> (watch::Sender<ChartSnapshot>, Self) {
        let (tx, rx) = watch::channel(ChartSnapshot::default());
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<ChartSnapshot> {
        // Return the initial value on first poll
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        match self.receiver.has_changed() {
            Ok(true) => Some(self.receiver.borrow_and_update().clone()),
            Ok(false) => None,
            Err(_) => {
                self.closed.get_or_insert_with(|| "Chart feed stopped".to_string());
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.closed.as_deref()
    }
}
