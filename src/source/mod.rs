//! Data source abstraction for the display.
//!
//! The TUI polls a [`DataSource`] for [`ChartSnapshot`]s; it never talks to
//! the observation log directly.

mod channel;

pub use channel::ChannelSource;

use std::fmt::Debug;

use crate::data::ChartSnapshot;

/// Trait for receiving chart data.
///
/// # Example
///
/// ```
/// use radiowatch::{ChannelSource, DataSource};
///
/// let (_tx, mut source) = ChannelSource::create("example");
/// if let Some(snapshot) = source.poll() {
///     println!("Got {} series", snapshot.series.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest snapshot.
    ///
    /// Returns `Some(snapshot)` if new data is available, `None` otherwise.
    /// This method must not block.
    fn poll(&mut self) -> Option<ChartSnapshot>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Returns the error message if the producer has gone away or failed.
    fn error(&self) -> Option<&str>;
}
