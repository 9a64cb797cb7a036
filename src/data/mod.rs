//! Data models shared by the monitor, the log, and the display.
//!
//! ## Submodules
//!
//! - [`observation`]: [`Source`], [`StreamStatus`], and the immutable [`Observation`] record
//! - [`snapshot`]: [`ChartSnapshot`], the rolling per-source window the chart is drawn from
//!
//! ## Data Flow
//!
//! ```text
//! Probe::check() ──▶ StreamStatus
//!                        │
//!                        ▼
//!              Observation::now() ──▶ ObservationLog::append()
//!                                            │
//!                                            ▼
//!                            ObservationLog::recent() ──▶ ChartSnapshot
//! ```

pub mod observation;
pub mod snapshot;

pub use observation::{display_name, now_seconds, Observation, Source, StreamStatus, TIMESTAMP_FORMAT};
pub use snapshot::{ChartSnapshot, SourceSeries};
