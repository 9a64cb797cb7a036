//! # radiowatch
//!
//! A monitor and live dashboard for Shoutcast radio streams.
//!
//! Each configured source is checked on a fixed interval by scraping its
//! status page. Every reading is appended to a SQLite log, an email goes out
//! the moment a stream goes offline, and a terminal UI charts the recent
//! listener counts of every source.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  tokio runtime                                                   │
//! │  ┌───────────────┐   append   ┌────────────────┐                 │
//! │  │   monitor     │──────────▶│     store      │                 │
//! │  │ (probe+alert) │            │(ObservationLog)│                 │
//! │  └──────┬────────┘            └───────┬────────┘                 │
//! │         │ WentOffline                 │ recent                   │
//! │         ▼                             ▼                          │
//! │  ┌───────────────┐            ┌────────────────┐                 │
//! │  │    notify     │            │     chart      │                 │
//! │  │ Email | Log   │            │  (ChartFeed)   │                 │
//! │  └───────────────┘            └───────┬────────┘                 │
//! └───────────────────────────────────────┼──────────────────────────┘
//!                                         │ watch channel
//!                              ┌──────────▼──────────┐
//!                              │ source → app → ui   │  main thread
//!                              └─────────────────────┘
//! ```
//!
//! - **[`checker`]**: HTTP fetch of a status page and the [`StatusParser`] that
//!   turns it into a [`StreamStatus`]
//! - **[`store`]**: Append-only SQLite log of [`Observation`]s
//! - **[`monitor`]**: The polling loop and per-source alert state machine
//! - **[`notify`]**: Offline alerts by email, or to the log when SMTP is not
//!   configured
//! - **[`chart`]**: Periodic reads of the log published as [`ChartSnapshot`]s
//! - **[`source`]**, **[`app`]**, **[`ui`]**: The terminal dashboard
//! - **[`shutdown`]**: The token every task watches to stop cleanly
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Dashboard with the default stations
//! radiowatch
//!
//! # Poll every 30 seconds, log to stderr, no UI
//! radiowatch --headless --interval 30s
//!
//! # Dump the recent log of every station
//! radiowatch --export radios.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use radiowatch::{HttpProbe, LogNotifier, Monitor, ObservationLog, Shutdown, Source};
//!
//! # tokio_test::block_on(async {
//! let log = Arc::new(ObservationLog::open("radio_logs.db".as_ref()).await.unwrap());
//! let probe = Arc::new(HttpProbe::builder().build().unwrap());
//! let sources = vec![Source::new("tabajara", "http://stm2.xcast.com.br:7524/index.html?sid=1")];
//!
//! let monitor = Monitor::new(sources, probe, log, Arc::new(LogNotifier));
//! monitor.run(Shutdown::new()).await;
//! # });
//! ```
//!
//! ### Feeding the dashboard
//!
//! ```
//! use radiowatch::{App, ChannelSource, Theme};
//!
//! let (tx, source) = ChannelSource::create("observation log");
//! let app = App::with_theme(Box::new(source), vec!["tabajara".into()], Theme::dark());
//! ```

pub mod app;
pub mod chart;
pub mod checker;
pub mod data;
pub mod duration;
pub mod error;
pub mod events;
pub mod monitor;
pub mod notify;
pub mod settings;
pub mod shutdown;
pub mod source;
pub mod store;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use chart::ChartFeed;
pub use checker::{HttpProbe, Probe, ShoutcastParser, StatusParser};
pub use data::{ChartSnapshot, Observation, Source, SourceSeries, StreamStatus};
pub use error::{CheckError, ConfigError, NotifyError, StoreError};
pub use monitor::{AlertTracker, Monitor, StreamState, Transition};
pub use notify::{Alert, EmailNotifier, LogNotifier, Notifier};
pub use settings::{Settings, SmtpSettings};
pub use shutdown::Shutdown;
pub use source::{ChannelSource, DataSource};
pub use store::ObservationLog;
pub use ui::Theme;
