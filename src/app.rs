//! Application state and navigation logic.

use anyhow::Result;

use crate::data::{ChartSnapshot, Observation};
use crate::source::DataSource;
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Rolling listener chart, one line per source.
    Chart,
    /// Table of the recent observations, newest first.
    Log,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Chart => View::Log,
            View::Log => View::Chart,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        // Two views: previous and next coincide.
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Chart => "Chart",
            View::Log => "Log",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    /// Configured source names, in display order.
    pub source_names: Vec<String>,
    pub data: Option<ChartSnapshot>,
    pub load_error: Option<String>,

    // Log view scrolling
    pub log_offset: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, std::time::Instant)>,
}

impl App {
    /// Create a new App over the given data source.
    pub fn new(source: Box<dyn DataSource>, source_names: Vec<String>) -> Self {
        Self::with_theme(source, source_names, Theme::auto_detect())
    }

    pub fn with_theme(source: Box<dyn DataSource>, source_names: Vec<String>, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Chart,
            show_help: false,
            source,
            source_names,
            data: None,
            load_error: None,
            log_offset: 0,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, std::time::Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Poll the data source for a new snapshot.
    ///
    /// Returns Ok(true) if new data was received, Ok(false) otherwise.
    pub fn reload_data(&mut self) -> Result<bool> {
        if let Some(snapshot) = self.source.poll() {
            self.data = Some(snapshot);
            self.load_error = None;
            self.clamp_log_offset();
            return Ok(true);
        }

        if let Some(err) = self.source.error() {
            self.load_error = Some(err.to_string());
        }
        Ok(false)
    }

    /// Latest observation of `source`, if any has been recorded.
    pub fn latest(&self, source: &str) -> Option<&Observation> {
        self.data.as_ref()?.series_for(source)?.latest()
    }

    /// Number of rows in the log view.
    pub fn log_len(&self) -> usize {
        self.data
            .as_ref()
            .map(|d| d.series.iter().map(|s| s.observations.len()).sum())
            .unwrap_or(0)
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Scroll the log view down by n rows.
    pub fn scroll_down(&mut self, n: usize) {
        self.log_offset = self.log_offset.saturating_add(n);
        self.clamp_log_offset();
    }

    /// Scroll the log view up by n rows.
    pub fn scroll_up(&mut self, n: usize) {
        self.log_offset = self.log_offset.saturating_sub(n);
    }

    fn clamp_log_offset(&mut self) {
        self.log_offset = self.log_offset.min(self.log_len().saturating_sub(1));
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current snapshot to a JSON file.
    pub fn export_state(&self, path: &std::path::Path) -> anyhow::Result<()> {
        use std::io::Write;

        let Some(ref data) = self.data else {
            anyhow::bail!("No data to export");
        };

        let json = serde_json::to_string_pretty(data)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}
