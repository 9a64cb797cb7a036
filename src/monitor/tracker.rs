//! Per-source online/offline state machine.
//!
//! ```text
//! Unknown ──online──▶ Online ◀──online── Offline
//!    │                  │                   ▲
//!    └─────offline──────┴─────offline───────┘
//! ```
//!
//! Entering `Offline` is the only transition that alerts, so an unbroken run
//! of offline observations produces exactly one alert.

use std::collections::HashMap;

/// Last known state of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// No observation yet (startup).
    #[default]
    Unknown,
    Online,
    /// Offline and already alerted for this episode.
    Offline,
}

/// What one observation did to a source's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// First observation since startup, online.
    FirstOnline,
    /// Offline after online or unknown. Starts an episode.
    WentOffline,
    /// Online after an offline episode.
    WentOnline,
    StillOnline,
    StillOffline,
}

impl Transition {
    /// True for the single transition that sends an alert.
    pub fn should_alert(self) -> bool {
        self == Transition::WentOffline
    }
}

/// Alert state for every source, owned by the monitor loop.
#[derive(Debug, Clone, Default)]
pub struct AlertTracker {
    states: HashMap<String, StreamState>,
}

impl AlertTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one observation and return the resulting transition.
    pub fn observe(&mut self, source: &str, online: bool) -> Transition {
        let state = self.states.entry(source.to_string()).or_default();
        let transition = match (*state, online) {
            (StreamState::Unknown, true) => Transition::FirstOnline,
            (StreamState::Online, true) => Transition::StillOnline,
            (StreamState::Offline, true) => Transition::WentOnline,
            (StreamState::Unknown | StreamState::Online, false) => Transition::WentOffline,
            (StreamState::Offline, false) => Transition::StillOffline,
        };
        *state = if online {
            StreamState::Online
        } else {
            StreamState::Offline
        };
        transition
    }

    pub fn state(&self, source: &str) -> StreamState {
        self.states.get(source).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alerts(tracker: &mut AlertTracker, source: &str, sequence: &[bool]) -> usize {
        sequence
            .iter()
            .filter(|&&online| tracker.observe(source, online).should_alert())
            .count()
    }

    #[test]
    fn test_one_alert_per_episode() {
        let mut tracker = AlertTracker::new();
        assert_eq!(alerts(&mut tracker, "a", &[true, false, false, true, false]), 2);
    }

    #[test]
    fn test_starting_offline_alerts_once() {
        let mut tracker = AlertTracker::new();
        assert_eq!(tracker.observe("a", false), Transition::WentOffline);
        assert_eq!(tracker.observe("a", false), Transition::StillOffline);
        assert_eq!(tracker.state("a"), StreamState::Offline);
        assert_eq!(tracker.observe("a", true), Transition::WentOnline);
        assert_eq!(tracker.state("a"), StreamState::Online);
    }

    #[test]
    fn test_transitions_from_online() {
        let mut tracker = AlertTracker::new();
        assert_eq!(tracker.state("a"), StreamState::Unknown);
        assert_eq!(tracker.observe("a", true), Transition::FirstOnline);
        assert_eq!(tracker.observe("a", true), Transition::StillOnline);
        assert_eq!(tracker.state("a"), StreamState::Online);
        assert_eq!(tracker.observe("a", false), Transition::WentOffline);
        assert_eq!(tracker.state("a"), StreamState::Offline);
    }

    #[test]
    fn test_sources_are_independent() {
        let mut tracker = AlertTracker::new();
        assert!(tracker.observe("a", false).should_alert());
        assert!(tracker.observe("b", false).should_alert());
        assert!(!tracker.observe("a", false).should_alert());
        assert_eq!(tracker.state("b"), StreamState::Offline);
    }

    #[test]
    fn test_long_outage_alerts_once() {
        let mut tracker = AlertTracker::new();
        let mut sequence = vec![true];
        sequence.extend(std::iter::repeat(false).take(50));
        assert_eq!(alerts(&mut tracker, "a", &sequence), 1);
    }
}
