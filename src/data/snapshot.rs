//! Rolling chart data built from the observation log.

use std::time::Instant;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use super::observation::Observation;

/// Headroom added above the highest listener count on the y axis.
const Y_HEADROOM: f64 = 5.0;

/// The most recent observations of one source, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSeries {
    pub source: String,
    pub observations: Vec<Observation>,
}

impl SourceSeries {
    pub fn new(source: impl Into<String>, observations: Vec<Observation>) -> Self {
        Self {
            source: source.into(),
            observations,
        }
    }

    /// `(unix seconds, listeners)` pairs for plotting.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.observations
            .iter()
            .map(|o| (to_x(&o.timestamp), f64::from(o.listeners)))
            .collect()
    }

    pub fn latest(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn max_listeners(&self) -> u32 {
        self.observations.iter().map(|o| o.listeners).max().unwrap_or(0)
    }
}

/// One consistent read of every source, as published to the display.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSnapshot {
    pub series: Vec<SourceSeries>,
    #[serde(skip)]
    pub taken_at: Instant,
}

impl Default for ChartSnapshot {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ChartSnapshot {
    pub fn new(series: Vec<SourceSeries>) -> Self {
        Self {
            series,
            taken_at: Instant::now(),
        }
    }

    /// True when no source has any observation yet.
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.observations.is_empty())
    }

    pub fn series_for(&self, source: &str) -> Option<&SourceSeries> {
        self.series.iter().find(|s| s.source == source)
    }

    /// Earliest and latest timestamp across all series, as unix seconds.
    ///
    /// A single instant is widened by one second so the axis has a span.
    pub fn x_bounds(&self) -> [f64; 2] {
        let mut xs = self
            .series
            .iter()
            .flat_map(|s| s.observations.iter())
            .map(|o| to_x(&o.timestamp));

        let Some(first) = xs.next() else {
            return [0.0, 1.0];
        };
        let (min, max) = xs.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x)));

        if max > min {
            [min, max]
        } else {
            [min, min + 1.0]
        }
    }

    /// Zero to the highest listener count plus headroom.
    pub fn y_bounds(&self) -> [f64; 2] {
        let max = self.series.iter().map(SourceSeries::max_listeners).max().unwrap_or(0);
        [0.0, f64::from(max) + Y_HEADROOM]
    }

    /// `count` evenly spaced `HH:MM:SS` labels spanning [`Self::x_bounds`].
    pub fn x_labels(&self, count: usize) -> Vec<String> {
        let [min, max] = self.x_bounds();
        if self.is_empty() || count == 0 {
            return Vec::new();
        }
        if count == 1 {
            return vec![format_x(min)];
        }

        let step = (max - min) / (count - 1) as f64;
        (0..count).map(|i| format_x(min + step * i as f64)).collect()
    }

    /// Evenly spaced integer labels spanning [`Self::y_bounds`].
    pub fn y_labels(&self, count: usize) -> Vec<String> {
        let [min, max] = self.y_bounds();
        if count < 2 {
            return vec![format!("{:.0}", max)];
        }
        let step = (max - min) / (count - 1) as f64;
        (0..count).map(|i| format!("{:.0}", min + step * i as f64)).collect()
    }

    /// All observations across sources, newest first.
    pub fn newest_first(&self) -> Vec<&Observation> {
        let mut rows: Vec<&Observation> =
            self.series.iter().flat_map(|s| s.observations.iter()).collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.source.cmp(&b.source)));
        rows
    }
}

fn to_x(ts: &NaiveDateTime) -> f64 {
    ts.and_utc().timestamp() as f64
}

fn format_x(x: f64) -> String {
    DateTime::<Utc>::from_timestamp(x.round() as i64, 0)
        .map(|dt| dt.naive_utc().format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::StreamStatus;
    use chrono::NaiveDate;

    fn obs(source: &str, listeners: u32, h: u32, m: u32, s: u32) -> Observation {
        let ts = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(h, m, s).unwrap();
        Observation::at(source, StreamStatus::online(listeners), ts)
    }

    #[test]
    fn test_empty_snapshot_bounds() {
        let snapshot = ChartSnapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.x_bounds(), [0.0, 1.0]);
        assert_eq!(snapshot.y_bounds(), [0.0, 5.0]);
        assert!(snapshot.x_labels(3).is_empty());
    }

    #[test]
    fn test_bounds_span_all_series() {
        let snapshot = ChartSnapshot::new(vec![
            SourceSeries::new("a", vec![obs("a", 3, 10, 0, 0), obs("a", 8, 10, 0, 20)]),
            SourceSeries::new("b", vec![obs("b", 35, 10, 0, 10), obs("b", 12, 10, 0, 30)]),
        ]);

        let [lo, hi] = snapshot.x_bounds();
        assert_eq!(hi - lo, 30.0);
        assert_eq!(snapshot.y_bounds(), [0.0, 40.0]);
        assert_eq!(snapshot.x_labels(2), vec!["10:00:00", "10:00:30"]);
        assert_eq!(snapshot.y_labels(3), vec!["0", "20", "40"]);
    }

    #[test]
    fn test_single_point_is_widened() {
        let snapshot =
            ChartSnapshot::new(vec![SourceSeries::new("a", vec![obs("a", 1, 8, 15, 0)])]);
        let [lo, hi] = snapshot.x_bounds();
        assert_eq!(hi - lo, 1.0);
        assert_eq!(snapshot.x_labels(1), vec!["08:15:00"]);
    }

    #[test]
    fn test_points_and_latest() {
        let series = SourceSeries::new("a", vec![obs("a", 3, 10, 0, 0), obs("a", 8, 10, 0, 20)]);
        let points = series.points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].0 - points[0].0, 20.0);
        assert_eq!(points[1].1, 8.0);
        assert_eq!(series.latest().unwrap().listeners, 8);
        assert_eq!(series.max_listeners(), 8);
    }

    #[test]
    fn test_newest_first_interleaves_sources() {
        let snapshot = ChartSnapshot::new(vec![
            SourceSeries::new("a", vec![obs("a", 1, 10, 0, 0), obs("a", 2, 10, 0, 20)]),
            SourceSeries::new("b", vec![obs("b", 3, 10, 0, 10)]),
        ]);
        let listeners: Vec<u32> = snapshot.newest_first().iter().map(|o| o.listeners).collect();
        assert_eq!(listeners, vec![2, 3, 1]);
        assert!(snapshot.series_for("b").is_some());
        assert!(snapshot.series_for("c").is_none());
    }
}
