//! Watched-interval algebra.
//!
//! A lesson's viewing history is a set of `[start, end]` second ranges. Raw
//! playback samples arrive noisy and overlapping; `merge_intervals` collapses
//! them into the canonical sorted, disjoint form that gets persisted.

use serde::{Deserialize, Serialize};

/// Gap (seconds) under which two intervals are considered contiguous.
pub const MERGE_TOLERANCE_SECS: f64 = 2.0;

//
// ─── WATCHED INTERVAL ──────────────────────────────────────────────────────────
//

/// A contiguous range of a lesson's video confirmed as played.
///
/// Persisted on the wire as a `[start, end]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct WatchedInterval {
    start: f64,
    end: f64,
}

impl WatchedInterval {
    /// Creates an interval, swapping the endpoints if they arrive reversed.
    ///
    /// Non-finite endpoints are clamped to zero so a bad sample can never
    /// poison the persisted set.
    #[must_use]
    pub fn new(start: f64, end: f64) -> Self {
        let start = if start.is_finite() { start.max(0.0) } else { 0.0 };
        let end = if end.is_finite() { end.max(0.0) } else { 0.0 };
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates a zero-length interval at the given position.
    #[must_use]
    pub fn at(position: f64) -> Self {
        Self::new(position, position)
    }

    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Covered seconds.
    #[must_use]
    pub fn len_secs(&self) -> f64 {
        self.end - self.start
    }

    /// Extends the end forward to `position`; never moves it backwards.
    pub fn extend_to(&mut self, position: f64) {
        if position.is_finite() {
            self.end = self.end.max(position);
        }
    }
}

impl From<(f64, f64)> for WatchedInterval {
    fn from((start, end): (f64, f64)) -> Self {
        Self::new(start, end)
    }
}

impl From<WatchedInterval> for (f64, f64) {
    fn from(interval: WatchedInterval) -> Self {
        (interval.start, interval.end)
    }
}

//
// ─── MERGE ─────────────────────────────────────────────────────────────────────
//

/// Merges overlapping and near-adjacent intervals.
///
/// Sorts by start, then folds left: an interval starting within `tolerance`
/// of the previous end joins it, taking the larger end. The result is sorted,
/// pairwise disjoint beyond `tolerance`, and stable under re-merging.
#[must_use]
pub fn merge_intervals(intervals: &[WatchedInterval], tolerance: f64) -> Vec<WatchedInterval> {
    let mut sorted: Vec<WatchedInterval> = intervals.to_vec();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<WatchedInterval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end + tolerance => {
                last.extend_to(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Total covered seconds across a set of intervals.
#[must_use]
pub fn total_watched_secs(intervals: &[WatchedInterval]) -> f64 {
    intervals.iter().map(WatchedInterval::len_secs).sum()
}

/// Percentage of `total_duration_secs` covered, rounded and clamped to 0..=100.
///
/// A zero, negative, or non-finite duration yields 0 rather than an error;
/// the widget simply has not reported a usable duration yet.
#[must_use]
pub fn percent_watched(intervals: &[WatchedInterval], total_duration_secs: f64) -> u8 {
    if !total_duration_secs.is_finite() || total_duration_secs <= 0.0 {
        return 0;
    }
    let ratio = 100.0 * total_watched_secs(intervals) / total_duration_secs;
    let rounded = ratio.round().clamp(0.0, 100.0);
    // Safe: the clamp above bounds the value to 0..=100.
    rounded as u8
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
