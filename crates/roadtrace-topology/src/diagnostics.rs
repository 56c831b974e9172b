//! Extraction diagnostics: counts, termination reasons, and timing.
//!
//! Collected by
//! [`Extractor::extract_with_diagnostics`](crate::Extractor::extract_with_diagnostics)
//! alongside the extracted polylines. Timing goes through the [`Clock`]
//! trait so this crate stays free of platform time sources; callers
//! supply a clock backed by `std::time::Instant` or a fake in tests.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::extract::{Termination, WalkOutcome};
use crate::types::SamplingDistance;

/// Source of timestamps for diagnostics.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractDiagnostics {
    /// Sampling distance used for every walk (meters).
    pub sampling_distance: f64,
    /// Topology edges received.
    pub edge_count: usize,
    /// Edges skipped because their origin was missing.
    pub skipped_edges: usize,
    /// Polylines emitted (one per non-skipped edge).
    pub polyline_count: usize,
    /// Total waypoints across all polylines.
    pub waypoint_count: usize,
    /// Fewest waypoints in any polyline.
    pub min_waypoints: usize,
    /// Most waypoints in any polyline.
    pub max_waypoints: usize,
    /// Mean waypoints per polyline.
    pub mean_waypoints: f64,
    /// Junctions where the walk silently committed to one branch.
    pub branch_points: usize,
    /// Walks ended because the next waypoint was on another road.
    pub ended_by_road_change: usize,
    /// Walks ended because no next waypoint existed.
    pub ended_by_dead_end: usize,
    /// Walks cut short by the walk guard.
    pub truncated_walks: usize,
    /// Wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

impl ExtractDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Road Extraction Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Sampling distance: {}m  |  Duration: {:.3}ms",
            self.sampling_distance,
            duration_ms(self.duration),
        ));
        lines.push(String::new());
        lines.push(format!(
            "Edges: {} ({} skipped without origin)",
            self.edge_count, self.skipped_edges,
        ));
        lines.push(format!(
            "Roads: {}  |  Waypoints: {} (min={} max={} mean={:.1})",
            self.polyline_count,
            self.waypoint_count,
            self.min_waypoints,
            self.max_waypoints,
            self.mean_waypoints,
        ));
        lines.push(format!(
            "Ended by road change: {}  |  dead end: {}  |  truncated: {}",
            self.ended_by_road_change, self.ended_by_dead_end, self.truncated_walks,
        ));
        lines.push(format!(
            "Junctions resolved by first branch: {}",
            self.branch_points
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Running counts while walks complete.
#[derive(Debug, Default)]
pub(crate) struct WalkTally {
    lengths: Vec<usize>,
    branch_points: usize,
    road_changes: usize,
    dead_ends: usize,
    truncated: usize,
}

impl WalkTally {
    pub(crate) fn record<W>(&mut self, outcome: &WalkOutcome<W>) {
        self.lengths.push(outcome.polyline.len());
        self.branch_points += outcome.branch_points;
        match outcome.termination {
            Termination::RoadChanged => self.road_changes += 1,
            Termination::RoadEnded => self.dead_ends += 1,
            Termination::StepLimit => self.truncated += 1,
        }
    }

    pub(crate) fn finish(
        self,
        edge_count: usize,
        distance: SamplingDistance,
        duration: Duration,
    ) -> ExtractDiagnostics {
        let polyline_count = self.lengths.len();
        let waypoint_count: usize = self.lengths.iter().sum();
        #[allow(clippy::cast_precision_loss)]
        let mean_waypoints = if polyline_count == 0 {
            0.0
        } else {
            waypoint_count as f64 / polyline_count as f64
        };
        ExtractDiagnostics {
            sampling_distance: distance.meters(),
            edge_count,
            skipped_edges: edge_count.saturating_sub(polyline_count),
            polyline_count,
            waypoint_count,
            min_waypoints: self.lengths.iter().copied().min().unwrap_or(0),
            max_waypoints: self.lengths.iter().copied().max().unwrap_or(0),
            mean_waypoints,
            branch_points: self.branch_points,
            ended_by_road_change: self.road_changes,
            ended_by_dead_end: self.dead_ends,
            truncated_walks: self.truncated,
            duration,
        }
    }
}
