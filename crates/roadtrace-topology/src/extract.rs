//! Road path extraction: turn a topology edge list into per-road polylines.
//!
//! For each edge with a known origin, the extractor walks forward from
//! the origin in steps of the sampling distance, following the first
//! successor at each junction, until the next waypoint belongs to a
//! different road or no successor exists. The waypoint on the new road
//! is not part of the polyline.
//!
//! Each walk is a small state machine:
//!
//! ```text
//! Start --(origin accepted)--> Walking --(same road, successor found)--> Walking
//!                                  |
//!                                  +--(road changed | no successor | guard)--> Done
//! ```

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Clock, ExtractDiagnostics, WalkTally};
use crate::map::{RoadMap, TopologyEdge};
use crate::types::{ExtractConfig, RoadId, RoadPolyline, SamplingDistance, TopologyError};

/// Selects which successor to follow when a waypoint has several.
///
/// Only [`First`](Self::First) exists today. It commits to one branch
/// at every junction, so a junction's other branches only appear in the
/// output when the topology lists them as edges of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BranchPolicy {
    /// Take the first candidate in the order the map returns them.
    #[default]
    First,
}

impl BranchPolicy {
    /// Pick one candidate, or `None` when there are none.
    #[must_use]
    pub fn select<W: Clone>(self, candidates: &[W]) -> Option<W> {
        match self {
            Self::First => candidates.first().cloned(),
        }
    }
}

/// Why a walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The next waypoint lies on a different road.
    RoadChanged,
    /// No waypoint exists within the sampling distance.
    RoadEnded,
    /// The walk guard stopped the walk.
    StepLimit,
}

/// State of a single road walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    /// Origin accepted, nothing queried yet.
    Start,
    /// Following successors along the road.
    Walking,
    /// Terminal. The polyline is complete.
    Done(Termination),
}

/// Result of walking one road from its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkOutcome<W> {
    /// The traced polyline, origin first.
    pub polyline: RoadPolyline<W>,
    /// Why the walk stopped.
    pub termination: Termination,
    /// Waypoints along the walk that offered more than one successor.
    pub branch_points: usize,
}

/// One in-progress walk along a road.
struct RoadWalk<'m, M: RoadMap> {
    map: &'m M,
    distance: SamplingDistance,
    policy: BranchPolicy,
    guard: Option<NonZeroUsize>,
    road_id: RoadId,
    current: M::Waypoint,
    waypoints: Vec<M::Waypoint>,
    steps: usize,
    branch_points: usize,
    state: WalkState,
}

impl<'m, M: RoadMap> RoadWalk<'m, M> {
    fn new(extractor: &Extractor<'m, M>, origin: M::Waypoint) -> Self {
        let road_id = extractor.map.road_id(&origin);
        Self {
            map: extractor.map,
            distance: extractor.distance,
            policy: extractor.policy,
            guard: extractor.guard,
            road_id,
            current: origin.clone(),
            waypoints: vec![origin],
            steps: 0,
            branch_points: 0,
            state: WalkState::Start,
        }
    }

    /// Perform one transition and return the new state.
    fn step(&mut self) -> WalkState {
        self.state = match self.state {
            WalkState::Start => WalkState::Walking,
            WalkState::Walking => self.advance(),
            done @ WalkState::Done(_) => done,
        };
        self.state
    }

    fn advance(&mut self) -> WalkState {
        if self.guard.is_some_and(|limit| self.steps >= limit.get()) {
            return WalkState::Done(Termination::StepLimit);
        }

        let candidates = self.map.next(&self.current, self.distance);
        if candidates.len() > 1 {
            self.branch_points += 1;
            tracing::debug!(
                road = %self.road_id,
                candidates = candidates.len(),
                "junction on road, following {:?} candidate",
                self.policy,
            );
        }

        let Some(selected) = self.policy.select(&candidates) else {
            return WalkState::Done(Termination::RoadEnded);
        };
        if self.map.road_id(&selected) != self.road_id {
            return WalkState::Done(Termination::RoadChanged);
        }

        self.waypoints.push(selected.clone());
        self.current = selected;
        self.steps += 1;
        WalkState::Walking
    }

    fn run(mut self) -> WalkOutcome<M::Waypoint> {
        loop {
            if let WalkState::Done(termination) = self.step() {
                if termination == Termination::StepLimit {
                    tracing::warn!(
                        road = %self.road_id,
                        steps = self.steps,
                        "walk guard reached, polyline truncated"
                    );
                }
                return WalkOutcome {
                    polyline: RoadPolyline::new(
                        self.road_id,
                        self.waypoints,
                        termination == Termination::StepLimit,
                    ),
                    termination,
                    branch_points: self.branch_points,
                };
            }
        }
    }
}

/// Walks roads of one map with one validated configuration.
#[derive(Debug)]
pub struct Extractor<'m, M> {
    map: &'m M,
    distance: SamplingDistance,
    policy: BranchPolicy,
    guard: Option<NonZeroUsize>,
}

impl<'m, M: RoadMap> Extractor<'m, M> {
    /// Validate `config` and bind it to `map`.
    ///
    /// # Errors
    ///
    /// Returns the error from [`ExtractConfig::validate`].
    pub fn new(map: &'m M, config: &ExtractConfig) -> Result<Self, TopologyError> {
        let (distance, guard) = config.validate()?;
        Ok(Self {
            map,
            distance,
            policy: config.branch_policy,
            guard,
        })
    }

    /// Extractor with first-branch selection and no walk guard.
    #[must_use]
    pub const fn unguarded(map: &'m M, distance: SamplingDistance) -> Self {
        Self {
            map,
            distance,
            policy: BranchPolicy::First,
            guard: None,
        }
    }

    /// Sampling distance used for every `next` query.
    #[must_use]
    pub const fn sampling_distance(&self) -> SamplingDistance {
        self.distance
    }

    /// Walk a single road starting at `origin`.
    #[must_use]
    pub fn walk(&self, origin: M::Waypoint) -> WalkOutcome<M::Waypoint> {
        RoadWalk::new(self, origin).run()
    }

    /// Extract one polyline per topology edge that has an origin.
    ///
    /// Output order follows input order. Edges without an origin are
    /// skipped.
    #[must_use]
    pub fn extract(&self, topology: &[TopologyEdge<M::Waypoint>]) -> Vec<RoadPolyline<M::Waypoint>> {
        self.walk_all(topology, |_| {})
    }

    /// Like [`extract`](Self::extract), also collecting diagnostics.
    pub fn extract_with_diagnostics<C: Clock>(
        &self,
        topology: &[TopologyEdge<M::Waypoint>],
        clock: &C,
    ) -> (Vec<RoadPolyline<M::Waypoint>>, ExtractDiagnostics) {
        let start = clock.now();
        let mut tally = WalkTally::default();
        let roads = self.walk_all(topology, |outcome| tally.record(outcome));
        let diagnostics = tally.finish(
            topology.len(),
            self.distance,
            clock.elapsed(&start),
        );
        tracing::info!(
            edges = diagnostics.edge_count,
            skipped = diagnostics.skipped_edges,
            roads = diagnostics.polyline_count,
            waypoints = diagnostics.waypoint_count,
            "extracted road polylines"
        );
        (roads, diagnostics)
    }

    fn walk_all(
        &self,
        topology: &[TopologyEdge<M::Waypoint>],
        mut observe: impl FnMut(&WalkOutcome<M::Waypoint>),
    ) -> Vec<RoadPolyline<M::Waypoint>> {
        topology
            .iter()
            .enumerate()
            .filter_map(|(index, edge)| {
                let Some(origin) = edge.origin.clone() else {
                    tracing::debug!(edge = index, "topology edge has no origin, skipping");
                    return None;
                };
                let outcome = self.walk(origin);
                observe(&outcome);
                Some(outcome.polyline)
            })
            .collect()
    }
}

/// Extract road polylines from `topology` using `config`.
///
/// Convenience wrapper around [`Extractor`].
///
/// # Errors
///
/// Returns [`TopologyError::InvalidSamplingDistance`] or
/// [`TopologyError::InvalidConfig`] if `config` does not validate.
pub fn extract<M: RoadMap>(
    map: &M,
    topology: &[TopologyEdge<M::Waypoint>],
    config: &ExtractConfig,
) -> Result<Vec<RoadPolyline<M::Waypoint>>, TopologyError> {
    Ok(Extractor::new(map, config)?.extract(topology))
}
