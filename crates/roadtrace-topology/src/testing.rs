//! Synthetic maps for unit tests.

use std::time::Duration;

use crate::diagnostics::Clock;
use crate::map::RoadMap;
use crate::types::{Location, RoadId, SamplingDistance};

/// A waypoint in a [`GraphMap`]: its road and the indices `next` returns.
pub struct Node {
    road: RoadId,
    next: Vec<usize>,
}

impl Node {
    pub fn new(road: i32, next: &[usize]) -> Self {
        Self {
            road: RoadId(road),
            next: next.to_vec(),
        }
    }
}

/// Map whose waypoints are indices into a node list. `next` ignores the
/// distance and returns the node's successor list verbatim.
pub struct GraphMap {
    nodes: Vec<Node>,
}

impl GraphMap {
    pub const fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}

impl RoadMap for GraphMap {
    type Waypoint = usize;

    #[allow(clippy::cast_precision_loss)]
    fn location(&self, waypoint: &usize) -> Location {
        Location::planar(*waypoint as f64, 0.0)
    }

    fn road_id(&self, waypoint: &usize) -> RoadId {
        self.nodes[*waypoint].road
    }

    fn next(&self, waypoint: &usize, _distance: SamplingDistance) -> Vec<usize> {
        self.nodes[*waypoint].next.clone()
    }
}

/// Clock that reports the same elapsed time for every measurement.
pub struct FixedClock(pub Duration);

impl Clock for FixedClock {
    type Instant = ();

    fn now(&self) {}

    fn elapsed(&self, _since: &()) -> Duration {
        self.0
    }
}
