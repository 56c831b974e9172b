//! In-memory road network: lanes, successor links, and waypoint queries.
//!
//! A [`RoadNetwork`] is built once from a [`MapDescription`] (typically
//! deserialized from a JSON map file) and then answers [`RoadMap`]
//! queries without any simulator connection.
//!
//! # Model
//!
//! Each lane is a directed centerline polyline belonging to one road.
//! Lanes are nodes of a `petgraph` directed graph; successor links are
//! edges weighted with their declaration order so junction candidates
//! come back in the order the map file lists them. A waypoint is a lane
//! plus an arc-length offset `s` along its centerline.
//!
//! `next(d)` moves `d` meters forward. When that passes the end of the
//! lane the remainder carries into every successor, which is how one
//! waypoint can have several candidates at a junction.

use std::collections::{HashMap, HashSet};

use geo::{Closest, ClosestPoint, Line};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rstar::RTree;
use rstar::primitives::GeomWithData;
use serde::{Deserialize, Serialize};

use crate::map::{RoadMap, TopologyEdge};
use crate::types::{Location, RoadId, SamplingDistance, TopologyError};

/// Slack (meters) when deciding whether an offset is still on a lane.
const LENGTH_TOLERANCE: f64 = 1e-9;

/// Cap on how many lane boundaries a single `next` query may cross.
///
/// Only reachable with many lanes shorter than the sampling distance.
const MAX_LANE_HOPS: usize = 64;

/// Most waypoints [`RoadNetwork::generate_waypoints`] places on one lane.
pub const MAX_WAYPOINTS_PER_LANE: usize = 1_000_000;

/// Serializable description of one lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneDescription {
    /// Unique key, referenced by other lanes' `successors`.
    pub id: String,
    /// Road this lane belongs to.
    pub road_id: RoadId,
    /// Centerline in driving direction. At least two distinct points.
    pub centerline: Vec<Location>,
    /// Lanes this one leads into, in preference order.
    #[serde(default)]
    pub successors: Vec<String>,
}

/// Serializable description of a whole map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapDescription {
    /// Human-readable map name, e.g. `"Town03"`.
    #[serde(default)]
    pub name: Option<String>,
    /// All lanes, in declaration order.
    pub lanes: Vec<LaneDescription>,
}

/// A lane with precomputed arc lengths.
#[derive(Debug)]
struct Lane {
    id: String,
    road_id: RoadId,
    points: Vec<Location>,
    /// Arc length at each centerline vertex; `cumulative[0] == 0`.
    cumulative: Vec<f64>,
}

impl Lane {
    fn new(description: &LaneDescription) -> Result<Self, TopologyError> {
        let points = description.centerline.clone();
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        cumulative.push(total);
        for pair in points.windows(2) {
            total += pair[0].distance(pair[1]);
            cumulative.push(total);
        }

        if points.len() < 2 || !total.is_finite() || total <= 0.0 {
            return Err(TopologyError::DegenerateLane(description.id.clone()));
        }

        Ok(Self {
            id: description.id.clone(),
            road_id: description.road_id,
            points,
            cumulative,
        })
    }

    fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Location at arc length `s`, clamped to the lane.
    fn location_at(&self, s: f64) -> Location {
        let s = s.clamp(0.0, self.length());
        let last_segment = self.points.len() - 2;
        let segment = self
            .cumulative
            .partition_point(|&c| c <= s)
            .saturating_sub(1)
            .min(last_segment);
        let start = self.cumulative[segment];
        let span = self.cumulative[segment + 1] - start;
        let t = if span > 0.0 { (s - start) / span } else { 0.0 };
        self.points[segment].lerp(self.points[segment + 1], t)
    }
}

/// A point on a lane of a [`RoadNetwork`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkWaypoint {
    lane: NodeIndex,
    s: f64,
}

impl NetworkWaypoint {
    /// Arc-length offset from the start of the lane (meters).
    #[must_use]
    pub const fn s(&self) -> f64 {
        self.s
    }
}

/// Which centerline segment an R-tree entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SegmentRef {
    lane: NodeIndex,
    segment: usize,
}

type IndexedSegment = GeomWithData<Line<f64>, SegmentRef>;

/// A road network held in memory.
#[derive(Debug)]
pub struct RoadNetwork {
    name: Option<String>,
    graph: DiGraph<Lane, usize>,
    by_id: HashMap<String, NodeIndex>,
    segments: RTree<IndexedSegment>,
}

impl RoadNetwork {
    /// Build and validate a network.
    ///
    /// # Errors
    ///
    /// - [`TopologyError::EmptyMap`] if there are no lanes.
    /// - [`TopologyError::DuplicateLane`] if two lanes share an id.
    /// - [`TopologyError::DegenerateLane`] if a centerline has fewer than
    ///   two points or no length.
    /// - [`TopologyError::UnknownSuccessor`] if a successor id is not a lane.
    pub fn from_description(description: &MapDescription) -> Result<Self, TopologyError> {
        if description.lanes.is_empty() {
            return Err(TopologyError::EmptyMap);
        }

        let mut graph = DiGraph::with_capacity(description.lanes.len(), 0);
        let mut by_id = HashMap::with_capacity(description.lanes.len());
        for lane in &description.lanes {
            let node = graph.add_node(Lane::new(lane)?);
            if by_id.insert(lane.id.clone(), node).is_some() {
                return Err(TopologyError::DuplicateLane(lane.id.clone()));
            }
        }

        for lane in &description.lanes {
            let from = by_id[&lane.id];
            for (order, successor) in lane.successors.iter().enumerate() {
                let to = *by_id
                    .get(successor)
                    .ok_or_else(|| TopologyError::UnknownSuccessor {
                        lane: lane.id.clone(),
                        successor: successor.clone(),
                    })?;
                graph.add_edge(from, to, order);
            }
        }

        let lanes = &graph;
        let segments = RTree::bulk_load(
            graph
                .node_indices()
                .flat_map(move |lane| {
                    let points = &lanes[lane].points;
                    (0..points.len() - 1).map(move |segment| {
                        let a = points[segment];
                        let b = points[segment + 1];
                        GeomWithData::new(
                            Line::new(geo::Coord { x: a.x, y: a.y }, geo::Coord { x: b.x, y: b.y }),
                            SegmentRef { lane, segment },
                        )
                    })
                })
                .collect(),
        );

        Ok(Self {
            name: description.name.clone(),
            graph,
            by_id,
            segments,
        })
    }

    /// Map name, if the description had one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of lanes.
    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Id of the lane a waypoint lies on.
    #[must_use]
    pub fn lane_id(&self, waypoint: &NetworkWaypoint) -> &str {
        &self.graph[waypoint.lane].id
    }

    /// Length of a lane in meters, by id.
    #[must_use]
    pub fn lane_length(&self, lane_id: &str) -> Option<f64> {
        self.by_id.get(lane_id).map(|&lane| self.graph[lane].length())
    }

    /// Waypoint `s` meters along the lane `lane_id`, if the lane exists
    /// and `s` lies on it.
    #[must_use]
    pub fn waypoint(&self, lane_id: &str, s: f64) -> Option<NetworkWaypoint> {
        let &lane = self.by_id.get(lane_id)?;
        (0.0..=self.graph[lane].length() + LENGTH_TOLERANCE)
            .contains(&s)
            .then(|| NetworkWaypoint {
                lane,
                s: s.min(self.graph[lane].length()),
            })
    }

    /// Successor lanes in declaration order.
    fn successors(&self, lane: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<(usize, NodeIndex)> = self
            .graph
            .edges(lane)
            .map(|edge| (*edge.weight(), edge.target()))
            .collect();
        edges.sort_unstable_by_key(|&(order, _)| order);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    /// Push every waypoint `remaining` meters past `s` on `lane`.
    ///
    /// Depth-first in successor order, so the first result is the one
    /// reached by always taking the first successor. `seen` holds the
    /// `(lane, carry)` pairs already entered from a lane start.
    fn advance(
        &self,
        lane: NodeIndex,
        s: f64,
        remaining: f64,
        hops: usize,
        seen: &mut HashSet<(NodeIndex, u64)>,
        out: &mut Vec<NetworkWaypoint>,
    ) {
        let length = self.graph[lane].length();
        let target = s + remaining;
        if target <= length + LENGTH_TOLERANCE {
            out.push(NetworkWaypoint {
                lane,
                s: target.min(length),
            });
            return;
        }
        if hops >= MAX_LANE_HOPS {
            return;
        }
        let carry = target - length;
        for successor in self.successors(lane) {
            if seen.insert((successor, carry.to_bits())) {
                self.advance(successor, 0.0, carry, hops + 1, seen, out);
            }
        }
    }

    /// The minimal road graph: one edge per successor link from the
    /// start of a lane to the start of its successor, or from start to
    /// end for lanes with no successor. Ordered by lane declaration.
    #[must_use]
    pub fn topology(&self) -> Vec<TopologyEdge<NetworkWaypoint>> {
        let mut edges = Vec::new();
        for lane in self.graph.node_indices() {
            let origin = NetworkWaypoint { lane, s: 0.0 };
            let successors = self.successors(lane);
            if successors.is_empty() {
                let end = NetworkWaypoint {
                    lane,
                    s: self.graph[lane].length(),
                };
                edges.push(TopologyEdge::new(origin, end));
            } else {
                edges.extend(
                    successors
                        .into_iter()
                        .map(|next| TopologyEdge::new(origin, NetworkWaypoint { lane: next, s: 0.0 })),
                );
            }
        }
        edges
    }

    /// Waypoints along every lane centerline, `distance` apart, starting
    /// at each lane's beginning.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::TooManyWaypoints`] if any lane would need
    /// more than [`MAX_WAYPOINTS_PER_LANE`] waypoints at this distance.
    pub fn generate_waypoints(
        &self,
        distance: SamplingDistance,
    ) -> Result<Vec<NetworkWaypoint>, TopologyError> {
        let step = distance.meters();
        #[allow(clippy::cast_precision_loss)]
        let max_intervals = MAX_WAYPOINTS_PER_LANE as f64 - 1.0;
        let mut waypoints = Vec::new();
        for lane in self.graph.node_indices() {
            let length = self.graph[lane].length();
            let intervals = ((length + LENGTH_TOLERANCE) / step).floor();
            if intervals > max_intervals {
                return Err(TopologyError::TooManyWaypoints {
                    lane: self.graph[lane].id.clone(),
                    limit: MAX_WAYPOINTS_PER_LANE,
                });
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let count = intervals as usize;
            for i in 0..=count {
                #[allow(clippy::cast_precision_loss)]
                let s = (i as f64 * step).min(length);
                waypoints.push(NetworkWaypoint { lane, s });
            }
        }
        Ok(waypoints)
    }

    /// Waypoint on the nearest lane centerline to `location`.
    ///
    /// The search ignores height; the returned offset is measured along
    /// the sloped centerline.
    #[must_use]
    pub fn closest_waypoint(&self, location: Location) -> Option<NetworkWaypoint> {
        let query = geo::Point::new(location.x, location.y);
        let nearest = self.segments.nearest_neighbor(&query)?;
        let line = nearest.geom();
        let projected: geo::Coord<f64> = match line.closest_point(&query) {
            Closest::Intersection(p) | Closest::SinglePoint(p) => p.into(),
            Closest::Indeterminate => line.start,
        };

        let SegmentRef { lane, segment } = nearest.data;
        let lane_ref = &self.graph[lane];
        let start = lane_ref.points[segment];
        let planar = start.distance_2d(lane_ref.points[segment + 1]);
        let along = Location::new(projected.x, projected.y, start.z).distance_2d(start);
        let t = if planar > 0.0 { along / planar } else { 0.0 };
        let span = lane_ref.cumulative[segment + 1] - lane_ref.cumulative[segment];
        let s = t.mul_add(span, lane_ref.cumulative[segment]).min(lane_ref.length());
        Some(NetworkWaypoint { lane, s })
    }
}

impl TryFrom<&MapDescription> for RoadNetwork {
    type Error = TopologyError;

    fn try_from(description: &MapDescription) -> Result<Self, Self::Error> {
        Self::from_description(description)
    }
}

impl RoadMap for RoadNetwork {
    type Waypoint = NetworkWaypoint;

    fn location(&self, waypoint: &NetworkWaypoint) -> Location {
        self.graph[waypoint.lane].location_at(waypoint.s)
    }

    fn road_id(&self, waypoint: &NetworkWaypoint) -> RoadId {
        self.graph[waypoint.lane].road_id
    }

    fn next(&self, waypoint: &NetworkWaypoint, distance: SamplingDistance) -> Vec<NetworkWaypoint> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.advance(
            waypoint.lane,
            waypoint.s,
            distance.meters(),
            0,
            &mut seen,
            &mut out,
        );
        out
    }
}
