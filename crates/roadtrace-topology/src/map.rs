//! The waypoint provider seam.
//!
//! A [`RoadMap`] answers the three questions the extractor asks about a
//! waypoint: where it is, which road it belongs to, and which waypoints
//! follow it a given distance ahead. Waypoints are plain handles; the map
//! value is passed explicitly to every operation, so a live simulator
//! client, the in-memory [`RoadNetwork`](crate::network::RoadNetwork) and
//! synthetic test maps are interchangeable.

use crate::types::{Location, Polyline, RoadId, RoadPolyline, SamplingDistance};

/// Read-only access to a road map's waypoints.
pub trait RoadMap {
    /// Handle identifying one waypoint of this map.
    type Waypoint: Clone;

    /// World position of a waypoint.
    fn location(&self, waypoint: &Self::Waypoint) -> Location;

    /// Road the waypoint lies on.
    fn road_id(&self, waypoint: &Self::Waypoint) -> RoadId;

    /// Waypoints roughly `distance` ahead along the lane.
    ///
    /// Several candidates are returned where the lane splits at a
    /// junction. An empty result means the road ends here.
    fn next(&self, waypoint: &Self::Waypoint, distance: SamplingDistance) -> Vec<Self::Waypoint>;

    /// Resolve a road polyline's waypoints into locations.
    fn resolve(&self, road: &RoadPolyline<Self::Waypoint>) -> Polyline {
        Polyline::new(road.waypoints().iter().map(|wp| self.location(wp)).collect())
    }
}

/// One minimal road connection: an origin waypoint and the waypoint it
/// leads to.
///
/// `origin` is `None` for a road with no predecessor, which some
/// OpenDRIVE files contain.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyEdge<W> {
    /// Where the connection starts, if known.
    pub origin: Option<W>,
    /// Where the connection ends.
    pub destination: W,
}

impl<W> TopologyEdge<W> {
    /// Edge with a known origin.
    #[must_use]
    pub const fn new(origin: W, destination: W) -> Self {
        Self {
            origin: Some(origin),
            destination,
        }
    }

    /// Edge whose origin road has no predecessor.
    #[must_use]
    pub const fn without_origin(destination: W) -> Self {
        Self {
            origin: None,
            destination,
        }
    }
}

impl<W> From<(Option<W>, W)> for TopologyEdge<W> {
    fn from((origin, destination): (Option<W>, W)) -> Self {
        Self {
            origin,
            destination,
        }
    }
}
