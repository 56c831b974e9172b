//! roadtrace-topology: Road topology walking (sans-IO).
//!
//! Reconstructs per-road polylines from a road map's topology: for each
//! `(origin, destination)` edge, walk forward from the origin in steps of
//! the sampling distance until the road id changes or the road ends.
//!
//! Maps are reached through the [`RoadMap`] trait. [`RoadNetwork`] is an
//! in-memory implementation built from a serializable
//! [`MapDescription`]; tests and other callers can supply their own.
//!
//! This crate has **no I/O dependencies**. Reading map files and writing
//! exports lives in the CLI and in `roadtrace-export`.

pub mod diagnostics;
pub mod extract;
pub mod kinematics;
pub mod map;
pub mod network;
pub mod types;

#[cfg(test)]
mod testing;

pub use diagnostics::{Clock, ExtractDiagnostics};
pub use extract::{BranchPolicy, Extractor, Termination, WalkOutcome, WalkState, extract};
pub use map::{RoadMap, TopologyEdge};
pub use network::{
    LaneDescription, MAX_WAYPOINTS_PER_LANE, MapDescription, NetworkWaypoint, RoadNetwork,
};
pub use types::{
    ExtractConfig, Location, Polyline, RoadId, RoadPolyline, Rotation, SamplingDistance,
    TopologyError, Transform, Vector3,
};

/// Build a network from `description` and extract every road in its
/// topology.
///
/// Returns the network alongside the polylines, since resolving the
/// polylines' waypoints to locations needs it.
///
/// # Errors
///
/// Returns [`TopologyError`] if the description or `config` is invalid.
pub fn trace_roads(
    description: &MapDescription,
    config: &ExtractConfig,
) -> Result<(RoadNetwork, Vec<Polyline>), TopologyError> {
    let network = RoadNetwork::from_description(description)?;
    let topology = network.topology();
    let roads = extract(&network, &topology, config)?;
    let polylines = roads.iter().map(|road| network.resolve(road)).collect();
    Ok((network, polylines))
}
