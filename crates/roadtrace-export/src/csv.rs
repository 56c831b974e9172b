//! CSV export of waypoint coordinates.
//!
//! Plain comma-separated text with a header row. Coordinates use Rust's
//! shortest round-trip float formatting, so re-parsing a value yields
//! the same `f64`.
//!
//! Two layouts:
//!
//! - **Points** (`LOCATION.X,LOCATION.Y`): one row per point, for the
//!   map-wide waypoint list.
//! - **Roads** (`ROAD,ROAD_ID,LOCATION.X,LOCATION.Y`): one row per point
//!   of each extracted road, with the road's position in the output and
//!   its road id so polylines can be separated again.
//!
//! This is a pure function with no I/O; it returns a `String`.

use std::fmt::Write;

use roadtrace_topology::{RoadMap, RoadPolyline};

/// Header of the points layout.
pub const POINTS_HEADER: &str = "LOCATION.X,LOCATION.Y";

/// Header of the roads layout.
pub const ROADS_HEADER: &str = "ROAD,ROAD_ID,LOCATION.X,LOCATION.Y";

/// Serialize `(x, y)` rows under the points header.
///
/// # Examples
///
/// ```
/// use roadtrace_export::csv::to_csv;
///
/// let csv = to_csv(&[(1.5, -2.0), (3.0, 4.25)]);
/// assert_eq!(csv, "LOCATION.X,LOCATION.Y\n1.5,-2\n3,4.25\n");
/// ```
#[must_use]
pub fn to_csv(rows: &[(f64, f64)]) -> String {
    let mut out = String::with_capacity(POINTS_HEADER.len() + rows.len() * 24);
    let _ = writeln!(out, "{POINTS_HEADER}");
    for (x, y) in rows {
        let _ = writeln!(out, "{x},{y}");
    }
    out
}

/// Serialize waypoints' planar locations under the points header.
#[must_use]
pub fn waypoints_csv<M: RoadMap>(map: &M, waypoints: &[M::Waypoint]) -> String {
    let rows: Vec<(f64, f64)> = waypoints
        .iter()
        .map(|wp| {
            let location = map.location(wp);
            (location.x, location.y)
        })
        .collect();
    to_csv(&rows)
}

/// Serialize extracted roads under the roads header.
///
/// `ROAD` is the zero-based index of the road in `roads`.
#[must_use]
pub fn roads_csv<M: RoadMap>(map: &M, roads: &[RoadPolyline<M::Waypoint>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{ROADS_HEADER}");
    for (index, road) in roads.iter().enumerate() {
        let road_id = road.road_id();
        for location in map.resolve(road).points() {
            let _ = writeln!(out, "{index},{road_id},{},{}", location.x, location.y);
        }
    }
    out
}
