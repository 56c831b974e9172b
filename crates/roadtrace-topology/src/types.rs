//! Shared types for roadtrace topology walking.

use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::extract::BranchPolicy;

/// A 3D position in world coordinates (meters).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    /// Forward/east axis.
    pub x: f64,
    /// Lateral axis. Increases downward on screen in UE4 coordinates.
    pub y: f64,
    /// Height above the ground plane.
    #[serde(default)]
    pub z: f64,
}

impl Location {
    /// Create a new location.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Create a location on the ground plane (`z = 0`).
    #[must_use]
    pub const fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Squared Euclidean distance to another location.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx.mul_add(dx, dy.mul_add(dy, dz * dz))
    }

    /// Euclidean distance to another location.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Distance to another location ignoring height.
    #[must_use]
    pub fn distance_2d(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point at fraction `t` (0.0 to 1.0) of the way from `self` to `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: t.mul_add(other.x - self.x, self.x),
            y: t.mul_add(other.y - self.y, self.y),
            z: t.mul_add(other.z - self.z, self.z),
        }
    }
}

/// A free 3D vector (velocities, directions).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length.
    #[must_use]
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y).hypot(self.z)
    }
}

/// Orientation in degrees, UE4 convention.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

/// Position plus orientation of an actor or waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub location: Location,
    pub rotation: Rotation,
}

impl Transform {
    /// Unit vector pointing along the transform's heading.
    #[must_use]
    pub fn forward_vector(&self) -> Vector3 {
        let (sin_yaw, cos_yaw) = self.rotation.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.rotation.pitch.to_radians().sin_cos();
        Vector3::new(cos_pitch * cos_yaw, cos_pitch * sin_yaw, sin_pitch)
    }
}

/// Identifier of an OpenDRIVE-style road.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoadId(pub i32);

impl fmt::Display for RoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Step size (meters) used when querying successor waypoints.
///
/// Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct SamplingDistance(f64);

impl SamplingDistance {
    /// Validate and wrap a sampling distance.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidSamplingDistance`] when `meters`
    /// is not finite or not strictly positive.
    pub fn new(meters: f64) -> Result<Self, TopologyError> {
        if meters.is_finite() && meters > 0.0 {
            Ok(Self(meters))
        } else {
            Err(TopologyError::InvalidSamplingDistance(meters))
        }
    }

    /// The distance in meters.
    #[must_use]
    pub const fn meters(self) -> f64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for SamplingDistance {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let meters = f64::deserialize(deserializer)?;
        Self::new(meters).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for SamplingDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}

/// A sequence of connected locations, resolved from a [`RoadPolyline`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline(Vec<Location>);

impl Polyline {
    /// Create a new polyline from a vector of locations.
    #[must_use]
    pub const fn new(points: Vec<Location>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Location] {
        &self.0
    }

    /// X coordinates, in order. Pairs with [`ys`](Self::ys) for plotting.
    #[must_use]
    pub fn xs(&self) -> Vec<f64> {
        self.0.iter().map(|p| p.x).collect()
    }

    /// Y coordinates, in order.
    #[must_use]
    pub fn ys(&self) -> Vec<f64> {
        self.0.iter().map(|p| p.y).collect()
    }

    /// `(x, y)` rows for tabular export.
    #[must_use]
    pub fn rows(&self) -> Vec<(f64, f64)> {
        self.0.iter().map(|p| (p.x, p.y)).collect()
    }

    /// Total length along the polyline (3D).
    #[must_use]
    pub fn length(&self) -> f64 {
        self.0.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// The ordered trace of waypoints belonging to one contiguous road.
///
/// Every waypoint shares [`road_id`](Self::road_id), the road of the
/// first waypoint. Produced by [`extract`](crate::extract()); immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadPolyline<W> {
    road_id: RoadId,
    waypoints: Vec<W>,
    truncated: bool,
}

impl<W> RoadPolyline<W> {
    pub(crate) const fn new(road_id: RoadId, waypoints: Vec<W>, truncated: bool) -> Self {
        Self {
            road_id,
            waypoints,
            truncated,
        }
    }

    /// Road shared by every waypoint in the polyline.
    #[must_use]
    pub const fn road_id(&self) -> RoadId {
        self.road_id
    }

    /// Waypoints in traversal order. Never empty.
    #[must_use]
    pub fn waypoints(&self) -> &[W] {
        &self.waypoints
    }

    /// The origin waypoint the walk started from.
    #[must_use]
    pub fn first(&self) -> Option<&W> {
        self.waypoints.first()
    }

    /// Number of waypoints.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always `false` for polylines produced by the extractor.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// `true` when the walk guard stopped the walk before the road ended.
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Consumes the polyline and returns its waypoints.
    #[must_use]
    pub fn into_waypoints(self) -> Vec<W> {
        self.waypoints
    }
}

/// Configuration for road polyline extraction.
///
/// All parameters have defaults matching the map plotting tool this
/// crate grew out of: one-meter sampling and first-branch selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Step size (meters) between successive waypoints of a walk.
    pub sampling_distance: f64,

    /// How to pick among several successor candidates at a junction.
    pub branch_policy: BranchPolicy,

    /// Upper bound on steps per walk.
    ///
    /// Guards against a road that loops back onto itself without ever
    /// changing road id. `None` walks until the road ends.
    pub max_steps_per_road: Option<usize>,
}

impl ExtractConfig {
    /// Default sampling distance in meters.
    pub const DEFAULT_SAMPLING_DISTANCE: f64 = 1.0;

    /// Default walk guard. A 100 km road at one-meter sampling.
    pub const DEFAULT_MAX_STEPS_PER_ROAD: usize = 100_000;

    /// Check the configuration and return the validated sampling distance
    /// and walk guard.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidSamplingDistance`] for a
    /// non-positive or non-finite distance and
    /// [`TopologyError::InvalidConfig`] for a zero walk guard.
    pub fn validate(&self) -> Result<(SamplingDistance, Option<NonZeroUsize>), TopologyError> {
        let distance = SamplingDistance::new(self.sampling_distance)?;
        let guard = match self.max_steps_per_road {
            None => None,
            Some(steps) => Some(NonZeroUsize::new(steps).ok_or_else(|| {
                TopologyError::InvalidConfig("max_steps_per_road must be at least 1".to_string())
            })?),
        };
        Ok((distance, guard))
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            sampling_distance: Self::DEFAULT_SAMPLING_DISTANCE,
            branch_policy: BranchPolicy::default(),
            max_steps_per_road: Some(Self::DEFAULT_MAX_STEPS_PER_ROAD),
        }
    }
}

/// Errors raised while configuring extraction or building a road network.
///
/// Walking a topology never fails: skipped edges and ended roads are
/// normal outcomes reported through diagnostics.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    /// Sampling distance must be finite and strictly positive.
    #[error("sampling distance must be finite and positive, got {0}")]
    InvalidSamplingDistance(f64),

    /// Extraction configuration is invalid.
    #[error("invalid extraction configuration: {0}")]
    InvalidConfig(String),

    /// The map description contains no lanes.
    #[error("map contains no lanes")]
    EmptyMap,

    /// Two lanes share the same identifier.
    #[error("duplicate lane id {0:?}")]
    DuplicateLane(String),

    /// A lane centerline has fewer than two points or zero length.
    #[error("lane {0:?} needs at least two distinct centerline points")]
    DegenerateLane(String),

    /// A lane lists a successor that does not exist.
    #[error("lane {lane:?} lists unknown successor {successor:?}")]
    UnknownSuccessor {
        /// Lane declaring the successor.
        lane: String,
        /// The missing successor id.
        successor: String,
    },

    /// Sampling a lane would produce more waypoints than allowed.
    #[error("lane {lane:?} needs more than {limit} waypoints at this sampling distance")]
    TooManyWaypoints {
        /// Lane that is too long for the sampling distance.
        lane: String,
        /// Per-lane waypoint cap.
        limit: usize,
    },
}
