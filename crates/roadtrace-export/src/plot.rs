//! Plot-series export.
//!
//! Produces the data behind a two-panel map figure: every sampled
//! waypoint as a scatter, and each extracted road as its own line
//! series. Each series is a pair of parallel `x`/`y` arrays, the shape
//! most plotting libraries take directly. Drawing the figure is left to
//! the consumer.
//!
//! Map coordinates follow the UE4 convention (y grows downward on
//! screen), so the data asks for an inverted y axis.

use serde::{Deserialize, Serialize};

use roadtrace_topology::{Polyline, RoadMap, RoadPolyline};

use crate::ExportError;

/// How a panel's series should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStyle {
    /// Unconnected point markers.
    Markers,
    /// Connected line segments.
    Lines,
}

/// One drawable series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Legend label, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// X coordinates.
    pub x: Vec<f64>,
    /// Y coordinates, same length as `x`.
    pub y: Vec<f64>,
}

impl Series {
    /// Series from a resolved polyline.
    #[must_use]
    pub fn from_polyline(polyline: &Polyline, label: Option<String>) -> Self {
        Self {
            label,
            x: polyline.xs(),
            y: polyline.ys(),
        }
    }

    /// Number of points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns `true` if the series has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// One subplot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub title: String,
    pub style: SeriesStyle,
    pub series: Vec<Series>,
}

/// A complete figure description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotData {
    /// Flip the y axis when drawing.
    pub invert_y_axis: bool,
    /// Subplots, left to right.
    pub panels: Vec<Panel>,
}

/// Build the waypoint and topology panels for one map.
///
/// `map_name` prefixes the panel titles (e.g. `"Town03 Waypoints"`).
#[must_use]
pub fn plot_data<M: RoadMap>(
    map: &M,
    map_name: Option<&str>,
    waypoints: &[M::Waypoint],
    roads: &[RoadPolyline<M::Waypoint>],
) -> PlotData {
    let title = |suffix: &str| match map_name {
        Some(name) => format!("{name} {suffix}"),
        None => suffix.to_string(),
    };

    let scatter = Polyline::new(waypoints.iter().map(|wp| map.location(wp)).collect());
    let waypoint_panel = Panel {
        title: title("Waypoints"),
        style: SeriesStyle::Markers,
        series: vec![Series::from_polyline(&scatter, None)],
    };

    let topology_panel = Panel {
        title: title("Topology"),
        style: SeriesStyle::Lines,
        series: roads
            .iter()
            .map(|road| {
                Series::from_polyline(&map.resolve(road), Some(format!("road {}", road.road_id())))
            })
            .collect(),
    };

    PlotData {
        invert_y_axis: true,
        panels: vec![waypoint_panel, topology_panel],
    }
}

/// Serialize plot data as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ExportError::NonFiniteCoordinate`] if any coordinate is
/// `NaN` or infinite (JSON would silently turn it into `null`), or
/// [`ExportError::Json`] if serialization fails.
pub fn to_json(plot: &PlotData) -> Result<String, ExportError> {
    for panel in &plot.panels {
        let finite = panel
            .series
            .iter()
            .flat_map(|s| s.x.iter().chain(&s.y))
            .all(|v| v.is_finite());
        if !finite {
            return Err(ExportError::NonFiniteCoordinate {
                panel: panel.title.clone(),
            });
        }
    }
    Ok(serde_json::to_string_pretty(plot)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use roadtrace_topology::{
        Extractor, LaneDescription, Location, MapDescription, RoadId, RoadNetwork,
        SamplingDistance,
    };

    fn corner() -> RoadNetwork {
        RoadNetwork::from_description(&MapDescription {
            name: Some("Corner".to_string()),
            lanes: vec![LaneDescription {
                id: "l".to_string(),
                road_id: RoadId(12),
                centerline: vec![
                    Location::planar(0.0, 0.0),
                    Location::planar(2.0, 0.0),
                    Location::planar(2.0, 2.0),
                ],
                successors: vec![],
            }],
        })
        .unwrap()
    }

    #[test]
    fn panels_mirror_waypoints_and_roads() {
        let net = corner();
        let d = SamplingDistance::new(1.0).unwrap();
        let waypoints = net.generate_waypoints(d).unwrap();
        let roads = Extractor::unguarded(&net, d).extract(&net.topology());
        let plot = plot_data(&net, net.name(), &waypoints, &roads);

        assert!(plot.invert_y_axis);
        assert_eq!(plot.panels.len(), 2);
        assert_eq!(plot.panels[0].title, "Corner Waypoints");
        assert_eq!(plot.panels[0].style, SeriesStyle::Markers);
        assert_eq!(plot.panels[0].series[0].len(), 5);

        assert_eq!(plot.panels[1].title, "Corner Topology");
        assert_eq!(plot.panels[1].series.len(), 1);
        let road = &plot.panels[1].series[0];
        assert_eq!(road.label.as_deref(), Some("road 12"));
        assert_eq!(road.x.len(), road.y.len());
        assert_eq!(road.len(), 5);
    }

    #[test]
    fn untitled_map_uses_bare_titles() {
        let net = corner();
        let plot = plot_data(&net, None, &[], &[]);
        assert_eq!(plot.panels[0].title, "Waypoints");
        assert!(plot.panels[0].series[0].is_empty());
        assert!(plot.panels[1].series.is_empty());
    }

    #[test]
    fn json_has_expected_shape() {
        let net = corner();
        let plot = plot_data(&net, None, &[], &[]);
        let json = to_json(&plot).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["invert_y_axis"], true);
        assert_eq!(value["panels"][0]["style"], "markers");
        assert_eq!(value["panels"][1]["style"], "lines");
        let back: PlotData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plot);
    }

    #[test]
    fn non_finite_coordinates_fail() {
        let plot = PlotData {
            invert_y_axis: false,
            panels: vec![Panel {
                title: "bad".to_string(),
                style: SeriesStyle::Lines,
                series: vec![Series {
                    label: None,
                    x: vec![f64::NAN],
                    y: vec![0.0],
                }],
            }],
        };
        assert!(matches!(
            to_json(&plot),
            Err(ExportError::NonFiniteCoordinate { panel }) if panel == "bad"
        ));
    }
}
