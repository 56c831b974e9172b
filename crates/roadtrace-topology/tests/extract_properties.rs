//! Behavioral properties of road extraction over synthetic maps.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use roadtrace_topology::{
    ExtractConfig, Extractor, Location, RoadId, RoadMap, SamplingDistance, TopologyEdge,
};

/// Named waypoints with scripted successors.
#[derive(Debug, Clone)]
struct ScriptedMap {
    roads: Vec<i32>,
    next: Vec<Vec<usize>>,
}

impl RoadMap for ScriptedMap {
    type Waypoint = usize;

    #[allow(clippy::cast_precision_loss)]
    fn location(&self, waypoint: &usize) -> Location {
        Location::planar(*waypoint as f64, 1.0)
    }

    fn road_id(&self, waypoint: &usize) -> RoadId {
        RoadId(self.roads[*waypoint])
    }

    fn next(&self, waypoint: &usize, _distance: SamplingDistance) -> Vec<usize> {
        self.next[*waypoint].clone()
    }
}

fn one_meter() -> SamplingDistance {
    SamplingDistance::new(1.0).unwrap()
}

const A: usize = 0;
const B: usize = 1;
const C: usize = 2;
const D: usize = 3;
const X: usize = 4;

fn letters() -> ScriptedMap {
    ScriptedMap {
        //          A  B  C  D  X
        roads: vec![1, 1, 1, 2, 9],
        next: vec![vec![C], vec![], vec![D], vec![], vec![]],
    }
}

#[test]
fn road_change_excludes_new_road_waypoint() {
    let map = letters();
    let roads = Extractor::unguarded(&map, one_meter()).extract(&[TopologyEdge::new(A, B)]);
    assert_eq!(roads.len(), 1);
    assert_eq!(roads[0].waypoints(), &[A, C]);
}

#[test]
fn missing_origin_produces_nothing() {
    let map = letters();
    let roads = Extractor::unguarded(&map, one_meter()).extract(&[TopologyEdge::without_origin(X)]);
    assert!(roads.is_empty());
}

#[test]
fn origin_without_successor_is_single_point() {
    let mut map = letters();
    map.next[A].clear();
    let roads = Extractor::unguarded(&map, one_meter()).extract(&[TopologyEdge::new(A, B)]);
    assert_eq!(roads.len(), 1);
    assert_eq!(roads[0].waypoints(), &[A]);
}

#[test]
fn resolve_yields_plot_series() {
    let map = letters();
    let roads = Extractor::unguarded(&map, one_meter()).extract(&[TopologyEdge::new(A, B)]);
    let polyline = map.resolve(&roads[0]);
    assert_eq!(polyline.xs(), vec![0.0, 2.0]);
    assert_eq!(polyline.ys(), vec![1.0, 1.0]);
    assert_eq!(polyline.rows(), vec![(0.0, 1.0), (2.0, 1.0)]);
}

/// Random maps of up to 12 waypoints on up to 3 roads, with up to 3
/// successors each, plus a topology over them with optional origins.
fn scripted_map_and_topology() -> impl Strategy<Value = (ScriptedMap, Vec<TopologyEdge<usize>>)> {
    (1usize..12).prop_flat_map(|n| {
        let roads = prop::collection::vec(0i32..3, n);
        let next = prop::collection::vec(prop::collection::vec(0..n, 0..3), n);
        let topology = prop::collection::vec((prop::option::of(0..n), 0..n), 0..8);
        (roads, next, topology).prop_map(|(roads, next, topology)| {
            let edges = topology.into_iter().map(TopologyEdge::from).collect();
            (ScriptedMap { roads, next }, edges)
        })
    })
}

fn guarded() -> ExtractConfig {
    ExtractConfig {
        max_steps_per_road: Some(40),
        ..ExtractConfig::default()
    }
}

proptest! {
    #[test]
    fn one_polyline_per_defined_origin((map, topology) in scripted_map_and_topology()) {
        let roads = Extractor::new(&map, &guarded()).unwrap().extract(&topology);
        let origins: Vec<usize> = topology.iter().filter_map(|e| e.origin).collect();
        prop_assert_eq!(roads.len(), origins.len());
        for (road, origin) in roads.iter().zip(&origins) {
            prop_assert_eq!(road.first(), Some(origin));
        }
    }

    #[test]
    fn road_id_is_constant_along_polyline((map, topology) in scripted_map_and_topology()) {
        let roads = Extractor::new(&map, &guarded()).unwrap().extract(&topology);
        for road in &roads {
            prop_assert!(!road.is_empty());
            for wp in road.waypoints() {
                prop_assert_eq!(map.road_id(wp), road.road_id());
            }
        }
    }

    #[test]
    fn extraction_is_idempotent((map, topology) in scripted_map_and_topology()) {
        let extractor = Extractor::new(&map, &guarded()).unwrap();
        prop_assert_eq!(extractor.extract(&topology), extractor.extract(&topology));
    }

    #[test]
    fn walk_stops_only_at_road_end_change_or_guard((map, topology) in scripted_map_and_topology()) {
        let roads = Extractor::new(&map, &guarded()).unwrap().extract(&topology);
        for road in &roads {
            let last = road.waypoints().last().unwrap();
            let at_boundary = match map.next[*last].first() {
                None => true,
                Some(next) => map.road_id(next) != road.road_id(),
            };
            prop_assert!(road.is_truncated() || at_boundary);
        }
    }

    #[test]
    fn each_step_follows_first_successor((map, topology) in scripted_map_and_topology()) {
        let roads = Extractor::new(&map, &guarded()).unwrap().extract(&topology);
        for road in &roads {
            for pair in road.waypoints().windows(2) {
                prop_assert_eq!(map.next[pair[0]].first(), Some(&pair[1]));
            }
        }
    }
}
