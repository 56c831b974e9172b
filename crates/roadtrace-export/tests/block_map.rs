//! Integration test: extract the sample block map and export CSV and plot data.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use roadtrace_topology::{ExtractConfig, Extractor, MapDescription, RoadMap, RoadNetwork};

fn load_block() -> RoadNetwork {
    // Locate the sample map relative to the workspace root.
    let workspace_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf();
    let map_path = workspace_root.join("assets/maps/block.json");
    assert!(map_path.exists(), "block map not found at {map_path:?}");

    let text = std::fs::read_to_string(&map_path).unwrap();
    let description: MapDescription = serde_json::from_str(&text).expect("map should parse");
    RoadNetwork::from_description(&description).expect("map should validate")
}

#[test]
fn block_map_to_csv_and_plot() {
    let network = load_block();
    assert_eq!(network.name(), Some("Block"));
    assert_eq!(network.lane_count(), 6);

    let topology = network.topology();
    // r1 -> j1, r1 -> j2, j1 -> r2, j2 -> r3, r2 end, r3 -> r3b, r3b end
    assert_eq!(topology.len(), 7);

    let extractor = Extractor::new(&network, &ExtractConfig::default()).unwrap();
    let roads = extractor.extract(&topology);
    let lengths: Vec<usize> = roads.iter().map(|r| r.len()).collect();
    // Road 3 spans two lanes, so the walk from r3 continues through r3b.
    assert_eq!(lengths, vec![21, 21, 11, 11, 21, 41, 21]);
    for road in &roads {
        assert!(!road.is_truncated());
        for wp in road.waypoints() {
            assert_eq!(network.road_id(wp), road.road_id());
        }
    }

    let waypoints = network
        .generate_waypoints(extractor.sampling_distance())
        .unwrap();
    assert_eq!(waypoints.len(), 21 + 11 + 11 + 21 + 21 + 21);

    let points = roadtrace_export::waypoints_csv(&network, &waypoints);
    assert_eq!(points.lines().count(), waypoints.len() + 1);
    assert!(points.starts_with("LOCATION.X,LOCATION.Y\n0,0\n1,0\n"));

    let rows = roadtrace_export::roads_csv(&network, &roads);
    assert_eq!(rows.lines().count(), lengths.iter().sum::<usize>() + 1);
    // The road 3 walk ends at the far corner of the block.
    assert!(rows.lines().any(|line| line == "5,3,0,30"));

    let plot = roadtrace_export::plot_data(&network, network.name(), &waypoints, &roads);
    assert_eq!(plot.panels[0].title, "Block Waypoints");
    assert_eq!(plot.panels[1].series.len(), roads.len());
    let json = roadtrace_export::plot::to_json(&plot).unwrap();
    eprintln!(
        "Block map: {} roads, {} waypoints, plot JSON {} bytes",
        roads.len(),
        waypoints.len(),
        json.len()
    );
}
