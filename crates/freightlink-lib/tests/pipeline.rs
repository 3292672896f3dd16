//! Full pipeline behavior: empty input, policies, end-to-end refinement and
//! idempotence.

mod common;

use freightlink_lib::{
    build_network, load_facilities, records_from_geojson, EdgeStatus, Error, FacilityRecord,
    GeometryPolicy, NetworkOptions, NetworkStatus, RoutableNetwork, TransportMode,
};

#[test]
fn empty_input_is_a_successful_no_data_result() {
    let result = build_network(&[], None, &NetworkOptions::default()).expect("empty run succeeds");
    assert_eq!(result.status, NetworkStatus::NoData);
    assert_eq!(result.nodes_count, 0);
    assert_eq!(result.edges_count, 0);
    assert_eq!(result.total_distance, 0.0);
    assert!(result.points.is_empty());
    assert!(result.edges.is_empty());
}

#[test]
fn end_to_end_refines_against_a_road_network() {
    let records = common::diagonal_facilities();
    let network = common::diagonal_road_network();
    let options = NetworkOptions {
        mode: Some(TransportMode::RoadFreight),
        ..NetworkOptions::default()
    };

    let result =
        build_network(&records, Some(&network), &options).expect("pipeline succeeds");

    assert_eq!(result.status, NetworkStatus::Ok);
    assert_eq!(result.nodes_count, 3);
    assert_eq!(result.edges_count, 2);
    assert!(result
        .edges
        .iter()
        .all(|edge| edge.status == EdgeStatus::Refined));
    // Road nodes coincide with the facilities, so the refined weights are the
    // fixture segment lengths.
    let mut distances: Vec<f64> = result.edges.iter().map(|edge| edge.distance).collect();
    distances.sort_by(f64::total_cmp);
    assert_eq!(distances, vec![15_000.0, 16_000.0]);
    assert_eq!(result.total_distance, 31_000.0);
    assert_eq!(result.refinement.refined, 2);
}

#[test]
fn pipeline_is_idempotent_for_a_deterministic_provider() {
    let records = common::diagonal_facilities();
    let network = common::diagonal_road_network();
    let options = NetworkOptions::default();

    let first = build_network(&records, Some(&network), &options).expect("first run");
    let second = build_network(&records, Some(&network), &options).expect("second run");

    let first_json = serde_json::to_string(&first).expect("serializes");
    let second_json = serde_json::to_string(&second).expect("serializes");
    assert_eq!(first_json, second_json);
}

#[test]
fn total_distance_always_matches_the_edge_sum() {
    let records = common::diagonal_facilities();
    for provider in [
        None,
        Some(&common::NoPathNetwork as &dyn RoutableNetwork),
    ] {
        let result =
            build_network(&records, provider, &NetworkOptions::default()).expect("run succeeds");
        let sum: f64 = result.edges.iter().map(|edge| edge.distance).sum();
        assert_eq!(result.total_distance, sum);
    }
}

#[test]
fn skip_policy_drops_bad_records_and_keeps_going() {
    let mut records = common::diagonal_facilities();
    records.insert(1, FacilityRecord::point(f64::NAN, 30.35));

    let strict = build_network(&records, None, &NetworkOptions::default());
    assert!(matches!(
        strict,
        Err(Error::NonFiniteCoordinate { index: 1 })
    ));

    let options = NetworkOptions {
        geometry_policy: GeometryPolicy::Skip,
        ..NetworkOptions::default()
    };
    let result = build_network(&records, None, &options).expect("skip run succeeds");
    assert_eq!(result.nodes_count, 3);
    assert_eq!(result.edges_count, 2);
}

#[test]
fn geojson_records_flow_through_the_pipeline() {
    let raw = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [30.3, 59.9]},
                "properties": {"building": "warehouse", "name": null}
            },
            {
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[30.39, 59.79], [30.41, 59.79], [30.41, 59.81], [30.39, 59.81], [30.39, 59.79]]]
                },
                "properties": {"building": "depot"}
            }
        ]
    }"#;
    let records = records_from_geojson(raw).expect("valid geojson");
    let result =
        build_network(&records, None, &NetworkOptions::default()).expect("pipeline succeeds");

    assert_eq!(result.nodes_count, 2);
    assert_eq!(result.edges_count, 1);
    // The polygon record collapsed to its centroid.
    let centroid = &result.points[1];
    assert!((centroid.lat - 59.8).abs() < 1e-9);
    assert!((centroid.lon - 30.4).abs() < 1e-9);
    // Explicit nulls survive scrubbing.
    assert_eq!(
        result.points[0].tags.get("name"),
        Some(&serde_json::Value::Null)
    );
}

#[test]
fn file_loading_matches_inline_parsing() {
    let raw = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [30.3, 59.9]},
                "properties": {"name": "solo"}
            }
        ]
    }"#;
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("facilities.geojson");
    std::fs::write(&path, raw).expect("write fixture");

    let from_file = load_facilities(&path).expect("loads from disk");
    let inline = records_from_geojson(raw).expect("parses inline");
    assert_eq!(from_file, inline);
}
