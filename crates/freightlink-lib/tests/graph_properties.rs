//! Structural properties of the distance graph builder and the spanning tree
//! engine.

mod common;

use freightlink_lib::{
    build_complete_graph, extract_points, haversine_distance, minimum_spanning_tree,
    FacilityRecord, GeometryPolicy,
};

fn extracted(records: &[FacilityRecord]) -> Vec<freightlink_lib::LocatedPoint> {
    extract_points(records, GeometryPolicy::Strict)
        .expect("fixture records are valid")
        .points
}

fn ring_records(count: usize) -> Vec<FacilityRecord> {
    (0..count)
        .map(|i| {
            let angle = i as f64 / count.max(1) as f64 * std::f64::consts::TAU;
            FacilityRecord::point(59.9 + 0.05 * angle.sin(), 30.3 + 0.1 * angle.cos())
        })
        .collect()
}

#[test]
fn builder_emits_all_unordered_pairs() {
    for n in 2..=8usize {
        let points = extracted(&ring_records(n));
        let graph = build_complete_graph(&points);
        assert_eq!(graph.edges().len(), n * (n - 1) / 2, "n = {n}");
        assert!(graph.edges().iter().all(|edge| edge.weight >= 0.0));
    }
}

#[test]
fn geodesic_weights_are_symmetric() {
    let points = extracted(&common::diagonal_facilities());
    for i in 0..points.len() {
        for j in 0..points.len() {
            let forward = haversine_distance(
                points[i].latitude,
                points[i].longitude,
                points[j].latitude,
                points[j].longitude,
            );
            let backward = haversine_distance(
                points[j].latitude,
                points[j].longitude,
                points[i].latitude,
                points[i].longitude,
            );
            assert!((forward - backward).abs() < 1e-9);
        }
    }
}

#[test]
fn spanning_tree_has_n_minus_1_edges_and_connects_everything() {
    for n in 1..=8usize {
        let points = extracted(&ring_records(n));
        let graph = build_complete_graph(&points);
        let tree = minimum_spanning_tree(&graph);
        assert_eq!(tree.len(), n - 1, "n = {n}");

        // Union-find reachability: the tree must be acyclic and span every
        // node.
        let mut parent: Vec<usize> = (0..n).collect();
        fn find(parent: &mut [usize], mut node: usize) -> usize {
            while parent[node] != node {
                parent[node] = parent[parent[node]];
                node = parent[node];
            }
            node
        }
        for edge in &tree {
            let (ra, rb) = (find(&mut parent, edge.a), find(&mut parent, edge.b));
            assert_ne!(ra, rb, "tree edge ({}, {}) closes a cycle", edge.a, edge.b);
            parent[ra] = rb;
        }
        let root = find(&mut parent, 0);
        for node in 1..n {
            assert_eq!(find(&mut parent, node), root, "node {node} disconnected");
        }
    }
}

#[test]
fn triangle_spanning_tree_drops_the_longest_side() {
    let points = extracted(&common::diagonal_facilities());
    let graph = build_complete_graph(&points);
    assert_eq!(graph.edges().len(), 3);

    let tree = minimum_spanning_tree(&graph);
    assert_eq!(tree.len(), 2);

    // The (0, 2) side spans the whole diagonal and is strictly longer than
    // either of the two short sides, so it can never be in the tree.
    assert!(!tree.iter().any(|edge| (edge.a, edge.b) == (0, 2)));
    let longest = graph
        .edges()
        .iter()
        .map(|edge| edge.weight)
        .fold(f64::NEG_INFINITY, f64::max);
    let tree_max = tree
        .iter()
        .map(|edge| edge.weight)
        .fold(f64::NEG_INFINITY, f64::max);
    assert!(tree_max < longest);
}
