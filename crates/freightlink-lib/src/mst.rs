//! Spanning Tree Engine: Kruskal's algorithm over the complete graph.

use tracing::debug;

use crate::graph::{DistanceGraph, WeightedEdge};

/// Compute the minimum spanning tree of `graph`.
///
/// Edges are considered in the total order `(weight, a, b)` with
/// `f64::total_cmp` on the weight, so ties resolve identically across runs.
/// Returns exactly `n - 1` edges for `n >= 1` nodes of a connected input;
/// the complete graph emitted by the builder is always connected, so a
/// shortfall can only mean a malformed input graph and is only checked with a
/// debug assertion.
pub fn minimum_spanning_tree(graph: &DistanceGraph) -> Vec<WeightedEdge> {
    let n = graph.node_count();
    if n <= 1 {
        return Vec::new();
    }

    let mut ordered: Vec<WeightedEdge> = graph.edges().to_vec();
    ordered.sort_by(|x, y| {
        x.weight
            .total_cmp(&y.weight)
            .then_with(|| x.a.cmp(&y.a))
            .then_with(|| x.b.cmp(&y.b))
    });

    let mut forest = UnionFind::new(n);
    let mut tree = Vec::with_capacity(n - 1);
    for edge in ordered {
        if forest.union(edge.a, edge.b) {
            tree.push(edge);
            if tree.len() == n - 1 {
                break;
            }
        }
    }

    debug_assert_eq!(tree.len(), n - 1, "complete input graph must be connected");
    debug!(nodes = n, edges = tree.len(), "computed minimum spanning tree");
    tree
}

/// Disjoint-set forest with path halving and union by rank.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        node
    }

    /// Merge the sets containing `a` and `b`; returns `false` if they were
    /// already connected.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return false;
        }
        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }
        true
    }
}
