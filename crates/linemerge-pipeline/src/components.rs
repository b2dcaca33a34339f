//! Connected-component counting over the segment graph.
//!
//! No edge joins two components, so extraction of one component never
//! touches the visited edges of another.

use petgraph::unionfind::UnionFind;

use crate::graph::SegmentGraph;

/// Number of connected components in `graph`.
///
/// Zero for an empty graph. Isolated points cannot occur because every
/// node is created by a non-degenerate segment.
#[must_use]
pub fn count_components(graph: &SegmentGraph) -> usize {
    let n = graph.point_count();
    if n == 0 {
        return 0;
    }

    let mut uf = UnionFind::<usize>::new(n);
    for a in 0..n {
        for &b in graph.neighbor_ids(a) {
            uf.union(a, b);
        }
    }

    let mut roots = uf.into_labeling();
    roots.sort_unstable();
    roots.dedup();
    roots.len()
}
