//! Path tracer: greedy, non-backtracking walk that consumes one unvisited
//! edge at a time.
//!
//! At every step the tracer takes the **first** neighbor (in stored
//! order) whose edge key has not been consumed. It never looks ahead and
//! never reconsiders a choice, so the decomposition depends only on
//! neighbor order. The walk stops when the current point has no
//! unconsumed edge left, or right after stepping onto an endpoint or
//! junction (which is included as the path's last point).

use std::collections::HashSet;

use crate::classify::Classification;
use crate::graph::{NodeId, SegmentGraph};
use crate::types::{EdgeKey, Point, Polyline};

/// Edge keys consumed so far during one extraction run.
///
/// The set only grows. Consuming the same key twice means the tracer
/// emitted one edge into two polylines, which is a bug, so
/// [`consume`](Self::consume) asserts against it.
#[derive(Debug, Clone, Default)]
pub struct VisitedEdges(HashSet<EdgeKey>);

impl VisitedEdges {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `key` has been consumed.
    #[must_use]
    pub fn contains(&self, key: &EdgeKey) -> bool {
        self.0.contains(key)
    }

    /// Mark `key` as consumed.
    ///
    /// # Panics
    ///
    /// Panics if `key` was already consumed.
    pub fn consume(&mut self, key: EdgeKey) {
        let inserted = self.0.insert(key);
        assert!(inserted, "edge {key:?} consumed twice");
    }

    /// Number of consumed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Trace one polyline from `start`.
///
/// Returns `[start]` alone if `start` is not in the graph or has no
/// unconsumed edge; callers should only trace from points known to
/// have one.
///
/// # Examples
///
/// ```
/// use linemerge_pipeline::{Classification, Point, Segment, SegmentGraph, VisitedEdges, trace_path};
///
/// let graph = SegmentGraph::build(
///     &[
///         Segment::new((0.0, 0.0), (1.0, 0.0)),
///         Segment::new((1.0, 0.0), (2.0, 0.0)),
///     ],
///     6,
/// );
/// let classes = Classification::classify(&graph, 3);
/// let mut visited = VisitedEdges::new();
///
/// let path = trace_path(Point::new(0.0, 0.0), &graph, &mut visited, &classes);
/// assert_eq!(path.len(), 3);
/// assert_eq!(visited.len(), 2);
/// ```
pub fn trace_path(
    start: Point,
    graph: &SegmentGraph,
    visited: &mut VisitedEdges,
    classes: &Classification,
) -> Polyline {
    graph.node_id(start).map_or_else(
        || Polyline::new(vec![start]),
        |id| trace_from(id, graph, visited, classes),
    )
}

/// Arena-index form of [`trace_path`] used by the extractor.
pub(crate) fn trace_from(
    start: NodeId,
    graph: &SegmentGraph,
    visited: &mut VisitedEdges,
    classes: &Classification,
) -> Polyline {
    let mut path = vec![graph.point_at(start)];
    let mut current = start;

    loop {
        let next = graph
            .neighbor_ids(current)
            .iter()
            .copied()
            .find(|&n| !visited.contains(&graph.edge_key(current, n)));

        let Some(next) = next else {
            break;
        };

        visited.consume(graph.edge_key(current, next));
        path.push(graph.point_at(next));

        if classes.is_boundary(next) {
            break;
        }
        current = next;
    }

    Polyline::new(path)
}
