//! Extraction orchestrator: cover every edge of the graph exactly once
//! with polylines.
//!
//! # Phases
//!
//! 1. **Endpoints**: trace from every degree-1 point, so loose ends of
//!    the drawing become polyline boundaries instead of being swallowed
//!    mid-path.
//! 2. **Junctions**: drain the remaining branches around every
//!    junction, so junctions also end up as boundaries.
//! 3. **Remainder**: sweep every point in graph order. Only closed
//!    loops made entirely of degree-2 points are left at this stage.
//!
//! The phase order fixes where boundaries fall when several equally
//! valid decompositions exist. Within a phase, points are visited in
//! graph order and neighbors in insertion order.

use serde::{Deserialize, Serialize};

use crate::classify::Classification;
use crate::graph::{NodeId, SegmentGraph};
use crate::trace::{VisitedEdges, trace_from};
use crate::types::{Point, Polyline};

/// Which extraction pass discovered a polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Traced from a degree-1 point.
    Endpoints,
    /// Traced from a junction.
    Junctions,
    /// Traced from any remaining point (closed loops).
    Remainder,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Self; 3] = [Self::Endpoints, Self::Junctions, Self::Remainder];
}

/// A polyline together with the phase that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracedPolyline {
    /// The traced path.
    pub polyline: Polyline,
    /// The phase that discovered it.
    pub phase: Phase,
}

/// Output of [`extract_polylines`], in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    traced: Vec<TracedPolyline>,
}

impl Extraction {
    /// Every traced polyline with its phase, in discovery order.
    #[must_use]
    pub fn traced(&self) -> &[TracedPolyline] {
        &self.traced
    }

    /// Number of polylines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.traced.len()
    }

    /// Returns `true` if nothing was traced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traced.is_empty()
    }

    /// Number of polylines discovered in `phase`.
    #[must_use]
    pub fn count_in(&self, phase: Phase) -> usize {
        self.traced.iter().filter(|t| t.phase == phase).count()
    }

    /// Iterate over the polylines in discovery order.
    pub fn polylines(&self) -> impl Iterator<Item = &Polyline> {
        self.traced.iter().map(|t| &t.polyline)
    }

    /// Discard phase information and keep the polylines.
    #[must_use]
    pub fn into_polylines(self) -> Vec<Polyline> {
        self.traced.into_iter().map(|t| t.polyline).collect()
    }
}

/// Decompose `graph` into polylines covering every edge key exactly once.
///
/// # Panics
///
/// Panics if an edge key is left unconsumed after the final phase. That
/// cannot happen for a graph built by [`SegmentGraph::build`]; it would
/// indicate a defect in the tracer.
///
/// # Examples
///
/// ```
/// use linemerge_pipeline::{Classification, Phase, Segment, SegmentGraph, extract_polylines};
///
/// // A closed square: every point has degree 2.
/// let graph = SegmentGraph::build(
///     &[
///         Segment::new((0.0, 0.0), (1.0, 0.0)),
///         Segment::new((1.0, 0.0), (1.0, 1.0)),
///         Segment::new((1.0, 1.0), (0.0, 1.0)),
///         Segment::new((0.0, 1.0), (0.0, 0.0)),
///     ],
///     6,
/// );
/// let classes = Classification::classify(&graph, 3);
/// let extraction = extract_polylines(&graph, &classes);
///
/// assert_eq!(extraction.len(), 1);
/// assert_eq!(extraction.traced()[0].phase, Phase::Remainder);
/// assert_eq!(extraction.traced()[0].polyline.len(), 5);
/// ```
#[must_use]
pub fn extract_polylines(graph: &SegmentGraph, classes: &Classification) -> Extraction {
    let mut visited = VisitedEdges::new();
    let mut traced = Vec::new();

    let endpoint_ids = ids_of(graph, classes.endpoints());
    drain_from(
        &endpoint_ids,
        Phase::Endpoints,
        graph,
        classes,
        &mut visited,
        &mut traced,
    );

    let junction_ids = ids_of(graph, classes.junctions());
    drain_from(
        &junction_ids,
        Phase::Junctions,
        graph,
        classes,
        &mut visited,
        &mut traced,
    );

    let all_ids: Vec<NodeId> = (0..graph.point_count()).collect();
    drain_from(
        &all_ids,
        Phase::Remainder,
        graph,
        classes,
        &mut visited,
        &mut traced,
    );

    assert_eq!(
        visited.len(),
        graph.edge_key_count(),
        "extraction left edges unconsumed",
    );

    let extraction = Extraction { traced };
    tracing::debug!(
        polylines = extraction.len(),
        from_endpoints = extraction.count_in(Phase::Endpoints),
        from_junctions = extraction.count_in(Phase::Junctions),
        loops = extraction.count_in(Phase::Remainder),
        "extracted polylines",
    );
    extraction
}

/// Arena indices for `points`, which all come from `graph`.
fn ids_of(graph: &SegmentGraph, points: &[Point]) -> Vec<NodeId> {
    points.iter().filter_map(|&p| graph.node_id(p)).collect()
}

/// Run one phase: for each start point, for each of its neighbors whose
/// edge is still unconsumed, trace a path from the start point.
fn drain_from(
    starts: &[NodeId],
    phase: Phase,
    graph: &SegmentGraph,
    classes: &Classification,
    visited: &mut VisitedEdges,
    out: &mut Vec<TracedPolyline>,
) {
    for &start in starts {
        for &neighbor in graph.neighbor_ids(start) {
            if visited.contains(&graph.edge_key(start, neighbor)) {
                continue;
            }
            let polyline = trace_from(start, graph, visited, classes);
            if polyline.len() >= 2 {
                out.push(TracedPolyline { polyline, phase });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point, Segment};

    fn extract(segments: &[Segment]) -> Extraction {
        let graph = SegmentGraph::build(segments, 6);
        let classes = Classification::classify(&graph, 3);
        extract_polylines(&graph, &classes)
    }

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn empty_graph_yields_nothing() {
        let extraction = extract(&[]);
        assert!(extraction.is_empty());
    }

    #[test]
    fn simple_chain_becomes_one_polyline() {
        let extraction = extract(&[
            Segment::new((0.0, 0.0), (1.0, 0.0)),
            Segment::new((1.0, 0.0), (2.0, 0.0)),
            Segment::new((2.0, 0.0), (3.0, 0.0)),
        ]);
        assert_eq!(extraction.len(), 1);
        assert_eq!(extraction.traced()[0].phase, Phase::Endpoints);
        assert_eq!(
            extraction.traced()[0].polyline.points(),
            pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]).as_slice()
        );
    }

    #[test]
    fn shuffled_chain_still_one_polyline() {
        let extraction = extract(&[
            Segment::new((2.0, 0.0), (1.0, 0.0)),
            Segment::new((3.0, 0.0), (2.0, 0.0)),
            Segment::new((0.0, 0.0), (1.0, 0.0)),
        ]);
        assert_eq!(extraction.len(), 1);
        assert_eq!(extraction.traced()[0].polyline.len(), 4);
    }

    #[test]
    fn branching_junction_splits_into_three() {
        // (1,0) has degree 3; each arm ends in an endpoint.
        let extraction = extract(&[
            Segment::new((0.0, 0.0), (1.0, 0.0)),
            Segment::new((1.0, 0.0), (2.0, 0.0)),
            Segment::new((1.0, 0.0), (1.0, 1.0)),
        ]);
        assert_eq!(extraction.len(), 3);
        for traced in extraction.traced() {
            assert_eq!(traced.phase, Phase::Endpoints);
            assert_eq!(traced.polyline.len(), 2);
            assert_eq!(traced.polyline.last(), Some(&Point::new(1.0, 0.0)));
        }
    }

    #[test]
    fn junction_to_junction_branch_found_in_phase_two() {
        // Two junctions (0,0) and (2,0) connected through (1,0); each has
        // two dangling arms.
        let extraction = extract(&[
            Segment::new((0.0, 0.0), (1.0, 0.0)),
            Segment::new((1.0, 0.0), (2.0, 0.0)),
            Segment::new((0.0, 0.0), (-1.0, 1.0)),
            Segment::new((0.0, 0.0), (-1.0, -1.0)),
            Segment::new((2.0, 0.0), (3.0, 1.0)),
            Segment::new((2.0, 0.0), (3.0, -1.0)),
        ]);
        assert_eq!(extraction.count_in(Phase::Endpoints), 4);
        assert_eq!(extraction.count_in(Phase::Junctions), 1);
        let bridge = extraction
            .traced()
            .iter()
            .find(|t| t.phase == Phase::Junctions)
            .map(|t| t.polyline.points().to_vec());
        assert_eq!(
            bridge,
            Some(pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]))
        );
    }

    #[test]
    fn square_loop_found_in_phase_three() {
        let extraction = extract(&[
            Segment::new((0.0, 0.0), (1.0, 0.0)),
            Segment::new((1.0, 0.0), (1.0, 1.0)),
            Segment::new((1.0, 1.0), (0.0, 1.0)),
            Segment::new((0.0, 1.0), (0.0, 0.0)),
        ]);
        assert_eq!(extraction.len(), 1);
        let traced = &extraction.traced()[0];
        assert_eq!(traced.phase, Phase::Remainder);
        assert_eq!(
            traced.polyline.points(),
            pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]).as_slice()
        );
    }

    #[test]
    fn loop_through_junction_starts_and_ends_at_junction() {
        // A triangle hanging off a tail: (0,0) has degree 3.
        let extraction = extract(&[
            Segment::new((-1.0, 0.0), (0.0, 0.0)),
            Segment::new((0.0, 0.0), (1.0, 0.0)),
            Segment::new((1.0, 0.0), (0.0, 1.0)),
            Segment::new((0.0, 1.0), (0.0, 0.0)),
        ]);
        assert_eq!(extraction.len(), 2);
        let lasso = &extraction.traced()[1];
        assert_eq!(lasso.phase, Phase::Junctions);
        assert!(lasso.polyline.is_closed());
        assert_eq!(lasso.polyline.first(), Some(&Point::new(0.0, 0.0)));
    }

    #[test]
    fn retraced_pair_forms_two_point_polyline() {
        let extraction = extract(&[
            Segment::new((0.0, 0.0), (1.0, 0.0)),
            Segment::new((0.0, 0.0), (1.0, 0.0)),
        ]);
        assert_eq!(extraction.len(), 1);
        assert_eq!(extraction.traced()[0].phase, Phase::Remainder);
        assert_eq!(extraction.traced()[0].polyline.len(), 2);
    }

    #[test]
    fn disjoint_pieces_each_get_a_polyline() {
        let extraction = extract(&[
            Segment::new((0.0, 0.0), (1.0, 0.0)),
            Segment::new((10.0, 0.0), (11.0, 0.0)),
            Segment::new((11.0, 0.0), (12.0, 0.0)),
        ]);
        assert_eq!(extraction.len(), 2);
        let lens: Vec<usize> = extraction.polylines().map(Polyline::len).collect();
        assert_eq!(lens, vec![2, 3]);
    }

    #[test]
    fn into_polylines_preserves_order() {
        let extraction = extract(&[
            Segment::new((0.0, 0.0), (1.0, 0.0)),
            Segment::new((10.0, 0.0), (11.0, 0.0)),
        ]);
        let polylines = extraction.into_polylines();
        assert_eq!(polylines[0].first(), Some(&Point::new(0.0, 0.0)));
        assert_eq!(polylines[1].first(), Some(&Point::new(10.0, 0.0)));
    }
}
