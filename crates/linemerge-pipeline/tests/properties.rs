//! Property tests for the extraction laws that must hold on any input.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use linemerge_pipeline::{
    Classification, DegreeClass, EdgeKey, Point, Polyline, Segment, SegmentGraph, SimplifyConfig,
    extract_polylines, process,
};
use proptest::prelude::*;

/// Segments on a small integer grid so endpoints collide often and
/// junctions, loops and retraced segments all show up.
fn grid_segments() -> impl Strategy<Value = Vec<Segment>> {
    let coord = (0i32..5, 0i32..5);
    prop::collection::vec((coord.clone(), coord), 1..40).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|((x0, y0), (x1, y1))| {
                Segment::new(
                    (f64::from(x0), f64::from(y0)),
                    (f64::from(x1), f64::from(y1)),
                )
            })
            .collect()
    })
}

/// Keep only the first segment per undirected edge, dropping degenerate ones.
fn without_repeats(segments: &[Segment]) -> Vec<Segment> {
    let mut seen = HashSet::new();
    segments
        .iter()
        .copied()
        .filter(|s| {
            let a = Point::from(s.start);
            let b = Point::from(s.end);
            a != b && seen.insert(EdgeKey::new(a, b))
        })
        .collect()
}

/// Each polyline as a sorted list of its edge keys, and the list sorted,
/// so that re-traversals of the same paths compare equal.
fn edge_structure(polylines: &[Polyline]) -> Vec<Vec<EdgeKey>> {
    let mut structure: Vec<Vec<EdgeKey>> = polylines
        .iter()
        .map(|p| {
            let mut keys: Vec<EdgeKey> = p.edge_keys().collect();
            keys.sort_unstable();
            keys
        })
        .collect();
    structure.sort_unstable();
    structure
}

proptest! {
    #[test]
    fn every_edge_is_covered_exactly_once(segments in grid_segments()) {
        let graph = SegmentGraph::build(&segments, 6);
        let classes = Classification::classify(&graph, 3);
        let extraction = extract_polylines(&graph, &classes);

        let mut covered = HashSet::new();
        for polyline in extraction.polylines() {
            prop_assert!(polyline.len() >= 2);
            for key in polyline.edge_keys() {
                prop_assert!(covered.insert(key), "edge {key:?} emitted twice");
            }
        }
        prop_assert_eq!(covered, graph.edge_keys());
    }

    #[test]
    fn boundaries_never_appear_mid_path(segments in grid_segments()) {
        let graph = SegmentGraph::build(&segments, 6);
        let classes = Classification::classify(&graph, 3);
        let extraction = extract_polylines(&graph, &classes);

        for polyline in extraction.polylines() {
            let points = polyline.points();
            for &interior in &points[1..points.len() - 1] {
                let class = classes.class_of(&graph, interior).unwrap();
                prop_assert_eq!(class, DegreeClass::PassThrough);
            }
        }

        let ends: HashSet<Point> = extraction
            .polylines()
            .flat_map(|p| [p.first().copied(), p.last().copied()])
            .flatten()
            .collect();
        for endpoint in classes.endpoints() {
            prop_assert!(ends.contains(endpoint));
        }
    }

    #[test]
    fn degenerate_segments_change_nothing(
        segments in grid_segments(),
        extra in prop::collection::vec((0i32..5, 0i32..5, 0usize..40), 1..5),
    ) {
        let config = SimplifyConfig::default();
        let baseline = process(&segments, &config);

        let mut noisy = segments.clone();
        for (x, y, at) in extra {
            let p = (f64::from(x), f64::from(y));
            let nudged = (p.0 + 1e-9, p.1);
            noisy.insert(at.min(noisy.len()), Segment::new(p, nudged));
        }
        let with_degenerate = process(&noisy, &config);

        match (baseline, with_degenerate) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.polylines, b.polylines);
                prop_assert_eq!(b.stats.degenerate_count, a.stats.degenerate_count + (noisy.len() - segments.len()));
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            (a, b) => prop_assert!(false, "outcomes differ: {a:?} vs {b:?}"),
        }
    }

    #[test]
    fn rerunning_on_output_keeps_structure(segments in grid_segments()) {
        let segments = without_repeats(&segments);
        prop_assume!(!segments.is_empty());
        let config = SimplifyConfig::default();

        let first = process(&segments, &config).unwrap();
        let replay: Vec<Segment> = first.polylines.iter().flat_map(Polyline::to_segments).collect();
        let second = process(&replay, &config).unwrap();

        prop_assert_eq!(edge_structure(&first.polylines), edge_structure(&second.polylines));
        prop_assert_eq!(first.stats.edge_keys, second.stats.edge_keys);
    }
}
