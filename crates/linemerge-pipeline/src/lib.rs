//! linemerge-pipeline: pure segment-graph simplification (sans-IO).
//!
//! Merges an unordered bag of 2D line segments into the smallest
//! practical set of polylines without changing the drawn geometry:
//! build graph -> classify degrees -> extract polylines in three phases
//! (endpoints, junctions, remaining loops).
//!
//! Every output edge corresponds to exactly one input edge key, and
//! every polyline starts and ends on an endpoint, a junction, or (for a
//! closed loop) its own start point.
//!
//! This crate has **no I/O dependencies**. Reading and writing drawing
//! files lives in `linemerge-formats`.

pub mod classify;
pub mod components;
pub mod diagnostics;
pub mod extract;
pub mod graph;
pub mod pipeline;
pub mod stats;
pub mod trace;
pub mod types;

pub use classify::{Classification, DegreeClass};
pub use components::count_components;
pub use diagnostics::{Clock, PipelineDiagnostics, StageDiagnostics, StageMetrics, SystemClock};
pub use extract::{Extraction, Phase, TracedPolyline, extract_polylines};
pub use graph::SegmentGraph;
pub use pipeline::{Pipeline, SimplifyResult};
pub use stats::{PhaseCounts, SimplifyStats};
pub use trace::{VisitedEdges, trace_path};
pub use types::{EdgeKey, PipelineError, Point, Polyline, Segment, SimplifyConfig};

/// Run the full simplification pipeline.
///
/// # Pipeline steps
///
/// 1. Validate the config
/// 2. Round endpoints and build the segment graph (degenerate segments
///    are dropped)
/// 3. Classify points into endpoints and junctions
/// 4. Extract polylines: endpoints first, then junctions, then loops
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` is out of range.
/// Returns [`PipelineError::NothingToSimplify`] if no non-degenerate
/// segment remains.
///
/// # Examples
///
/// ```
/// use linemerge_pipeline::{Segment, SimplifyConfig, process};
///
/// let result = process(
///     &[
///         Segment::new((1.0, 0.0), (2.0, 0.0)),
///         Segment::new((0.0, 0.0), (1.0, 0.0)),
///     ],
///     &SimplifyConfig::default(),
/// )?;
/// assert_eq!(result.polylines.len(), 1);
/// assert_eq!(result.stats.reduction_ratio, Some(2.0));
/// # Ok::<(), linemerge_pipeline::PipelineError>(())
/// ```
pub fn process(segments: &[Segment], config: &SimplifyConfig) -> Result<SimplifyResult, PipelineError> {
    config.validate()?;

    let graph = SegmentGraph::build(segments, config.precision);
    if graph.is_empty() {
        return Err(PipelineError::NothingToSimplify);
    }
    let classes = Classification::classify(&graph, config.junction_threshold);
    let extraction = extract_polylines(&graph, &classes);
    let components = count_components(&graph);

    let stats = SimplifyStats::collect(&graph, &classes, &extraction, components);
    Ok(SimplifyResult {
        polylines: extraction.into_polylines(),
        stats,
    })
}

/// Run the full pipeline and collect per-stage diagnostics.
///
/// Produces the same [`SimplifyResult`] as [`process`], plus timings
/// read from `clock` around each stage.
///
/// # Errors
///
/// Same as [`process`].
pub fn process_with_diagnostics(
    segments: &[Segment],
    config: &SimplifyConfig,
    clock: &impl Clock,
) -> Result<(SimplifyResult, PipelineDiagnostics), PipelineError> {
    config.validate()?;
    let start = clock.now();

    let graph = SegmentGraph::build(segments, config.precision);
    let graph_done = clock.now();
    if graph.is_empty() {
        return Err(PipelineError::NothingToSimplify);
    }

    let classes = Classification::classify(&graph, config.junction_threshold);
    let classify_done = clock.now();

    let extraction = extract_polylines(&graph, &classes);
    let components = count_components(&graph);
    let extract_done = clock.now();

    let diagnostics = PipelineDiagnostics {
        build_graph: StageDiagnostics {
            duration: graph_done.saturating_sub(start),
            metrics: StageMetrics::BuildGraph {
                segments: graph.segment_count(),
                degenerate: graph.degenerate_count(),
                points: graph.point_count(),
                edge_keys: graph.edge_key_count(),
            },
        },
        classify: StageDiagnostics {
            duration: classify_done.saturating_sub(graph_done),
            metrics: StageMetrics::Classify {
                junction_threshold: config.junction_threshold,
                endpoints: classes.endpoints().len(),
                junctions: classes.junctions().len(),
            },
        },
        extract: StageDiagnostics {
            duration: extract_done.saturating_sub(classify_done),
            metrics: StageMetrics::Extract {
                polylines: extraction.len(),
                from_endpoints: extraction.count_in(Phase::Endpoints),
                from_junctions: extraction.count_in(Phase::Junctions),
                loops: extraction.count_in(Phase::Remainder),
            },
        },
        total_duration: extract_done.saturating_sub(start),
    };

    let stats = SimplifyStats::collect(&graph, &classes, &extraction, components);
    let result = SimplifyResult {
        polylines: extraction.into_polylines(),
        stats,
    };
    Ok((result, diagnostics))
}
