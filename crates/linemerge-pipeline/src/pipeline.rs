//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process`] which runs everything in one call,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use linemerge_pipeline::{Pipeline, PipelineError, Segment, SimplifyConfig};
//! # fn run(segments: Vec<Segment>) -> Result<(), PipelineError> {
//! let classified = Pipeline::new(segments, SimplifyConfig::default())
//!     .build_graph()
//!     .classify();
//! println!("{} junctions", classified.classification().junctions().len());
//!
//! let result = classified.extract()?.into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for fallible stages), carrying the graph and every
//! intermediate computed so far.

use serde::{Deserialize, Serialize};

use crate::classify::Classification;
use crate::components::count_components;
use crate::extract::{Extraction, extract_polylines};
use crate::graph::SegmentGraph;
use crate::stats::SimplifyStats;
use crate::types::{PipelineError, Polyline, Segment, SimplifyConfig};

/// Final output of a simplification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifyResult {
    /// Extracted polylines in discovery order.
    pub polylines: Vec<Polyline>,
    /// Summary counts.
    pub stats: SimplifyStats,
}

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// Call [`build_graph`](Self::build_graph) to advance.
#[must_use = "pipeline stages are consumed by advancing — call .build_graph() to continue"]
pub struct Pending {
    config: SimplifyConfig,
    segments: Vec<Segment>,
}

impl Pending {
    /// The raw input segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Round endpoints, drop degenerate segments and build the graph.
    pub fn build_graph(self) -> GraphBuilt {
        let graph = SegmentGraph::build(&self.segments, self.config.precision);
        GraphBuilt {
            config: self.config,
            graph,
        }
    }
}

// ───────────────────────── Stage 1: GraphBuilt ───────────────────────

/// Pipeline state after the segment graph has been built.
#[must_use = "pipeline stages are consumed by advancing — call .classify() to continue"]
pub struct GraphBuilt {
    config: SimplifyConfig,
    graph: SegmentGraph,
}

impl GraphBuilt {
    /// The segment graph.
    #[must_use]
    pub const fn graph(&self) -> &SegmentGraph {
        &self.graph
    }

    /// Classify every point by degree.
    pub fn classify(self) -> Classified {
        let classes = Classification::classify(&self.graph, self.config.junction_threshold);
        Classified {
            graph: self.graph,
            classes,
        }
    }
}

// ───────────────────────── Stage 2: Classified ───────────────────────

/// Pipeline state after degree classification.
#[must_use = "pipeline stages are consumed by advancing — call .extract() to continue"]
pub struct Classified {
    graph: SegmentGraph,
    classes: Classification,
}

impl Classified {
    /// The segment graph.
    #[must_use]
    pub const fn graph(&self) -> &SegmentGraph {
        &self.graph
    }

    /// Endpoints and junctions.
    #[must_use]
    pub const fn classification(&self) -> &Classification {
        &self.classes
    }

    /// Run the three extraction phases.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NothingToSimplify`] if no usable segment
    /// survived graph construction.
    pub fn extract(self) -> Result<Extracted, PipelineError> {
        if self.graph.is_empty() {
            return Err(PipelineError::NothingToSimplify);
        }
        let extraction = extract_polylines(&self.graph, &self.classes);
        let components = count_components(&self.graph);
        Ok(Extracted {
            graph: self.graph,
            classes: self.classes,
            extraction,
            components,
        })
    }
}

// ───────────────────────── Stage 3: Extracted ────────────────────────

/// Pipeline state after extraction, the final stage.
///
/// Call [`into_result`](Self::into_result) to obtain the polylines and
/// statistics.
#[must_use = "call .into_result() to extract the SimplifyResult"]
pub struct Extracted {
    graph: SegmentGraph,
    classes: Classification,
    extraction: Extraction,
    components: usize,
}

impl Extracted {
    /// The extracted polylines with their phases.
    #[must_use]
    pub const fn extraction(&self) -> &Extraction {
        &self.extraction
    }

    /// Number of connected components in the graph.
    #[must_use]
    pub const fn components(&self) -> usize {
        self.components
    }

    /// Statistics for this run.
    #[must_use]
    pub fn stats(&self) -> SimplifyStats {
        SimplifyStats::collect(&self.graph, &self.classes, &self.extraction, self.components)
    }

    /// Consume the pipeline and return the polylines and statistics.
    #[must_use]
    pub fn into_result(self) -> SimplifyResult {
        let stats = self.stats();
        SimplifyResult {
            polylines: self.extraction.into_polylines(),
            stats,
        }
    }
}

/// Entry point for the staged API.
///
/// ```rust
/// # use linemerge_pipeline::{Pipeline, Segment, SimplifyConfig};
/// let result = Pipeline::new(
///     vec![
///         Segment::new((0.0, 0.0), (1.0, 0.0)),
///         Segment::new((1.0, 0.0), (2.0, 0.0)),
///     ],
///     SimplifyConfig::default(),
/// )
/// .build_graph()
/// .classify()
/// .extract()
/// .map(|stage| stage.into_result());
/// assert_eq!(result.map(|r| r.polylines.len()).ok(), Some(1));
/// ```
///
/// Each stage method consumes the current state and returns the next,
/// making it a compile-time error to skip stages or call them out of
/// order.
pub struct Pipeline;

impl Pipeline {
    /// Create a new pipeline from raw segments and config.
    ///
    /// No processing is performed and the config is not validated; use
    /// [`crate::process`] for a checked one-shot run.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(segments: Vec<Segment>, config: SimplifyConfig) -> Pending {
        Pending { config, segments }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::extract::Phase;
    use crate::types::Point;

    fn branching() -> Vec<Segment> {
        vec![
            Segment::new((0.0, 0.0), (1.0, 0.0)),
            Segment::new((1.0, 0.0), (2.0, 0.0)),
            Segment::new((1.0, 0.0), (1.0, 1.0)),
        ]
    }

    #[test]
    fn pending_exposes_segments() {
        let pending = Pipeline::new(branching(), SimplifyConfig::default());
        assert_eq!(pending.segments().len(), 3);
    }

    #[test]
    fn graph_built_exposes_graph() {
        let built = Pipeline::new(branching(), SimplifyConfig::default()).build_graph();
        assert_eq!(built.graph().point_count(), 4);
        assert_eq!(built.graph().degree(Point::new(1.0, 0.0)), 3);
    }

    #[test]
    fn classified_exposes_classification() {
        let classified = Pipeline::new(branching(), SimplifyConfig::default())
            .build_graph()
            .classify();
        assert_eq!(
            classified.classification().junctions(),
            &[Point::new(1.0, 0.0)]
        );
        assert_eq!(classified.graph().edge_key_count(), 3);
    }

    #[test]
    fn raised_threshold_turns_junction_into_pass_through() {
        let config = SimplifyConfig {
            junction_threshold: 4,
            ..SimplifyConfig::default()
        };
        let classified = Pipeline::new(branching(), config).build_graph().classify();
        assert!(classified.classification().junctions().is_empty());
    }

    #[test]
    fn extract_empty_graph_is_an_error() {
        let result = Pipeline::new(
            vec![Segment::new((1.0, 1.0), (1.0, 1.0))],
            SimplifyConfig::default(),
        )
        .build_graph()
        .classify()
        .extract();
        assert!(matches!(result, Err(PipelineError::NothingToSimplify)));
    }

    #[test]
    fn extracted_exposes_phases_and_stats() {
        let extracted = Pipeline::new(branching(), SimplifyConfig::default())
            .build_graph()
            .classify()
            .extract()
            .unwrap();
        assert_eq!(extracted.extraction().count_in(Phase::Endpoints), 3);
        assert_eq!(extracted.components(), 1);
        let result = extracted.into_result();
        assert_eq!(result.polylines.len(), 3);
        assert_eq!(result.stats.junctions, 1);
        assert_eq!(result.stats.polylines, 3);
    }
}
