//! Summary statistics for one simplification run.

use serde::{Deserialize, Serialize};

use crate::classify::Classification;
use crate::extract::{Extraction, Phase};
use crate::graph::SegmentGraph;

/// Polylines discovered by each extraction phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCounts {
    /// Traced from degree-1 points.
    pub endpoints: usize,
    /// Traced from junctions.
    pub junctions: usize,
    /// Closed loops found in the final sweep.
    pub remainder: usize,
}

impl PhaseCounts {
    /// Count for a single phase.
    #[must_use]
    pub const fn get(&self, phase: Phase) -> usize {
        match phase {
            Phase::Endpoints => self.endpoints,
            Phase::Junctions => self.junctions,
            Phase::Remainder => self.remainder,
        }
    }
}

/// Counts describing the input graph and the extracted polylines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifyStats {
    /// Segments supplied, before degeneracy filtering.
    pub segment_count: usize,
    /// Segments dropped as zero-length after rounding.
    pub degenerate_count: usize,
    /// Distinct rounded points.
    pub unique_points: usize,
    /// Distinct edge keys (retraced segments counted once).
    pub edge_keys: usize,
    /// Degree-1 points.
    pub endpoints: usize,
    /// Points at or above the junction threshold.
    pub junctions: usize,
    /// Connected components of the graph.
    pub components: usize,
    /// Polylines produced.
    pub polylines: usize,
    /// Polylines whose first and last points coincide.
    pub closed_loops: usize,
    /// Polylines per extraction phase.
    pub phases: PhaseCounts,
    /// `segment_count / polylines`, or `None` when nothing was produced.
    pub reduction_ratio: Option<f64>,
}

impl SimplifyStats {
    pub(crate) fn collect(
        graph: &SegmentGraph,
        classes: &Classification,
        extraction: &Extraction,
        components: usize,
    ) -> Self {
        let polylines = extraction.len();
        #[allow(clippy::cast_precision_loss)]
        let reduction_ratio =
            (polylines > 0).then(|| graph.segment_count() as f64 / polylines as f64);

        Self {
            segment_count: graph.segment_count(),
            degenerate_count: graph.degenerate_count(),
            unique_points: graph.point_count(),
            edge_keys: graph.edge_key_count(),
            endpoints: classes.endpoints().len(),
            junctions: classes.junctions().len(),
            components,
            polylines,
            closed_loops: extraction.polylines().filter(|p| p.is_closed()).count(),
            phases: PhaseCounts {
                endpoints: extraction.count_in(Phase::Endpoints),
                junctions: extraction.count_in(Phase::Junctions),
                remainder: extraction.count_in(Phase::Remainder),
            },
            reduction_ratio,
        }
    }

    /// Format the statistics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Simplification Report\n{}", "=".repeat(40)));
        lines.push(format!(
            "{:<22} {:>10}",
            "Input segments", self.segment_count
        ));
        lines.push(format!(
            "{:<22} {:>10}",
            "Degenerate dropped", self.degenerate_count
        ));
        lines.push(format!("{:<22} {:>10}", "Unique points", self.unique_points));
        lines.push(format!("{:<22} {:>10}", "Edges", self.edge_keys));
        lines.push(format!("{:<22} {:>10}", "Endpoints", self.endpoints));
        lines.push(format!("{:<22} {:>10}", "Junctions", self.junctions));
        lines.push(format!("{:<22} {:>10}", "Components", self.components));
        lines.push("-".repeat(40));
        lines.push(format!("{:<22} {:>10}", "Polylines", self.polylines));
        lines.push(format!("{:<22} {:>10}", "Closed loops", self.closed_loops));
        lines.push(format!(
            "{:<22} {:>10}",
            "  from endpoints", self.phases.endpoints
        ));
        lines.push(format!(
            "{:<22} {:>10}",
            "  from junctions", self.phases.junctions
        ));
        lines.push(format!(
            "{:<22} {:>10}",
            "  from loops", self.phases.remainder
        ));

        let ratio = self
            .reduction_ratio
            .map_or_else(|| "n/a".to_owned(), |r| format!("{r:.2}x"));
        lines.push(format!("{:<22} {ratio:>10}", "Reduction"));

        lines.join("\n")
    }
}
