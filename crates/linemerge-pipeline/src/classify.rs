//! Degree classifier: partition graph points into endpoints, junctions,
//! and pass-through points.

use serde::{Deserialize, Serialize};

use crate::graph::{NodeId, SegmentGraph};
use crate::types::Point;

/// Role of a point in the graph, derived from its degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegreeClass {
    /// Exactly one incident edge: a dangling end of the drawing.
    Endpoint,
    /// Two incident edges (or, with a raised threshold, anything below
    /// the junction threshold): lies inside a polyline.
    PassThrough,
    /// At least `junction_threshold` incident edges: a branch point.
    Junction,
}

impl DegreeClass {
    /// Classify a single degree.
    #[must_use]
    pub const fn from_degree(degree: usize, junction_threshold: usize) -> Self {
        if degree == 1 {
            Self::Endpoint
        } else if degree >= junction_threshold {
            Self::Junction
        } else {
            Self::PassThrough
        }
    }

    /// Endpoints and junctions terminate a traced path.
    #[must_use]
    pub const fn is_boundary(self) -> bool {
        matches!(self, Self::Endpoint | Self::Junction)
    }
}

/// Endpoints and junctions of a [`SegmentGraph`], computed once.
///
/// Both lists follow the graph's point order, so enumeration during
/// extraction is reproducible.
#[derive(Debug, Clone)]
pub struct Classification {
    classes: Vec<DegreeClass>,
    endpoints: Vec<Point>,
    junctions: Vec<Point>,
}

impl Classification {
    /// Scan every point of `graph` once and classify it by degree.
    #[must_use]
    pub fn classify(graph: &SegmentGraph, junction_threshold: usize) -> Self {
        let mut classes = Vec::with_capacity(graph.point_count());
        let mut endpoints = Vec::new();
        let mut junctions = Vec::new();

        for (id, &point) in graph.points().iter().enumerate() {
            let class = DegreeClass::from_degree(graph.degree_of(id), junction_threshold);
            match class {
                DegreeClass::Endpoint => endpoints.push(point),
                DegreeClass::Junction => junctions.push(point),
                DegreeClass::PassThrough => {}
            }
            classes.push(class);
        }

        tracing::debug!(
            endpoints = endpoints.len(),
            junctions = junctions.len(),
            junction_threshold,
            "classified points by degree",
        );

        Self {
            classes,
            endpoints,
            junctions,
        }
    }

    /// Degree-1 points, in graph order.
    #[must_use]
    pub fn endpoints(&self) -> &[Point] {
        &self.endpoints
    }

    /// Points at or above the junction threshold, in graph order.
    #[must_use]
    pub fn junctions(&self) -> &[Point] {
        &self.junctions
    }

    /// Class of `point`, or `None` if it is not in `graph`.
    #[must_use]
    pub fn class_of(&self, graph: &SegmentGraph, point: Point) -> Option<DegreeClass> {
        graph.node_id(point).map(|id| self.classes[id])
    }

    pub(crate) fn is_boundary(&self, id: NodeId) -> bool {
        self.classes[id].is_boundary()
    }
}
