//! Graph builder: turn an unordered bag of segments into an undirected
//! multigraph of rounded points.
//!
//! Points live in an arena in first-appearance order, and each point
//! keeps its neighbors in the order the segments were supplied. Both
//! orders are observable: they decide which polyline boundaries the
//! extractor picks when several decompositions are equally valid, so
//! the same input always yields the same output.
//!
//! A segment repeated between the same two points occupies two slots in
//! each endpoint's neighbor list (it counts twice towards degree) but
//! shares a single [`EdgeKey`].

use std::collections::{HashMap, HashSet};

use crate::types::{EdgeKey, Point, Segment, decimal_scale, round_to_scale};

/// Index of a point in the graph arena.
pub(crate) type NodeId = usize;

/// Undirected multigraph of rounded points built from raw segments.
#[derive(Debug, Clone, Default)]
pub struct SegmentGraph {
    /// Arena of points, in order of first appearance.
    points: Vec<Point>,
    /// Reverse lookup from point to arena index.
    ids: HashMap<Point, NodeId>,
    /// Per-point neighbor lists, parallel to `points`.
    neighbors: Vec<Vec<NodeId>>,
    /// Number of segments supplied, including degenerate ones.
    segment_count: usize,
    /// Segments dropped because both endpoints rounded to the same point.
    degenerate_count: usize,
    /// Number of distinct edge keys.
    edge_key_count: usize,
}

impl SegmentGraph {
    /// Build the graph from raw segments, rounding endpoints to
    /// `precision` decimal digits.
    ///
    /// Zero-length segments (after rounding) are counted and discarded.
    ///
    /// # Examples
    ///
    /// ```
    /// use linemerge_pipeline::{Point, Segment, SegmentGraph};
    ///
    /// let graph = SegmentGraph::build(
    ///     &[
    ///         Segment::new((0.0, 0.0), (1.0, 0.0)),
    ///         Segment::new((1.0, 0.0), (1.0, 0.0)), // degenerate
    ///     ],
    ///     6,
    /// );
    /// assert_eq!(graph.point_count(), 2);
    /// assert_eq!(graph.degenerate_count(), 1);
    /// assert_eq!(graph.degree(Point::new(1.0, 0.0)), 1);
    /// ```
    #[must_use]
    pub fn build(segments: &[Segment], precision: u32) -> Self {
        let scale = decimal_scale(precision);
        let mut graph = Self {
            segment_count: segments.len(),
            ..Self::default()
        };
        let mut keys = HashSet::new();

        for segment in segments {
            let start = Point::new(
                round_to_scale(segment.start.0, scale),
                round_to_scale(segment.start.1, scale),
            );
            let end = Point::new(
                round_to_scale(segment.end.0, scale),
                round_to_scale(segment.end.1, scale),
            );

            if start == end {
                graph.degenerate_count += 1;
                continue;
            }

            let a = graph.intern(start);
            let b = graph.intern(end);
            graph.neighbors[a].push(b);
            graph.neighbors[b].push(a);
            keys.insert(EdgeKey::new(start, end));
        }

        graph.edge_key_count = keys.len();
        tracing::debug!(
            segments = graph.segment_count,
            degenerate = graph.degenerate_count,
            points = graph.points.len(),
            edges = graph.edge_key_count,
            "built segment graph",
        );
        graph
    }

    /// Return the arena index for `point`, inserting it if new.
    fn intern(&mut self, point: Point) -> NodeId {
        if let Some(&id) = self.ids.get(&point) {
            return id;
        }
        let id = self.points.len();
        self.points.push(point);
        self.neighbors.push(Vec::new());
        self.ids.insert(point, id);
        id
    }

    /// Returns `true` if no usable segment was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of unique points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of distinct edge keys (repeated segments counted once).
    #[must_use]
    pub const fn edge_key_count(&self) -> usize {
        self.edge_key_count
    }

    /// Number of segments supplied to [`build`](Self::build).
    #[must_use]
    pub const fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Number of supplied segments discarded as zero-length.
    #[must_use]
    pub const fn degenerate_count(&self) -> usize {
        self.degenerate_count
    }

    /// All points in first-appearance order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns `true` if `point` is a node of the graph.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.ids.contains_key(&point)
    }

    /// Degree of `point`, counting repeated segments with multiplicity.
    /// Zero for points not in the graph.
    #[must_use]
    pub fn degree(&self, point: Point) -> usize {
        self.ids
            .get(&point)
            .map_or(0, |&id| self.neighbors[id].len())
    }

    /// Neighbors of `point` in insertion order (with repeats).
    pub fn neighbors(&self, point: Point) -> impl Iterator<Item = Point> + '_ {
        let ids: &[NodeId] = self
            .ids
            .get(&point)
            .map(|&id| self.neighbors[id].as_slice())
            .unwrap_or_default();
        ids.iter().map(|&n| self.points[n])
    }

    /// The set of all distinct edge keys.
    #[must_use]
    pub fn edge_keys(&self) -> HashSet<EdgeKey> {
        self.neighbors
            .iter()
            .enumerate()
            .flat_map(|(a, list)| {
                list.iter()
                    .map(move |&b| EdgeKey::new(self.points[a], self.points[b]))
            })
            .collect()
    }

    pub(crate) fn node_id(&self, point: Point) -> Option<NodeId> {
        self.ids.get(&point).copied()
    }

    pub(crate) fn point_at(&self, id: NodeId) -> Point {
        self.points[id]
    }

    pub(crate) fn neighbor_ids(&self, id: NodeId) -> &[NodeId] {
        &self.neighbors[id]
    }

    pub(crate) fn degree_of(&self, id: NodeId) -> usize {
        self.neighbors[id].len()
    }

    pub(crate) fn edge_key(&self, a: NodeId, b: NodeId) -> EdgeKey {
        EdgeKey::new(self.points[a], self.points[b])
    }
}
