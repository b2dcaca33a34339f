//! Shared types for the linemerge segment pipeline.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A 2D point in drawing coordinates.
///
/// Points that enter the graph are produced by [`Point::rounded`], which
/// snaps both coordinates to a fixed number of decimal digits so that
/// segments sharing an endpoint compare equal despite floating-point
/// noise in the source file.
///
/// Equality and hashing are **bitwise** on the two coordinates, and the
/// ordering is lexicographic (x, then y) using [`f64::total_cmp`]. The
/// two agree because rounding normalises `-0.0` to `0.0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point from coordinates as given (no rounding).
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Create a point with both coordinates rounded to `precision`
    /// decimal digits.
    ///
    /// # Examples
    ///
    /// ```
    /// use linemerge_pipeline::Point;
    ///
    /// let a = Point::rounded(1.000_000_4, 2.0, 6);
    /// let b = Point::rounded(0.999_999_9, 2.0, 6);
    /// assert_eq!(a, b);
    /// assert_eq!(a, Point::new(1.0, 2.0));
    /// ```
    #[must_use]
    pub fn rounded(x: f64, y: f64, precision: u32) -> Self {
        let scale = decimal_scale(precision);
        Self {
            x: round_to_scale(x, scale),
            y: round_to_scale(y, scale),
        }
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// `10^precision` as an exact `f64` (exact for every precision the
/// config accepts).
pub(crate) fn decimal_scale(precision: u32) -> f64 {
    (0..precision).fold(1.0, |acc, _| acc * 10.0)
}

/// Round `value` to the grid implied by `scale`.
///
/// Values too large to scale are returned unchanged. The result never
/// carries a negative zero.
pub(crate) fn round_to_scale(value: f64, scale: f64) -> f64 {
    let scaled = value * scale;
    let rounded = if scaled.is_finite() {
        scaled.round() / scale
    } else {
        value
    };
    // -0.0 + 0.0 == +0.0
    rounded + 0.0
}

/// A raw line segment as produced by a format adapter.
///
/// Coordinates are not yet rounded; the graph builder rounds them with
/// the configured precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// First endpoint `(x, y)`.
    pub start: (f64, f64),
    /// Second endpoint `(x, y)`.
    pub end: (f64, f64),
}

impl Segment {
    /// Create a segment between two coordinate pairs.
    #[must_use]
    pub const fn new(start: (f64, f64), end: (f64, f64)) -> Self {
        Self { start, end }
    }
}

/// Order-independent identity of an undirected edge.
///
/// The two endpoints are stored sorted, so `EdgeKey::new(a, b)` and
/// `EdgeKey::new(b, a)` are equal. Repeated segments between the same
/// two points share one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    low: Point,
    high: Point,
}

impl EdgeKey {
    /// Canonical key for the edge between `a` and `b`.
    #[must_use]
    pub fn new(a: Point, b: Point) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// The two endpoints, lexicographically smaller first.
    #[must_use]
    pub const fn endpoints(&self) -> (Point, Point) {
        (self.low, self.high)
    }
}

/// An ordered sequence of points forming one traced path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// A polyline is closed when it has at least three points and ends
    /// where it starts.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.0.len() >= 3 && self.0.first() == self.0.last()
    }

    /// Edge keys of consecutive point pairs, in path order.
    pub fn edge_keys(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.0.windows(2).map(|w| EdgeKey::new(w[0], w[1]))
    }

    /// Consecutive point pairs as raw segments.
    ///
    /// Feeding these back through the pipeline reproduces the same edge
    /// set.
    #[must_use]
    pub fn to_segments(&self) -> Vec<Segment> {
        self.0
            .windows(2)
            .map(|w| Segment::new((w[0].x, w[0].y), (w[1].x, w[1].y)))
            .collect()
    }
}

/// Configuration for the segment simplification pipeline.
///
/// Construct with [`Default`] and override fields as needed; call
/// [`validate`](Self::validate) (done by [`crate::process`]) before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyConfig {
    /// Decimal digits kept when rounding coordinates on ingestion.
    ///
    /// Endpoints that agree to this many digits become the same graph
    /// node.
    pub precision: u32,

    /// Minimum degree at which a point counts as a junction.
    ///
    /// Junctions always terminate a traced path. Not expected to change
    /// from the default of 3 outside of tests.
    pub junction_threshold: usize,
}

impl SimplifyConfig {
    /// Default coordinate rounding precision (decimal digits).
    pub const DEFAULT_PRECISION: u32 = 6;

    /// Default junction degree threshold.
    pub const DEFAULT_JUNCTION_THRESHOLD: usize = 3;

    /// Largest accepted precision. Beyond this `f64` cannot represent
    /// typical drawing coordinates at the requested resolution.
    pub const MAX_PRECISION: u32 = 12;

    /// Smallest accepted junction threshold. A threshold of 1 would make
    /// every endpoint a junction too.
    pub const MIN_JUNCTION_THRESHOLD: usize = 2;

    /// Check that every field is within its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] describing the first
    /// out-of-range field.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.precision > Self::MAX_PRECISION {
            return Err(PipelineError::InvalidConfig(format!(
                "precision must be at most {}, got {}",
                Self::MAX_PRECISION,
                self.precision,
            )));
        }
        if self.junction_threshold < Self::MIN_JUNCTION_THRESHOLD {
            return Err(PipelineError::InvalidConfig(format!(
                "junction_threshold must be at least {}, got {}",
                Self::MIN_JUNCTION_THRESHOLD,
                self.junction_threshold,
            )));
        }
        Ok(())
    }
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            precision: Self::DEFAULT_PRECISION,
            junction_threshold: Self::DEFAULT_JUNCTION_THRESHOLD,
        }
    }
}

/// Errors that can occur during simplification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum PipelineError {
    /// No usable (non-degenerate) segments were supplied.
    #[error("no line segments found, nothing to simplify")]
    NothingToSimplify,

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}
