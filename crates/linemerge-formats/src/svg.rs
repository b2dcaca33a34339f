//! SVG adapter: extract straight geometry from an SVG document and write
//! polylines back as `<path>` elements.
//!
//! Reading uses the [`svg`] crate's event parser. `<line>`, `<path>`,
//! `<polyline>` and `<polygon>` contribute geometry; everything else
//! (groups, text, curves inside paths) is walked past. Transforms are
//! not applied.
//!
//! Writing builds the document with the [`svg`] crate and formats path
//! data by hand so coordinates keep `f64` precision.

use std::fmt::Write;
use std::sync::LazyLock;

use linemerge_pipeline::{Point, Polyline, Segment};
use regex::{Captures, Regex};
use svg::Document;
use svg::node::Attributes;
use svg::node::element::tag::Type;
use svg::node::element::{Path, Title};
use svg::parser::Event;

use crate::error::FormatError;
use crate::path_data::{parse_path, parse_points};

/// Length unit used for `width`/`height` when fitting to bounds.
pub const DEFAULT_UNITS: &str = "mm";

/// Stroke width written on every output path.
const STROKE_WIDTH: &str = "0.5";

/// A character or entity reference.
#[allow(clippy::expect_used)] // literal pattern
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[xX]([0-9a-fA-F]+)|#([0-9]+)|([A-Za-z]+));").expect("entity pattern")
});

/// Geometry and document metadata read from an SVG file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgSource {
    /// Straight segments in document order.
    pub segments: Vec<Segment>,
    /// Attributes of the root `<svg>` element, sorted by name.
    pub root_attributes: Vec<(String, String)>,
    /// Text of the first `<title>` element, if any.
    pub title: Option<String>,
}

/// How [`to_svg`] sets up the output document's coordinate system.
#[derive(Debug, Clone, Copy)]
pub enum SvgLayout<'a> {
    /// Reuse the source document's root attributes (size, `viewBox`,
    /// namespaces) and title. Coordinates are written unchanged.
    Preserve {
        /// Root `<svg>` attributes to re-emit.
        attributes: &'a [(String, String)],
        /// Optional `<title>` text.
        title: Option<&'a str>,
    },
    /// Size the document to the polylines' bounding box and flip the Y
    /// axis, for geometry that comes from a Y-up source such as DXF.
    FitToBounds {
        /// Unit suffix for `width` and `height`, e.g. `mm`.
        units: &'a str,
    },
}

impl Default for SvgLayout<'_> {
    fn default() -> Self {
        Self::FitToBounds {
            units: DEFAULT_UNITS,
        }
    }
}

/// Everything collected in one pass over the document.
#[derive(Debug, Default)]
struct Scan {
    chains: Vec<Vec<(f64, f64)>>,
    root_attributes: Option<Vec<(String, String)>>,
    title: Option<String>,
}

/// Tag name without any namespace prefix.
fn local_name(name: &str) -> &str {
    name.split_once(':').map_or(name, |(_, local)| local)
}

fn attribute<'a>(attributes: &'a Attributes, name: &str) -> Option<&'a str> {
    let value: &'a str = attributes.get(name)?;
    Some(value)
}

/// Decode the predefined XML entities and character references.
///
/// The parser hands out attribute values and text exactly as written,
/// and the writer escapes on output, so stored metadata must be plain
/// text. Unknown entities are left as written.
fn unescape(raw: &str) -> String {
    ENTITY
        .replace_all(raw, |caps: &Captures<'_>| {
            let decoded = if let Some(hex) = caps.get(1) {
                u32::from_str_radix(hex.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32)
            } else if let Some(dec) = caps.get(2) {
                dec.as_str().parse().ok().and_then(char::from_u32)
            } else {
                match caps.get(3).map(|m| m.as_str()) {
                    Some("amp") => Some('&'),
                    Some("lt") => Some('<'),
                    Some("gt") => Some('>'),
                    Some("quot") => Some('"'),
                    Some("apos") => Some('\''),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_owned(), String::from)
        })
        .into_owned()
}

/// Drop repeated consecutive points; a chain needs two distinct points.
fn distinct_chain(mut points: Vec<(f64, f64)>) -> Vec<Vec<(f64, f64)>> {
    points.dedup();
    if points.len() >= 2 {
        vec![points]
    } else {
        Vec::new()
    }
}

/// Numeric attribute; missing means zero.
fn number(attributes: &Attributes, element: &str, name: &str) -> Result<f64, FormatError> {
    attribute(attributes, name).map_or(Ok(0.0), |text| {
        text.trim()
            .parse()
            .map_err(|_| FormatError::InvalidNumber {
                value: text.to_owned(),
                context: format!("<{element}> attribute {name}"),
            })
    })
}

/// Point chains contributed by one element.
fn element_chains(
    element: &str,
    attributes: &Attributes,
) -> Result<Vec<Vec<(f64, f64)>>, FormatError> {
    match element {
        "line" => {
            let start = (
                number(attributes, element, "x1")?,
                number(attributes, element, "y1")?,
            );
            let end = (
                number(attributes, element, "x2")?,
                number(attributes, element, "y2")?,
            );
            Ok(distinct_chain(vec![start, end]))
        }
        "path" => attribute(attributes, "d").map_or_else(|| Ok(Vec::new()), parse_path),
        "polyline" | "polygon" => {
            let mut points = attribute(attributes, "points")
                .map_or_else(|| Ok(Vec::new()), parse_points)?;
            points.dedup();
            if element == "polygon"
                && let (Some(&first), Some(&last)) = (points.first(), points.last())
                && first != last
            {
                points.push(first);
            }
            Ok(distinct_chain(points))
        }
        _ => Ok(Vec::new()),
    }
}

fn scan(text: &str) -> Result<Scan, FormatError> {
    let parser = svg::read(text).map_err(|e| FormatError::SvgRead(e.to_string()))?;
    let mut scan = Scan::default();
    let mut in_title = false;

    for event in parser {
        match event {
            Event::Error(e) => return Err(FormatError::SvgRead(e.to_string())),
            Event::Tag(name, Type::End, _) => {
                if local_name(name) == "title" {
                    in_title = false;
                }
            }
            Event::Tag(name, kind, attributes) => {
                let element = local_name(name);
                if element == "svg" && scan.root_attributes.is_none() {
                    let mut root: Vec<(String, String)> = attributes
                        .iter()
                        .map(|(name, value)| {
                            let value: &str = value;
                            (name.clone(), unescape(value))
                        })
                        .collect();
                    root.sort();
                    scan.root_attributes = Some(root);
                }
                if element == "title" && matches!(kind, Type::Start) && scan.title.is_none() {
                    in_title = true;
                }
                scan.chains.extend(element_chains(element, &attributes)?);
            }
            Event::Text(content) if in_title => {
                scan.title = Some(unescape(content.trim()));
                in_title = false;
            }
            _ => {}
        }
    }

    if scan.root_attributes.is_none() {
        return Err(FormatError::SvgRead("no <svg> root element".to_owned()));
    }
    Ok(scan)
}

/// Extract straight segments, root attributes and title from SVG text.
///
/// # Errors
///
/// Returns [`FormatError::SvgRead`] if the document is malformed or has
/// no `<svg>` element, and [`FormatError::InvalidNumber`] for a
/// non-numeric coordinate.
///
/// # Examples
///
/// ```
/// use linemerge_formats::svg::read_segments;
///
/// let source = read_segments(
///     r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
///          <line x1="0" y1="0" x2="5" y2="0"/>
///          <polyline points="5,0 5,5 0,5"/>
///        </svg>"#,
/// )?;
/// assert_eq!(source.segments.len(), 3);
/// # Ok::<(), linemerge_formats::FormatError>(())
/// ```
pub fn read_segments(text: &str) -> Result<SvgSource, FormatError> {
    let scan = scan(text)?;
    let segments: Vec<Segment> = scan
        .chains
        .iter()
        .flat_map(|chain| chain.windows(2).map(|w| Segment::new(w[0], w[1])))
        .collect();

    tracing::debug!(
        segments = segments.len(),
        title = scan.title.as_deref(),
        "read SVG geometry",
    );

    Ok(SvgSource {
        segments,
        root_attributes: scan.root_attributes.unwrap_or_default(),
        title: scan.title,
    })
}

/// Read the same elements as [`read_segments`], but keep each element's
/// points together as one polyline (used for format conversion).
///
/// # Errors
///
/// Same as [`read_segments`].
pub fn read_polylines(text: &str) -> Result<Vec<Polyline>, FormatError> {
    Ok(scan(text)?
        .chains
        .into_iter()
        .map(|chain| Polyline::new(chain.into_iter().map(Point::from).collect()))
        .collect())
}

/// Format a coordinate, never emitting `-0`.
fn coord(value: f64) -> String {
    format!("{}", value + 0.0)
}

/// Build the `d` attribute for one polyline.
///
/// `M x,y L x,y ...`; a closed polyline ends with `Z` instead of a final
/// line back to its start. Empty for fewer than two points.
///
/// # Examples
///
/// ```
/// use linemerge_pipeline::{Point, Polyline};
/// use linemerge_formats::svg::build_path_data;
///
/// let open = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(1.5, 2.0)]);
/// assert_eq!(build_path_data(&open, false), "M0,0 L1.5,2");
///
/// let triangle = Polyline::new(vec![
///     Point::new(0.0, 0.0),
///     Point::new(1.0, 0.0),
///     Point::new(0.0, 1.0),
///     Point::new(0.0, 0.0),
/// ]);
/// assert_eq!(build_path_data(&triangle, false), "M0,0 L1,0 L0,1 Z");
/// ```
#[must_use]
pub fn build_path_data(polyline: &Polyline, flip_y: bool) -> String {
    let points = polyline.points();
    if points.len() < 2 {
        return String::new();
    }
    let sign = if flip_y { -1.0 } else { 1.0 };
    let drawn = if polyline.is_closed() {
        &points[..points.len() - 1]
    } else {
        points
    };

    let mut d = String::new();
    for (i, p) in drawn.iter().enumerate() {
        let command = if i == 0 { "M" } else { " L" };
        let _ = write!(d, "{command}{},{}", coord(p.x), coord(sign * p.y));
    }
    if polyline.is_closed() {
        d.push_str(" Z");
    }
    d
}

/// Axis-aligned bounds `(min_x, min_y, max_x, max_y)` of all points, or
/// `None` if there are none.
fn bounds(polylines: &[Polyline]) -> Option<(f64, f64, f64, f64)> {
    polylines
        .iter()
        .flat_map(Polyline::points)
        .fold(None, |acc, p| {
            Some(match acc {
                None => (p.x, p.y, p.x, p.y),
                Some((min_x, min_y, max_x, max_y)) => (
                    min_x.min(p.x),
                    min_y.min(p.y),
                    max_x.max(p.x),
                    max_y.max(p.y),
                ),
            })
        })
}

/// Serialize polylines into an SVG document string.
///
/// One `<path>` per polyline (polylines with fewer than two points are
/// skipped), stroked black, unfilled.
#[must_use]
pub fn to_svg(polylines: &[Polyline], layout: &SvgLayout<'_>) -> String {
    let (mut doc, flip_y) = match *layout {
        SvgLayout::Preserve { attributes, title } => {
            let mut doc = Document::new();
            for (name, value) in attributes {
                doc = doc.set(name.as_str(), value.as_str());
            }
            if let Some(title) = title {
                doc = doc.add(Title::new(title));
            }
            (doc, false)
        }
        SvgLayout::FitToBounds { units } => {
            let (min_x, min_y, max_x, max_y) = bounds(polylines).unwrap_or_default();
            let width = coord(max_x - min_x);
            let height = coord(max_y - min_y);
            let doc = Document::new()
                .set("width", format!("{width}{units}"))
                .set("height", format!("{height}{units}"))
                .set(
                    "viewBox",
                    format!("{} {} {width} {height}", coord(min_x), coord(-max_y)),
                );
            (doc, true)
        }
    };

    for polyline in polylines {
        let d = build_path_data(polyline, flip_y);
        if d.is_empty() {
            continue;
        }
        let path = Path::new()
            .set("d", d)
            .set("stroke", "black")
            .set("fill", "none")
            .set("stroke-width", STROKE_WIDTH);
        doc = doc.add(path);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
