//! DXF adapter built on the [`dxf`] crate.
//!
//! Model-space LINE entities become raw segments (Z is ignored). Every
//! other entity is kept as-is so it can be written back next to the merged
//! polylines, along with the blocks that INSERT entities refer to.

use std::io::Cursor;

use dxf::entities::{Entity, EntityType, LwPolyline};
use dxf::enums::AcadVersion;
use dxf::{Block, Drawing, LwPolylineVertex};
use linemerge_pipeline::{Point, Polyline, Segment};

use crate::error::FormatError;

/// Oldest DXF version that can hold LWPOLYLINE entities.
pub const MIN_VERSION: AcadVersion = AcadVersion::R2000;

/// Geometry and carried-over content read from a DXF drawing.
#[derive(Debug, Clone)]
pub struct DxfSource {
    /// LINE entities as raw segments, in drawing order.
    pub segments: Vec<Segment>,
    /// Every non-LINE entity, unchanged.
    pub passthrough: Vec<Entity>,
    /// User block definitions (model/paper space blocks excluded).
    pub blocks: Vec<Block>,
    /// Version of the source drawing.
    pub version: AcadVersion,
}

/// Settings for [`to_dxf`].
#[derive(Debug, Clone, Copy)]
pub struct DxfOptions<'a> {
    /// Requested output version; raised to [`MIN_VERSION`] if older.
    pub version: AcadVersion,
    /// Entities to write after the polylines.
    pub passthrough: &'a [Entity],
    /// Block definitions to carry over.
    pub blocks: &'a [Block],
}

impl Default for DxfOptions<'_> {
    fn default() -> Self {
        Self {
            version: MIN_VERSION,
            passthrough: &[],
            blocks: &[],
        }
    }
}

fn load(bytes: &[u8]) -> Result<Drawing, FormatError> {
    if bytes.is_empty() {
        return Err(FormatError::EmptyInput);
    }
    Drawing::load(&mut Cursor::new(bytes)).map_err(|e| FormatError::DxfRead(e.to_string()))
}

/// Model and paper space blocks are recreated by every drawing.
fn is_layout_block(block: &Block) -> bool {
    let name = block.name.to_ascii_lowercase();
    name.starts_with("*model_space") || name.starts_with("*paper_space")
}

/// Read model-space LINE entities as segments and keep everything else
/// (paper-space LINEs included) for pass-through.
///
/// # Errors
///
/// Returns [`FormatError::EmptyInput`] for empty input and
/// [`FormatError::DxfRead`] if the drawing cannot be parsed.
pub fn read_lines(bytes: &[u8]) -> Result<DxfSource, FormatError> {
    let drawing = load(bytes)?;

    let mut segments = Vec::new();
    let mut passthrough = Vec::new();
    for entity in drawing.entities() {
        match &entity.specific {
            EntityType::Line(line) if !entity.common.is_in_paper_space => {
                segments.push(Segment::new((line.p1.x, line.p1.y), (line.p2.x, line.p2.y)));
            }
            _ => passthrough.push(entity.clone()),
        }
    }
    let blocks: Vec<Block> = drawing
        .blocks()
        .filter(|b| !is_layout_block(b))
        .cloned()
        .collect();

    tracing::debug!(
        lines = segments.len(),
        passthrough = passthrough.len(),
        blocks = blocks.len(),
        version = ?drawing.header.version,
        "read DXF drawing",
    );

    Ok(DxfSource {
        segments,
        passthrough,
        blocks,
        version: drawing.header.version,
    })
}

/// Straight geometry of a LINE, LWPOLYLINE or POLYLINE entity.
///
/// Closed polylines repeat their first point at the end. Returns `None`
/// for other entity types and for fewer than two points.
#[must_use]
pub fn entity_polyline(entity: &Entity) -> Option<Polyline> {
    let (mut points, closed): (Vec<Point>, bool) = match &entity.specific {
        EntityType::Line(line) => (
            vec![
                Point::new(line.p1.x, line.p1.y),
                Point::new(line.p2.x, line.p2.y),
            ],
            false,
        ),
        EntityType::LwPolyline(lw) => (
            lw.vertices.iter().map(|v| Point::new(v.x, v.y)).collect(),
            lw.is_closed(),
        ),
        EntityType::Polyline(poly) => (
            poly.vertices()
                .map(|v| Point::new(v.location.x, v.location.y))
                .collect(),
            poly.is_closed(),
        ),
        _ => return None,
    };
    if closed
        && points.len() >= 3
        && let Some(&first) = points.first()
    {
        points.push(first);
    }
    (points.len() >= 2).then(|| Polyline::new(points))
}

/// Model-space LWPOLYLINE and POLYLINE geometry among pass-through
/// entities, so it can be drawn next to the merged polylines.
#[must_use]
pub fn passthrough_polylines(entities: &[Entity]) -> Vec<Polyline> {
    entities
        .iter()
        .filter(|e| !e.common.is_in_paper_space)
        .filter(|e| {
            matches!(
                e.specific,
                EntityType::LwPolyline(_) | EntityType::Polyline(_)
            )
        })
        .filter_map(entity_polyline)
        .collect()
}

/// Read model-space LINE, LWPOLYLINE and POLYLINE entities as point
/// sequences, for format conversion.
///
/// # Errors
///
/// Same as [`read_lines`].
pub fn read_polylines(bytes: &[u8]) -> Result<Vec<Polyline>, FormatError> {
    let drawing = load(bytes)?;

    let mut polylines = Vec::new();
    let mut skipped = 0usize;
    for entity in drawing
        .entities()
        .filter(|e| !e.common.is_in_paper_space)
    {
        match entity_polyline(entity) {
            Some(polyline) => polylines.push(polyline),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "DXF entities without straight geometry were not converted");
    }
    Ok(polylines)
}

/// Write polylines as LWPOLYLINE entities into a new drawing and return
/// its bytes.
///
/// Closed polylines keep their repeated end point rather than setting
/// the closed flag, so the vertex list matches the polyline exactly.
///
/// # Errors
///
/// Returns [`FormatError::DxfWrite`] if serialization fails.
pub fn to_dxf(polylines: &[Polyline], options: &DxfOptions<'_>) -> Result<Vec<u8>, FormatError> {
    let mut drawing = Drawing::new();
    drawing.header.version = if options.version >= MIN_VERSION {
        options.version
    } else {
        MIN_VERSION
    };

    for block in options.blocks {
        drawing.add_block(block.clone());
    }

    for polyline in polylines.iter().filter(|p| p.len() >= 2) {
        let mut lw = LwPolyline::default();
        lw.vertices = polyline
            .points()
            .iter()
            .map(|p| {
                let mut vertex = LwPolylineVertex::default();
                vertex.x = p.x;
                vertex.y = p.y;
                vertex
            })
            .collect();
        drawing.add_entity(Entity::new(EntityType::LwPolyline(lw)));
    }

    for entity in options.passthrough {
        drawing.add_entity(entity.clone());
    }

    let mut out = Vec::new();
    drawing
        .save(&mut out)
        .map_err(|e| FormatError::DxfWrite(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dxf::entities::{Circle, Line};

    use super::*;

    fn line(a: (f64, f64), b: (f64, f64)) -> Entity {
        let mut line = Line::default();
        line.p1 = dxf::Point::new(a.0, a.1, 0.0);
        line.p2 = dxf::Point::new(b.0, b.1, 0.0);
        Entity::new(EntityType::Line(line))
    }

    fn circle() -> Entity {
        let mut circle = Circle::default();
        circle.center = dxf::Point::new(5.0, 5.0, 0.0);
        circle.radius = 2.0;
        Entity::new(EntityType::Circle(circle))
    }

    fn drawing_bytes(entities: Vec<Entity>) -> Vec<u8> {
        let mut drawing = Drawing::new();
        for entity in entities {
            drawing.add_entity(entity);
        }
        let mut out = Vec::new();
        drawing.save(&mut out).unwrap();
        out
    }

    fn reload(bytes: &[u8]) -> Drawing {
        Drawing::load(&mut Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn reads_lines_and_keeps_other_entities() {
        let bytes = drawing_bytes(vec![
            line((0.0, 0.0), (1.0, 0.0)),
            circle(),
            line((1.0, 0.0), (1.0, 2.5)),
        ]);
        let source = read_lines(&bytes).unwrap();
        assert_eq!(
            source.segments,
            vec![
                Segment::new((0.0, 0.0), (1.0, 0.0)),
                Segment::new((1.0, 0.0), (1.0, 2.5)),
            ]
        );
        assert_eq!(source.passthrough.len(), 1);
        assert!(matches!(
            source.passthrough[0].specific,
            EntityType::Circle(_)
        ));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(read_lines(&[]), Err(FormatError::EmptyInput)));
    }

    #[test]
    fn garbage_is_a_read_error() {
        let result = read_lines(b"this is not a drawing\n");
        assert!(matches!(result, Err(FormatError::DxfRead(_))));
    }

    #[test]
    fn writes_one_lwpolyline_per_polyline() {
        let polylines = vec![
            Polyline::new(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
            ]),
            Polyline::new(vec![Point::new(5.0, 5.0), Point::new(6.0, 5.0)]),
        ];
        let bytes = to_dxf(&polylines, &DxfOptions::default()).unwrap();
        let drawing = reload(&bytes);

        let vertex_counts: Vec<usize> = drawing
            .entities()
            .filter_map(|e| match &e.specific {
                EntityType::LwPolyline(lw) => Some(lw.vertices.len()),
                _ => None,
            })
            .collect();
        assert_eq!(vertex_counts, vec![3, 2]);
    }

    #[test]
    fn old_versions_are_upgraded() {
        let options = DxfOptions {
            version: AcadVersion::R12,
            ..DxfOptions::default()
        };
        let polylines = vec![Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
        ])];
        let bytes = to_dxf(&polylines, &options).unwrap();
        assert_eq!(reload(&bytes).header.version, AcadVersion::R2000);
    }

    #[test]
    fn newer_versions_are_kept() {
        let options = DxfOptions {
            version: AcadVersion::R2010,
            ..DxfOptions::default()
        };
        let bytes = to_dxf(&[], &options).unwrap();
        assert_eq!(reload(&bytes).header.version, AcadVersion::R2010);
    }

    #[test]
    fn passthrough_entities_are_written() {
        let passthrough = vec![circle()];
        let options = DxfOptions {
            passthrough: &passthrough,
            ..DxfOptions::default()
        };
        let bytes = to_dxf(&[], &options).unwrap();
        let circles = reload(&bytes)
            .entities()
            .filter(|e| matches!(e.specific, EntityType::Circle(_)))
            .count();
        assert_eq!(circles, 1);
    }

    #[test]
    fn read_polylines_closes_closed_lwpolylines() {
        let mut lw = LwPolyline::default();
        lw.set_is_closed(true);
        lw.vertices = [(0.0, 0.0), (4.0, 0.0), (4.0, 3.0)]
            .iter()
            .map(|&(x, y)| {
                let mut v = LwPolylineVertex::default();
                v.x = x;
                v.y = y;
                v
            })
            .collect();
        let mut drawing = Drawing::new();
        drawing.header.version = AcadVersion::R2000;
        drawing.add_entity(Entity::new(EntityType::LwPolyline(lw)));
        drawing.add_entity(line((10.0, 0.0), (11.0, 0.0)));
        drawing.add_entity(circle());
        let mut bytes = Vec::new();
        drawing.save(&mut bytes).unwrap();

        let polylines = read_polylines(&bytes).unwrap();
        assert_eq!(polylines.len(), 2);
        assert_eq!(polylines[0].len(), 4);
        assert!(polylines[0].is_closed());
        assert_eq!(polylines[1].len(), 2);
    }

    fn paper_space(mut entity: Entity) -> Entity {
        entity.common.is_in_paper_space = true;
        entity
    }

    fn lwpolyline(coords: &[(f64, f64)]) -> Entity {
        let mut lw = LwPolyline::default();
        lw.vertices = coords
            .iter()
            .map(|&(x, y)| {
                let mut v = LwPolylineVertex::default();
                v.x = x;
                v.y = y;
                v
            })
            .collect();
        Entity::new(EntityType::LwPolyline(lw))
    }

    #[test]
    fn paper_space_lines_are_not_merged() {
        let bytes = drawing_bytes(vec![
            line((0.0, 0.0), (1.0, 0.0)),
            paper_space(line((1.0, 0.0), (2.0, 0.0))),
        ]);
        let source = read_lines(&bytes).unwrap();
        assert_eq!(source.segments, vec![Segment::new((0.0, 0.0), (1.0, 0.0))]);
        assert_eq!(source.passthrough.len(), 1);
        assert!(source.passthrough[0].common.is_in_paper_space);
    }

    #[test]
    fn read_polylines_skips_paper_space() {
        let bytes = drawing_bytes(vec![
            line((0.0, 0.0), (1.0, 0.0)),
            paper_space(line((5.0, 5.0), (6.0, 5.0))),
        ]);
        assert_eq!(read_polylines(&bytes).unwrap().len(), 1);
    }

    #[test]
    fn passthrough_polylines_keep_only_model_space_polylines() {
        let entities = vec![
            lwpolyline(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]),
            circle(),
            paper_space(lwpolyline(&[(5.0, 5.0), (6.0, 5.0)])),
            lwpolyline(&[(9.0, 9.0)]),
        ];
        let polylines = passthrough_polylines(&entities);
        assert_eq!(polylines.len(), 1);
        assert_eq!(polylines[0].len(), 3);
    }
}
