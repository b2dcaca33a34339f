//! Whole-document operations: detect the format, run the pipeline and
//! render both output formats.

use std::path::Path;

use linemerge_pipeline::{SimplifyConfig, SimplifyStats, process};
use serde::{Deserialize, Serialize};

use crate::dxf::{self, DxfOptions};
use crate::error::FormatError;
use crate::svg::{self, SvgLayout};

/// Supported drawing formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    /// AutoCAD Drawing Exchange Format.
    Dxf,
    /// Scalable Vector Graphics.
    Svg,
}

impl SourceFormat {
    /// Format for a file extension (without the dot), ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnsupportedFormat`] for anything other
    /// than `dxf` or `svg`.
    pub fn from_extension(extension: &str) -> Result<Self, FormatError> {
        if extension.eq_ignore_ascii_case("dxf") {
            Ok(Self::Dxf)
        } else if extension.eq_ignore_ascii_case("svg") {
            Ok(Self::Svg)
        } else {
            Err(FormatError::UnsupportedFormat(format!(".{extension}")))
        }
    }

    /// Format for a file path, from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnsupportedFormat`] if the path has no
    /// extension or an unsupported one.
    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| FormatError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_extension(extension)
    }

    /// Lowercase file extension for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Dxf => "dxf",
            Self::Svg => "svg",
        }
    }

    /// The other format, i.e. the conversion target.
    #[must_use]
    pub const fn counterpart(self) -> Self {
        match self {
            Self::Dxf => Self::Svg,
            Self::Svg => Self::Dxf,
        }
    }
}

/// Output of [`simplify_document`]: the merged geometry in both formats.
#[derive(Debug, Clone)]
pub struct SimplifiedDocument {
    /// DXF bytes with one LWPOLYLINE per polyline.
    pub dxf: Vec<u8>,
    /// SVG text with one `<path>` per polyline.
    pub svg: String,
    /// Pipeline statistics.
    pub stats: SimplifyStats,
    /// Non-LINE DXF entities carried over (always zero for SVG input).
    pub passthrough_entities: usize,
}

/// Simplify a drawing and render the result as both DXF and SVG.
///
/// For DXF input, the DXF output keeps the source version (at least
/// R2000) and every entity other than model-space LINEs; the SVG output
/// draws the merged polylines followed by the existing model-space
/// LWPOLYLINE and POLYLINE entities, fitted to the geometry with Y
/// flipped. For SVG input, the SVG output keeps the
/// source root attributes and title, and the DXF output uses the SVG
/// coordinates as-is.
///
/// # Errors
///
/// Returns [`FormatError::EmptyInput`] for empty input, a read error
/// from the matching adapter, or [`FormatError::Pipeline`] if no usable
/// segment was found or `config` is invalid.
pub fn simplify_document(
    format: SourceFormat,
    bytes: &[u8],
    config: &SimplifyConfig,
) -> Result<SimplifiedDocument, FormatError> {
    if bytes.is_empty() {
        return Err(FormatError::EmptyInput);
    }

    let document = match format {
        SourceFormat::Dxf => {
            let source = dxf::read_lines(bytes)?;
            let result = process(&source.segments, config)?;
            let dxf = dxf::to_dxf(
                &result.polylines,
                &DxfOptions {
                    version: source.version,
                    passthrough: &source.passthrough,
                    blocks: &source.blocks,
                },
            )?;
            let mut drawn = result.polylines.clone();
            drawn.extend(dxf::passthrough_polylines(&source.passthrough));
            let svg = svg::to_svg(&drawn, &SvgLayout::default());
            SimplifiedDocument {
                dxf,
                svg,
                stats: result.stats,
                passthrough_entities: source.passthrough.len(),
            }
        }
        SourceFormat::Svg => {
            let text = std::str::from_utf8(bytes)?;
            let source = svg::read_segments(text)?;
            let result = process(&source.segments, config)?;
            let svg = svg::to_svg(
                &result.polylines,
                &SvgLayout::Preserve {
                    attributes: &source.root_attributes,
                    title: source.title.as_deref(),
                },
            );
            let dxf = dxf::to_dxf(&result.polylines, &DxfOptions::default())?;
            SimplifiedDocument {
                dxf,
                svg,
                stats: result.stats,
                passthrough_entities: 0,
            }
        }
    };

    tracing::info!(
        format = ?format,
        segments = document.stats.segment_count,
        polylines = document.stats.polylines,
        passthrough = document.passthrough_entities,
        "simplified document",
    );
    Ok(document)
}

/// Convert a drawing to the other format without simplifying it.
///
/// DXF becomes a fitted, Y-flipped SVG; SVG becomes an R2000 DXF.
///
/// # Errors
///
/// Returns [`FormatError::EmptyInput`] for empty input, or a read or
/// write error from the adapters.
pub fn convert_document(format: SourceFormat, bytes: &[u8]) -> Result<Vec<u8>, FormatError> {
    if bytes.is_empty() {
        return Err(FormatError::EmptyInput);
    }
    match format {
        SourceFormat::Dxf => {
            let polylines = dxf::read_polylines(bytes)?;
            tracing::debug!(polylines = polylines.len(), "converting DXF to SVG");
            Ok(svg::to_svg(&polylines, &SvgLayout::default()).into_bytes())
        }
        SourceFormat::Svg => {
            let polylines = svg::read_polylines(std::str::from_utf8(bytes)?)?;
            tracing::debug!(polylines = polylines.len(), "converting SVG to DXF");
            dxf::to_dxf(&polylines, &DxfOptions::default())
        }
    }
}
