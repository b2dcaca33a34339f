//! linemerge-formats: DXF and SVG adapters (sans-IO).
//!
//! Turns drawing files into raw segments for `linemerge-pipeline` and
//! renders merged polylines back into DXF and SVG. Everything operates
//! on in-memory bytes; reading and writing files is left to the caller.

pub mod document;
pub mod dxf;
pub mod error;
pub mod path_data;
pub mod svg;

pub use crate::document::{SimplifiedDocument, SourceFormat, convert_document, simplify_document};
pub use crate::dxf::{DxfOptions, DxfSource};
pub use crate::error::FormatError;
pub use crate::svg::{SvgLayout, SvgSource};
