//! Errors raised while reading, converting or writing drawing files.

use linemerge_pipeline::PipelineError;

/// Errors that can occur in the format adapters.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// The input contained no bytes.
    #[error("input is empty")]
    EmptyInput,

    /// The file extension is not one of the supported formats.
    #[error("unsupported file format: {0} (expected .dxf or .svg)")]
    UnsupportedFormat(String),

    /// The DXF reader rejected the input.
    #[error("failed to read DXF: {0}")]
    DxfRead(String),

    /// The DXF writer failed.
    #[error("failed to write DXF: {0}")]
    DxfWrite(String),

    /// The SVG input is not well-formed.
    #[error("failed to read SVG: {0}")]
    SvgRead(String),

    /// A coordinate attribute did not parse as a number.
    #[error("invalid number {value:?} in {context}")]
    InvalidNumber {
        /// The offending text.
        value: String,
        /// Where it was found, e.g. `<line> attribute x1`.
        context: String,
    },

    /// SVG input was not valid UTF-8.
    #[error("SVG input is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The core pipeline rejected the extracted segments.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
