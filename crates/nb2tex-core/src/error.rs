//! Conversion errors
//!
//! Every error aborts the conversion of the current document.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// A block-level tag with no renderer
    #[error("Unable to process tag of type <{tag}>")]
    UnsupportedBlock { tag: String },

    /// An inline tag with no renderer, with the text rendered so far
    #[error("Unable to process inline tag <{tag}>, rendered so far: {rendered:?}")]
    UnsupportedInline { tag: String, rendered: String },

    /// An element other than a header or data cell inside a table row
    #[error("Expecting either <td> or <th> under a table row, found <{tag}>")]
    UnexpectedTableCell { tag: String },

    /// An output whose payload has no content type this tool can render
    #[error("Unable to process {kind} output in cell {cell}, content types: {mimes:?}")]
    UnsupportedOutput {
        cell: usize,
        kind: &'static str,
        mimes: Vec<String>,
    },

    /// Table rows disagree on their effective column count
    #[error("Inconsistent number of table columns per row: {counts:?}")]
    InconsistentGrid { counts: Vec<usize> },

    /// A row or column span reaches past the table edge
    #[error("Table span at row {row}, column {col} extends past the table")]
    SpanOutOfBounds { row: usize, col: usize },

    /// A span attribute that is not a positive integer
    #[error("Invalid {attr} value {value:?}")]
    InvalidSpan { attr: &'static str, value: String },

    /// A malformed list-valued metadata entry
    #[error("Invalid metadata {group}.{key}: {message}")]
    Metadata {
        group: String,
        key: String,
        message: String,
    },

    #[error("Failed to decode image {name}: {source}")]
    ImageDecode {
        name: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Failed to write image {name}: {source}")]
    ImageWrite {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;
