//! Notebook document model
//!
//! Typed representation of a Jupyter notebook, independent of the nbformat
//! version it was read from.
//! Reference: https://nbformat.readthedocs.io/en/latest/format_description.html

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A complete notebook document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Notebook {
    /// Major nbformat version the document declared (3 or 4)
    pub nbformat: u32,
    /// Notebook-level metadata (kernel spec, language info, ...)
    pub metadata: Map<String, Value>,
    /// Cells in document order
    pub cells: Vec<Cell>,
}

/// One unit of the notebook
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub kind: CellKind,
    /// Source text, multi-line sources already joined
    pub source: String,
    pub metadata: CellMetadata,
}

/// Cell kinds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CellKind {
    Code { outputs: Vec<Output> },
    Markdown,
    /// nbformat 3 heading cell
    Heading { level: u8 },
    Raw,
}

impl Cell {
    /// Create a cell with empty metadata
    pub fn new(kind: CellKind, source: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
            metadata: CellMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: CellMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_raw(&self) -> bool {
        matches!(self.kind, CellKind::Raw)
    }

    /// Outputs of a code cell, empty for every other kind
    pub fn outputs(&self) -> &[Output] {
        match &self.kind {
            CellKind::Code { outputs } => outputs,
            _ => &[],
        }
    }

    /// Short name of the cell kind, as written in the notebook
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            CellKind::Code { .. } => "code",
            CellKind::Markdown => "markdown",
            CellKind::Heading { .. } => "heading",
            CellKind::Raw => "raw",
        }
    }
}

/// A result object attached to a code cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum Output {
    Stream {
        name: String,
        text: String,
    },
    ExecuteResult {
        data: MimeBundle,
    },
    DisplayData {
        data: MimeBundle,
    },
    Error {
        ename: String,
        evalue: String,
        traceback: Vec<String>,
    },
}

impl Output {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Output::Stream { .. } => "stream",
            Output::ExecuteResult { .. } => "execute_result",
            Output::DisplayData { .. } => "display_data",
            Output::Error { .. } => "error",
        }
    }
}

/// Payloads keyed by content type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MimeBundle(BTreeMap<String, String>);

impl MimeBundle {
    pub const PLAIN: &'static str = "text/plain";
    pub const HTML: &'static str = "text/html";
    pub const LATEX: &'static str = "text/latex";
    pub const PNG: &'static str = "image/png";
    pub const JPEG: &'static str = "image/jpeg";
    pub const PDF: &'static str = "application/pdf";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mime: impl Into<String>, payload: impl Into<String>) {
        self.0.insert(mime.into(), payload.into());
    }

    pub fn get(&self, mime: &str) -> Option<&str> {
        self.0.get(mime).map(String::as_str)
    }

    /// Content types present in this bundle
    pub fn mime_types(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MimeBundle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Free-form cell metadata
///
/// Captions, labels and sizing hints live in named groups
/// (`listingCaption`, `figureCaption`, `tableCaption`, `latex`); bibliography
/// helpers live under `bibxref` and `bibtexentry`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CellMetadata(Map<String, Value>);

impl CellMetadata {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Look up a metadata group such as `figureCaption`
    pub fn group(&self, name: &str) -> Option<&Map<String, Value>> {
        self.0.get(name).and_then(Value::as_object)
    }

    /// Look up a value inside a group
    pub fn value(&self, group: &str, key: &str) -> Option<&Value> {
        self.group(group).and_then(|g| g.get(key))
    }

    /// Citation cross-references: local label -> existing bibliography key
    pub fn bibxref(&self) -> Vec<(String, String)> {
        self.group("bibxref")
            .map(|g| {
                g.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// User-supplied BibTeX entries, in notebook order
    pub fn bibtex_entries(&self) -> Vec<String> {
        self.group("bibtexentry")
            .map(|g| {
                g.values()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl From<Map<String, Value>> for CellMetadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
