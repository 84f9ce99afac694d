//! Notebook JSON reader
//!
//! Reads both the nbformat 3 layout (cells nested under a single worksheet,
//! payloads keyed by short names) and the nbformat 4 layout (cells at the top
//! level, payloads in a `data` bundle keyed by content type).

use crate::model::{Cell, CellKind, CellMetadata, MimeBundle, Notebook, Output};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Notebook schema errors
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid notebook JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Only one worksheet allowed in nbformat 3 notebooks, found {0}")]
    MultipleWorksheets(usize),

    #[error("Notebook has neither `cells` nor `worksheets`")]
    MissingCells,

    #[error("Unknown cell type: {0}")]
    UnknownCellType(String),

    #[error("Unknown output type {output_type} in cell {cell}")]
    UnknownOutputType { cell: usize, output_type: String },

    #[error("Malformed output in cell {cell}: {message}")]
    MalformedOutput { cell: usize, message: String },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Short nbformat 3 payload keys and the content types they stand for
const V3_PAYLOAD_KEYS: &[(&str, &str)] = &[
    ("text", MimeBundle::PLAIN),
    ("html", MimeBundle::HTML),
    ("latex", MimeBundle::LATEX),
    ("png", MimeBundle::PNG),
    ("jpeg", MimeBundle::JPEG),
    ("pdf", MimeBundle::PDF),
    ("svg", "image/svg+xml"),
    ("json", "application/json"),
    ("javascript", "application/javascript"),
];

/// Text that nbformat allows either as one string or as a list of lines
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MultilineText {
    Single(String),
    Lines(Vec<String>),
}

impl MultilineText {
    fn into_string(self) -> String {
        match self {
            MultilineText::Single(s) => s,
            MultilineText::Lines(lines) => lines.concat(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawNotebook {
    #[serde(default)]
    nbformat: Option<u32>,
    #[serde(default)]
    metadata: Map<String, Value>,
    #[serde(default)]
    cells: Option<Vec<RawCell>>,
    #[serde(default)]
    worksheets: Option<Vec<RawWorksheet>>,
}

#[derive(Debug, Deserialize)]
struct RawWorksheet {
    #[serde(default)]
    cells: Vec<RawCell>,
}

#[derive(Debug, Deserialize)]
struct RawCell {
    cell_type: String,
    #[serde(default)]
    source: Option<MultilineText>,
    /// nbformat 3 code cells keep their source here
    #[serde(default)]
    input: Option<MultilineText>,
    #[serde(default)]
    metadata: Map<String, Value>,
    #[serde(default)]
    outputs: Vec<Map<String, Value>>,
    #[serde(default)]
    level: Option<u8>,
}

/// Parse a notebook from its JSON text
pub fn parse(json: &str) -> ParseResult<Notebook> {
    let raw: RawNotebook = serde_json::from_str(json)?;

    let (cells, default_version) = match (raw.cells, raw.worksheets) {
        (Some(cells), _) => (cells, 4),
        (None, Some(mut worksheets)) => {
            if worksheets.len() > 1 {
                return Err(ParseError::MultipleWorksheets(worksheets.len()));
            }
            let cells = worksheets.pop().map(|w| w.cells).unwrap_or_default();
            (cells, 3)
        }
        (None, None) => return Err(ParseError::MissingCells),
    };

    let cells = cells
        .into_iter()
        .enumerate()
        .map(|(index, cell)| convert_cell(index, cell))
        .collect::<ParseResult<Vec<_>>>()?;

    Ok(Notebook {
        nbformat: raw.nbformat.unwrap_or(default_version),
        metadata: raw.metadata,
        cells,
    })
}

fn convert_cell(index: usize, raw: RawCell) -> ParseResult<Cell> {
    let source = raw
        .source
        .or(raw.input)
        .map(MultilineText::into_string)
        .unwrap_or_default();

    let kind = match raw.cell_type.as_str() {
        "code" => CellKind::Code {
            outputs: raw
                .outputs
                .into_iter()
                .map(|o| convert_output(index, o))
                .collect::<ParseResult<Vec<_>>>()?,
        },
        "markdown" => CellKind::Markdown,
        "heading" => CellKind::Heading {
            level: raw.level.unwrap_or(1).clamp(1, 6),
        },
        "raw" => CellKind::Raw,
        other => return Err(ParseError::UnknownCellType(other.to_string())),
    };

    Ok(Cell {
        kind,
        source,
        metadata: CellMetadata::new(raw.metadata),
    })
}

fn convert_output(cell: usize, mut raw: Map<String, Value>) -> ParseResult<Output> {
    let output_type = match raw.get("output_type").and_then(Value::as_str) {
        Some(t) => t.to_string(),
        None => {
            return Err(ParseError::MalformedOutput {
                cell,
                message: "missing output_type".to_string(),
            });
        }
    };

    match output_type.as_str() {
        "stream" => {
            // v4 uses `name`, v3 uses `stream`
            let name = raw
                .get("name")
                .or_else(|| raw.get("stream"))
                .and_then(Value::as_str)
                .unwrap_or("stdout")
                .to_string();
            let text = raw.remove("text").map(payload_text).unwrap_or_default();
            Ok(Output::Stream { name, text })
        }
        "execute_result" | "pyout" => Ok(Output::ExecuteResult {
            data: mime_bundle(cell, &mut raw)?,
        }),
        "display_data" => Ok(Output::DisplayData {
            data: mime_bundle(cell, &mut raw)?,
        }),
        "error" | "pyerr" => {
            let field = |raw: &Map<String, Value>, key: &str| {
                raw.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            let traceback = raw
                .get("traceback")
                .and_then(Value::as_array)
                .map(|lines| {
                    lines
                        .iter()
                        .filter_map(|l| l.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            Ok(Output::Error {
                ename: field(&raw, "ename"),
                evalue: field(&raw, "evalue"),
                traceback,
            })
        }
        _ => Err(ParseError::UnknownOutputType {
            cell,
            output_type,
        }),
    }
}

/// Collect the payloads of a rich output into a bundle
fn mime_bundle(cell: usize, raw: &mut Map<String, Value>) -> ParseResult<MimeBundle> {
    if let Some(data) = raw.remove("data") {
        let Value::Object(data) = data else {
            return Err(ParseError::MalformedOutput {
                cell,
                message: "`data` is not an object".to_string(),
            });
        };
        return Ok(data
            .into_iter()
            .map(|(mime, payload)| (mime, payload_text(payload)))
            .collect());
    }

    let mut bundle = MimeBundle::new();
    for (key, mime) in V3_PAYLOAD_KEYS {
        if let Some(payload) = raw.remove(*key) {
            bundle.insert(*mime, payload_text(payload));
        }
    }
    Ok(bundle)
}

fn payload_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        other => other.to_string(),
    }
}
