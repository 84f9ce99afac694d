//! nb-parser: Parser for Jupyter notebook (ipynb) files
//!
//! This crate provides:
//! - Typed notebook model (cells, outputs, content-type bundles, metadata)
//! - Reader for nbformat 3 (single worksheet) and nbformat 4 documents
//!
//! # Example
//!
//! ```
//! use nb_parser::{parse, CellKind};
//!
//! let source = r##"{
//!   "nbformat": 4,
//!   "metadata": {},
//!   "cells": [{"cell_type": "markdown", "metadata": {}, "source": "# Title"}]
//! }"##;
//!
//! let notebook = parse(source).unwrap();
//! assert_eq!(notebook.cells.len(), 1);
//! assert_eq!(notebook.cells[0].kind, CellKind::Markdown);
//! ```

pub mod model;
pub mod parser;

// Re-export main types for convenient access
pub use model::{Cell, CellKind, CellMetadata, MimeBundle, Notebook, Output};
pub use parser::{ParseError, ParseResult, parse};
