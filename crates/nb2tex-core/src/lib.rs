//! nb2tex-core: Core library for converting Jupyter notebooks to LaTeX
//!
//! This crate provides:
//! - LaTeX escaping for prose, table cells and labels
//! - A content-node tree built from HTML (markdown cells and HTML outputs)
//! - Block, inline and table renderers
//! - Cell and output converters, and the document assembler
//!
//! # Example
//!
//! ```
//! use nb2tex_core::{ConvertOptions, DocumentNames, MemorySink, convert_notebook};
//!
//! let notebook = nb_parser::parse(r##"{
//!   "nbformat": 4,
//!   "metadata": {},
//!   "cells": [{"cell_type": "markdown", "metadata": {}, "source": "# Results"}]
//! }"##).unwrap();
//!
//! let names = DocumentNames {
//!     image_stem: "results".to_string(),
//!     bibliography: "results".to_string(),
//! };
//! let mut sink = MemorySink::new();
//! let doc = convert_notebook(&notebook, &names, &ConvertOptions::default(), &mut sink).unwrap();
//! assert!(doc.tex.contains("\\chapter{Results}"));
//! ```

pub mod block;
pub mod cell;
pub mod context;
pub mod document;
pub mod error;
pub mod escape;
pub mod image;
pub mod inline;
pub mod markdown;
pub mod metadata;
pub mod node;
mod output;
pub mod preamble;
pub mod table;

pub use cell::{ConvertedCell, convert_cell};
pub use context::{BibEntry, DocumentContext};
pub use document::{ConvertOptions, ConvertedDocument, DocumentNames, convert_notebook};
pub use error::{ConvertError, Result};
pub use image::{DirectorySink, ImageSink, MemorySink};
pub use inline::HtmlRenderer;
pub use node::{ContentNode, Tag, parse_html};
