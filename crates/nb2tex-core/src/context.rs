//! Per-document conversion state
//!
//! Bibliography entries and citation keys accumulate while cells are
//! converted. A fresh context is created for every document, so nothing
//! leaks between the notebooks of a batch.

use crate::escape::clean_label;
use nb_parser::CellMetadata;
use std::collections::HashMap;
use std::fmt;

/// Labels longer than this are truncated and made unique with a counter
const MAX_LABEL_LEN: usize = 20;

/// One entry of the generated `.bib` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BibEntry {
    /// A `@MISC` record created for a hyperlink
    Generated { key: String, url: String },
    /// BibTeX text supplied verbatim in cell metadata
    Supplied(String),
}

impl fmt::Display for BibEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BibEntry::Generated { key, url } => {
                write!(f, "@MISC{{{key},\n  url = {{{url}}}\n}}\n\n")
            }
            BibEntry::Supplied(text) => write!(f, "{text}\n\n"),
        }
    }
}

/// Mutable state shared by all cells of one document
#[derive(Debug, Default)]
pub struct DocumentContext {
    bibliography: Vec<BibEntry>,
    /// Citation label -> bibliography key
    xref: HashMap<String, String>,
    /// Suffix for truncated labels
    label_counter: u32,
}

impl DocumentContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a cell's `bibxref` map and `bibtexentry` texts
    ///
    /// A label already mapped keeps its first key.
    pub fn harvest_metadata(&mut self, metadata: &CellMetadata) {
        for (label, key) in metadata.bibxref() {
            self.xref.entry(label).or_insert(key);
        }
        self.bibliography.extend(
            metadata
                .bibtex_entries()
                .into_iter()
                .map(BibEntry::Supplied),
        );
    }

    /// Record a hyperlink and return the key to `\cite`
    ///
    /// Every call appends a bibliography entry, even for a URL seen before.
    pub fn cite_url(&mut self, url: &str, url_command: bool) -> String {
        let label = self.cite_label(url);
        let key = self.xref.entry(label.clone()).or_insert(label).clone();

        let url = if url_command {
            format!(r"\url{{{url}}}")
        } else {
            url.to_string()
        };
        self.bibliography.push(BibEntry::Generated {
            key: key.clone(),
            url,
        });
        key
    }

    fn cite_label(&mut self, url: &str) -> String {
        let label = clean_label(url);
        if label.chars().count() <= MAX_LABEL_LEN {
            return label;
        }

        let prefix: String = label.chars().take(MAX_LABEL_LEN).collect();
        let label = format!("{prefix}{:05}", self.label_counter);
        self.label_counter += 1;
        label
    }

    pub fn bibliography(&self) -> &[BibEntry] {
        &self.bibliography
    }

    /// Text of the `.bib` file, or `None` when nothing was cited
    pub fn bibliography_text(&self) -> Option<String> {
        if self.bibliography.is_empty() {
            return None;
        }
        Some(self.bibliography.iter().map(ToString::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(value: serde_json::Value) -> CellMetadata {
        match value {
            serde_json::Value::Object(map) => CellMetadata::new(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_short_url_label() {
        let mut ctx = DocumentContext::new();
        assert_eq!(ctx.cite_url("http://a.io", false), "httpaio");
        assert_eq!(
            ctx.bibliography(),
            &[BibEntry::Generated {
                key: "httpaio".to_string(),
                url: "http://a.io".to_string()
            }]
        );
    }

    #[test]
    fn test_long_url_label_counter() {
        let mut ctx = DocumentContext::new();
        let first = ctx.cite_url("https://example.com/some/long/path", false);
        let second = ctx.cite_url("https://example.com/some/long/path", false);
        assert_eq!(first, "httpsexamplecomsomel00000");
        assert_eq!(second, "httpsexamplecomsomel00001");
    }

    #[test]
    fn test_duplicate_links_keep_entries() {
        let mut ctx = DocumentContext::new();
        ctx.cite_url("http://a.io", false);
        ctx.cite_url("http://a.io", false);
        assert_eq!(ctx.bibliography().len(), 2);
    }

    #[test]
    fn test_url_command() {
        let mut ctx = DocumentContext::new();
        ctx.cite_url("http://a.io", true);
        assert_eq!(
            ctx.bibliography_text().unwrap(),
            "@MISC{httpaio,\n  url = {\\url{http://a.io}}\n}\n\n"
        );
    }

    #[test]
    fn test_xref_maps_label_to_key() {
        let mut ctx = DocumentContext::new();
        ctx.harvest_metadata(&metadata(json!({
            "bibxref": {"httpaio": "Smith2020"},
            "bibtexentry": {"smith": "@BOOK{Smith2020, title={T}}"}
        })));
        assert_eq!(ctx.cite_url("http://a.io", false), "Smith2020");
        assert_eq!(
            ctx.bibliography()[0],
            BibEntry::Supplied("@BOOK{Smith2020, title={T}}".to_string())
        );
    }

    #[test]
    fn test_xref_first_mapping_wins() {
        let mut ctx = DocumentContext::new();
        ctx.harvest_metadata(&metadata(json!({"bibxref": {"lbl": "First"}})));
        ctx.harvest_metadata(&metadata(json!({"bibxref": {"lbl": "Second"}})));
        assert_eq!(ctx.xref.get("lbl").map(String::as_str), Some("First"));
    }

    #[test]
    fn test_empty_bibliography() {
        assert_eq!(DocumentContext::new().bibliography_text(), None);
    }
}
