//! Notebook to LaTeX document assembly

use crate::cell::convert_cell;
use crate::context::DocumentContext;
use crate::error::Result;
use crate::escape::strip_protect_markers;
use crate::image::ImageSink;
use crate::preamble::standard_preamble;
use nb_parser::Notebook;
use std::path::Path;

/// Options for notebook conversion
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Place code listings in the text instead of a closing `Listings` chapter
    pub inline_listings: bool,
    /// Wrap URLs in `\url{}` in bibliography entries and link text
    pub url_command: bool,
    /// BibTeX style for `\bibliographystyle`
    pub bib_style: String,
    /// Prefix of `\includegraphics` paths; ends with a separator
    pub image_dir: String,
    /// Title for the standard preamble
    pub title: String,
    /// Author for the standard preamble
    pub author: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            inline_listings: false,
            url_command: false,
            bib_style: "IEEEtran".to_string(),
            image_dir: "./pic/".to_string(),
            title: "Title".to_string(),
            author: "Author".to_string(),
        }
    }
}

/// File names derived from the input and output paths of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNames {
    /// Base name of extracted images, `<stem>_<cell>_<output>.<ext>`
    pub image_stem: String,
    /// Name given to `\bibliography`, without extension
    pub bibliography: String,
}

impl DocumentNames {
    pub fn from_paths(input: &Path, output: &Path) -> Self {
        let stem = |path: &Path| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        Self {
            image_stem: stem(input),
            bibliography: stem(output),
        }
    }
}

/// A converted notebook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDocument {
    /// The LaTeX source
    pub tex: String,
    /// BibTeX entries, if anything was cited
    pub bibliography: Option<String>,
}

/// Convert a notebook to a LaTeX document
///
/// Images are written to `sink` as they are encountered. The first error
/// aborts the document.
pub fn convert_notebook(
    notebook: &Notebook,
    names: &DocumentNames,
    options: &ConvertOptions,
    sink: &mut dyn ImageSink,
) -> Result<ConvertedDocument> {
    let mut ctx = DocumentContext::new();
    let mut tex = String::from("\n");
    let mut listings = String::new();

    for (index, cell) in notebook.cells.iter().enumerate() {
        if index == 0 && !cell.is_raw() {
            tex.push_str(&standard_preamble(&options.title, &options.author));
        }

        let converted = convert_cell(cell, index, &mut ctx, names, options, sink)?;
        tex.push_str(&strip_protect_markers(&converted.text));
        listings.push_str(&converted.listing);
    }

    if !listings.is_empty() {
        tex.push_str("\n\n\\chapter{Listings}\n\n");
        tex.push_str(&listings);
    }

    let bibliography = ctx.bibliography_text();
    if bibliography.is_some() {
        tex.push_str(&format!(
            "\n\n\\bibliographystyle{{{}}}\n\\bibliography{{{}}}\n\n",
            options.bib_style, names.bibliography
        ));
    }
    tex.push_str("\\end{document}\n\n");

    tracing::info!(
        cells = notebook.cells.len(),
        citations = ctx.bibliography().len(),
        "converted notebook"
    );
    Ok(ConvertedDocument { tex, bibliography })
}
