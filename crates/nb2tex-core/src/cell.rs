//! Per-cell conversion
//!
//! Code cells produce an input listing followed by their outputs. Without
//! inline listings the listing goes to a separate section at the end of the
//! document and the cell body only refers to it.

use crate::context::DocumentContext;
use crate::document::{ConvertOptions, DocumentNames};
use crate::error::Result;
use crate::image::ImageSink;
use crate::inline::HtmlRenderer;
use crate::markdown::{markdown_to_html, protect_math};
use crate::metadata::meta_string;
use crate::output::OutputRenderer;
use nb_parser::{Cell, CellKind};

/// First-line marker that hides a code cell's source
const SUPPRESS_MARKER: &str = "#-- suppress";

/// LaTeX produced by one cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertedCell {
    /// Text placed at the cell's position in the document
    pub text: String,
    /// Floated input listing, empty with inline listings
    pub listing: String,
}

/// Convert one cell; `index` is its position in the notebook
pub fn convert_cell(
    cell: &Cell,
    index: usize,
    ctx: &mut DocumentContext,
    names: &DocumentNames,
    options: &ConvertOptions,
    sink: &mut dyn ImageSink,
) -> Result<ConvertedCell> {
    tracing::debug!(cell = index, kind = cell.kind_name(), "converting cell");
    ctx.harvest_metadata(&cell.metadata);

    match &cell.kind {
        CellKind::Raw => Ok(ConvertedCell {
            text: cell.source.clone(),
            listing: String::new(),
        }),
        CellKind::Markdown => {
            let html = markdown_to_html(&protect_math(&cell.source));
            let text = HtmlRenderer::new(ctx, &cell.metadata, options.url_command)
                .render_html(&html)?;
            Ok(ConvertedCell {
                text,
                listing: String::new(),
            })
        }
        CellKind::Heading { level } => {
            let html = markdown_to_html(&protect_math(&cell.source));
            let text = HtmlRenderer::new(ctx, &cell.metadata, options.url_command)
                .with_heading_level(*level)
                .render_html(&html)?;
            Ok(ConvertedCell {
                text,
                listing: String::new(),
            })
        }
        CellKind::Code { outputs } => {
            let mut converted = input_listing(cell, index, options.inline_listings)?;
            let mut renderer = OutputRenderer::new(
                HtmlRenderer::new(ctx, &cell.metadata, options.url_command),
                index,
                &options.image_dir,
                &names.image_stem,
            );
            for (output_index, output) in outputs.iter().enumerate() {
                converted
                    .text
                    .push_str(&renderer.render(output_index, output, sink)?);
            }
            Ok(converted)
        }
    }
}

/// The source listing of a code cell
fn input_listing(cell: &Cell, index: usize, inline: bool) -> Result<ConvertedCell> {
    let source = cell.source.as_str();
    let listed = if source.starts_with(SUPPRESS_MARKER) {
        match source.split('\n').nth(1) {
            Some(second) if second.starts_with('#') => second,
            _ => {
                return Ok(ConvertedCell {
                    text: "\n\n".to_string(),
                    listing: String::new(),
                });
            }
        }
    } else {
        source
    };

    let mut caption = meta_string(&cell.metadata, 0, "listingCaption", "caption", "")?;
    let mut label = meta_string(&cell.metadata, 0, "listingCaption", "label", "")?;
    let mut purpose = None;
    if !inline {
        if label.is_empty() {
            label = format!("lst:autolistingcell{index}");
        }
        purpose = listing_purpose(listed);
        caption = format!("Code Listing in cell {index}");
    }

    let style = if caption.is_empty() {
        "[style=incellstyle]".to_string()
    } else {
        format!("[style=incellstyle,caption={{{caption} \\label{{{label}}}}}]")
    };
    let listing = format!("\n\\begin{{lstlisting}}{style}\n{listed}\n\\end{{lstlisting}}\n\n");

    if inline {
        return Ok(ConvertedCell {
            text: listing,
            listing: String::new(),
        });
    }

    let text = match purpose {
        Some(purpose) => {
            format!("\n\nSee Listing~\\ref{{{label}}} for the code{purpose}.\n\n")
        }
        None => String::new(),
    };
    Ok(ConvertedCell { text, listing })
}

/// What the cross-reference sentence says about the listing
///
/// A leading single-`#` comment describes the code; ordinary code gets an
/// empty description; a blank first line or a `##` comment suppresses the
/// sentence.
fn listing_purpose(listed: &str) -> Option<String> {
    let first = listed.split('\n').next().unwrap_or_default();
    match first.strip_prefix('#') {
        None if first.is_empty() => None,
        None => Some(String::new()),
        Some(comment) if first.chars().count() > 2 && !comment.starts_with('#') => {
            Some(format!(" {comment}"))
        }
        Some(_) => None,
    }
}
