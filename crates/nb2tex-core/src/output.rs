//! Code cell output rendering
//!
//! Each output is rendered from the richest payload it carries. Images are
//! decoded and handed to an [`ImageSink`]; LaTeX payloads are wrapped in
//! table or figure floats when the cell metadata gives them a caption.

use crate::error::{ConvertError, Result};
use crate::image::ImageSink;
use crate::inline::HtmlRenderer;
use crate::metadata::{indexed_label, meta_string};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use nb_parser::{MimeBundle, Output};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static ANSI_COLOUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]+m").expect("ANSI colour pattern is valid"));

/// Image content types by preference, with the file extension used for each
const IMAGE_TYPES: [(&str, &str); 3] = [
    (MimeBundle::JPEG, "jpeg"),
    (MimeBundle::PNG, "png"),
    (MimeBundle::PDF, "pdf"),
];

/// Rule spacing reset for booktabs tables, so vertical lines stay unbroken
const BOOKTABS_SETUP: &str = "\
% to get unbroken vertical lines with booktabs, set separators to zero
% also set all horizontal lines to same width
\\aboverulesep=0ex
\\belowrulesep=0ex
\\heavyrulewidth=.05em
\\lightrulewidth=.05em
\\cmidrulewidth=.05em
\\belowbottomsep=0pt
\\abovetopsep=0pt
";

/// Renders the outputs of one code cell
pub(crate) struct OutputRenderer<'a> {
    pub(crate) html: HtmlRenderer<'a>,
    cell_index: usize,
    /// Prefix for `\includegraphics` paths, ends with a separator
    image_dir: &'a str,
    /// Base name for extracted image files
    image_stem: &'a str,
    /// Captioned LaTeX figures rendered so far in this cell
    figure_index: usize,
}

impl<'a> OutputRenderer<'a> {
    pub(crate) fn new(
        html: HtmlRenderer<'a>,
        cell_index: usize,
        image_dir: &'a str,
        image_stem: &'a str,
    ) -> Self {
        Self {
            html,
            cell_index,
            image_dir,
            image_stem,
            figure_index: 0,
        }
    }

    pub(crate) fn render(
        &mut self,
        index: usize,
        output: &Output,
        sink: &mut dyn ImageSink,
    ) -> Result<String> {
        match output {
            Output::Stream { text, .. } => self.listing(text),
            Output::ExecuteResult { data } => {
                if let Some(html) = data.get(MimeBundle::HTML) {
                    return self.html.render_html(html);
                }
                if let Some((payload, ext)) = image_payload(data) {
                    return self.image(index, payload, ext, sink);
                }
                self.text_payload(index, data, output.kind_name())
            }
            Output::DisplayData { data } => {
                if let Some((payload, ext)) = image_payload(data) {
                    return self.image(index, payload, ext, sink);
                }
                if let Some(html) = data.get(MimeBundle::HTML) {
                    return self.html.render_html(html);
                }
                self.text_payload(index, data, output.kind_name())
            }
            Output::Error { traceback, .. } => Ok(traceback_block(traceback)),
        }
    }

    fn text_payload(&mut self, index: usize, data: &MimeBundle, kind: &'static str) -> Result<String> {
        if let Some(latex) = data.get(MimeBundle::LATEX) {
            return self.latex(index, latex);
        }
        if let Some(plain) = data.get(MimeBundle::PLAIN) {
            return self.listing(plain);
        }
        Err(ConvertError::UnsupportedOutput {
            cell: self.cell_index,
            kind,
            mimes: data.mime_types().map(str::to_string).collect(),
        })
    }

    /// Text output as an `outcellstyle` listing
    fn listing(&self, text: &str) -> Result<String> {
        let metadata = self.html.metadata;
        let caption = meta_string(metadata, 0, "listingCaption", "outputCaption", "")?;
        let label = meta_string(metadata, 0, "listingCaption", "label", "")?;

        let style = if caption.is_empty() {
            "[style=outcellstyle]".to_string()
        } else {
            format!("[style=outcellstyle,caption={{{caption} \\label{{{label}-out}}}}]")
        };
        Ok(format!(
            "\n\\begin{{lstlisting}}{style}\n{}\n\\end{{lstlisting}}\n\n",
            fold_to_ascii(text)
        ))
    }

    fn image(
        &mut self,
        index: usize,
        payload: &str,
        ext: &str,
        sink: &mut dyn ImageSink,
    ) -> Result<String> {
        let name = format!("{}_{}_{}.{}", self.image_stem, self.cell_index, index, ext);
        let encoded: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|source| ConvertError::ImageDecode {
                name: name.clone(),
                source,
            })?;
        sink.write_image(&name, &bytes)?;
        tracing::debug!(cell = self.cell_index, output = index, %name, "extracted image");

        let metadata = self.html.metadata;
        let caption = meta_string(metadata, index, "figureCaption", "caption", "")?;
        let label = meta_string(metadata, index, "figureCaption", "label", "")?;

        let mut out = String::new();
        if caption.is_empty() {
            out.push_str("\\begin{center}\n");
        } else {
            out.push_str("\n\\begin{figure}[tb]\n\\centering\n");
        }
        out.push_str(&format!("\\includegraphics{{{}{name}}}\n", self.image_dir));
        if caption.is_empty() {
            out.push_str("\\end{center}\n\n");
        } else {
            out.push_str(&format!(
                "\\caption{{{caption}{}}}\n\\end{{figure}}\n\n",
                indexed_label(&label, index)
            ));
        }
        Ok(out)
    }

    /// LaTeX payload, floated when the cell metadata captions it
    ///
    /// Table captions are consumed before figure captions; each kind keeps
    /// its own running index within the cell.
    fn latex(&mut self, index: usize, payload: &str) -> Result<String> {
        let metadata = self.html.metadata;
        let booktabs = if ["toprule", "midrule", "bottomrule"]
            .iter()
            .any(|rule| payload.contains(rule))
        {
            BOOKTABS_SETUP
        } else {
            ""
        };
        let fontsize = meta_string(metadata, index, "latex", "fontsize", "normalsize")?;

        let table_index = self.html.table_index;
        let caption = meta_string(metadata, table_index, "tableCaption", "caption", "")?;
        if !caption.is_empty() {
            let fontsize = meta_string(metadata, table_index, "tableCaption", "fontsize", &fontsize)?;
            let label = meta_string(metadata, table_index, "tableCaption", "label", "")?;
            self.html.table_index += 1;

            let mut out = String::from("{\n\n\\begin{table}[htb]\n\\centering\n");
            out.push_str(&format!(
                "\\caption{{{caption}{}}}\n",
                indexed_label(&label, table_index)
            ));
            out.push_str(booktabs);
            out.push_str(&format!("\n\\begin{{{fontsize}}}\n"));
            out.push_str("\\renewcommand{\\arraystretch}{1.1}\n");
            out.push_str(payload);
            out.push('\n');
            out.push_str("\\renewcommand{\\arraystretch}{1}\n");
            out.push_str(&format!("\\end{{{fontsize}}}\n"));
            out.push_str("\\end{table}\n\n}\n\n");
            return Ok(out);
        }

        let figure_index = self.figure_index;
        let caption = meta_string(metadata, figure_index, "figureCaption", "caption", "")?;
        if !caption.is_empty() {
            let label = meta_string(metadata, figure_index, "figureCaption", "label", "")?;
            self.figure_index += 1;

            let mut out = String::from("{\n\n\\begin{figure}[htb]\n\\centering\n");
            out.push_str(&format!("\n\\begin{{{fontsize}}}\n"));
            out.push_str(payload);
            out.push_str(&format!("\\end{{{fontsize}}}\n"));
            out.push_str(&format!(
                "\\caption{{{caption}{}}}\n",
                indexed_label(&label, figure_index)
            ));
            out.push_str("\\end{figure}\n\n}\n\n");
            return Ok(out);
        }

        if !booktabs.is_empty() || payload.contains(r"\begin{tabular}") {
            let mut out = String::from("{\n\\renewcommand{\\arraystretch}{1.1}\n\\centering\n");
            out.push_str(booktabs);
            out.push_str(&format!("\n\\begin{{{fontsize}}}\n"));
            out.push_str(payload);
            out.push('\n');
            out.push_str(&format!("\\end{{{fontsize}}}\n"));
            out.push_str("\\renewcommand{\\arraystretch}{1}\n}\n\n");
            return Ok(out);
        }

        Ok(format!("{payload}\n"))
    }
}

/// First image payload by preference, with its file extension
fn image_payload(data: &MimeBundle) -> Option<(&str, &'static str)> {
    IMAGE_TYPES
        .iter()
        .find_map(|(mime, ext)| data.get(mime).map(|payload| (payload, *ext)))
}

/// Compatibility-decompose, then drop everything outside ASCII
fn fold_to_ascii(text: &str) -> String {
    text.nfkd().filter(char::is_ascii).collect()
}

fn traceback_block(traceback: &[String]) -> String {
    let lines: Vec<_> = traceback
        .iter()
        .map(|line| ANSI_COLOUR.replace_all(line, ""))
        .collect();
    format!("\n\\begin{{verbatim}}\n{}\n\\end{{verbatim}}\n", lines.join("\n"))
}
