//! Block content rendering
//!
//! Entry point for HTML produced by markdown cells and HTML outputs. Each
//! top-level element becomes a heading, paragraph, list, quote, table or
//! image; the result then gets the percent and underscore escaping passes.

use crate::error::{ConvertError, Result};
use crate::escape::{clean_label, escape_percent, escape_underscores};
use crate::inline::{HtmlRenderer, image_block};
use crate::node::{ContentNode, Tag, parse_html};
use crate::table::render_table;

/// Sectioning commands for heading levels 1 through 6
const SECTION_COMMANDS: [&str; 6] = [
    r"\chapter",
    r"\section",
    r"\subsection",
    r"\subsubsection",
    r"\paragraph",
    r"\subparagraph",
];

impl HtmlRenderer<'_> {
    /// Render an HTML fragment to LaTeX
    pub fn render_html(&mut self, html: &str) -> Result<String> {
        let root = parse_html(html);
        let mut out = String::new();
        self.render_container(&root, &mut out)?;
        Ok(escape_underscores(&escape_percent(&out)))
    }

    /// Render the children of a `div`
    ///
    /// Loose text and inline markup between block children are gathered into
    /// paragraphs.
    fn render_container(&mut self, parent: &ContentNode, out: &mut String) -> Result<()> {
        let mut run = ContentNode::new(Tag::Paragraph).with_text(parent.text.as_str());
        for child in &parent.children {
            if child.tag.is_phrasing() {
                run = run.with_child(child.clone());
                continue;
            }
            self.flush_run(&run, out)?;
            self.render_block(child, out)?;
            let tail = if self.renders_tail(child) { "" } else { child.tail.as_str() };
            run = ContentNode::new(Tag::Paragraph).with_text(tail);
        }
        self.flush_run(&run, out)
    }

    /// Paragraph-like blocks already render the text that follows them
    fn renders_tail(&self, node: &ContentNode) -> bool {
        self.heading_level_for(&node.tag).is_none()
            && matches!(node.tag, Tag::Paragraph | Tag::Pre | Tag::Blockquote)
    }

    fn flush_run(&mut self, run: &ContentNode, out: &mut String) -> Result<()> {
        if run.children.is_empty() && run.text.trim().is_empty() {
            return Ok(());
        }
        self.render_block(run, out)
    }

    fn render_block(&mut self, node: &ContentNode, out: &mut String) -> Result<()> {
        if let Some(level) = self.heading_level_for(&node.tag) {
            out.push_str(&heading(level, &node.text_content()));
            return Ok(());
        }

        match &node.tag {
            Tag::Paragraph | Tag::Pre => {
                out.push_str(&self.paragraph(node)?);
                out.push('\n');
            }
            Tag::UnorderedList | Tag::OrderedList => {
                out.push_str(&self.list(node)?);
                out.push('\n');
            }
            Tag::Blockquote => {
                let quote = self.paragraph(node)?;
                out.push_str("\n\\begin{quote}\n");
                out.push_str(quote.trim());
                out.push_str("\\end{quote}\n\n");
            }
            Tag::Table => {
                out.push_str(&render_table(node, self.metadata, self.table_index)?);
                self.table_index += 1;
            }
            Tag::Image => out.push_str(&image_block(node.attr("src").unwrap_or_default())),
            Tag::Break => out.push_str(r"\newline"),
            Tag::Div => self.render_container(node, out)?,
            Tag::Iframe | Tag::Style | Tag::Script => {}
            other => return Err(ConvertError::UnsupportedBlock { tag: other.name() }),
        }
        Ok(())
    }

    /// Heading level for a block, if it renders as a heading
    ///
    /// In a heading cell every block is a heading; an explicit `hN` of a
    /// higher rank than the cell keeps its own level.
    fn heading_level_for(&self, tag: &Tag) -> Option<u8> {
        match (tag, self.heading_level) {
            (Tag::Heading(level), Some(cell_level)) => Some((*level).min(cell_level)),
            (Tag::Heading(level), None) => Some(*level),
            (_, cell_level) => cell_level,
        }
    }
}

fn heading(level: u8, text: &str) -> String {
    let index = usize::from(level.clamp(1, 6)) - 1;
    format!(
        "\n{}{{{text}}}\n\\label{{sec:{}}}\n\n",
        SECTION_COMMANDS[index],
        clean_label(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DocumentContext;
    use nb_parser::CellMetadata;

    fn render(html: &str) -> Result<String> {
        let mut ctx = DocumentContext::new();
        let metadata = CellMetadata::default();
        HtmlRenderer::new(&mut ctx, &metadata, false).render_html(html)
    }

    #[test]
    fn test_headings() {
        assert_eq!(
            render("<h1>Title</h1>").unwrap(),
            "\n\\chapter{Title}\n\\label{sec:Title}\n\n"
        );
        assert_eq!(
            render("<h3>Some Thing</h3>").unwrap(),
            "\n\\subsection{Some Thing}\n\\label{sec:SomeThing}\n\n"
        );
    }

    #[test]
    fn test_heading_cell_level() {
        let mut ctx = DocumentContext::new();
        let metadata = CellMetadata::default();
        let out = HtmlRenderer::new(&mut ctx, &metadata, false)
            .with_heading_level(2)
            .render_html("<p>Intro</p><h1>Top</h1><h4>Low</h4>")
            .unwrap();
        assert_eq!(
            out,
            "\n\\section{Intro}\n\\label{sec:Intro}\n\n\
             \n\\chapter{Top}\n\\label{sec:Top}\n\n\
             \n\\section{Low}\n\\label{sec:Low}\n\n"
        );
    }

    #[test]
    fn test_paragraph_escaping() {
        assert_eq!(
            render("<p>rate_a is 5% of $x_1$</p>").unwrap(),
            "rate\\_a is 5\\% of $x_1$\n\n\n"
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(
            render("<blockquote>\n<p>quoted</p>\n</blockquote>").unwrap(),
            "\n\\begin{quote}\nquoted\\end{quote}\n\n"
        );
    }

    #[test]
    fn test_div_is_transparent() {
        let out = render("<div><style>td {}</style><p>inside</p></div>").unwrap();
        assert_eq!(out, "inside\n\n\n");
    }

    #[test]
    fn test_div_text_becomes_paragraph() {
        assert_eq!(
            render("<div align=\"center\">Figure 3 shows the result</div>").unwrap(),
            "Figure 3 shows the result\n\n\n"
        );
        assert_eq!(render("<div>text <b>x</b></div>").unwrap(), "text \\textbf{x}\n\n\n");
    }

    #[test]
    fn test_div_mixed_content_keeps_order() {
        assert_eq!(
            render("<div>lead <em>a</em><ul><li>i</li></ul>trail</div>").unwrap(),
            "lead \\textit{a}\n\n\n\\begin{itemize}\n\\item i\n\\end{itemize}\n\ntrail\n\n\n"
        );
    }

    #[test]
    fn test_dropped_tags() {
        assert_eq!(render("<iframe src=\"x\"></iframe>").unwrap(), "");
    }

    #[test]
    fn test_break() {
        assert_eq!(render("<br>").unwrap(), "\\newline");
    }

    #[test]
    fn test_unsupported_block() {
        let err = render("<hr>").unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedBlock { tag } if tag == "hr"));
    }

    #[test]
    fn test_image_path_not_escaped() {
        let out = render("<img src=\"my_pic.png\">").unwrap();
        assert!(out.contains("{my_pic.png}"), "{out}");
    }

    #[test]
    fn test_table_index_advances() {
        let mut ctx = DocumentContext::new();
        let metadata = match serde_json::json!({"tableCaption": {"caption": "['One', 'Two']"}}) {
            serde_json::Value::Object(map) => CellMetadata::new(map),
            _ => unreachable!(),
        };
        let table = "<table><tr><td>a</td></tr></table>";
        let out = HtmlRenderer::new(&mut ctx, &metadata, false)
            .render_html(&format!("{table}{table}"))
            .unwrap();
        assert!(out.contains("\\caption{One}"));
        assert!(out.contains("\\caption{Two}"));
    }
}
