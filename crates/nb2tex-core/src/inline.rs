//! Inline content rendering
//!
//! Paragraph bodies, emphasis, code spans, hyperlinks and lists. Hyperlinks
//! become citations, so the renderer borrows the document context.

use crate::context::DocumentContext;
use crate::error::{ConvertError, Result};
use crate::escape::{PROTECT_END, PROTECT_START, verb};
use crate::node::{ContentNode, Tag};
use nb_parser::CellMetadata;

/// Renders content trees of one cell
pub struct HtmlRenderer<'a> {
    pub(crate) ctx: &'a mut DocumentContext,
    pub(crate) metadata: &'a CellMetadata,
    /// Wrap URLs in `\url{}`
    pub(crate) url_command: bool,
    /// Heading level forced on every block (nbformat 3 heading cells)
    pub(crate) heading_level: Option<u8>,
    /// Tables rendered so far in this cell
    pub(crate) table_index: usize,
}

impl<'a> HtmlRenderer<'a> {
    pub fn new(ctx: &'a mut DocumentContext, metadata: &'a CellMetadata, url_command: bool) -> Self {
        Self {
            ctx,
            metadata,
            url_command,
            heading_level: None,
            table_index: 0,
        }
    }

    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = Some(level);
        self
    }

    /// Render a paragraph-like element, including its tail
    pub fn paragraph(&mut self, node: &ContentNode) -> Result<String> {
        let mut out = self.body(node)?;
        out.push_str(&node.tail);
        Ok(format!("{}\n\n", out.trim()))
    }

    /// Render a `ul` or `ol` element as `itemize` or `enumerate`
    pub fn list(&mut self, node: &ContentNode) -> Result<String> {
        let env = if node.tag == Tag::OrderedList {
            "enumerate"
        } else {
            "itemize"
        };

        let mut out = format!("\n\\begin{{{env}}}\n");
        for child in &node.children {
            match &child.tag {
                Tag::ListItem => {
                    let item = self.paragraph(child)?;
                    out.push_str(r"\item ");
                    out.push_str(item.trim());
                    out.push('\n');
                }
                tag if tag.is_list() => {
                    out.push_str(self.list(child)?.trim());
                    out.push('\n');
                }
                _ => {}
            }
        }
        out.push_str(&format!("\\end{{{env}}}\n"));

        Ok(format!("{}\n", out.trim()))
    }

    /// Own text plus rendered children, without the element's tail
    fn body(&mut self, node: &ContentNode) -> Result<String> {
        let mut out = node.text.clone();
        for child in &node.children {
            self.render_inline(child, &mut out)?;
        }
        Ok(out)
    }

    fn render_inline(&mut self, child: &ContentNode, out: &mut String) -> Result<()> {
        match &child.tag {
            Tag::Emphasis | Tag::Italic => {
                let body = self.body(child)?;
                out.push_str(&format!(r"\textit{{{body}}}"));
            }
            Tag::Bold | Tag::Strong => {
                let body = self.body(child)?;
                out.push_str(&format!(r"\textbf{{{body}}}"));
            }
            Tag::Paragraph => {
                let body = self.body(child)?;
                out.push_str(body.trim());
                out.push_str("\n\n");
            }
            Tag::Break => out.push_str("\n\n"),
            Tag::Code => out.push_str(&code_span(&child.text_content())),
            Tag::Font => out.push_str(&self.body(child)?),
            Tag::Anchor => match child.attr("href") {
                Some(url) => {
                    let key = self.ctx.cite_url(url, self.url_command);
                    let text = child.text_content();
                    if self.url_command && text.contains("http") {
                        out.push_str(&format!(r"\url{{{text}}}"));
                    } else {
                        out.push_str(&text);
                    }
                    out.push_str(&format!(r"\cite{{{key}}}"));
                }
                None => out.push_str(&self.body(child)?),
            },
            Tag::UnorderedList | Tag::OrderedList => out.push_str(&self.list(child)?),
            Tag::Pre => {
                out.push_str("\n\\begin{verbatim}\n");
                out.push_str(child.text_content().trim());
                out.push_str("\n\\end{verbatim}\n\n");
            }
            Tag::Image => out.push_str(&image_block(child.attr("src").unwrap_or_default())),
            other => {
                return Err(ConvertError::UnsupportedInline {
                    tag: other.name(),
                    rendered: out.clone(),
                });
            }
        }
        out.push_str(&child.tail);
        Ok(())
    }
}

/// Code span: `\verb` for one line, a verbatim environment for several
fn code_span(text: &str) -> String {
    if text.lines().count() > 1 {
        format!("\\begin{{verbatim}}\n{text}\\end{{verbatim}}")
    } else {
        verb(text.trim_end())
    }
}

/// Centered image whose path is shielded from escaping
pub(crate) fn image_block(src: &str) -> String {
    format!(
        "\\begin{{center}}\n{PROTECT_START}\\includegraphics[width=0.9\\textwidth]{{{src}}}\n{PROTECT_END}\\end{{center}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::parse_html;

    fn render(html: &str, url_command: bool) -> (String, DocumentContext) {
        let mut ctx = DocumentContext::new();
        let metadata = CellMetadata::default();
        let root = parse_html(html);
        let out = {
            let mut renderer = HtmlRenderer::new(&mut ctx, &metadata, url_command);
            renderer.paragraph(&root.children[0]).unwrap()
        };
        (out, ctx)
    }

    #[test]
    fn test_emphasis_and_strong() {
        let (out, _) = render("<p>a <em>b</em> <strong>c</strong> <i>d</i></p>", false);
        assert_eq!(out, "a \\textit{b} \\textbf{c} \\textit{d}\n\n");
    }

    #[test]
    fn test_nested_emphasis() {
        let (out, _) = render("<p><strong>x <em>y</em></strong></p>", false);
        assert_eq!(out, "\\textbf{x \\textit{y}}\n\n");
    }

    #[test]
    fn test_code_span() {
        let (out, _) = render("<p>run <code>x+1</code> now</p>", false);
        assert_eq!(out, "run \\verb|x+1| now\n\n");
    }

    #[test]
    fn test_multiline_code() {
        assert_eq!(
            code_span("a\nb\n"),
            "\\begin{verbatim}\na\nb\n\\end{verbatim}"
        );
    }

    #[test]
    fn test_link_becomes_citation() {
        let (out, ctx) = render(r#"<p>See <a href="http://a.io">here</a>.</p>"#, false);
        assert_eq!(out, "See here\\cite{httpaio}.\n\n");
        assert_eq!(
            ctx.bibliography_text().unwrap(),
            "@MISC{httpaio,\n  url = {http://a.io}\n}\n\n"
        );
    }

    #[test]
    fn test_link_text_url_command() {
        let (out, _) = render(r#"<p><a href="http://a.io">http://a.io</a></p>"#, true);
        assert_eq!(out, "\\url{http://a.io}\\cite{httpaio}\n\n");

        let (out, _) = render(r#"<p><a href="http://a.io">http://a.io</a></p>"#, false);
        assert_eq!(out, "http://a.io\\cite{httpaio}\n\n");
    }

    #[test]
    fn test_anchor_without_href() {
        let (out, ctx) = render(r#"<p><a name="x">target</a> text</p>"#, false);
        assert_eq!(out, "target text\n\n");
        assert!(ctx.bibliography().is_empty());
    }

    #[test]
    fn test_break() {
        let (out, _) = render("<p>one<br>two</p>", false);
        assert_eq!(out, "one\n\ntwo\n\n");
    }

    #[test]
    fn test_unsupported_inline() {
        let mut ctx = DocumentContext::new();
        let metadata = CellMetadata::default();
        let root = parse_html("<p>so far <span>x</span></p>");
        let err = HtmlRenderer::new(&mut ctx, &metadata, false)
            .paragraph(&root.children[0])
            .unwrap_err();
        match err {
            ConvertError::UnsupportedInline { tag, rendered } => {
                assert_eq!(tag, "span");
                assert_eq!(rendered, "so far ");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nested_list() {
        let mut ctx = DocumentContext::new();
        let metadata = CellMetadata::default();
        let root = parse_html("<ul><li>a<ol><li>b</li></ol></li><li>c</li></ul>");
        let out = HtmlRenderer::new(&mut ctx, &metadata, false)
            .list(&root.children[0])
            .unwrap();
        assert_eq!(
            out,
            "\\begin{itemize}\n\\item a\\begin{enumerate}\n\\item b\n\\end{enumerate}\n\\item c\n\\end{itemize}\n"
        );
    }

    #[test]
    fn test_image_is_protected() {
        let (out, _) = render(r#"<p><img src="a_b.png"></p>"#, false);
        assert_eq!(
            out,
            format!(
                "\\begin{{center}}\n{PROTECT_START}\\includegraphics[width=0.9\\textwidth]{{a_b.png}}\n{PROTECT_END}\\end{{center}}\n\n"
            )
        );
    }
}
