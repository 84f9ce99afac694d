//! Markdown cell handling
//!
//! Markdown processors treat backslashes, underscores and asterisks as markup,
//! which mangles LaTeX math. Before conversion every math span is found and
//! its markdown-special characters are backslash-escaped, so the markdown
//! processor hands the math back unchanged.

use pulldown_cmark::{Options, Parser, html};

/// Replacements for `$$`, used alternately
const DISPLAY_MATH_DELIMITERS: [&str; 2] = [r"\begin{equation}", r"\end{equation}"];

/// Characters markdown would otherwise interpret inside math
const MARKDOWN_SPECIAL: &str = r"\`*_{}[]()#+-.!";

/// Display environments protected from markdown: opener (with its leading
/// newline) and closer
const MATH_ENVIRONMENTS: &[(&str, &str)] = &[
    ("\n\\begin{equation}", r"\end{equation}"),
    ("\n\\begin{equation*}", r"\end{equation*}"),
    ("\n\\begin{eqnarray}", r"\end{eqnarray}"),
];

/// Convert `$$` pairs to equation environments and escape the contents of
/// every math span
pub fn protect_math(source: &str) -> String {
    let mkd = if source.contains("$$") {
        replace_display_dollars(source)
    } else {
        source.to_string()
    };

    let spans = math_spans(&mkd);
    if spans.is_empty() {
        return mkd;
    }

    let mut out = String::with_capacity(mkd.len() + mkd.len() / 8);
    let mut cursor = 0;
    for (start, end) in spans {
        // A span that opens inside one already copied is part of it
        if start < cursor {
            continue;
        }
        out.push_str(&mkd[cursor..start]);
        escape_math_span(&mkd[start..=end], &mut out);
        cursor = end + 1;
    }
    out.push_str(&mkd[cursor..]);
    out
}

/// Render markdown to HTML (CommonMark plus tables)
pub fn markdown_to_html(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(source, options);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn replace_display_dollars(source: &str) -> String {
    let mut toggle = 0usize;
    source
        .split('\n')
        .map(|line| {
            let mut line = line.to_string();
            while let Some(pos) = line.find("$$") {
                line.replace_range(pos..pos + 2, DISPLAY_MATH_DELIMITERS[toggle % 2]);
                toggle += 1;
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inclusive byte ranges of math spans, sorted by start
fn math_spans(mkd: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();

    let dollars: Vec<usize> = mkd.match_indices('$').map(|(i, _)| i).collect();
    spans.extend(dollars.chunks_exact(2).map(|pair| (pair[0], pair[1])));

    for (opener, closer) in MATH_ENVIRONMENTS {
        // The first line of the cell has no newline before it
        let leading = mkd.starts_with(&opener[1..]).then_some(0);
        let starts = leading.into_iter().chain(mkd.match_indices(opener).map(|(i, _)| i));
        for start in starts {
            // Unclosed openers are dropped
            if let Some(pos) = mkd[start + 1..].find(closer) {
                spans.push((start, start + 1 + pos + closer.len() - 1));
            }
        }
    }

    spans.sort_unstable();
    spans
}

fn escape_math_span(span: &str, out: &mut String) {
    for ch in span.chars() {
        if ch == '\n' {
            continue;
        }
        if MARKDOWN_SPECIAL.contains(ch) {
            out.push('\\');
        }
        out.push(ch);
    }
}
