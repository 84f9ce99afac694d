//! HTML table to LaTeX `tabular`
//!
//! Row and column spans are resolved into two grids before emission: a
//! row-span carry grid (how many more rows a cell above still covers) and
//! the span width of every placed cell. Rules between rows follow the carry
//! grid: a full `\hline` when nothing carries into the next row, otherwise a
//! `\cline` for each column that is not covered.

use crate::error::{ConvertError, Result};
use crate::escape::escape_cell_text;
use crate::metadata::{indexed_label, meta_string};
use crate::node::{ContentNode, Tag};
use nb_parser::CellMetadata;

/// Largest accepted `rowspan`/`colspan`
const MAX_SPAN: usize = 1000;

/// A `td`/`th` with its resolved span
struct GridCell<'a> {
    node: &'a ContentNode,
    rows: usize,
    cols: usize,
    /// The cell carried an explicit `colspan`
    multicolumn: bool,
}

/// Render a `table` element; `index` counts tables within the cell and
/// selects the `tableCaption` metadata entry
pub fn render_table(table: &ContentNode, metadata: &CellMetadata, index: usize) -> Result<String> {
    let rows = grid_rows(table)?;
    let Some(col_count) = column_count(&rows)? else {
        return Ok(String::new());
    };

    let mut format = meta_string(metadata, index, "tableCaption", "format", "")?;
    if format.is_empty() {
        format = format!("|{}|", vec!["c"; col_count].join("|"));
    }
    let caption = meta_string(metadata, index, "tableCaption", "caption", "")?;
    let fontsize = meta_string(metadata, index, "tableCaption", "fontsize", "normalsize")?;
    let label = meta_string(metadata, index, "tableCaption", "label", "")?;

    let tabular = tabular(&rows, col_count, &format)?;

    let mut out = String::new();
    if caption.is_empty() {
        out.push_str("\\begin{center}\n");
    } else {
        let label = indexed_label(&label, index);
        out.push_str("\n\\begin{table}[htb]\n\\centering\n");
        out.push_str(&format!("\\caption{{{caption}{label}}}\n"));
    }
    out.push_str(&format!("\n\\begin{{{fontsize}}}\n"));
    out.push_str(&tabular);
    out.push_str(&format!("\\end{{{fontsize}}}\n"));
    if caption.is_empty() {
        out.push_str("\\end{center}\n\n");
    } else {
        out.push_str("\\end{table}\n\n");
    }
    Ok(out)
}

fn grid_rows(table: &ContentNode) -> Result<Vec<Vec<GridCell<'_>>>> {
    table
        .children_with(&Tag::TableRow)
        .map(|row| {
            row.children
                .iter()
                .map(|cell| {
                    if !cell.tag.is_table_cell() {
                        return Err(ConvertError::UnexpectedTableCell {
                            tag: cell.tag.name(),
                        });
                    }
                    let cols = span_attr(cell, "colspan")?;
                    Ok(GridCell {
                        node: cell,
                        rows: span_attr(cell, "rowspan")?.unwrap_or(1),
                        cols: cols.unwrap_or(1),
                        multicolumn: cols.is_some(),
                    })
                })
                .collect()
        })
        .collect()
}

fn span_attr(cell: &ContentNode, attr: &'static str) -> Result<Option<usize>> {
    let Some(value) = cell.attr(attr) else {
        return Ok(None);
    };
    match value.trim().parse::<usize>() {
        Ok(n) if (1..=MAX_SPAN).contains(&n) => Ok(Some(n)),
        _ => Err(ConvertError::InvalidSpan {
            attr,
            value: value.to_string(),
        }),
    }
}

/// Effective column count shared by every row, `None` for an empty table
fn column_count(rows: &[Vec<GridCell<'_>>]) -> Result<Option<usize>> {
    let mut counts = vec![0usize; rows.len()];
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            for spanned in r..r + cell.rows {
                let count = counts
                    .get_mut(spanned)
                    .ok_or(ConvertError::SpanOutOfBounds { row: r, col: c })?;
                *count += cell.cols;
            }
        }
    }

    if counts.windows(2).any(|w| w[0] != w[1]) {
        return Err(ConvertError::InconsistentGrid { counts });
    }
    Ok(counts.first().copied().filter(|&n| n > 0))
}

fn tabular(rows: &[Vec<GridCell<'_>>], col_count: usize, format: &str) -> Result<String> {
    let row_count = rows.len();
    let mut carry = vec![vec![0usize; col_count]; row_count];

    let mut out = format!("\n\\begin{{tabular}}{{{format}}}\n\\hline\n");
    for (r, row) in rows.iter().enumerate() {
        let mut line = String::new();
        let mut col = 0;

        for cell in row {
            while col < col_count && carry[r][col] > 0 {
                line.push('&');
                col += 1;
            }
            if col + cell.cols > col_count {
                return Err(ConvertError::SpanOutOfBounds { row: r, col });
            }

            for below in 1..cell.rows {
                for spanned in &mut carry[r + below][col..col + cell.cols] {
                    *spanned = cell.rows - below;
                }
            }

            let text = escape_cell_text(cell.node.text_content().trim());
            if cell.multicolumn {
                line.push_str(&format!("\\multicolumn{{{}}}{{|c|}}{{{text}}}", cell.cols));
            } else {
                line.push_str(&text);
            }
            line.push('&');
            col += cell.cols;
        }

        while col < col_count && carry[r][col] > 0 {
            line.push('&');
            col += 1;
        }
        if line.ends_with('&') {
            line.pop();
        }

        out.push_str(&line);
        out.push_str("\\\\");
        out.push_str(&row_rule(&carry, r));
        out.push('\n');
    }
    out.push_str("\n\\end{tabular}\n");
    Ok(out)
}

/// Rule under row `r`
fn row_rule(carry: &[Vec<usize>], r: usize) -> String {
    if r == 0 || r + 1 == carry.len() {
        return r"\hline".to_string();
    }

    let next = &carry[r + 1];
    if next.iter().all(|&n| n == 0) {
        return r"\hline".to_string();
    }
    next.iter()
        .enumerate()
        .filter(|(_, n)| **n == 0)
        .map(|(i, _)| format!("\\cline{{{0}-{0}}}", i + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::parse_html;
    use serde_json::json;

    fn render(html: &str) -> Result<String> {
        render_with(html, &CellMetadata::default(), 0)
    }

    fn render_with(html: &str, metadata: &CellMetadata, index: usize) -> Result<String> {
        let root = parse_html(html);
        render_table(&root.children[0], metadata, index)
    }

    #[test]
    fn test_uniform_table() {
        let out = render(
            "<table><thead><tr><th>A</th><th>B</th></tr></thead>\
             <tbody><tr><td>1</td><td>2</td></tr><tr><td>3</td><td>4</td></tr></tbody></table>",
        )
        .unwrap();
        assert_eq!(
            out,
            "\\begin{center}\n\n\\begin{normalsize}\n\n\\begin{tabular}{|c|c|}\n\\hline\n\
             A&B\\\\\\hline\n1&2\\\\\\hline\n3&4\\\\\\hline\n\n\\end{tabular}\n\
             \\end{normalsize}\n\\end{center}\n\n"
        );
    }

    #[test]
    fn test_rowspan_fillers_and_partial_rule() {
        let out = render(
            "<table>\
             <tr><td>A</td><td>B</td></tr>\
             <tr><td rowspan=\"2\">x</td><td>y</td></tr>\
             <tr><td>z</td></tr>\
             <tr><td>p</td><td>q</td></tr>\
             </table>",
        )
        .unwrap();
        assert!(out.contains("A&B\\\\\\hline\n"), "{out}");
        assert!(out.contains("x&y\\\\\\cline{2-2}\n"), "{out}");
        assert!(out.contains("&z\\\\\\hline\n"), "{out}");
        assert!(out.contains("p&q\\\\\\hline\n"), "{out}");
    }

    #[test]
    fn test_middle_carry_filler() {
        let out = render(
            "<table>\
             <tr><td>A</td><td>B</td><td>C</td></tr>\
             <tr><td>a</td><td rowspan=\"2\">b</td><td>c</td></tr>\
             <tr><td>d</td><td>e</td></tr>\
             <tr><td>f</td><td>g</td><td>h</td></tr>\
             </table>",
        )
        .unwrap();
        assert!(out.contains("a&b&c\\\\\\cline{1-1}\\cline{3-3}\n"), "{out}");
        assert!(out.contains("d&&e\\\\\\hline\n"), "{out}");
    }

    #[test]
    fn test_trailing_carry_filler() {
        let out = render(
            "<table>\
             <tr><td>A</td><td>B</td></tr>\
             <tr><td>a</td><td rowspan=\"2\">b</td></tr>\
             <tr><td>c</td></tr>\
             <tr><td>d</td><td>e</td></tr>\
             </table>",
        )
        .unwrap();
        assert!(out.contains("a&b\\\\\\cline{1-1}\n"), "{out}");
        assert!(out.contains("\nc&\\\\\\hline\n"), "{out}");
    }

    #[test]
    fn test_colspan_multicolumn() {
        let out = render(
            "<table><tr><td colspan=\"2\">wide</td></tr><tr><td>1</td><td>2</td></tr></table>",
        )
        .unwrap();
        assert!(out.contains("\\multicolumn{2}{|c|}{wide}\\\\\\hline\n"), "{out}");
        assert!(out.contains("{tabular}{|c|c|}"));
    }

    #[test]
    fn test_cell_text_escaped() {
        let out = render("<table><tr><td>50%</td><td>1.5e-05</td></tr></table>").unwrap();
        assert!(out.contains("50\\%&$1.5\\times 10^{-5}$\\\\"), "{out}");
    }

    #[test]
    fn test_inconsistent_grid() {
        let err = render("<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>")
            .unwrap_err();
        match err {
            ConvertError::InconsistentGrid { counts } => assert_eq!(counts, vec![2, 1]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rowspan_past_last_row() {
        let err = render("<table><tr><td rowspan=\"3\">a</td></tr><tr></tr></table>").unwrap_err();
        assert!(matches!(err, ConvertError::SpanOutOfBounds { row: 0, col: 0 }));
    }

    #[test]
    fn test_invalid_span() {
        let err = render("<table><tr><td colspan=\"two\">a</td></tr></table>").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidSpan { attr: "colspan", .. }));
    }

    #[test]
    fn test_oversized_span() {
        let err = render("<table><tr><td colspan=\"1000000000\">a</td></tr></table>").unwrap_err();
        assert!(
            matches!(err, ConvertError::InvalidSpan { attr: "colspan", value } if value == "1000000000")
        );

        let huge = usize::MAX.to_string();
        let err = render(&format!(
            "<table><tr><td colspan=\"{huge}\">a</td><td colspan=\"{huge}\">b</td></tr></table>"
        ))
        .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidSpan { .. }));
    }

    #[test]
    fn test_three_row_span() {
        let out = render(
            "<table>\
             <tr><td>A</td><td>B</td></tr>\
             <tr><td rowspan=\"3\">x</td><td>y</td></tr>\
             <tr><td>z</td></tr>\
             <tr><td>w</td></tr>\
             <tr><td>p</td><td>q</td></tr>\
             </table>",
        )
        .unwrap();
        assert!(out.contains("\nx&y\\\\\\cline{2-2}\n&z\\\\\\cline{2-2}\n&w\\\\\\hline\np&q\\\\\\hline\n"), "{out}");
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(render("<table></table>").unwrap(), "");
    }

    #[test]
    fn test_caption_metadata() {
        let metadata = match json!({"tableCaption": {
            "caption": "['First', 'Second']",
            "label": "tab:data",
            "fontsize": "small",
            "format": "|l|r|"
        }}) {
            serde_json::Value::Object(map) => CellMetadata::new(map),
            _ => unreachable!(),
        };
        let out = render_with(
            "<table><tr><td>a</td><td>b</td></tr></table>",
            &metadata,
            1,
        )
        .unwrap();
        assert!(out.starts_with(
            "\n\\begin{table}[htb]\n\\centering\n\\caption{Second\\label{tab:data-1}}\n\n\\begin{small}\n"
        ));
        assert!(out.contains("{tabular}{|l|r|}"));
        assert!(out.ends_with("\\end{small}\n\\end{table}\n\n"));
    }
}
