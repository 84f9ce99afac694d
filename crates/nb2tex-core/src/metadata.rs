//! Caption and label lookup in cell metadata
//!
//! A metadata value is either a scalar that applies to every output of the
//! cell, or a list with one entry per occurrence (first table, second table,
//! ...). Lists are usually written as Python literals inside a string, e.g.
//! `"['First caption', 'Second caption']"`; real JSON arrays work too.

use crate::error::{ConvertError, Result};
use nb_parser::CellMetadata;
use serde_json::Value;

/// Look up `group.key` for occurrence `index`, falling back to `default`
pub fn meta_string(
    metadata: &CellMetadata,
    index: usize,
    group: &str,
    key: &str,
    default: &str,
) -> Result<String> {
    let Some(value) = metadata.value(group, key) else {
        return Ok(default.to_string());
    };

    let picked = match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) if s.starts_with('[') => {
            let items = parse_literal_list(s).map_err(|message| ConvertError::Metadata {
                group: group.to_string(),
                key: key.to_string(),
                message,
            })?;
            items.into_iter().nth(index)
        }
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.get(index).and_then(scalar_text),
        other => scalar_text(other),
    };

    Ok(picked.unwrap_or_else(|| default.to_string()))
}

/// `\label{<label>-<index>}`, or nothing for an empty label
pub fn indexed_label(label: &str, index: usize) -> String {
    if label.is_empty() {
        String::new()
    } else {
        format!("\\label{{{label}-{index}}}")
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a Python-style literal list of strings and numbers
fn parse_literal_list(text: &str) -> std::result::Result<Vec<String>, String> {
    let mut chars = text.trim().chars().peekable();
    if chars.next() != Some('[') {
        return Err("expected '['".to_string());
    }

    let mut items = Vec::new();
    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.peek().copied() {
            None => return Err("unterminated list".to_string()),
            Some(']') => {
                chars.next();
                break;
            }
            Some(quote @ ('\'' | '"')) => {
                chars.next();
                let mut item = String::new();
                loop {
                    match chars.next() {
                        None => return Err("unterminated string".to_string()),
                        Some('\\') => match chars.next() {
                            Some('n') => item.push('\n'),
                            Some('t') => item.push('\t'),
                            Some(c) if c == quote || c == '\\' => item.push(c),
                            Some(c) => {
                                item.push('\\');
                                item.push(c);
                            }
                            None => return Err("unterminated string".to_string()),
                        },
                        Some(c) if c == quote => break,
                        Some(c) => item.push(c),
                    }
                }
                items.push(item);
            }
            Some(_) => {
                let mut item = String::new();
                while let Some(&c) = chars.peek() {
                    if c == ',' || c == ']' {
                        break;
                    }
                    item.push(c);
                    chars.next();
                }
                items.push(item.trim().to_string());
            }
        }

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            Some(',') => continue,
            Some(']') => break,
            Some(c) => return Err(format!("unexpected character {c:?}")),
            None => return Err("unterminated list".to_string()),
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(value: Value) -> CellMetadata {
        match value {
            Value::Object(map) => CellMetadata::new(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_missing_uses_default() {
        let md = metadata(json!({}));
        assert_eq!(
            meta_string(&md, 0, "tableCaption", "fontsize", "normalsize").unwrap(),
            "normalsize"
        );
    }

    #[test]
    fn test_scalar_applies_to_every_index() {
        let md = metadata(json!({"figureCaption": {"caption": "A plot"}}));
        assert_eq!(
            meta_string(&md, 3, "figureCaption", "caption", "").unwrap(),
            "A plot"
        );
    }

    #[test]
    fn test_literal_list_indexed() {
        let md = metadata(json!({"tableCaption": {"caption": "['First', \"Second, too\"]"}}));
        assert_eq!(
            meta_string(&md, 0, "tableCaption", "caption", "").unwrap(),
            "First"
        );
        assert_eq!(
            meta_string(&md, 1, "tableCaption", "caption", "").unwrap(),
            "Second, too"
        );
        assert_eq!(meta_string(&md, 2, "tableCaption", "caption", "").unwrap(), "");
    }

    #[test]
    fn test_json_array_indexed() {
        let md = metadata(json!({"figureCaption": {"width": [0.5, 0.8]}}));
        assert_eq!(
            meta_string(&md, 1, "figureCaption", "width", "").unwrap(),
            "0.8"
        );
    }

    #[test]
    fn test_empty_string_uses_default() {
        let md = metadata(json!({"tableCaption": {"fontsize": ""}}));
        assert_eq!(
            meta_string(&md, 0, "tableCaption", "fontsize", "normalsize").unwrap(),
            "normalsize"
        );
    }

    #[test]
    fn test_malformed_list() {
        let md = metadata(json!({"tableCaption": {"caption": "['open"}}));
        let err = meta_string(&md, 0, "tableCaption", "caption", "").unwrap_err();
        assert!(matches!(err, ConvertError::Metadata { .. }));
    }

    #[test]
    fn test_indexed_label() {
        assert_eq!(indexed_label("fig:a", 2), "\\label{fig:a-2}");
        assert_eq!(indexed_label("", 2), "");
    }

    #[test]
    fn test_literal_numbers() {
        assert_eq!(
            parse_literal_list("[1, 2.5 , -3]").unwrap(),
            vec!["1", "2.5", "-3"]
        );
        assert_eq!(parse_literal_list("[]").unwrap(), Vec::<String>::new());
    }
}
