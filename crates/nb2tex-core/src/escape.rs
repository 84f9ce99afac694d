//! LaTeX escaping helpers
//!
//! Makes notebook prose safe to embed in LaTeX outside verbatim regions.
//! Math written by the author is left alone, so the passes here only touch
//! characters that markdown accepts but LaTeX does not.

use regex::Regex;
use std::sync::LazyLock;

/// Marker opening a span that must reach the output untouched (image paths)
pub const PROTECT_START: &str = "beginincludegraphics\n";
/// Marker closing a protected span
pub const PROTECT_END: &str = "endincludegraphics\n";

/// Characters removed when deriving labels from headings and URLs
pub const LABEL_STRIP: &str = r" %:/,.\[]=?~!@#$^&*()-_{};";

/// Candidate delimiters for `\verb`, in order of preference
const VERB_DELIMITERS: &[char] = &['+', '|', '!', '~', '@', '#', ':', ';', '=', '-'];

static FLOAT_EXPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9,.\-]+)e(\+|\-)([0-9]+)$").expect("float exponent pattern is valid")
});

/// Span kinds tracked while escaping underscores, one bit each
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SpanSet(u8);

impl SpanSet {
    const INLINE_MATH: u8 = 1 << 0;
    const EQUATION: u8 = 1 << 1;
    const EQUATION_STAR: u8 = 1 << 2;
    const EQNARRAY: u8 = 1 << 3;
    const PROTECTED: u8 = 1 << 4;

    fn toggle(&mut self, kind: u8) {
        self.0 ^= kind;
    }

    fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Every delimiter occurrence flips the parity of its span kind.
///
/// `\begin{equation` also matches the starred form, so a starred environment
/// flips both the `EQUATION` and `EQUATION_STAR` bits.
const SPAN_DELIMITERS: &[(&str, u8)] = &[
    ("$", SpanSet::INLINE_MATH),
    (r"\begin{equation", SpanSet::EQUATION),
    (r"\end{equation", SpanSet::EQUATION),
    (r"\begin{equation*", SpanSet::EQUATION_STAR),
    (r"\end{equation*", SpanSet::EQUATION_STAR),
    (r"\begin{eqnarray", SpanSet::EQNARRAY),
    (r"\end{eqnarray", SpanSet::EQNARRAY),
    (PROTECT_START, SpanSet::PROTECTED),
    (PROTECT_END, SpanSet::PROTECTED),
];

/// Un-escape `\%`, then escape every `%`
///
/// Running this twice gives the same result as running it once.
pub fn escape_percent(text: &str) -> String {
    text.replace(r"\%", "%").replace('%', r"\%")
}

/// Escape the text content of a table cell
///
/// Percent signs are escaped, comparison characters are set in math mode and
/// a computer-style float such as `1.5e-05` becomes `$1.5\times 10^{-5}$`.
pub fn escape_cell_text(text: &str) -> String {
    let mut escaped = escape_percent(text);
    for symbol in ['<', '>', '|', '='] {
        escaped = escaped.replace(symbol, &format!("${symbol}$"));
    }

    let scientific = {
        let trimmed = escaped.trim();
        FLOAT_EXPONENT.captures(trimmed).map(|caps| {
            let sign = if &caps[2] == "+" { "" } else { "-" };
            let exponent = caps[3].trim_start_matches('0');
            let exponent = if exponent.is_empty() { "0" } else { exponent };
            (
                caps[0].to_string(),
                format!(r"${}\times 10^{{{}{}}}$", &caps[1], sign, exponent),
            )
        })
    };

    match scientific {
        Some((token, replacement)) => escaped.replace(&token, &replacement),
        None => escaped,
    }
}

/// Escape underscores outside math and protected spans
///
/// A position counts as inside a span kind when an odd number of that kind's
/// delimiters start before it. Kinds are tracked independently; an underscore
/// is left alone as soon as any kind has odd parity.
pub fn escape_underscores(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut spans = SpanSet::default();

    for (i, ch) in text.char_indices() {
        if ch == '_' && spans.is_empty() {
            out.push('\\');
        }
        out.push(ch);

        let rest = &text[i..];
        for (delimiter, kind) in SPAN_DELIMITERS {
            if rest.starts_with(delimiter) {
                spans.toggle(*kind);
            }
        }
    }

    out
}

/// Remove the protected-span markers from rendered output
pub fn strip_protect_markers(text: &str) -> String {
    text.replace(PROTECT_START, "").replace(PROTECT_END, "")
}

/// Derive a label from arbitrary text by dropping punctuation and whitespace
pub fn clean_label(text: &str) -> String {
    text.chars().filter(|c| !LABEL_STRIP.contains(*c)).collect()
}

/// Render a single-line code span as `\verb`
pub fn verb(text: &str) -> String {
    let delimiter = VERB_DELIMITERS
        .iter()
        .copied()
        .find(|d| !text.contains(*d))
        .unwrap_or('+');
    format!(r"\verb{delimiter}{text}{delimiter}")
}
