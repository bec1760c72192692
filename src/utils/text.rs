use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::notation::scan::NOTATION_SPAN;

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

lazy_static! {
    static ref HORIZONTAL_RUNS: Regex = Regex::new(r"[ \t\u{a0}]+").expect("valid whitespace pattern");
    static ref BLANK_RUNS: Regex = Regex::new(r"\n{3,}").expect("valid blank line pattern");
    /// "end.Next" left behind when two block elements were read without a separator
    static ref GLUED_SENTENCE: Regex =
        Regex::new(r"([a-z]{2}[.!?])([A-Z][a-z])").expect("valid glued sentence pattern");
    static ref PLACEHOLDER: Regex =
        Regex::new("\u{E000}(\\d+)\u{E001}").expect("valid placeholder pattern");
}

/// Normalize whitespace in extracted text without touching notation.
///
/// Notation spans are swapped for placeholders first, the text is cleaned, then the spans
/// are put back verbatim. Every caller goes through this one order.
pub fn clean_text(text: &str) -> String {
    let mut spans: Vec<String> = Vec::new();
    let protected = NOTATION_SPAN.replace_all(text, |caps: &Captures| {
        spans.push(caps[0].to_string());
        format!("{}{}{}", PLACEHOLDER_OPEN, spans.len() - 1, PLACEHOLDER_CLOSE)
    });

    let unified = protected.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<String> =
        unified.lines().map(|line| HORIZONTAL_RUNS.replace_all(line, " ").trim().to_string()).collect();
    let joined = lines.join("\n");
    let collapsed = BLANK_RUNS.replace_all(&joined, "\n\n");
    let split = GLUED_SENTENCE.replace_all(collapsed.trim(), "$1 $2");

    PLACEHOLDER
        .replace_all(&split, |caps: &Captures| {
            caps[1].parse::<usize>().ok().and_then(|i| spans.get(i)).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// First line of `text`, cut to at most `max_chars` characters with an ellipsis
pub fn first_line_truncated(text: &str, max_chars: usize) -> String {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or_default();
    if line.chars().count() <= max_chars {
        return line.to_string();
    }
    let cut: String = line.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}
