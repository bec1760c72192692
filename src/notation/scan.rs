use lazy_static::lazy_static;
use regex::Regex;

use crate::models::NotationExpression;

lazy_static! {
    /// `$$...$$` (group 1) or `$...$` (group 2).
    ///
    /// The block alternative is tried first so `$$x$$` is never read as two empty inline
    /// spans. Inline spans stay on one line and neither start nor end with whitespace, which
    /// keeps prices like "$5 and $10" out.
    pub static ref NOTATION_SPAN: Regex =
        Regex::new(r"(?s)\$\$(.+?)\$\$|\$([^\s$](?:[^$\n]*[^\s$])?)\$").expect("valid notation pattern");
}

/// Record every notation span in `text`, in order of appearance.
pub fn scan_notation(text: &str) -> Vec<NotationExpression> {
    let mut found = Vec::new();
    let mut chars_before = 0usize;
    let mut last_byte = 0usize;

    for caps in NOTATION_SPAN.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        chars_before += text[last_byte..whole.start()].chars().count();
        last_byte = whole.start();

        let (raw, is_block) = match caps.get(1) {
            Some(block) => (block.as_str().trim(), true),
            None => (caps.get(2).map_or("", |m| m.as_str()), false),
        };
        if raw.is_empty() {
            continue;
        }
        found.push(NotationExpression { raw: raw.to_string(), is_block, offset: chars_before });
    }

    found
}
