use percent_encoding::percent_decode_str;
use uuid::Uuid;

/// Used when the caller has no source URL
pub const BLANK_URL: &str = "about:blank";

/// Path segments that precede a conversation id
const ID_MARKERS: &[&str] = &["c", "chat"];

/// Source URL, or [`BLANK_URL`] when empty
pub fn normalize_source_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() { BLANK_URL.to_string() } else { trimmed.to_string() }
}

/// Id from a `/c/<id>` or `/chat/<id>` URL, percent-decoded
pub fn conversation_id_from_url(url: &str) -> Option<String> {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme.split(['?', '#']).next().unwrap_or_default();

    let segments: Vec<&str> = path.split('/').skip(1).filter(|s| !s.is_empty()).collect();
    let marker = segments.iter().rposition(|s| ID_MARKERS.contains(s))?;
    let raw = segments.get(marker + 1)?;

    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    let id = decoded.trim();
    (!id.is_empty()).then(|| id.to_string())
}

/// Conversation id for `url`.
///
/// Falls back to a name-based UUID of the URL so extracting the same page twice yields the
/// same id.
pub fn conversation_id(url: &str) -> String {
    conversation_id_from_url(url).unwrap_or_else(|| Uuid::new_v5(&Uuid::NAMESPACE_URL, url.as_bytes()).to_string())
}
