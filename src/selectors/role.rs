use lazy_static::lazy_static;
use scraper::{ElementRef, Selector};

use crate::models::Role;

const ROLE_ATTRIBUTE: &str = "data-message-author-role";

/// Inner markup beyond this many characters is not inspected for keywords
const INNER_HTML_PREFIX_CHARS: usize = 500;

const USER_KEYWORDS: &[&str] = &["user", "human"];
const ASSISTANT_KEYWORDS: &[&str] = &["assistant", "gpt", "bot", "model"];

/// Bubble backgrounds seen on user turns. Themes change these freely.
const USER_BUBBLE_COLOURS: &[&str] = &["#f4f4f4", "#f7f7f8", "rgb(244,244,244)", "rgb(247,247,248)"];

lazy_static! {
    static ref ROLE_DESCENDANT: Selector =
        Selector::parse("[data-message-author-role]").expect("valid author role selector");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedRole {
    User,
    Assistant,
    Unknown,
}

impl DetectedRole {
    /// Concrete role, alternating by position when detection came back empty
    pub fn or_parity(self, position: usize) -> Role {
        match self {
            DetectedRole::User => Role::User,
            DetectedRole::Assistant => Role::Assistant,
            DetectedRole::Unknown => Role::from_parity(position),
        }
    }
}

/// Best-effort role of a message element.
///
/// Checked in order: the author-role attribute on the element, the same attribute on a
/// descendant, role keywords in the class attribute and the start of the inner markup, and
/// finally the inline background colour.
pub fn resolve_role(element: ElementRef<'_>) -> DetectedRole {
    if let Some(role) = element.value().attr(ROLE_ATTRIBUTE).and_then(parse_role_value) {
        return role;
    }

    if let Some(role) = element
        .select(&ROLE_DESCENDANT)
        .filter_map(|d| d.value().attr(ROLE_ATTRIBUTE))
        .find_map(parse_role_value)
    {
        return role;
    }

    let class = element.value().attr("class").unwrap_or_default();
    let inner: String = element.inner_html().chars().take(INNER_HTML_PREFIX_CHARS).collect();
    let haystack = format!("{} {}", class, inner).to_lowercase();
    if USER_KEYWORDS.iter().any(|k| haystack.contains(k)) {
        return DetectedRole::User;
    }
    if ASSISTANT_KEYWORDS.iter().any(|k| haystack.contains(k)) {
        return DetectedRole::Assistant;
    }

    style_heuristic(element)
}

fn parse_role_value(value: &str) -> Option<DetectedRole> {
    match value.trim().to_ascii_lowercase().as_str() {
        "user" | "human" => Some(DetectedRole::User),
        "assistant" | "model" | "ai" => Some(DetectedRole::Assistant),
        _ => None,
    }
}

// Unreliable: only an explicit inline background from the short list above counts.
fn style_heuristic(element: ElementRef<'_>) -> DetectedRole {
    let Some(style) = element.value().attr("style") else {
        return DetectedRole::Unknown;
    };

    let background = style.split(';').find_map(|decl| {
        let (prop, value) = decl.split_once(':')?;
        prop.trim().eq_ignore_ascii_case("background-color").then(|| value.to_ascii_lowercase())
    });

    match background {
        Some(value) => {
            let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
            if USER_BUBBLE_COLOURS.contains(&compact.as_str()) {
                DetectedRole::User
            } else {
                DetectedRole::Unknown
            }
        }
        None => DetectedRole::Unknown,
    }
}
