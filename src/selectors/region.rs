use lazy_static::lazy_static;
use scraper::{ElementRef, Selector};

lazy_static! {
    /// Tried in order; the first selector with a match inside the message wins
    static ref CONTENT_REGIONS: Vec<Selector> = [
        "[data-message-content]",
        ".markdown",
        r#"[class*="markdown"]"#,
        ".whitespace-pre-wrap",
    ]
    .iter()
    .map(|css| Selector::parse(css).expect("valid content region selector"))
    .collect();
}

/// The part of a message element holding its rendered content, or the element itself
pub fn find_content_region(message: ElementRef<'_>) -> ElementRef<'_> {
    CONTENT_REGIONS.iter().find_map(|selector| message.select(selector).next()).unwrap_or(message)
}
