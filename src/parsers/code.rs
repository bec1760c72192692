use crate::dom::{SnapshotElement, SnapshotNode};
use crate::models::ContentBlock;

const LANGUAGE_PREFIXES: &[&str] = &["language-", "lang-"];
const FILENAME_MARKERS: &[&str] = &["filename", "file-name"];

/// Elements that hold prose; a wrapper containing any of these is not a code container
const PROSE_ELEMENTS: &[&str] = &["p", "table", "ul", "ol", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6"];

/// The `pre`/`code` element behind `el`, if `el` is a code block or a thin wrapper around one
pub fn code_container(el: &SnapshotElement) -> Option<&SnapshotElement> {
    if el.is("pre") || el.is("code") {
        return Some(el);
    }
    if !matches!(el.name.as_str(), "div" | "figure" | "section") {
        return None;
    }

    let pre = el.find_descendant(&|e: &SnapshotElement| e.is("pre"))?;
    let prose = el.find_descendant(&|e: &SnapshotElement| PROSE_ELEMENTS.contains(&e.name.as_str()));
    if prose.is_some() {
        return None;
    }
    Some(pre)
}

/// Whether `el` is a label carrying the file name of the code block after it
pub fn is_filename_label(el: &SnapshotElement) -> bool {
    FILENAME_MARKERS.iter().any(|marker| el.class_contains(marker))
}

/// Build a code block from `wrapper` (the classified child) and its `container`.
///
/// `filename` is the text of a preceding sibling label, if the caller found one.
pub fn build_code_block(wrapper: &SnapshotElement, container: &SnapshotElement, filename: Option<String>) -> ContentBlock {
    let code = if container.is("code") {
        Some(container)
    } else {
        container.find_descendant(&|e: &SnapshotElement| e.is("code"))
    };

    let language = language_of(container).or_else(|| code.and_then(language_of)).or_else(|| language_of(wrapper));

    let content = match code {
        Some(code) => code.text_content(),
        None => text_without_buttons(container),
    };

    // A label nested inside the wrapper counts when no sibling label was found
    let filename = filename.or_else(|| {
        wrapper
            .find_descendant(&|e: &SnapshotElement| is_filename_label(e))
            .map(|label| label.text_content().trim().to_string())
            .filter(|name| !name.is_empty())
    });

    ContentBlock::Code { language, content: content.trim_end_matches('\n').to_string(), filename }
}

/// Language from `language-*` / `lang-*` class tokens, or a `data-language` attribute
pub fn language_of(el: &SnapshotElement) -> Option<String> {
    el.classes()
        .find_map(|class| LANGUAGE_PREFIXES.iter().find_map(|prefix| class.strip_prefix(prefix)))
        .or_else(|| el.attr("data-language"))
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_lowercase)
}

fn text_without_buttons(el: &SnapshotElement) -> String {
    let mut working = el.clone();
    strip_buttons(&mut working);
    working.text_content()
}

fn strip_buttons(el: &mut SnapshotElement) {
    el.children.retain(|child| !matches!(child, SnapshotNode::Element(e) if e.is("button")));
    for child in el.children.iter_mut() {
        if let SnapshotNode::Element(e) = child {
            strip_buttons(e);
        }
    }
}
