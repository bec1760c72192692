//! Text extraction from snapshots.
//!
//! Reading `textContent` straight off a chat page produces garbage around math: rendered
//! formulas contribute both their glyph layer and their hidden MathML, and strikethrough
//! wrappers split tokens apart. [`extract_text`] rewrites a private copy first:
//!
//! 1. scripts, styles, buttons and SVG are dropped;
//! 2. rendered math is replaced by `$$src$$` / `$src$`, with `src` taken from the TeX
//!    annotation or `data-latex`-style attribute the renderer left behind;
//! 3. strikethrough elements are flattened to their plain text;
//! 4. `<br>` becomes `\n` and block-level elements are followed by `\n`.

use super::snapshot::{SnapshotElement, SnapshotNode};

const IGNORED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "svg", "button"];

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "summary", "table", "tr", "ul",
];

const STRIKETHROUGH_ELEMENTS: &[&str] = &["s", "del", "strike"];

const SOURCE_ATTRIBUTES: &[&str] = &["data-latex", "data-tex", "data-math", "data-formula"];

/// Text of `element` after the math-aware rewrite. `element` itself is left untouched.
pub fn extract_text(element: &SnapshotElement) -> String {
    let mut working = SnapshotElement::fragment(vec![SnapshotNode::Element(element.clone())]);
    rewrite_for_text(&mut working);
    working.text_content()
}

/// Rewrite the children of `element` in place. Only ever call this on a snapshot.
pub fn rewrite_for_text(element: &mut SnapshotElement) {
    let children = std::mem::take(&mut element.children);
    for child in children {
        let mut el = match child {
            SnapshotNode::Element(el) => el,
            text @ SnapshotNode::Text(_) => {
                element.children.push(text);
                continue;
            }
        };

        if IGNORED_ELEMENTS.contains(&el.name.as_str()) {
            continue;
        }

        if let Some(math) = math_source(&el) {
            let text = if math.is_block { format!("$${}$$", math.source) } else { format!("${}$", math.source) };
            element.children.push(SnapshotNode::Text(text));
            if math.is_block {
                element.children.push(SnapshotNode::Text("\n".to_string()));
            }
            continue;
        }

        if el.is("br") {
            element.children.push(SnapshotNode::Text("\n".to_string()));
            continue;
        }

        rewrite_for_text(&mut el);

        if is_strikethrough(&el) {
            element.children.push(SnapshotNode::Text(el.text_content()));
            continue;
        }

        let block = BLOCK_ELEMENTS.contains(&el.name.as_str());
        element.children.push(SnapshotNode::Element(el));
        if block {
            element.children.push(SnapshotNode::Text("\n".to_string()));
        }
    }
}

fn is_strikethrough(el: &SnapshotElement) -> bool {
    if STRIKETHROUGH_ELEMENTS.contains(&el.name.as_str()) {
        return true;
    }
    el.attr("style").is_some_and(|style| style.to_ascii_lowercase().contains("line-through"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathSource {
    pub source: String,
    pub is_block: bool,
}

/// Recover the TeX source of a rendered math element, if `el` is one.
///
/// Recognizes KaTeX (`.katex`, `.katex-display`), raw MathML (`<math>`), MathJax 3
/// (`<mjx-container>`) and generic elements carrying a `data-latex`-style attribute.
pub fn math_source(el: &SnapshotElement) -> Option<MathSource> {
    let attribute_source =
        SOURCE_ATTRIBUTES.iter().find_map(|name| el.attr(name)).map(str::trim).filter(|s| !s.is_empty());

    let rendered = el.has_class("katex")
        || el.has_class("katex-display")
        || el.is("math")
        || el.is("mjx-container")
        || el.has_class("math-display")
        || el.has_class("math-inline");
    if attribute_source.is_none() && !rendered {
        return None;
    }

    let is_block = el.has_class("katex-display")
        || el.has_class("math-display")
        || el.attr("display").is_some_and(|d| d == "block" || d == "true")
        || el.attr("data-display").is_some_and(|d| d == "block" || d == "true");

    let source = match attribute_source {
        Some(s) => s.to_string(),
        None => annotation_source(el)?,
    };

    Some(MathSource { source, is_block })
}

fn annotation_source(el: &SnapshotElement) -> Option<String> {
    let annotation = el.find_descendant(&|e: &SnapshotElement| {
        (e.is("annotation") && e.attr("encoding").is_some_and(|enc| enc.contains("tex")))
            || (e.is("script") && e.attr("type").is_some_and(|t| t.starts_with("math/tex")))
    })?;
    let text = annotation.text_content();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
