use scraper::ElementRef;

use crate::dom::{SnapshotElement, SnapshotNode, extract_text};
use crate::models::{ContentBlock, ExtractOptions};
use crate::notation::{repair_text, scan_notation};
use crate::parsers::code::{build_code_block, code_container, is_filename_label};
use crate::parsers::image::{build_image_block, image_elements};
use crate::parsers::list::{flatten_list, is_list};
use crate::parsers::table::{parse_table, table_container};
use crate::utils::clean_text;

const REASONING_MARKERS: &[&str] = &["thinking", "reasoning"];
const REASONING_ATTRIBUTES: &[&str] = &["data-thinking", "data-reasoning"];
const REASONING_SUMMARY_WORDS: &[&str] = &["thought", "thinking", "reasoning"];

/// Phrasing content; consecutive runs of these (and loose text) form one paragraph
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "del", "em", "font", "i", "kbd", "label", "mark", "math",
    "mjx-container", "q", "s", "small", "span", "strike", "strong", "sub", "sup", "time", "u", "var",
];

/// Split a message's content region into typed blocks. The page is not modified.
pub fn segment(content: ElementRef<'_>, options: &ExtractOptions) -> Vec<ContentBlock> {
    segment_snapshot(&SnapshotElement::capture(content), options)
}

/// Classify each child of `root` in document order.
///
/// Priority per child: code, table, reasoning, list, image, then text. Disabled block types
/// fall through to text; disabled images are dropped. Never fails: anything unrecognized
/// ends up as text, and an empty pass falls back to the whole element's text.
pub fn segment_snapshot(root: &SnapshotElement, options: &ExtractOptions) -> Vec<ContentBlock> {
    if !root.has_element_children() {
        return build_text_block(&extract_text(root), options).into_iter().collect();
    }

    let mut segmenter = Segmenter::new(options);
    for (position, child) in root.children.iter().enumerate() {
        match child {
            SnapshotNode::Text(_) => segmenter.inline.push(child.clone()),
            SnapshotNode::Element(el) => segmenter.classify(el, next_element(&root.children, position)),
        }
    }
    segmenter.flush_inline();

    if segmenter.blocks.is_empty() {
        return build_text_block(&extract_text(root), options).into_iter().collect();
    }
    segmenter.blocks
}

/// Repair (when math parsing is on) and normalize raw extracted text
pub fn prepare_text(raw: &str, options: &ExtractOptions) -> String {
    if options.parse_math { clean_text(&repair_text(raw)) } else { clean_text(raw) }
}

/// Text block over `raw`, with notation spans recorded. `None` when nothing is left after cleaning.
pub fn build_text_block(raw: &str, options: &ExtractOptions) -> Option<ContentBlock> {
    let content = prepare_text(raw, options);
    if content.is_empty() {
        return None;
    }

    let notation = if options.parse_math { scan_notation(&content) } else { Vec::new() };
    Some(ContentBlock::Text { has_notation: !notation.is_empty(), content, notation })
}

struct Segmenter<'o> {
    options: &'o ExtractOptions,
    blocks: Vec<ContentBlock>,
    inline: Vec<SnapshotNode>,
    pending_filename: Option<String>,
}

impl<'o> Segmenter<'o> {
    fn new(options: &'o ExtractOptions) -> Self {
        Self { options, blocks: Vec::new(), inline: Vec::new(), pending_filename: None }
    }

    fn classify(&mut self, el: &SnapshotElement, next: Option<&SnapshotElement>) {
        let options = self.options;

        if options.parse_code {
            if is_filename_label(el) && next.is_some_and(|n| code_container(n).is_some()) {
                self.flush_inline();
                let name = el.text_content().trim().to_string();
                self.pending_filename = (!name.is_empty()).then_some(name);
                return;
            }
            if let Some(container) = code_container(el) {
                self.flush_inline();
                let filename = self.pending_filename.take();
                self.blocks.push(build_code_block(el, container, filename));
                return;
            }
        }

        if options.parse_tables
            && let Some(parsed) = table_container(el).and_then(|table| parse_table(table, options.parse_math))
        {
            self.flush_inline();
            self.blocks.push(ContentBlock::Table { headers: parsed.headers, rows: parsed.rows });
            return;
        }

        if options.parse_reasoning && is_reasoning(el) {
            self.flush_inline();
            self.blocks.extend(build_reasoning_block(el, options));
            return;
        }

        if is_list(el) {
            self.flush_inline();
            self.blocks.extend(build_text_block(&flatten_list(el), options));
            return;
        }

        let images = image_elements(el);
        if !images.is_empty() {
            self.flush_inline();
            if options.parse_images {
                self.blocks.extend(images.into_iter().filter_map(build_image_block));
            }
            return;
        }

        if INLINE_ELEMENTS.contains(&el.name.as_str()) {
            self.inline.push(SnapshotNode::Element(el.clone()));
            return;
        }

        self.flush_inline();
        self.blocks.extend(build_text_block(&extract_text(el), options));
    }

    fn flush_inline(&mut self) {
        if self.inline.is_empty() {
            return;
        }
        let run = SnapshotElement::fragment(std::mem::take(&mut self.inline));
        self.blocks.extend(build_text_block(&extract_text(&run), self.options));
    }
}

/// Next element sibling after `position`, looking past whitespace but not past text
fn next_element(children: &[SnapshotNode], position: usize) -> Option<&SnapshotElement> {
    for child in children.iter().skip(position + 1) {
        match child {
            SnapshotNode::Element(el) => return Some(el),
            SnapshotNode::Text(text) if text.trim().is_empty() => continue,
            SnapshotNode::Text(_) => return None,
        }
    }
    None
}

fn is_reasoning(el: &SnapshotElement) -> bool {
    if REASONING_ATTRIBUTES.iter().any(|attr| el.has_attr(attr)) {
        return true;
    }
    if REASONING_MARKERS.iter().any(|marker| el.class_contains(marker)) {
        return true;
    }
    el.is("details")
        && el.child_elements().find(|child| child.is("summary")).is_some_and(|summary| {
            let text = summary.text_content().to_lowercase();
            REASONING_SUMMARY_WORDS.iter().any(|word| text.contains(word))
        })
}

fn build_reasoning_block(el: &SnapshotElement, options: &ExtractOptions) -> Option<ContentBlock> {
    let collapsed = el.attr("data-collapsed").is_some_and(|v| v.eq_ignore_ascii_case("true"))
        || el.attr("aria-expanded").is_some_and(|v| v.eq_ignore_ascii_case("false"))
        || el.has_class("collapsed")
        || (el.is("details") && !el.has_attr("open"));

    let mut body = el.clone();
    body.children.retain(|child| !matches!(child, SnapshotNode::Element(e) if e.is("summary")));

    let content = prepare_text(&extract_text(&body), options);
    if content.is_empty() {
        return None;
    }
    Some(ContentBlock::Reasoning { content, collapsed })
}
