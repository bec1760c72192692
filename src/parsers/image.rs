use crate::dom::SnapshotElement;
use crate::models::ContentBlock;

const GENERATED_MARKERS: &[&str] = &["generated", "dalle", "dall-e"];

/// `el` if it is an `img`, or every image inside a wrapper with no text of its own
pub fn image_elements(el: &SnapshotElement) -> Vec<&SnapshotElement> {
    if el.is("img") {
        return vec![el];
    }
    let mut images = Vec::new();
    if el.text_content().trim().is_empty() {
        el.find_all(&|e: &SnapshotElement| e.is("img"), &mut images);
    }
    images
}

/// Image block for `img`, `None` when it has no usable source
pub fn build_image_block(img: &SnapshotElement) -> Option<ContentBlock> {
    let src = img.attr("src").or_else(|| img.attr("data-src")).map(str::trim).filter(|s| !s.is_empty())?;
    let alt = img.attr("alt").unwrap_or_default().trim().to_string();

    let haystack = format!("{} {} {}", img.attr("class").unwrap_or_default(), alt, src).to_lowercase();
    let generated = GENERATED_MARKERS.iter().any(|marker| haystack.contains(marker));

    Some(ContentBlock::Image { src: src.to_string(), alt, generated })
}
