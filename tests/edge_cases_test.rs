/// Edge case tests for extraction
///
/// Tests boundary conditions: empty pages, unparseable messages, unicode offsets,
/// dollar signs that are not math, title fallbacks and disabled options
mod common;

use common::{Layout, PageBuilder, TurnBuilder};
use convo_export::models::{ContentBlock, Role};
use convo_export::utils::BLANK_URL;
use convo_export::{ExtractOptions, extract_conversation};

fn only_text(blocks: &[ContentBlock]) -> (&str, usize) {
    match blocks {
        [ContentBlock::Text { content, notation, .. }] => (content.as_str(), notation.len()),
        other => panic!("expected one text block, got {:?}", other),
    }
}

#[test]
fn test_empty_page_fails_with_layout_message() {
    let result = extract_conversation("<html><body></body></html>", "", &ExtractOptions::default());
    assert!(!result.success);
    assert!(result.conversation.is_none());
    assert!(result.error.unwrap().starts_with("No messages found"));
}

#[test]
fn test_page_chrome_is_not_a_message() {
    let html = PageBuilder::new().chrome("<a href=\"/\">New chat</a><button>Share</button>").build();
    let result = extract_conversation(&html, "", &ExtractOptions::default());
    assert!(!result.success);
}

#[test]
fn test_unparseable_message_becomes_warning() {
    let html = PageBuilder::new()
        .turns([
            TurnBuilder::user("<button>Copy</button>"),
            TurnBuilder::assistant("<p>A real answer</p>"),
        ])
        .build();

    let result = extract_conversation(&html, "", &ExtractOptions::default());
    assert!(result.success);
    assert_eq!(result.warnings, vec!["Failed to parse message 1: message has no extractable content"]);

    let conversation = result.conversation.unwrap();
    assert_eq!(conversation.message_count, 1);
    assert_eq!(conversation.messages[0].index, 0);
    assert_eq!(conversation.messages[0].role, Role::Assistant);
}

#[test]
fn test_no_parseable_messages_fails() {
    let html = PageBuilder::new()
        .turns([TurnBuilder::user("<button>Edit</button>"), TurnBuilder::assistant("<svg></svg>")])
        .build();

    let result = extract_conversation(&html, "", &ExtractOptions::default());
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("No messages could be parsed"));
    assert_eq!(result.warnings.len(), 2);
}

#[test]
fn test_notation_offsets_count_unicode_characters() {
    let html = PageBuilder::new().turn(TurnBuilder::user("<p>Ünïcödé 🙂 $z$</p>")).build();
    let conversation = extract_conversation(&html, "", &ExtractOptions::default()).conversation.unwrap();

    match &conversation.messages[0].blocks[0] {
        ContentBlock::Text { notation, .. } => assert_eq!(notation[0].offset, 10),
        other => panic!("expected text, got {:?}", other),
    }
}

#[test]
fn test_prices_are_not_notation() {
    let html = PageBuilder::new().turn(TurnBuilder::user("<p>It costs $5 and $10 total</p>")).build();
    let conversation = extract_conversation(&html, "", &ExtractOptions::default()).conversation.unwrap();

    let (content, spans) = only_text(&conversation.messages[0].blocks);
    assert_eq!(content, "It costs $5 and $10 total");
    assert_eq!(spans, 0);
}

#[test]
fn test_escaped_dollars_become_delimiters() {
    let html = PageBuilder::new().turn(TurnBuilder::user(r"<p>cost \$x^2\$ here</p>")).build();
    let conversation = extract_conversation(&html, "", &ExtractOptions::default()).conversation.unwrap();

    let (content, spans) = only_text(&conversation.messages[0].blocks);
    assert_eq!(content, "cost $x^2$ here");
    assert_eq!(spans, 1);
}

#[test]
fn test_title_from_long_first_user_message() {
    let question = "a".repeat(120);
    let html = PageBuilder::new()
        .turns([TurnBuilder::user(&format!("<p>{}</p>", question)), TurnBuilder::assistant("<p>Sure</p>")])
        .build();
    let conversation = extract_conversation(&html, "", &ExtractOptions::default()).conversation.unwrap();

    assert_eq!(conversation.title.chars().count(), 80);
    assert!(conversation.title.ends_with('…'));
}

#[test]
fn test_generic_document_title_is_ignored() {
    let html = PageBuilder::new()
        .title("ChatGPT")
        .turn(TurnBuilder::user("<p>How do tides work?</p>"))
        .build();
    let conversation = extract_conversation(&html, "", &ExtractOptions::default()).conversation.unwrap();
    assert_eq!(conversation.title, "How do tides work?");
}

#[test]
fn test_untitled_when_no_user_text() {
    let html = PageBuilder::new().turn(TurnBuilder::assistant("<p>Hello, how can I help?</p>")).build();
    let conversation = extract_conversation(&html, "", &ExtractOptions::default()).conversation.unwrap();
    assert_eq!(conversation.title, "Untitled conversation");
}

#[test]
fn test_blank_url_gets_stable_fallback_id() {
    let html = PageBuilder::new().turn(TurnBuilder::user("<p>hi</p>")).build();
    let first = extract_conversation(&html, "", &ExtractOptions::default()).conversation.unwrap();
    let second = extract_conversation(&html, "", &ExtractOptions::default()).conversation.unwrap();

    assert_eq!(first.url, BLANK_URL);
    assert_eq!(first.id, second.id);
    assert_eq!(first.id.len(), 36);
}

#[test]
fn test_message_ids_and_timestamps() {
    let html = PageBuilder::new()
        .turns([
            TurnBuilder::user("<p>first</p>").timestamp("2024-03-01T14:00:00+02:00"),
            TurnBuilder::assistant("<p>second</p>").timestamp("not a date"),
        ])
        .build();
    let conversation = extract_conversation(&html, "", &ExtractOptions::default()).conversation.unwrap();

    assert_eq!(conversation.messages[0].id, "msg-0");
    assert_eq!(conversation.messages[1].id, "msg-1");
    assert_eq!(conversation.messages[0].timestamp.unwrap().to_rfc3339(), "2024-03-01T12:00:00+00:00");
    assert!(conversation.messages[1].timestamp.is_none());
}

#[test]
fn test_disabled_parsers_fall_back_to_text() {
    let body = concat!(
        r#"<pre><code class="language-rust">let x = 1;</code></pre>"#,
        "<table><tr><th>a</th></tr><tr><td>1</td></tr></table>",
        r#"<div class="thinking"><p>Considering the question.</p></div>"#,
        r#"<p><img src="cat.png" alt="cat"></p>"#,
    );
    let html = PageBuilder::new().turn(TurnBuilder::assistant(body)).build();
    let options = ExtractOptions {
        parse_code: false,
        parse_tables: false,
        parse_reasoning: false,
        parse_images: false,
        ..ExtractOptions::default()
    };

    let conversation = extract_conversation(&html, "", &options).conversation.unwrap();
    let blocks = &conversation.messages[0].blocks;
    assert!(blocks.iter().all(|b| b.kind() == "text"), "{:?}", blocks);
    assert!(blocks.iter().any(|b| matches!(b, ContentBlock::Text { content, .. } if content.contains("let x = 1;"))));
}

#[test]
fn test_math_disabled_keeps_source_without_notation() {
    let html = PageBuilder::new()
        .turn(TurnBuilder::user(
            r#"<p>Area <span class="katex"><annotation encoding="application/x-tex">\pi r^2</annotation></span></p>"#,
        ))
        .build();
    let options = ExtractOptions { parse_math: false, ..ExtractOptions::default() };

    let conversation = extract_conversation(&html, "", &options).conversation.unwrap();
    match &conversation.messages[0].blocks[0] {
        ContentBlock::Text { content, has_notation, notation } => {
            assert_eq!(content, r"Area $\pi r^2$");
            assert!(!has_notation);
            assert!(notation.is_empty());
        }
        other => panic!("expected text, got {:?}", other),
    }
}

#[test]
fn test_strikethrough_text_is_kept_flat() {
    let html = PageBuilder::new()
        .layout(Layout::Article)
        .turn(TurnBuilder::user("<p>Use <del>old</del> new syntax</p>"))
        .build();
    let conversation = extract_conversation(&html, "", &ExtractOptions::default()).conversation.unwrap();
    let (content, _) = only_text(&conversation.messages[0].blocks);
    assert_eq!(content, "Use old new syntax");
}
