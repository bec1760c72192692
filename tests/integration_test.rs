/// End-to-end integration tests for conversation extraction
///
/// These tests verify complete workflows: page markup → selector resolution → segmentation →
/// conversation model
mod common;

use common::{Layout, PageBuilder, TurnBuilder, alternating_turns, rich_answer};
use convo_export::models::{ContentBlock, LimitMode, Role};
use convo_export::notation::{NotationRenderer, RenderOptions};
use convo_export::selectors::{SelectorResolver, TracingDiagnostics};
use convo_export::{ExtractOptions, Extractor, extract_conversation, repair_formula, repair_text};
use scraper::Html;

#[test]
fn test_e2e_rich_conversation() {
    let html = PageBuilder::new()
        .title("Squares and integrals - ChatGPT")
        .turn(TurnBuilder::user("<p>Show me squares</p>").message_id("u-1"))
        .turn(TurnBuilder::assistant(&rich_answer()).message_id("a-1"))
        .build();

    let result = extract_conversation(&html, "https://chatgpt.com/c/conv-42", &ExtractOptions::default());
    assert!(result.success, "extraction failed: {:?}", result.error);
    assert!(result.warnings.is_empty(), "unexpected warnings: {:?}", result.warnings);

    let conversation = result.conversation.unwrap();
    assert_eq!(conversation.id, "conv-42");
    assert_eq!(conversation.title, "Squares and integrals");
    assert_eq!(conversation.url, "https://chatgpt.com/c/conv-42");
    assert_eq!(conversation.message_count, 2);

    let answer = &conversation.messages[1];
    assert_eq!(answer.id, "a-1");
    assert_eq!(answer.role, Role::Assistant);

    let kinds: Vec<_> = answer.blocks.iter().map(ContentBlock::kind).collect();
    assert_eq!(kinds, vec!["text", "reasoning", "code", "table", "text", "image", "text"]);

    match &answer.blocks[0] {
        ContentBlock::Text { content, has_notation, notation } => {
            assert_eq!(content, "Here is the derivation of $x^2$.");
            assert!(has_notation);
            assert_eq!(notation.len(), 1);
            assert_eq!(notation[0].raw, "x^2");
            assert!(!notation[0].is_block);
            assert_eq!(notation[0].offset, 26);
        }
        other => panic!("expected text, got {:?}", other),
    }

    assert_eq!(answer.blocks[1], ContentBlock::Reasoning { content: "The user wants a proof.".into(), collapsed: true });

    assert_eq!(
        answer.blocks[2],
        ContentBlock::Code {
            language: Some("python".into()),
            content: "def square(x):\n    return x * x".into(),
            filename: None
        }
    );

    match &answer.blocks[3] {
        ContentBlock::Table { headers, rows } => {
            assert_eq!(headers.len(), 2);
            assert_eq!(rows.len(), 3);
            assert!(rows.iter().all(|r| r.len() == 2));
        }
        other => panic!("expected table, got {:?}", other),
    }

    match &answer.blocks[4] {
        ContentBlock::Text { content, notation, .. } => {
            assert_eq!(content, "1. Expand\n2. Simplify $a+b$");
            assert_eq!(notation.len(), 1);
        }
        other => panic!("expected list text, got {:?}", other),
    }

    assert!(matches!(answer.blocks[5], ContentBlock::Image { generated: true, .. }));

    match &answer.blocks[6] {
        ContentBlock::Text { notation, .. } => {
            assert_eq!(notation.len(), 1);
            assert!(notation[0].is_block);
            assert_eq!(notation[0].raw, r"\int_0^1 x dx = \frac{1}{2}");
        }
        other => panic!("expected block math text, got {:?}", other),
    }
}

#[test]
fn test_e2e_role_parity_fallback() {
    let html = PageBuilder::new()
        .layout(Layout::Article)
        .turns([
            TurnBuilder::anonymous("<p>first</p>"),
            TurnBuilder::anonymous("<p>second</p>"),
            TurnBuilder::anonymous("<p>third</p>"),
        ])
        .build();

    let conversation = extract_conversation(&html, "", &ExtractOptions::default()).conversation.unwrap();
    let roles: Vec<_> = conversation.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
}

#[test]
fn test_e2e_explicit_role_wins_over_position() {
    let html = PageBuilder::new()
        .layout(Layout::Article)
        .turns([TurnBuilder::assistant("<p>I start</p>"), TurnBuilder::assistant("<p>Me again</p>")])
        .build();

    let conversation = extract_conversation(&html, "", &ExtractOptions::default()).conversation.unwrap();
    assert!(conversation.messages.iter().all(|m| m.role == Role::Assistant));
}

#[test]
fn test_e2e_each_layout_is_located() {
    for layout in [Layout::Article, Layout::TestId, Layout::AuthorRole, Layout::ContentClass] {
        let html = PageBuilder::new().layout(layout).turns(alternating_turns(4)).build();
        let result = extract_conversation(&html, "", &ExtractOptions::default());
        assert!(result.success, "{:?}: {:?}", layout, result.error);
        assert_eq!(result.conversation.unwrap().message_count, 4, "{:?}", layout);
    }

    let html = PageBuilder::new()
        .layout(Layout::MainRegion)
        .turns([
            TurnBuilder::anonymous("Can you explain lifetimes to me?"),
            TurnBuilder::anonymous("Lifetimes describe how long references stay valid."),
        ])
        .build();
    let conversation = extract_conversation(&html, "", &ExtractOptions::default()).conversation.unwrap();
    assert_eq!(conversation.message_count, 2);
    assert_eq!(conversation.messages[1].role, Role::Assistant);
}

#[test]
fn test_e2e_first_matching_strategy_wins() {
    // Articles and test-id turns both present: only the articles are used
    let html = r#"<html><body>
        <article data-message-author-role="user"><p>article one</p></article>
        <div data-testid="conversation-turn-1"><p>test id one</p></div>
        <div data-testid="conversation-turn-2"><p>test id two</p></div>
        </body></html>"#;
    let document = Html::parse_document(html);
    let resolution = SelectorResolver::default().locate(&document, &TracingDiagnostics);
    assert_eq!(resolution.strategy, Some("article"));
    assert_eq!(resolution.elements.len(), 1);
}

#[test]
fn test_e2e_hard_cap_rejects_oversized_conversation() {
    let html = PageBuilder::new().turns(alternating_turns(1001)).build();
    let options = ExtractOptions { max_messages: 1000, limit_mode: LimitMode::Hard, ..ExtractOptions::default() };

    let result = extract_conversation(&html, "", &options);
    assert!(!result.success);
    assert!(result.conversation.is_none());
    assert_eq!(result.error.as_deref(), Some("Conversation has 1001 messages, over the limit of 1000"));
}

#[test]
fn test_e2e_soft_cap_truncates_with_warning() {
    let html = PageBuilder::new().turns(alternating_turns(5)).build();
    let options = ExtractOptions { max_messages: 3, ..ExtractOptions::default() };

    let result = extract_conversation(&html, "", &options);
    assert!(result.success);
    assert_eq!(result.conversation.unwrap().message_count, 3);
    assert_eq!(result.warnings, vec!["Conversation has 5 messages; only the first 3 were extracted"]);
}

#[test]
fn test_e2e_document_is_not_mutated() {
    let html = PageBuilder::new()
        .turn(TurnBuilder::user("<p>Question with <del>struck</del> text</p>"))
        .turn(TurnBuilder::assistant(&rich_answer()))
        .build();
    let document = Html::parse_document(&html);
    let before = document.html();

    let result = Extractor::default().extract(&document, "");
    assert!(result.success);
    assert_eq!(document.html(), before);
}

#[test]
fn test_e2e_extracted_text_is_repair_stable() {
    let html = PageBuilder::new()
        .turn(TurnBuilder::user(r"<p>Why is \$5 written as $\frac(1)(2)$ here.</p>"))
        .turn(TurnBuilder::assistant(&rich_answer()))
        .build();
    let conversation = extract_conversation(&html, "", &ExtractOptions::default()).conversation.unwrap();

    for message in &conversation.messages {
        for block in &message.blocks {
            if let ContentBlock::Text { content, .. } = block {
                assert_eq!(&repair_text(content), content);
            }
        }
    }
}

#[test]
fn test_e2e_malformed_formula_renders_without_panic() {
    let repaired = repair_formula(r"\left\{frac{1}{2}\right}");
    let renderer = NotationRenderer::new();

    let output = renderer.render(&repaired, RenderOptions::display()).unwrap();
    assert!(
        output.markup.contains("<math") || output.markup.contains("math-error"),
        "unexpected markup: {}",
        output.markup
    );
}

#[test]
fn test_e2e_brace_deficit_is_closed() {
    assert_eq!(repair_formula(r"\frac{1}{2"), r"\frac{1}{2}");
}

#[test]
fn test_e2e_serialized_shape() {
    let html = PageBuilder::new()
        .turn(TurnBuilder::user("<p>Compute $y$</p>").timestamp("2024-03-01T12:00:00Z"))
        .build();
    let result = extract_conversation(&html, "https://claude.ai/chat/abc", &ExtractOptions::default());
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["success"], true);
    assert!(json.get("error").is_none());
    assert_eq!(json["conversation"]["messageCount"], 1);
    let message = &json["conversation"]["messages"][0];
    assert_eq!(message["role"], "user");
    assert_eq!(message["timestamp"], "2024-03-01T12:00:00Z");
    assert_eq!(message["blocks"][0]["type"], "text");
    assert_eq!(message["blocks"][0]["hasNotation"], true);
    assert_eq!(message["blocks"][0]["notation"][0]["isBlock"], false);
}
