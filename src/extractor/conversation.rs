//! Conversation extraction for one page.
//!
//! # Error Handling Strategy
//!
//! Extraction follows a **graceful degradation** approach:
//!
//! - **Per-message failures**: a message that yields no content is skipped and reported as a
//!   warning `Failed to parse message N: ...`; the remaining messages are still extracted.
//! - **Call-level failures**: only "no message elements found", "no message could be parsed",
//!   a hard message cap and a concurrent extraction on the same [`Extractor`] fail the call.
//!   They come back as an [`ExtractionResult`] with `success == false`, never as `Err`.
//! - **Selector health**: checked once per call and logged; it never blocks extraction.

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::extractor::guard::ExtractionSlot;
use crate::models::{ContentBlock, Conversation, ExtractOptions, LimitMode, Message, Role};
use crate::parsers::segment;
use crate::selectors::{
    Diagnostics, SelectorHealth, SelectorResolver, TracingDiagnostics, find_content_region, resolve_role,
    validate_selectors,
};
use crate::utils::{conversation_id, first_line_truncated, normalize_source_url};

/// Title derived from the first user message is cut to this many characters
const MAX_TITLE_CHARS: usize = 80;

const UNTITLED: &str = "Untitled conversation";

/// Suffixes sites append to the document title
const TITLE_SUFFIXES: &[&str] = &[" - ChatGPT", " - Claude", " - Gemini"];

/// Document titles that name the site, not the conversation
const GENERIC_TITLES: &[&str] = &["chatgpt", "claude", "gemini", "new chat"];

lazy_static! {
    static ref TITLE: Selector = Selector::parse("title").expect("valid title selector");
    static ref TIME: Selector = Selector::parse("time[datetime]").expect("valid time selector");
    static ref MESSAGE_ID: Selector = Selector::parse("[data-message-id]").expect("valid message id selector");
}

/// Outcome of one extraction call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Conversation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub warnings: Vec<String>,
}

impl ExtractionResult {
    fn succeeded(conversation: Conversation, warnings: Vec<String>) -> Self {
        Self { success: true, conversation: Some(conversation), error: None, warnings }
    }

    fn failed(error: impl Into<String>, warnings: Vec<String>) -> Self {
        Self { success: false, conversation: None, error: Some(error.into()), warnings }
    }
}

/// Drives selector resolution and segmentation over a page.
///
/// An `Extractor` runs one extraction at a time; a call made while another is in progress
/// on the same instance fails immediately. Independent pages can use independent extractors.
pub struct Extractor {
    options: ExtractOptions,
    resolver: SelectorResolver,
    diagnostics: Box<dyn Diagnostics>,
    slot: ExtractionSlot,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}

impl Extractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            resolver: SelectorResolver::default(),
            diagnostics: Box::new(TracingDiagnostics),
            slot: ExtractionSlot::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: SelectorResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Box<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Selector health for `document`, using this extractor's strategies
    pub fn health(&self, document: &Html) -> SelectorHealth {
        validate_selectors(document, &self.resolver)
    }

    /// Extract the conversation in `document`. `source_url` may be empty.
    pub fn extract(&self, document: &Html, source_url: &str) -> ExtractionResult {
        let Some(_guard) = self.slot.try_acquire() else {
            return ExtractionResult::failed("An extraction is already in progress", Vec::new());
        };
        self.run(document, source_url)
    }

    fn run(&self, document: &Html, source_url: &str) -> ExtractionResult {
        let mut warnings = Vec::new();

        let health = self.health(document);
        if !health.valid {
            warn!(broken = ?health.broken, "No message selector matched this page");
        }

        let resolution = self.resolver.locate(document, self.diagnostics.as_ref());
        let mut elements = resolution.elements;
        if elements.is_empty() {
            return ExtractionResult::failed(
                "No messages found. The page layout may have changed or the conversation has not finished loading.",
                warnings,
            );
        }
        debug!(strategy = ?resolution.strategy, count = elements.len(), "Located message elements");

        if let Some(cap) = self.options.message_cap()
            && elements.len() > cap
        {
            match self.options.limit_mode {
                LimitMode::Hard => {
                    return ExtractionResult::failed(
                        format!("Conversation has {} messages, over the limit of {}", elements.len(), cap),
                        warnings,
                    );
                }
                LimitMode::Soft => {
                    warnings.push(format!(
                        "Conversation has {} messages; only the first {} were extracted",
                        elements.len(),
                        cap
                    ));
                    elements.truncate(cap);
                }
            }
        }

        let mut messages = Vec::with_capacity(elements.len());
        for (position, element) in elements.into_iter().enumerate() {
            match self.parse_message(element, position, messages.len()) {
                Ok(message) => messages.push(message),
                Err(e) => {
                    warn!(position, error = %e, "Skipping message");
                    warnings.push(format!("Failed to parse message {}: {}", position + 1, e));
                }
            }
        }

        if messages.is_empty() {
            return ExtractionResult::failed("No messages could be parsed", warnings);
        }

        let url = normalize_source_url(source_url);
        let id = conversation_id(&url);
        let title = derive_title(document, &messages);
        info!(messages = messages.len(), warnings = warnings.len(), "Extracted conversation");

        ExtractionResult::succeeded(Conversation::new(id, title, url, messages), warnings)
    }

    /// `position` is the element's place among located elements and drives the role
    /// fallback; `index` is the place among successfully parsed messages.
    fn parse_message(&self, element: ElementRef<'_>, position: usize, index: usize) -> Result<Message> {
        let role = resolve_role(element).or_parity(position);
        let region = find_content_region(element);

        let blocks = segment(region, &self.options);
        if blocks.is_empty() {
            bail!("message has no extractable content");
        }

        Ok(Message {
            id: message_id(element).unwrap_or_else(|| format!("msg-{}", index)),
            index,
            role,
            blocks,
            raw_html: element.html(),
            timestamp: message_timestamp(element),
            selected: false,
        })
    }
}

/// Parse `html` and extract it with a fresh [`Extractor`]
pub fn extract_conversation(html: &str, source_url: &str, options: &ExtractOptions) -> ExtractionResult {
    let document = Html::parse_document(html);
    Extractor::new(options.clone()).extract(&document, source_url)
}

fn message_id(element: ElementRef<'_>) -> Option<String> {
    element
        .value()
        .attr("data-message-id")
        .or_else(|| element.select(&MESSAGE_ID).find_map(|e| e.value().attr("data-message-id")))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn message_timestamp(element: ElementRef<'_>) -> Option<DateTime<Utc>> {
    element
        .select(&TIME)
        .filter_map(|time| time.value().attr("datetime"))
        .find_map(|value| DateTime::parse_from_rfc3339(value.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Document title without the site suffix, else the first user line, else a placeholder
fn derive_title(document: &Html, messages: &[Message]) -> String {
    title_from_document(document).or_else(|| title_from_messages(messages)).unwrap_or_else(|| UNTITLED.to_string())
}

fn title_from_document(document: &Html) -> Option<String> {
    let raw: String = document.select(&TITLE).next()?.text().collect();
    let mut title = raw.trim();

    if let Some(stripped) = TITLE_SUFFIXES.iter().find_map(|suffix| title.strip_suffix(suffix)) {
        title = stripped;
    } else if let Some((head, _site)) = title.rsplit_once(" | ") {
        title = head;
    }

    let title = title.trim();
    if title.is_empty() || GENERIC_TITLES.contains(&title.to_lowercase().as_str()) {
        return None;
    }
    Some(title.to_string())
}

fn title_from_messages(messages: &[Message]) -> Option<String> {
    let first_user = messages.iter().find(|m| m.role == Role::User)?;
    first_user
        .blocks
        .iter()
        .find_map(|block| match block {
            ContentBlock::Text { content, .. } => Some(first_line_truncated(content, MAX_TITLE_CHARS)),
            _ => None,
        })
        .filter(|title| !title.is_empty())
}
