use std::collections::HashSet;

use anyhow::{Result, anyhow};
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

use super::diagnostics::Diagnostics;

/// Direct `div` children of the main region shorter than this are chrome, not messages
pub const MIN_MESSAGE_TEXT_LEN: usize = 20;

/// Ancestor levels walked up from a content-class hit to reach the message container
const CONTENT_CLASS_ANCESTOR_LEVELS: usize = 2;

lazy_static! {
    static ref ARTICLE: Selector = Selector::parse("article").expect("valid article selector");
    static ref TEST_ID_TURN: Selector =
        Selector::parse(r#"[data-testid^="conversation-turn"]"#).expect("valid test id selector");
    static ref AUTHOR_ROLE: Selector =
        Selector::parse("[data-message-author-role]").expect("valid author role selector");
    static ref MAIN_REGION: Selector = Selector::parse(r#"main, [role="main"]"#).expect("valid main selector");
    static ref CONTENT_CLASS: Selector =
        Selector::parse(r#"[class*="markdown"], [class*="prose"]"#).expect("valid content class selector");
}

/// One way of locating message elements in a page.
pub trait SelectorStrategy {
    fn name(&self) -> &'static str;

    /// Matching elements in document order; empty when the strategy does not apply.
    fn try_locate<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>>;
}

/// Every element matching a CSS selector
pub struct CssStrategy {
    name: &'static str,
    selector: Selector,
}

impl CssStrategy {
    pub fn new(name: &'static str, selector: Selector) -> Self {
        Self { name, selector }
    }

    pub fn parse(name: &'static str, css: &str) -> Result<Self> {
        let selector = Selector::parse(css).map_err(|e| anyhow!("Invalid selector '{}': {}", css, e))?;
        Ok(Self::new(name, selector))
    }
}

impl SelectorStrategy for CssStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn try_locate<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document.select(&self.selector).collect()
    }
}

/// Direct `div` children of the first `main` region that carry enough text to be a turn
pub struct MainRegionStrategy {
    pub min_text_len: usize,
}

impl Default for MainRegionStrategy {
    fn default() -> Self {
        Self { min_text_len: MIN_MESSAGE_TEXT_LEN }
    }
}

impl SelectorStrategy for MainRegionStrategy {
    fn name(&self) -> &'static str {
        "main-region"
    }

    fn try_locate<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        let Some(main) = document.select(&MAIN_REGION).next() else {
            return Vec::new();
        };

        main.children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "div")
            .filter(|child| child.text().collect::<String>().trim().chars().count() >= self.min_text_len)
            .collect()
    }
}

/// Rendered-markdown containers, lifted to the turn element that holds them
#[derive(Default)]
pub struct ContentClassStrategy;

impl SelectorStrategy for ContentClassStrategy {
    fn name(&self) -> &'static str {
        "content-class"
    }

    fn try_locate<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for hit in document.select(&CONTENT_CLASS) {
            let container = ancestor_or_self(hit, CONTENT_CLASS_ANCESTOR_LEVELS);
            if seen.insert(container.id()) {
                found.push(container);
            }
        }

        found
    }
}

/// Walk up to `levels` parent elements, stopping early at the top of the tree
fn ancestor_or_self(element: ElementRef<'_>, levels: usize) -> ElementRef<'_> {
    let mut current = element;
    for _ in 0..levels {
        match current.parent().and_then(ElementRef::wrap) {
            Some(parent) if parent.value().name() != "html" && parent.value().name() != "body" => {
                current = parent;
            }
            _ => break,
        }
    }
    current
}

/// Outcome of one resolution run
#[derive(Debug)]
pub struct Resolution<'a> {
    /// Name of the winning strategy, `None` when every strategy came back empty
    pub strategy: Option<&'static str>,
    pub elements: Vec<ElementRef<'a>>,
}

/// Ordered strategy list. The first strategy that finds anything wins.
pub struct SelectorResolver {
    strategies: Vec<Box<dyn SelectorStrategy>>,
}

impl Default for SelectorResolver {
    fn default() -> Self {
        Self::new(vec![
            Box::new(CssStrategy::new("article", ARTICLE.clone())),
            Box::new(CssStrategy::new("test-id", TEST_ID_TURN.clone())),
            Box::new(CssStrategy::new("author-role", AUTHOR_ROLE.clone())),
            Box::new(MainRegionStrategy::default()),
            Box::new(ContentClassStrategy),
        ])
    }
}

impl SelectorResolver {
    pub fn new(strategies: Vec<Box<dyn SelectorStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &[Box<dyn SelectorStrategy>] {
        &self.strategies
    }

    pub fn locate<'a>(&self, document: &'a Html, diagnostics: &dyn Diagnostics) -> Resolution<'a> {
        for (position, strategy) in self.strategies.iter().enumerate() {
            let elements = strategy.try_locate(document);
            if elements.is_empty() {
                diagnostics.strategy_failed(position, strategy.name());
                continue;
            }
            diagnostics.strategy_matched(position, strategy.name(), elements.len());
            return Resolution { strategy: Some(strategy.name()), elements };
        }
        Resolution { strategy: None, elements: Vec::new() }
    }
}
