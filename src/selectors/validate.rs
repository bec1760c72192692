use lazy_static::lazy_static;
use scraper::{Html, Selector};
use serde::Serialize;

use super::strategies::SelectorResolver;

const ROLE_PROBE: &str = "role-attribute";

lazy_static! {
    static ref ROLE_ATTRIBUTE: Selector =
        Selector::parse("[data-message-author-role]").expect("valid author role selector");
}

/// Which selectors still match the page.
///
/// `valid` means at least one message strategy matched, so extraction has something to
/// work with. Broken entries are expected on any given site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorHealth {
    pub valid: bool,
    pub working: Vec<String>,
    pub broken: Vec<String>,
}

/// Run every strategy once, plus the role-attribute probe
pub fn validate_selectors(document: &Html, resolver: &SelectorResolver) -> SelectorHealth {
    let mut working = Vec::new();
    let mut broken = Vec::new();

    for strategy in resolver.strategies() {
        if strategy.try_locate(document).is_empty() {
            broken.push(strategy.name().to_string());
        } else {
            working.push(strategy.name().to_string());
        }
    }
    let valid = !working.is_empty();

    if document.select(&ROLE_ATTRIBUTE).next().is_some() {
        working.push(ROLE_PROBE.to_string());
    } else {
        broken.push(ROLE_PROBE.to_string());
    }

    SelectorHealth { valid, working, broken }
}
