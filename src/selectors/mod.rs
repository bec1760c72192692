//! Locating messages in pages whose markup changes without notice.
//!
//! Message elements come from an ordered list of [`SelectorStrategy`] objects; the first
//! one that matches anything wins. Roles are read from attributes where the site provides
//! them and otherwise guessed, with the caller falling back to position parity.

pub mod diagnostics;
pub mod region;
pub mod role;
pub mod strategies;
pub mod validate;

use scraper::{ElementRef, Html};

pub use diagnostics::{Diagnostics, NoopDiagnostics, TracingDiagnostics};
pub use region::find_content_region;
pub use role::{DetectedRole, resolve_role};
pub use strategies::{
    ContentClassStrategy, CssStrategy, MainRegionStrategy, Resolution, SelectorResolver, SelectorStrategy,
};
pub use validate::{SelectorHealth, validate_selectors};

/// Message elements located with the default strategy list
pub fn locate_message_elements(document: &Html) -> Vec<ElementRef<'_>> {
    SelectorResolver::default().locate(document, &TracingDiagnostics).elements
}
