//! Convo Export - Extract chat conversations from rendered web pages
//!
//! This library turns the HTML of a chat page into a typed conversation model. It supports:
//!
//! - Locating message elements through an ordered list of selector strategies
//! - Resolving message roles, with position parity as the fallback
//! - Segmenting each message into text, code, table, image and reasoning blocks
//! - Repairing LaTeX-like notation mangled by copy/transform steps, and rendering it
//!
//! # Example
//!
//! ```no_run
//! use convo_export::{ExtractOptions, extract_conversation};
//!
//! let html = std::fs::read_to_string("chat.html")?;
//! let result = extract_conversation(&html, "https://chatgpt.com/c/abc", &ExtractOptions::default());
//! if let Some(conversation) = result.conversation {
//!     println!("Extracted {} messages", conversation.message_count);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod batch;
pub mod cli;
pub mod dom;
pub mod extractor;
pub mod models;
pub mod notation;
pub mod parsers;
pub mod selectors;
pub mod utils;

// Re-export commonly used types
pub use extractor::{ExtractionResult, Extractor, extract_conversation};
pub use models::{ContentBlock, Conversation, ExtractOptions, LimitMode, Message, NotationExpression, Role};
pub use notation::{NotationRenderer, RenderOptions, repair_formula, repair_text, scan_notation};
pub use selectors::{SelectorHealth, locate_message_elements, resolve_role, validate_selectors};
