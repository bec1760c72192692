//! Data models for extracted conversations.
//!
//! - [`Conversation`] - One extracted conversation with its ordered messages
//! - [`Message`] - A single turn, with resolved [`Role`] and typed content
//! - [`ContentBlock`] - Text, code, table, image or reasoning content
//! - [`NotationExpression`] - A math span recorded on a text block
//! - [`ExtractOptions`] - Flat options record controlling extraction
//!
//! Every value is built fresh per extraction call and serializes to camelCase JSON for the
//! export layer.

pub mod blocks;
pub mod conversation;
pub mod options;

pub use blocks::{ContentBlock, NotationExpression};
pub use conversation::{Conversation, Message, Role};
pub use options::{ExtractOptions, LimitMode};
