//! Content block segmentation for one message
//!
//! # Error Handling Strategy
//!
//! Segmentation follows a **graceful degradation** approach:
//!
//! - **Unrecognized structure**: anything that is not code, a table, reasoning, a list or an
//!   image becomes a text block. There is no error path out of [`segment`].
//!
//! - **Disabled block types**: code, tables and reasoning fall back to text when their option
//!   is off; images are dropped.
//!
//! - **Empty output**: when classification yields nothing, the whole element's text is used.
//!   A message that is still empty after that is reported by the caller.
//!
//! All work happens on an owned snapshot of the subtree; the parsed page is never modified.

pub mod blocks;
pub mod code;
pub mod image;
pub mod list;
pub mod table;

pub use blocks::{build_text_block, prepare_text, segment, segment_snapshot};
pub use table::{ParsedTable, parse_table};
