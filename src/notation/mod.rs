//! LaTeX-like notation handling: repair, scanning and rendering.
//!
//! - [`repair`] - idempotent rewrite passes for corrupted notation
//! - [`rules`] - the declarative rule table machinery the passes are built on
//! - [`scan`] - locate `$...$` / `$$...$$` spans in extracted text
//! - [`render`] - two-pass formula rendering with an escaped fallback

pub mod render;
pub mod repair;
pub mod rules;
pub mod scan;

pub use render::{FormulaEngine, MathMlEngine, NotationRenderer, RenderError, RenderOptions, RenderOutput};
pub use repair::{repair_formula, repair_text};
pub use scan::scan_notation;
