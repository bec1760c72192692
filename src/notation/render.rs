//! Formula rendering with graceful degradation.
//!
//! A formula is tried twice: a strict pass that rejects structurally broken input up front,
//! then a lenient pass over a relaxed copy. If both fail the escaped source comes back
//! inside an error-styled span together with the captured message, so a single bad formula
//! never takes the surrounding document down with it.

use lazy_static::lazy_static;
use latex2mathml::{DisplayStyle, latex_to_mathml};
use regex::{Captures, Regex};
use thiserror::Error;

use super::repair::{balance_braces, ends_with_null_delimiter};
use crate::utils::html::escape_html;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("formula is empty")]
    Empty,
    #[error("unbalanced braces: {open} opening, {close} closing")]
    UnbalancedBraces { open: usize, close: usize },
    #[error("unbalanced delimiters: {lefts} \\left, {rights} \\right")]
    UnbalancedDelimiters { lefts: usize, rights: usize },
    #[error("{0}")]
    Engine(String),
}

/// The third-party renderer behind the adapter
pub trait FormulaEngine {
    fn render(&self, formula: &str, display: bool) -> Result<String, RenderError>;
}

/// MathML output via `latex2mathml`
#[derive(Debug, Clone, Copy, Default)]
pub struct MathMlEngine;

impl FormulaEngine for MathMlEngine {
    fn render(&self, formula: &str, display: bool) -> Result<String, RenderError> {
        let style = if display { DisplayStyle::Block } else { DisplayStyle::Inline };
        latex_to_mathml(formula, style).map_err(|e| RenderError::Engine(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub display_mode: bool,
    /// Surface the final failure as `Err` instead of an error span
    pub throw_on_error: bool,
}

impl RenderOptions {
    pub fn inline() -> Self {
        Self::default()
    }

    pub fn display() -> Self {
        Self { display_mode: true, ..Self::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub markup: String,
    pub error: Option<String>,
}

lazy_static! {
    static ref BLOCK_MATH: Regex = Regex::new(
        r"(?s)\$\$(.+?)\$\$|\\\[(.+?)\\\]|\\begin\{(equation|align|gather)\*?\}(.+?)\\end\{(?:equation|align|gather)\*?\}"
    )
    .expect("valid block math pattern");
    static ref INLINE_MATH: Regex = Regex::new(r"(?s)\\\((.+?)\\\)|\$([^\s$](?:[^$\n]*[^\s$])?)\$")
        .expect("valid inline math pattern");
    static ref BLOCK_PLACEHOLDER: Regex =
        Regex::new("\u{E000}(\\d+)\u{E001}").expect("valid placeholder pattern");
    static ref SIZING: Regex = Regex::new(
        r"\\(?:left|right|bigl|bigr|Bigl|Bigr|big|Big|displaystyle|textstyle)\b\.?"
    )
    .expect("valid sizing pattern");
    static ref LEFT_TOKEN: Regex = Regex::new(r"\\left\b").expect("valid left token pattern");
    static ref RIGHT_TOKEN: Regex = Regex::new(r"\\right\b").expect("valid right token pattern");
}

pub struct NotationRenderer<E = MathMlEngine> {
    engine: E,
}

impl Default for NotationRenderer<MathMlEngine> {
    fn default() -> Self {
        Self { engine: MathMlEngine }
    }
}

impl NotationRenderer<MathMlEngine> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: FormulaEngine> NotationRenderer<E> {
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    /// Render one formula (no delimiters).
    ///
    /// Returns `Err` only when `options.throw_on_error` is set; otherwise a failed formula
    /// yields an error span and the message in [`RenderOutput::error`].
    pub fn render(&self, formula: &str, options: RenderOptions) -> Result<RenderOutput, RenderError> {
        let prepared = strip_trailing_period(formula.trim());

        let first_error = match self.render_strict(prepared, options.display_mode) {
            Ok(markup) => return Ok(RenderOutput { markup, error: None }),
            Err(e) => e,
        };
        tracing::trace!(formula = prepared, error = %first_error, "strict render failed, retrying leniently");

        match self.engine.render(&relax(prepared), options.display_mode) {
            Ok(markup) => Ok(RenderOutput { markup, error: None }),
            Err(e) if options.throw_on_error => Err(e),
            Err(e) => {
                tracing::debug!(formula = prepared, error = %e, "formula could not be rendered");
                Ok(RenderOutput { markup: error_span(formula, &e.to_string()), error: Some(e.to_string()) })
            }
        }
    }

    /// Infallible convenience wrapper
    pub fn render_lossy(&self, formula: &str, display_mode: bool) -> RenderOutput {
        let options = RenderOptions { display_mode, throw_on_error: false };
        match self.render(formula, options) {
            Ok(output) => output,
            Err(e) => RenderOutput { markup: error_span(formula, &e.to_string()), error: Some(e.to_string()) },
        }
    }

    fn render_strict(&self, formula: &str, display: bool) -> Result<String, RenderError> {
        validate_structure(formula)?;
        self.engine.render(formula, display)
    }

    /// Replace every delimited formula in `text` with rendered markup.
    ///
    /// Block forms (`$$..$$`, `\[..\]`, `equation`/`align`/`gather` environments) go first
    /// and are parked behind placeholders, so the inline pass (`\(..\)`, `$..$`) never sees
    /// their output.
    pub fn render_text(&self, text: &str) -> String {
        let mut blocks: Vec<String> = Vec::new();
        let parked = BLOCK_MATH.replace_all(text, |caps: &Captures| {
            let formula = block_formula(caps);
            let output = self.render_lossy(&formula, true);
            blocks.push(format!("<div class=\"math-block\">{}</div>", output.markup));
            format!("\u{E000}{}\u{E001}", blocks.len() - 1)
        });

        let inlined = INLINE_MATH.replace_all(&parked, |caps: &Captures| {
            let formula = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            let output = self.render_lossy(formula, false);
            format!("<span class=\"math-inline\">{}</span>", output.markup)
        });

        BLOCK_PLACEHOLDER
            .replace_all(&inlined, |caps: &Captures| {
                caps[1].parse::<usize>().ok().and_then(|i| blocks.get(i)).cloned().unwrap_or_default()
            })
            .into_owned()
    }
}

fn block_formula(caps: &Captures) -> String {
    if let Some(m) = caps.get(1).or_else(|| caps.get(2)) {
        return m.as_str().to_string();
    }
    let body = caps.get(4).map_or("", |m| m.as_str());
    match caps.get(3).map(|m| m.as_str()) {
        Some("equation") => body.to_string(),
        _ => format!("\\begin{{aligned}}{}\\end{{aligned}}", body),
    }
}

fn strip_trailing_period(formula: &str) -> &str {
    if formula.ends_with('.') && !formula.ends_with("..") && !ends_with_null_delimiter(formula) {
        formula[..formula.len() - 1].trim_end()
    } else {
        formula
    }
}

fn validate_structure(formula: &str) -> Result<(), RenderError> {
    if formula.is_empty() {
        return Err(RenderError::Empty);
    }

    let mut depth = 0i64;
    let mut open = 0usize;
    let mut close = 0usize;
    let mut chars = formula.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '{' => {
                open += 1;
                depth += 1;
            }
            '}' => {
                close += 1;
                depth -= 1;
                if depth < 0 {
                    return Err(RenderError::UnbalancedBraces { open, close });
                }
            }
            _ => {}
        }
    }
    if open != close {
        return Err(RenderError::UnbalancedBraces { open, close });
    }

    let lefts = LEFT_TOKEN.find_iter(formula).count();
    let rights = RIGHT_TOKEN.find_iter(formula).count();
    if lefts != rights {
        return Err(RenderError::UnbalancedDelimiters { lefts, rights });
    }
    Ok(())
}

/// Lenient copy: drop sizing commands and unmatched closing braces, close open groups.
fn relax(formula: &str) -> String {
    let stripped = SIZING.replace_all(formula, "");

    let mut kept = String::with_capacity(stripped.len());
    let mut depth = 0usize;
    let mut chars = stripped.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                kept.push(c);
                if let Some(next) = chars.next() {
                    kept.push(next);
                }
            }
            '{' => {
                depth += 1;
                kept.push(c);
            }
            '}' if depth == 0 => {}
            '}' => {
                depth -= 1;
                kept.push(c);
            }
            _ => kept.push(c),
        }
    }

    balance_braces(&kept).into_owned()
}

fn error_span(formula: &str, message: &str) -> String {
    format!(
        "<span class=\"math-error\" title=\"{}\">{}</span>",
        escape_html(message),
        escape_html(formula)
    )
}
