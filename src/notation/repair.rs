//! Notation repair passes.
//!
//! Upstream copy/transform steps mangle LaTeX in a handful of recurring ways: backslashes
//! turn into look-alike glyphs, bars or the literal word "backslash"; command names pick up
//! stray spaces; `\left(` becomes `\left\{` with the next backslash eaten; closing braces
//! go missing. The two passes here undo those shapes:
//!
//! - [`repair_text`] runs over a whole text block before segmentation output is built. It
//!   unescapes `\$`, fixes look-alike backslashes, moves sentence punctuation out of math
//!   spans and then repairs every `$...$` / `$$...$$` span with [`repair_formula`].
//! - [`repair_formula`] runs over one isolated formula right before rendering.
//!
//! Both passes are pure and idempotent: `f(f(x)) == f(x)`. Neither guarantees a renderable
//! result; the renderer has its own fallback.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::rules::{Rule, apply_rules, is_escaped_backslash};
use super::scan::NOTATION_SPAN;

/// Commands a stray `|` is allowed to stand in front of
const BAR_COMMANDS: &[&str] = &[
    "frac", "dfrac", "tfrac", "sqrt", "sum", "prod", "int", "oint", "lim", "infty", "cdot",
    "times", "leq", "geq", "neq", "approx", "alpha", "beta", "gamma", "delta", "epsilon",
    "theta", "lambda", "sigma", "omega", "partial", "nabla", "left", "right", "text", "mathbf",
    "mathrm", "log", "sin", "cos", "tan", "exp",
];

/// Commands reassembled when their letters were split by whitespace. Short names such as
/// `\int` are left out: `\in t` is legitimate input.
const SPLIT_COMMANDS: &[&str] = &[
    "frac", "dfrac", "sqrt", "left", "right", "cdot", "times", "infty", "partial", "alpha",
    "beta", "gamma", "delta", "theta", "lambda", "sigma", "omega", "mathbf", "mathrm", "text",
];

/// Real commands that are also the leading letters of a [`SPLIT_COMMANDS`] entry: `\le f t`
/// is `\le` followed by `f t`, not a broken `\left`
const PREFIX_COMMANDS: &[&str] = &["le", "in", "t", "c"];

/// Commands that can follow a `\left\{` whose own backslash was swallowed
const LEFT_FOLLOWERS: &[&str] = &[
    "frac", "dfrac", "tfrac", "sqrt", "sum", "prod", "int", "lim", "cdot", "alpha", "beta",
    "gamma", "delta", "theta", "lambda", "sigma", "omega", "pi", "mathbf", "mathrm", "text",
];

const OPERATOR_NAMES: &str = "sinh|cosh|tanh|sin|cos|tan|cot|sec|csc|arcsin|arccos|arctan|log|ln|exp|max|min|lim|sup|inf|det|arg|deg|dim|gcd|ker|Pr";

lazy_static! {
    static ref TEXT_RULES: Vec<Rule> = vec![
        Rule::func("unescape-dollar", r"\\\\|\\\$", |caps| {
            if is_escaped_backslash(caps) { caps[0].to_string() } else { "$".to_string() }
        }),
        lookalike_backslash_rule(),
    ];

    static ref FORMULA_RULES: Vec<Rule> = vec![
        lookalike_backslash_rule(),
        Rule::func("glyph-commands", r"([×÷≤≥≠∞±·→−])([A-Za-z])?", glyph_command),
        Rule::func("backslash-word", r"\\backslash|\bbackslash[ \t]*([A-Za-z]+)", |caps| {
            match caps.get(1) {
                Some(name) => format!("\\{}", name.as_str()),
                None => caps[0].to_string(),
            }
        }),
        Rule::func(
            "bar-as-backslash",
            &format!(r"\\\||\|({})\b", BAR_COMMANDS.join("|")),
            |caps| match caps.get(1) {
                Some(name) => format!("\\{}", name.as_str()),
                None => caps[0].to_string(),
            },
        ),
        Rule::func("split-command", &split_command_pattern(SPLIT_COMMANDS), reassemble_command),
        Rule::func(
            "operatorname",
            &format!(r"\\operatorname\*?\{{\s*({})\s*\}}([A-Za-z])?", OPERATOR_NAMES),
            |caps| match caps.get(2) {
                Some(next) => format!("\\{} {}", &caps[1], next.as_str()),
                None => format!("\\{}", &caps[1]),
            },
        ),
        Rule::func("fullwidth-braces", r"[｛｝]", |caps| {
            if &caps[0] == "｛" { "{".to_string() } else { "}".to_string() }
        }),
        Rule::template(
            "escaped-group-braces",
            r"\\(frac|dfrac|tfrac|binom)\\\{([^{}\\]*)\\\}\\\{([^{}\\]*)\\\}",
            r"\${1}{${2}}{${3}}",
        ),
        Rule::template(
            "paren-arguments",
            r"\\(frac|dfrac|tfrac|binom)\(([^()]*)\)\(([^()]*)\)",
            r"\${1}{${2}}{${3}}",
        ),
        Rule::template(
            "left-brace-swallowed-command",
            &format!(r"\\left\\\{{({})", LEFT_FOLLOWERS.join("|")),
            r"\left(\${1}",
        ),
        Rule::template("left-bare-brace", r"\\left\{", r"\left("),
        Rule::template("right-bare-brace", r"\\right\}", r"\right)"),
        Rule::template("left-escaped-paren", r"\\left\\([(\[])", r"\left${1}"),
        Rule::template("right-escaped-paren", r"\\right\\([)\]])", r"\right${1}"),
        Rule::template("dangling-left", r"\\left[ \t]*$", ""),
        Rule::template("dangling-right", r"\\right[ \t]*$", r"\right."),
        Rule::func("spacing", r"\\\\|\\qquad|\\quad|\\[,:; ]", |caps| {
            match &caps[0] {
                "\\\\" => caps[0].to_string(),
                "\\qquad" => "    ".to_string(),
                "\\quad" => "  ".to_string(),
                _ => " ".to_string(),
            }
        }),
    ];

    /// Runs after brace balancing so a wrapper closed by the balancer is seen as complete.
    static ref REDUNDANT_BRACE_RULES: Vec<Rule> = vec![Rule::template(
        "redundant-fraction-braces",
        r"(^|[\s=+\-*,(])\{(\\(?:[dt]?frac|binom)\{[^{}]*\}\{[^{}]*\})\}",
        "${1}${2}",
    )];

    static ref LEFT_TOKEN: Regex = Regex::new(r"\\left\b").expect("valid left token pattern");
    static ref RIGHT_TOKEN: Regex = Regex::new(r"\\right\b").expect("valid right token pattern");
}

fn lookalike_backslash_rule() -> Rule {
    Rule::template("lookalike-backslash", r"[⧵＼﹨]", r"\")
}

fn glyph_command(caps: &Captures) -> String {
    let command = match &caps[1] {
        "×" => r"\times",
        "÷" => r"\div",
        "≤" => r"\leq",
        "≥" => r"\geq",
        "≠" => r"\neq",
        "∞" => r"\infty",
        "±" => r"\pm",
        "·" => r"\cdot",
        "→" => r"\to",
        _ => "-",
    };
    match caps.get(2) {
        Some(next) if command.starts_with('\\') => format!("{} {}", command, next.as_str()),
        Some(next) => format!("{}{}", command, next.as_str()),
        None => command.to_string(),
    }
}

/// Join a command whose letters were split by whitespace. Intact spellings and splits whose
/// first fragment is already a command come back unchanged.
fn reassemble_command(caps: &Captures) -> String {
    let matched = &caps[0];
    let Some((head, _)) = matched.split_once([' ', '\t']) else {
        return matched.to_string();
    };
    if PREFIX_COMMANDS.contains(&head.trim_start_matches('\\')) {
        return matched.to_string();
    }
    matched.chars().filter(|c| !c.is_whitespace()).collect()
}

/// `\\(?:f[ \t]*r[ \t]*a[ \t]*c|...)` - also matches the intact spelling, which the
/// replacement maps to itself.
fn split_command_pattern(commands: &[&str]) -> String {
    let alternatives: Vec<String> = commands
        .iter()
        .map(|name| name.chars().map(|c| c.to_string()).collect::<Vec<_>>().join("[ \t]*"))
        .collect();
    format!(r"\\(?:{})", alternatives.join("|"))
}

/// Append the missing closing braces. Escaped braces are not counted and surplus closing
/// braces are never removed.
pub fn balance_braces(formula: &str) -> Cow<'_, str> {
    let mut trimmed = formula;
    if trailing_backslashes(formula) % 2 == 1 {
        // A lone trailing backslash would escape the brace we append.
        trimmed = &formula[..formula.len() - 1];
    }

    let mut open = 0usize;
    let mut close = 0usize;
    let mut chars = trimmed.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '{' => open += 1,
            '}' => close += 1,
            _ => {}
        }
    }

    if open <= close {
        return if trimmed.len() == formula.len() { Cow::Borrowed(formula) } else { Cow::Owned(trimmed.to_string()) };
    }

    let mut out = String::with_capacity(trimmed.len() + open - close);
    out.push_str(trimmed);
    out.extend(std::iter::repeat_n('}', open - close));
    Cow::Owned(out)
}

fn trailing_backslashes(s: &str) -> usize {
    s.chars().rev().take_while(|c| *c == '\\').count()
}

/// Close every unmatched `\left` with an invisible `\right.`.
pub fn balance_left_right(formula: &str) -> Cow<'_, str> {
    let lefts = LEFT_TOKEN.find_iter(formula).count();
    let rights = RIGHT_TOKEN.find_iter(formula).count();
    if lefts <= rights {
        return Cow::Borrowed(formula);
    }
    let mut out = formula.to_string();
    for _ in rights..lefts {
        out.push_str(r"\right.");
    }
    Cow::Owned(out)
}

/// Pre-render pass over one formula (no delimiters).
pub fn repair_formula(formula: &str) -> String {
    let ruled = apply_rules(formula, &FORMULA_RULES);
    let braced = balance_braces(&ruled).into_owned();
    let unwrapped = apply_rules(&braced, &REDUNDANT_BRACE_RULES);
    balance_left_right(&unwrapped).into_owned()
}

/// Pre-extraction pass over a whole text block.
pub fn repair_text(text: &str) -> String {
    let prepared = apply_rules(text, &TEXT_RULES);
    NOTATION_SPAN
        .replace_all(&prepared, |caps: &Captures| {
            if let Some(body) = caps.get(1) {
                let (formula, punctuation) = split_trailing_period(body.as_str());
                format!("$${}$${}", repair_formula(formula), punctuation)
            } else {
                let (formula, punctuation) = split_trailing_period(&caps[2]);
                let repaired = repair_formula(formula);
                // An inline span may not start or end with whitespace
                let body = match repaired.trim() {
                    "" => repaired.as_str(),
                    trimmed => trimmed,
                };
                format!("${}${}", body, punctuation)
            }
        })
        .into_owned()
}

/// Split a sentence-ending period off the end of a formula. The `.` of `\left.` and
/// `\right.` is a null delimiter and stays, as does any run of dots (`\ldots` typed out).
pub fn split_trailing_period(formula: &str) -> (&str, &'static str) {
    let trimmed = formula.trim_end();
    if trimmed.ends_with('.') && !trimmed.ends_with("..") && !ends_with_null_delimiter(trimmed) {
        (&trimmed[..trimmed.len() - 1], ".")
    } else {
        (formula, "")
    }
}

pub(crate) fn ends_with_null_delimiter(formula: &str) -> bool {
    formula.ends_with(r"\left.") || formula.ends_with(r"\right.")
}
