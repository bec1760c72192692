//! Declarative rewrite rules.
//!
//! A rule is a compiled pattern plus either a `$n` template or a function of the captures.
//! Rule tables are plain slices applied front to back by [`apply_rules`]; later rules may
//! assume the shape produced by earlier ones, so table order is part of the behavior.

use std::borrow::Cow;

use regex::{Captures, Regex};

pub enum Replacement {
    /// Expanded with `Captures::expand` (`$1`, `${name}`)
    Template(&'static str),
    Func(fn(&Captures) -> String),
}

pub struct Rule {
    pub name: &'static str,
    pub pattern: Regex,
    pub replacement: Replacement,
}

impl Rule {
    pub fn template(name: &'static str, pattern: &str, template: &'static str) -> Self {
        Self { name, pattern: compile(name, pattern), replacement: Replacement::Template(template) }
    }

    pub fn func(name: &'static str, pattern: &str, func: fn(&Captures) -> String) -> Self {
        Self { name, pattern: compile(name, pattern), replacement: Replacement::Func(func) }
    }

    /// Apply this rule once over the whole input. Borrowed when nothing matched.
    pub fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        match &self.replacement {
            Replacement::Template(template) => self.pattern.replace_all(input, *template),
            Replacement::Func(func) => self.pattern.replace_all(input, |caps: &Captures| func(caps)),
        }
    }
}

fn compile(name: &str, pattern: &str) -> Regex {
    // Rule patterns are compile-time constants; a bad one is a programming error.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid pattern for rule {}: {}", name, e))
}

/// Run every rule in order, each over the previous rule's output.
pub fn apply_rules(input: &str, rules: &[Rule]) -> String {
    let mut current = input.to_string();
    for rule in rules {
        if let Cow::Owned(next) = rule.apply(&current) {
            current = next;
        }
    }
    current
}

/// Leave an escaped backslash pair untouched.
///
/// Rules that must not fire right after a backslash list `\\\\` as their first alternative
/// and use this to keep such matches verbatim, which sidesteps the lack of look-behind.
pub fn is_escaped_backslash(caps: &Captures) -> bool {
    caps.get(0).is_some_and(|m| m.as_str() == "\\\\")
}
