//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Markup shape used to wrap message turns, one per selector strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `<article>` per turn
    Article,
    /// `[data-testid="conversation-turn-N"]` per turn
    TestId,
    /// `[data-message-author-role]` per turn
    AuthorRole,
    /// Plain `div` children of `<main>`
    MainRegion,
    /// `.prose` containers two levels below a `section`
    ContentClass,
}

/// Builder for one message turn
#[derive(Debug, Clone)]
pub struct TurnBuilder {
    role: Option<&'static str>,
    body: String,
    message_id: Option<String>,
    timestamp: Option<String>,
}

impl TurnBuilder {
    pub fn user(body: &str) -> Self {
        Self::with_role(Some("user"), body)
    }

    pub fn assistant(body: &str) -> Self {
        Self::with_role(Some("assistant"), body)
    }

    /// Turn without any role attribute
    pub fn anonymous(body: &str) -> Self {
        Self::with_role(None, body)
    }

    fn with_role(role: Option<&'static str>, body: &str) -> Self {
        Self { role, body: body.to_string(), message_id: None, timestamp: None }
    }

    pub fn message_id(mut self, id: &str) -> Self {
        self.message_id = Some(id.to_string());
        self
    }

    pub fn timestamp(mut self, rfc3339: &str) -> Self {
        self.timestamp = Some(rfc3339.to_string());
        self
    }

    fn attributes(&self) -> String {
        let mut attrs = String::new();
        if let Some(role) = self.role {
            attrs.push_str(&format!(r#" data-message-author-role="{}""#, role));
        }
        if let Some(id) = &self.message_id {
            attrs.push_str(&format!(r#" data-message-id="{}""#, id));
        }
        attrs
    }

    fn content(&self, class: &str) -> String {
        let time = self.timestamp.as_ref().map(|t| format!(r#"<time datetime="{}">sent</time>"#, t)).unwrap_or_default();
        format!(r#"{}<div class="{}">{}</div>"#, time, class, self.body)
    }

    fn render(&self, layout: Layout, position: usize) -> String {
        match layout {
            Layout::Article => format!("<article{}>{}</article>", self.attributes(), self.content("markdown")),
            Layout::TestId => format!(
                r#"<div data-testid="conversation-turn-{}"><div{}>{}</div></div>"#,
                position + 1,
                self.attributes(),
                self.content("markdown")
            ),
            Layout::AuthorRole => format!("<div{}>{}</div>", self.attributes(), self.content("markdown")),
            Layout::MainRegion => format!("<div{}>{}</div>", self.attributes(), self.content("whitespace-pre-wrap")),
            Layout::ContentClass => {
                format!("<section{}><div>{}</div></section>", self.attributes(), self.content("prose"))
            }
        }
    }
}

/// Builder for a saved chat page
pub struct PageBuilder {
    title: Option<String>,
    layout: Layout,
    turns: Vec<TurnBuilder>,
    chrome: String,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self { title: None, layout: Layout::AuthorRole, turns: Vec::new(), chrome: String::new() }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn turn(mut self, turn: TurnBuilder) -> Self {
        self.turns.push(turn);
        self
    }

    pub fn turns(mut self, turns: impl IntoIterator<Item = TurnBuilder>) -> Self {
        self.turns.extend(turns);
        self
    }

    /// Extra markup placed before the conversation (navigation, banners)
    pub fn chrome(mut self, html: &str) -> Self {
        self.chrome = html.to_string();
        self
    }

    pub fn build(&self) -> String {
        let head = self.title.as_ref().map(|t| format!("<title>{}</title>", t)).unwrap_or_default();
        let turns: String = self.turns.iter().enumerate().map(|(i, t)| t.render(self.layout, i)).collect();
        format!(
            "<!DOCTYPE html><html><head>{}</head><body><nav>{}</nav><main>{}</main></body></html>",
            head, self.chrome, turns
        )
    }

    /// Write the page to `dir/name` and return its path
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, self.build()).expect("Failed to write page");
        path
    }
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `count` alternating user/assistant turns with short paragraphs
pub fn alternating_turns(count: usize) -> Vec<TurnBuilder> {
    (0..count)
        .map(|i| {
            let body = format!("<p>Message number {} in this conversation</p>", i);
            if i % 2 == 0 { TurnBuilder::user(&body) } else { TurnBuilder::assistant(&body) }
        })
        .collect()
}

/// A realistic assistant answer mixing every block type
pub fn rich_answer() -> String {
    r#"<p>Here is the derivation of <span class="katex"><span class="katex-mathml"><math><semantics><mrow><mi>x</mi></mrow><annotation encoding="application/x-tex">x^2</annotation></semantics></math></span><span class="katex-html" aria-hidden="true">x2</span></span>.</p>
<div class="thinking-block" data-collapsed="true"><p>The user wants a proof.</p></div>
<pre><div class="code-header">python<button>Copy code</button></div><code class="language-python">def square(x):
    return x * x
</code></pre>
<table><thead><tr><th>n</th><th>n²</th></tr></thead><tbody><tr><td>1</td><td>1</td></tr><tr><td>2</td><td>4</td></tr><tr><td>3</td><td>9</td></tr></tbody></table>
<ol><li>Expand</li><li>Simplify <span class="katex"><annotation encoding="application/x-tex">a+b</annotation></span></li></ol>
<p><img src="https://files.example.com/dalle-plot.webp" alt="Generated plot"></p>
<span class="katex-display"><span class="katex"><annotation encoding="application/x-tex">\int_0^1 x\,dx = \frac{1}{2}</annotation></span></span>"#
        .to_string()
}

/// Temp directory for page fixtures
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}
