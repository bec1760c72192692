use serde::{Deserialize, Serialize};

/// A notation span found inside a text block.
///
/// `offset` counts characters (not bytes) from the start of the owning block's content and
/// points at the opening delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotationExpression {
    pub raw: String,
    pub is_block: bool,
    pub offset: usize,
}

/// One typed unit of message content.
///
/// The variant is fixed at construction. Consumers match all five variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ContentBlock {
    Text { content: String, has_notation: bool, notation: Vec<NotationExpression> },
    Code { language: Option<String>, content: String, filename: Option<String> },
    Table { headers: Vec<String>, rows: Vec<Vec<String>> },
    Image { src: String, alt: String, generated: bool },
    Reasoning { content: String, collapsed: bool },
}

impl ContentBlock {
    /// Short lowercase tag, matches the serialized `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentBlock::Text { .. } => "text",
            ContentBlock::Code { .. } => "code",
            ContentBlock::Table { .. } => "table",
            ContentBlock::Image { .. } => "image",
            ContentBlock::Reasoning { .. } => "reasoning",
        }
    }

    /// Render the block as markdown.
    pub fn to_markdown(&self) -> String {
        match self {
            ContentBlock::Text { content, .. } => content.clone(),
            ContentBlock::Code { language, content, filename } => {
                let mut out = String::new();
                if let Some(name) = filename {
                    out.push_str(&format!("`{}`\n", name));
                }
                out.push_str("```");
                out.push_str(language.as_deref().unwrap_or_default());
                out.push('\n');
                out.push_str(content.trim_end_matches('\n'));
                out.push_str("\n```");
                out
            }
            ContentBlock::Table { headers, rows } => {
                let mut lines = Vec::with_capacity(rows.len() + 2);
                if !headers.is_empty() {
                    lines.push(format!("| {} |", headers.join(" | ")));
                    lines.push(format!("|{}", " --- |".repeat(headers.len())));
                }
                for row in rows {
                    lines.push(format!("| {} |", row.join(" | ")));
                }
                lines.join("\n")
            }
            ContentBlock::Image { src, alt, .. } => format!("![{}]({})", alt, src),
            ContentBlock::Reasoning { content, .. } => {
                content.lines().map(|line| format!("> {}", line)).collect::<Vec<_>>().join("\n")
            }
        }
    }
}
