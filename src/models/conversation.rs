use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::blocks::ContentBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Positional fallback used when the page gives no usable role signal:
    /// even positions are user turns, odd positions assistant turns.
    pub fn from_parity(index: usize) -> Self {
        if index % 2 == 0 { Role::User } else { Role::Assistant }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub index: usize,
    pub role: Role,
    pub blocks: Vec<ContentBlock>,
    pub raw_html: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub url: String,
    pub messages: Vec<Message>,
    pub message_count: usize,
}

impl Conversation {
    pub fn new(id: String, title: String, url: String, messages: Vec<Message>) -> Self {
        let message_count = messages.len();
        Self { id, title, url, messages, message_count }
    }

    /// Messages the user ticked for export; all of them when nothing is ticked.
    pub fn selected_messages(&self) -> Vec<&Message> {
        let selected: Vec<&Message> = self.messages.iter().filter(|m| m.selected).collect();
        if selected.is_empty() { self.messages.iter().collect() } else { selected }
    }

    /// Markdown rendition used by the CLI text output
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n\n", self.title);
        for message in &self.messages {
            let heading = match message.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            out.push_str(&format!("## {}\n\n", heading));
            for block in &message.blocks {
                out.push_str(&block.to_markdown());
                out.push_str("\n\n");
            }
        }
        out.truncate(out.trim_end().len());
        out.push('\n');
        out
    }
}
