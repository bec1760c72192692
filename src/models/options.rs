use serde::{Deserialize, Serialize};

/// How the message cap is enforced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitMode {
    /// Warn and extract the first `max_messages` messages
    #[default]
    Soft,
    /// Fail the whole extraction
    Hard,
}

/// Flat extraction options record.
///
/// Omitted fields take the defaults below and unknown fields are ignored, so an options file
/// written for a newer version still loads.
///
/// | field            | default |
/// |------------------|---------|
/// | `parseCode`      | `true`  |
/// | `parseTables`    | `true`  |
/// | `parseReasoning` | `true`  |
/// | `parseImages`    | `true`  |
/// | `parseMath`      | `true`  |
/// | `maxMessages`    | `0` (unlimited) |
/// | `limitMode`      | `"soft"` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractOptions {
    pub parse_code: bool,
    pub parse_tables: bool,
    pub parse_reasoning: bool,
    pub parse_images: bool,
    pub parse_math: bool,
    pub max_messages: usize,
    pub limit_mode: LimitMode,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            parse_code: true,
            parse_tables: true,
            parse_reasoning: true,
            parse_images: true,
            parse_math: true,
            max_messages: 0,
            limit_mode: LimitMode::Soft,
        }
    }
}

impl ExtractOptions {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// `Some(cap)` when a cap is configured
    pub fn message_cap(&self) -> Option<usize> {
        (self.max_messages > 0).then_some(self.max_messages)
    }
}
