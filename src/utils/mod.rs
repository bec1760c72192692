pub mod environment;
pub mod html;
pub mod paths;
pub mod text;
pub mod url;

pub use environment::{OPTIONS_ENV_VAR, load_options};
pub use html::escape_html;
pub use paths::{display_relative, is_html_file, json_output_path, read_html_file, validate_file_size};
pub use text::{clean_text, first_line_truncated};
pub use url::{BLANK_URL, conversation_id, conversation_id_from_url, normalize_source_url};
