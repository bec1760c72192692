use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

// Maximum size for an input HTML page: 10MB
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// Validates that a file's size is within acceptable limits (10MB)
///
/// Takes an open file handle so the size checked is the size of the file that is then read.
///
/// # Errors
///
/// Returns an error if:
/// - The file metadata cannot be read
/// - The file is larger than 10MB
pub fn validate_file_size(file: &File, path: &Path) -> Result<()> {
    let metadata = file.metadata().with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > MAX_FILE_SIZE_BYTES {
        bail!("File too large: {} ({} bytes, max {} bytes)", path.display(), file_size, MAX_FILE_SIZE_BYTES);
    }

    Ok(())
}

/// Read a saved page after checking its size
pub fn read_html_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("Failed to open HTML file: {}", path.display()))?;
    validate_file_size(&file, path)?;

    let mut html = String::new();
    file.read_to_string(&mut html).with_context(|| format!("Failed to read HTML file: {}", path.display()))?;
    Ok(html)
}

/// Whether `path` looks like a saved HTML page
pub fn is_html_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| HTML_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Where the JSON result for `input` is written: next to it, `.json` extension
pub fn json_output_path(input: &Path) -> PathBuf {
    input.with_extension("json")
}

/// `path` relative to `base` when it lives under it, for summaries
pub fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base).unwrap_or(path).display().to_string()
}
