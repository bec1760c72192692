use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use walkdir::WalkDir;

use crate::utils::is_html_file;

// Resource limit: Maximum number of pages processed in one batch
const MAX_BATCH_FILES: usize = 10_000;

/// Find saved HTML pages under `dir`, sorted by path
///
/// Symlinks are not followed and symlinked files are skipped. Unreadable entries are
/// reported and skipped.
///
/// # Errors
///
/// Returns an error if `dir` is not a directory or holds more than the batch file limit.
pub fn discover_html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Not a directory: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                eprintln!("Warning: Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_html_file(entry.path()) {
            continue;
        }

        if files.len() >= MAX_BATCH_FILES {
            bail!(
                "Resource limit exceeded: Found more than {} HTML files under {}",
                MAX_BATCH_FILES,
                dir.display()
            );
        }
        files.push(entry.into_path());
    }

    Ok(files)
}
