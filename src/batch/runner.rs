use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use scraper::Html;

use crate::extractor::{ExtractionResult, Extractor};
use crate::models::ExtractOptions;
use crate::utils::{json_output_path, read_html_file};

/// One page extracted and written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub messages: usize,
    pub warnings: usize,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<FileOutcome>,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn message_count(&self) -> usize {
        self.succeeded.iter().map(|o| o.messages).sum()
    }
}

/// `file://` URL for a saved page, used as its source URL
pub fn file_url(path: &Path) -> String {
    let absolute = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

/// Extract one page and write its result as JSON next to it.
///
/// The JSON is written for failed extractions too, so the error is on disk with the page.
///
/// # Errors
///
/// Returns an error if the page cannot be read or written, or if extraction failed.
pub fn extract_file(path: &Path, options: &ExtractOptions) -> Result<FileOutcome> {
    let html = read_html_file(path)?;
    let document = Html::parse_document(&html);
    let result = Extractor::new(options.clone()).extract(&document, &file_url(path));

    let output = json_output_path(path);
    write_result(&result, &output)?;

    let ExtractionResult { conversation, error, warnings, .. } = result;
    match conversation {
        Some(conversation) => Ok(FileOutcome {
            input: path.to_path_buf(),
            output,
            messages: conversation.message_count,
            warnings: warnings.len(),
        }),
        None => bail!(error.unwrap_or_else(|| "Extraction failed".to_string())),
    }
}

fn write_result(result: &ExtractionResult, output: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("Failed to serialize extraction result")?;
    fs::write(output, json).with_context(|| format!("Failed to write {}", output.display()))
}

/// Extract every page in parallel, each with its own [`Extractor`]
///
/// Pages sharing an output path (`a.html` and `a.htm`) are not extracted twice: the first
/// one in `files` order writes the JSON and the others are reported as failed.
///
/// # Errors
///
/// Returns an error if more than 50% of the pages fail (systematic breakage such as a
/// changed site layout). Individual failures below that rate are reported and tolerated.
pub fn run_batch(files: &[PathBuf], options: &ExtractOptions) -> Result<BatchReport> {
    let mut claimed: HashMap<PathBuf, &PathBuf> = HashMap::new();
    let mut runnable = Vec::with_capacity(files.len());
    let mut collisions = Vec::new();
    for path in files {
        let output = json_output_path(path);
        match claimed.get(&output) {
            Some(first) => collisions.push((
                path.clone(),
                format!("{} is already written for {}", output.display(), first.display()),
            )),
            None => {
                claimed.insert(output, path);
                runnable.push(path);
            }
        }
    }

    let outcomes: Vec<(PathBuf, Result<FileOutcome>)> =
        runnable.par_iter().map(|path| ((*path).clone(), extract_file(path, options))).collect();

    let mut report = BatchReport::default();
    for (path, reason) in collisions {
        eprintln!("Warning: Skipping {}: {}", path.display(), reason);
        report.failed.push((path, reason));
    }
    for (path, outcome) in outcomes {
        match outcome {
            Ok(done) => report.succeeded.push(done),
            Err(e) => {
                eprintln!("Warning: Failed to extract {}: {:#}", path.display(), e);
                report.failed.push((path, format!("{:#}", e)));
            }
        }
    }

    // Check error rate and fail if >50% of pages failed
    let total = report.total();
    if total > 0 {
        let failure_rate = report.failed.len() as f64 / total as f64;
        if failure_rate > 0.5 {
            bail!(
                "Batch extraction failed: {}/{} pages failed ({}% failure rate)",
                report.failed.len(),
                total,
                (failure_rate * 100.0) as u32
            );
        }
    }

    Ok(report)
}
