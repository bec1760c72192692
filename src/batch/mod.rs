//! Batch extraction over a directory of saved pages
//!
//! Pages are found with [`discover_html_files`] and extracted in parallel by [`run_batch`].
//! A failing page is reported and skipped; the batch itself fails only when more than half
//! of the pages fail.

pub mod discovery;
pub mod runner;

pub use discovery::discover_html_files;
pub use runner::{BatchReport, FileOutcome, extract_file, file_url, run_batch};
