use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use scraper::Html;

use crate::batch::{discover_html_files, file_url, run_batch};
use crate::extractor::Extractor;
use crate::models::{ExtractOptions, LimitMode};
use crate::notation::{NotationRenderer, RenderOptions, repair_formula};
use crate::utils::{OPTIONS_ENV_VAR, display_relative, load_options, read_html_file};

#[derive(Parser)]
#[command(name = "convo-export")]
#[command(version = "0.1.0")]
#[command(about = "Extract chat conversations from saved web pages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract one saved page and print the result as JSON
    Extract {
        /// Saved HTML page
        file: PathBuf,

        /// Source URL of the page (used for the conversation id)
        #[arg(long)]
        url: Option<String>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,

        /// Print the conversation as markdown instead of JSON
        #[arg(long, conflicts_with = "pretty")]
        markdown: bool,

        #[command(flatten)]
        options: OptionArgs,
    },
    /// Extract every HTML page under a directory, writing <name>.json next to each
    Batch {
        /// Directory to scan
        dir: PathBuf,

        #[command(flatten)]
        options: OptionArgs,
    },
    /// Show which message selectors match a saved page
    Check {
        /// Saved HTML page
        file: PathBuf,
    },
    /// Repair a formula and print the result
    Repair {
        /// Formula without delimiters
        formula: String,
    },
    /// Render a formula to MathML
    Render {
        /// Formula without delimiters
        formula: String,

        /// Render as a display (block) formula
        #[arg(long)]
        display: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct OptionArgs {
    /// Options JSON file
    #[arg(long, env = OPTIONS_ENV_VAR)]
    pub options: Option<PathBuf>,

    /// Maximum number of messages (0 = unlimited)
    #[arg(long)]
    pub max_messages: Option<usize>,

    /// Fail instead of truncating when over --max-messages
    #[arg(long)]
    pub hard_limit: bool,

    /// Keep math as plain text: no repair, no notation scan
    #[arg(long)]
    pub no_math: bool,

    /// Treat code blocks as text
    #[arg(long)]
    pub no_code: bool,

    /// Treat tables as text
    #[arg(long)]
    pub no_tables: bool,

    /// Treat reasoning blocks as text
    #[arg(long)]
    pub no_reasoning: bool,

    /// Drop images
    #[arg(long)]
    pub no_images: bool,
}

impl OptionArgs {
    /// Options file (or defaults) with command-line flags applied on top
    pub fn resolve(&self) -> Result<ExtractOptions> {
        let mut options = load_options(self.options.as_deref())?;
        if let Some(max) = self.max_messages {
            options.max_messages = max;
        }
        if self.hard_limit {
            options.limit_mode = LimitMode::Hard;
        }
        options.parse_math &= !self.no_math;
        options.parse_code &= !self.no_code;
        options.parse_tables &= !self.no_tables;
        options.parse_reasoning &= !self.no_reasoning;
        options.parse_images &= !self.no_images;
        Ok(options)
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Extract { file, url, pretty, markdown, options }) => {
            extract(file, url.as_deref(), *pretty, *markdown, &options.resolve()?)?;
        }
        Some(Commands::Batch { dir, options }) => {
            batch(dir, &options.resolve()?)?;
        }
        Some(Commands::Check { file }) => {
            check(file)?;
        }
        Some(Commands::Repair { formula }) => {
            println!("{}", repair_formula(formula));
        }
        Some(Commands::Render { formula, display }) => {
            render(formula, *display)?;
        }
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn extract(file: &Path, url: Option<&str>, pretty: bool, markdown: bool, options: &ExtractOptions) -> Result<()> {
    let html = read_html_file(file)?;
    let document = Html::parse_document(&html);
    let source_url = url.map(str::to_string).unwrap_or_else(|| file_url(file));
    let result = Extractor::new(options.clone()).extract(&document, &source_url);

    match (&result.conversation, markdown) {
        (Some(conversation), true) => {
            for warning in &result.warnings {
                eprintln!("Warning: {}", warning);
            }
            print!("{}", conversation.to_markdown());
        }
        _ if pretty => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => println!("{}", serde_json::to_string(&result)?),
    }

    if !result.success {
        bail!("Extraction failed: {}", result.error.unwrap_or_default());
    }
    Ok(())
}

fn batch(dir: &Path, options: &ExtractOptions) -> Result<()> {
    let files = discover_html_files(dir)?;
    if files.is_empty() {
        println!("No HTML files found in {}", dir.display());
        return Ok(());
    }

    let report = run_batch(&files, options)?;
    for outcome in &report.succeeded {
        println!(
            "{} -> {} ({} messages, {} warnings)",
            display_relative(&outcome.input, dir),
            display_relative(&outcome.output, dir),
            outcome.messages,
            outcome.warnings
        );
    }

    // Print summary statistics
    eprintln!(
        "Extracted {} messages from {} pages ({} failed)",
        report.message_count(),
        report.succeeded.len(),
        report.failed.len()
    );
    Ok(())
}

fn check(file: &Path) -> Result<()> {
    let html = read_html_file(file)?;
    let document = Html::parse_document(&html);
    let health = Extractor::default().health(&document);

    println!("Selector Health");
    println!("===============");
    println!("Status: {}", if health.valid { "ok" } else { "no message selector matched" });
    println!("Working: {}", if health.working.is_empty() { "-".to_string() } else { health.working.join(", ") });
    println!("Broken: {}", if health.broken.is_empty() { "-".to_string() } else { health.broken.join(", ") });
    Ok(())
}

fn render(formula: &str, display: bool) -> Result<()> {
    let renderer = NotationRenderer::new();
    let options = if display { RenderOptions::display() } else { RenderOptions::inline() };
    let output = renderer.render(&repair_formula(formula), options)?;

    println!("{}", output.markup);
    if let Some(error) = output.error {
        eprintln!("Warning: Rendered as plain text: {}", error);
    }
    Ok(())
}
