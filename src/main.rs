use std::io;

use tracing_subscriber::EnvFilter;

fn main() {
    // Library diagnostics go to stderr; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = convo_export::cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
