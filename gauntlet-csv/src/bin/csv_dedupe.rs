use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gauntlet_csv::{deduplicate, read_lines, write_lines};

/// De-duplicates the data rows of a CSV file, preserving the header and
/// first-occurrence order. File errors are logged and degrade to an empty
/// result; they are never fatal.
#[derive(Debug, Parser)]
#[command(name = "csv-dedupe", version, about)]
struct Args {
    /// Input CSV file.
    input: PathBuf,
    /// Output CSV file.
    output: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let lines = read_lines(&args.input).unwrap_or_else(|err| {
        warn!("{err}; continuing with empty input");
        Vec::new()
    });
    info!(rows = lines.len(), "read input");

    let unique = deduplicate(lines);
    info!(rows = unique.len(), "after de-duplication");

    match write_lines(&args.output, &unique) {
        Ok(()) => info!(path = %args.output.display(), "unique rows written"),
        Err(err) => warn!("{err}"),
    }
}
