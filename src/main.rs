//! CLI entry point for imgrab.

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use imgrab::download::filename;
use imgrab::{FetchEngine, HttpFetcher, RetryPolicy, aggregate_and_export, output};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let directory = args
        .directory
        .clone()
        .unwrap_or_else(|| filename::directory_from_url(&args.url));
    info!(directory = %directory, "creating target directory");

    let engine = FetchEngine::new(
        HttpFetcher::new(),
        RetryPolicy::default(),
        args.concurrency_limit(),
    );
    let run = engine.run(&args.url, Path::new(&directory)).await?;

    let summary = aggregate_and_export(
        &run.outcomes,
        &run.image_urls,
        run.title.as_deref(),
        Path::new(&directory),
    )?;
    output::print_summary(&summary);

    Ok(())
}
