// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (RUST_LOG controls the level, "info" by default)
// 3. Load the seed sites, crawl them all, write the collected urls
// 4. Print a summary (or a JSON report with --json)
// 5. Exit with proper code (0 = success, 2 = error)
//
// Rust concepts used:
// - async/await: every site is crawled by a tokio task, many at once
// - Arc: settings and the fetcher are shared by all workers
// - anyhow::Result: any startup or file error bubbles up to main
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - crawl settings and defaults
mod crawl; // src/crawl/ - crawling a single site
mod error; // src/error.rs - error types
mod fetch; // src/fetch/ - downloading pages and extracting links
mod files; // src/files.rs - seed file, results file, JSON report
mod job; // src/job.rs - one crawl job per seed
mod pool; // src/pool/ - job queue, workers, orchestrator

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use fetch::HttpFetcher;
use files::RunReport;
use pool::Orchestrator;

#[tokio::main]
async fn main() {
    init_logging();

    // Parse errors (missing INPUT/OUTPUT, --max-urls 0, ...) exit with code 2
    // inside clap, before any file is touched
    let cli = Cli::parse();

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so stdout stays clean for --json
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

// The whole run: seeds in, urls out
async fn run(cli: Cli) -> Result<()> {
    let started = Instant::now();

    let seeds = files::load_seeds(&cli.input)?;
    tracing::info!("Loaded {} site(s) from {}", seeds.len(), cli.input.display());

    let settings = Arc::new(cli.settings());
    let fetcher = HttpFetcher::new(&settings).context("Failed to build the HTTP client")?;

    let outcome = Orchestrator::run(&seeds, Arc::new(fetcher), settings)
        .await
        .context("Crawl could not start")?;

    files::save_results(&cli.output, &outcome.urls)?;

    let elapsed = started.elapsed();
    tracing::info!(
        urls = outcome.urls.len(),
        workers = outcome.workers,
        elapsed_secs = elapsed.as_secs_f64(),
        "crawl finished"
    );

    if cli.json {
        let report = RunReport::new(seeds.len(), &outcome, elapsed);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Urls collected: {} ({:.1}s), written to {}",
            outcome.urls.len(),
            elapsed.as_secs_f64(),
            cli.output.display()
        );
    }

    Ok(())
}
