// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Usage:
//   site-harvester sites.txt found.txt
//   site-harvester sites.txt found.txt --max-urls 20 --workers 8 --json
//
// Every crawl setting has a flag; anything left out keeps its default
// (see config.rs). Timing flags take milliseconds.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::builder::TypedValueParser;
use clap::Parser;

use crate::config::{
    CrawlSettings, ScopePolicy, DEFAULT_LOAD_FACTOR, DEFAULT_MAX_URLS_PER_SITE,
};

#[derive(Parser, Debug)]
#[command(
    name = "site-harvester",
    version,
    about = "Crawls a list of websites and collects the urls found on each of them",
    long_about = "site-harvester reads one website per line from INPUT, crawls each site \
                  breadth-first up to a fixed number of urls, and writes every url it \
                  collected to OUTPUT, one per line."
)]
pub struct Cli {
    /// File with the sites to crawl, one per line
    pub input: PathBuf,

    /// File the collected urls are written to (overwritten)
    pub output: PathBuf,

    /// Maximum number of urls collected per site, the site itself included
    ///
    /// Must be at least 1; the range check happens while parsing
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_URLS_PER_SITE,
        value_parser = clap::value_parser!(u64).range(1..).map(|n| n as usize)
    )]
    pub max_urls: usize,

    /// Workers started per CPU core
    #[arg(long, default_value_t = DEFAULT_LOAD_FACTOR)]
    pub load_factor: usize,

    /// Exact number of workers (overrides --load-factor)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..).map(|n| n as usize))]
    pub workers: Option<usize>,

    /// Pause between two requests to the same site
    #[arg(long, default_value_t = 1000)]
    pub request_interval_ms: u64,

    #[arg(long, default_value_t = 500)]
    pub connect_timeout_ms: u64,

    /// Applies to the response head and to every read of the body
    #[arg(long, default_value_t = 2000)]
    pub read_timeout_ms: u64,

    /// How long an idle worker waits on the queue before checking again
    #[arg(long, default_value_t = 1000)]
    pub poll_ms: u64,

    /// Only follow links to the seed's own host and port
    ///
    /// Without it, any url containing the seed text is followed
    #[arg(long)]
    pub same_host: bool,

    /// Print a JSON report instead of the summary line
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    // Turns the parsed flags into the settings every component receives
    pub fn settings(&self) -> CrawlSettings {
        CrawlSettings {
            max_urls_per_site: self.max_urls,
            load_factor: self.load_factor,
            workers: self.workers,
            queue_poll: Duration::from_millis(self.poll_ms),
            request_interval: Duration::from_millis(self.request_interval_ms),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            scope: if self.same_host {
                ScopePolicy::SameHost
            } else {
                ScopePolicy::Substring
            },
            ..CrawlSettings::default()
        }
    }
}


// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Where do the flag names come from?
//    - #[arg(long)] turns the field name into a flag: read_timeout_ms becomes
//      --read-timeout-ms (underscores become dashes)
//    - fields without #[arg] are positional arguments, in declaration order
//
// 2. What does value_parser!(u64).range(1..) do?
//    - it parses the text as a number and refuses anything below 1
//    - .map(...) then converts the accepted value into the field's type
//
// 3. Why Option<usize> for --workers?
//    - None means "not given", so the pool size is computed from the cores
//    - clap makes a flag optional automatically when the field is an Option
// -----------------------------------------------------------------------------
