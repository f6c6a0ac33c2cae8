// src/files.rs
// =============================================================================
// Reading the seed list and writing what the crawl found.
//
// Input file:  one site per line, e.g. "example.com" or "https://rust-lang.org"
// Output file: every collected url, sorted, one per line
//
// Also builds the JSON run report printed with --json.
// =============================================================================

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::pool::CrawlOutcome;

// Loads the seed sites from `path`
//
// - bytes that are not valid UTF-8 become U+FFFD instead of failing the run
// - whitespace around each line is trimmed, blank lines are skipped
// - a site listed twice is only crawled once (first occurrence wins)
pub fn load_seeds(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);

    let mut seen = HashSet::new();
    let seeds = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect();

    Ok(seeds)
}

/// Writes `urls` to `path`, one per line, replacing any existing file.
pub fn save_results(path: &Path, urls: &BTreeSet<String>) -> Result<()> {
    let mut contents = String::new();
    for url in urls {
        contents.push_str(url);
        contents.push('\n');
    }

    fs::write(path, contents)
        .with_context(|| format!("Failed to write results to {}", path.display()))
}

/// Summary of one run, serialized with --json.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub seeds: usize,
    pub workers: usize,
    pub jobs_completed: usize,
    pub urls_collected: usize,
    pub elapsed_secs: f64,
    pub sites: Vec<SiteReport>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SiteReport {
    pub url: String,
    pub collected: usize,
}

impl RunReport {
    pub fn new(seeds: usize, outcome: &CrawlOutcome, elapsed: Duration) -> Self {
        let mut sites: Vec<SiteReport> = outcome
            .jobs
            .iter()
            .map(|job| SiteReport {
                url: job.url().to_string(),
                collected: job.results().len(),
            })
            .collect();
        sites.sort_by(|a, b| a.url.cmp(&b.url));

        Self {
            seeds,
            workers: outcome.workers,
            jobs_completed: outcome.jobs.len(),
            urls_collected: outcome.urls.len(),
            elapsed_secs: elapsed.as_secs_f64(),
            sites,
        }
    }
}
