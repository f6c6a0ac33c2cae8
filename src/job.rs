// src/job.rs
// =============================================================================
// The unit of work: one seed site to crawl.
//
// A job goes through two states, expressed as two types:
// - CrawlJob: waiting in the queue (or being crawled), no results yet
// - CompletedJob: crawled, results attached, read-only from now on
//
// Because results only exist on CompletedJob, nobody can read them before
// the worker has finished the crawl.
// =============================================================================

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlJob {
    url: String,
    max_urls: usize,
}

impl CrawlJob {
    pub fn new(url: impl Into<String>, max_urls: usize) -> Self {
        Self {
            url: url.into(),
            max_urls,
        }
    }

    /// The seed url; also the root used for scope checks.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Cap on how many urls (seed included) this job may collect.
    pub fn max_urls(&self) -> usize {
        self.max_urls
    }

    // Consumes the job, so results are attached exactly once
    pub fn complete(self, results: HashSet<String>) -> CompletedJob {
        CompletedJob { job: self, results }
    }
}

#[derive(Debug, Clone)]
pub struct CompletedJob {
    job: CrawlJob,
    results: HashSet<String>,
}

impl CompletedJob {
    pub fn url(&self) -> &str {
        self.job.url()
    }

    pub fn max_urls(&self) -> usize {
        self.job.max_urls()
    }

    pub fn results(&self) -> &HashSet<String> {
        &self.results
    }
}
