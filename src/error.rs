// src/error.rs
// =============================================================================
// Error types shared across the crawler.
//
// Two families:
// - FetchError: something went wrong for ONE url (timeout, bad status, ...).
//   These never escape the crawl of a single site; the crawler records the
//   url as visited and moves on.
// - CrawlError: something went wrong with the crawl machinery itself
//   (queue overflow, nonsense settings).
//
// Application-level code (main.rs, files.rs) uses anyhow on top of these.
// =============================================================================

use thiserror::Error;

/// Why a single url produced no links.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url '{0}'")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("not an HTML document (content-type: {0})")]
    NotHtml(String),

    #[error("timed out")]
    Timeout,

    #[error("failed reading body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("failed parsing page: {0}")]
    Parse(String),
}

impl FetchError {
    // reqwest reports its own timeouts as ordinary errors
    // We fold them into our Timeout variant so callers see one kind
    pub fn from_request(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_builder() {
            FetchError::InvalidUrl(
                error
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| error.to_string()),
            )
        } else {
            FetchError::Request(error)
        }
    }
}

/// Errors raised by the job queue and worker pool.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("job queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
