// src/config.rs
// =============================================================================
// Tunable knobs for a crawl run.
//
// Every component receives these settings explicitly (usually behind an Arc)
// instead of reading globals. Defaults match the behaviour the tool is
// documented with: 100 urls per site, 10 workers per core, one request per
// second per site, 500ms connect / 2s read timeouts.
// =============================================================================

use std::time::Duration;

use url::Url;

use crate::error::CrawlError;

/// How many urls (including the seed itself) are collected per site
pub const DEFAULT_MAX_URLS_PER_SITE: usize = 100;

/// Workers started per available core; crawling is I/O bound
pub const DEFAULT_LOAD_FACTOR: usize = 10;

pub const DEFAULT_QUEUE_POLL: Duration = Duration::from_millis(1000);
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(2000);
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(1000);

/// Decides whether a discovered url belongs to the site being crawled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopePolicy {
    /// The url must textually contain the root url.
    ///
    /// Loose on purpose: `notexample.com` contains `example.com`.
    #[default]
    Substring,
    /// The url must point at the same host and port as the root url.
    SameHost,
}

impl ScopePolicy {
    // Returns true if `url` may be fetched while crawling `root`
    pub fn in_scope(&self, root: &str, url: &str) -> bool {
        match self {
            ScopePolicy::Substring => url.contains(root),
            ScopePolicy::SameHost => {
                let (Ok(root), Ok(candidate)) = (
                    Url::parse(&with_scheme(root)),
                    Url::parse(&with_scheme(url)),
                ) else {
                    return false;
                };
                root.host_str().is_some()
                    && root.host_str() == candidate.host_str()
                    && root.port_or_known_default() == candidate.port_or_known_default()
            }
        }
    }
}

// Prepends http:// to urls that carry no scheme at all
// "example.com/a" -> "http://example.com/a", "https://x.org" is left alone
//
// Only a "://" preceded by a well-formed scheme counts, so
// "example.com/go?to=http://other.org" still gets the prefix
pub fn with_scheme(url: &str) -> String {
    if has_scheme(url) {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

// scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub max_urls_per_site: usize,
    pub load_factor: usize,
    /// Explicit pool size; `None` means cores * load_factor
    pub workers: Option<usize>,
    pub queue_poll: Duration,
    pub request_interval: Duration,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub progress_interval: Duration,
    pub scope: ScopePolicy,
    pub user_agent: String,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_urls_per_site: DEFAULT_MAX_URLS_PER_SITE,
            load_factor: DEFAULT_LOAD_FACTOR,
            workers: None,
            queue_poll: DEFAULT_QUEUE_POLL,
            request_interval: DEFAULT_REQUEST_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            scope: ScopePolicy::default(),
            user_agent: format!("site-harvester/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CrawlSettings {
    /// Number of worker tasks to start.
    pub fn pool_size(&self) -> usize {
        self.workers
            .unwrap_or_else(|| num_cpus::get().saturating_mul(self.load_factor))
            .max(1)
    }

    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.max_urls_per_site == 0 {
            return Err(CrawlError::InvalidSettings(
                "max urls per site must be at least 1".to_string(),
            ));
        }
        if self.workers == Some(0) {
            return Err(CrawlError::InvalidSettings(
                "worker count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
