// src/crawl/site.rs
// =============================================================================
// This module crawls ONE site breadth-first, up to a fixed number of urls.
//
// How it works:
// 1. Fetch the root url and collect the links on it
// 2. Take the oldest url from the frontier
// 3. Skip it if it was already visited or is outside the site
// 4. Otherwise fetch it, collect its links, and mark it visited
// 5. Wait a moment (politeness), then repeat from 2
// 6. Stop when the frontier is empty or enough urls were collected
//
// Failures:
// - A page that can't be fetched is dropped from the results and never
//   retried, but the crawl goes on with the rest of the frontier
//
// Politeness:
// - One request at a time per site, with a fixed delay in between
// =============================================================================

use std::collections::HashSet;

use super::Frontier;
use crate::config::CrawlSettings;
use crate::error::FetchError;
use crate::fetch::LinkSource;
use crate::job::CrawlJob;

// Crawls the site behind `job` and returns every url collected for it
//
// Parameters:
//   source: where pages come from (HTTP in production, a fake site in tests)
//   job: the seed url and the cap
//   settings: politeness delay and scope policy
//
// Returns: at most job.max_urls() urls, the root included if it was reachable
pub async fn crawl_site(
    source: &dyn LinkSource,
    job: &CrawlJob,
    settings: &CrawlSettings,
) -> HashSet<String> {
    let root = job.url();
    let mut frontier = Frontier::new(root, job.max_urls());

    // The root is collected and visited before anything else, so it uses
    // up one slot of the cap like every other url
    frontier.start();
    tracing::debug!("Crawling root: {}", root);
    if let Err(e) = fetch_into(source, root, &mut frontier).await {
        // An unreachable root is not a result; links it reported stay
        tracing::warn!("Failed to fetch {}: {}", root, e);
        frontier.forget(root);
    }

    // next() returns None once the frontier is empty OR the cap is reached
    while let Some(url) = frontier.next() {
        // Already fetched (or already failed): never twice
        if frontier.is_visited(&url) {
            continue;
        }
        // Off-site links stay in the results but are not fetched
        if !settings.scope.in_scope(root, &url) {
            tracing::debug!("Not following {} (outside {})", url, root);
            continue;
        }

        // Mark first, so a failure below is not retried later
        frontier.mark_visited(&url);
        tracing::debug!("Crawling: {}", url);
        if let Err(e) = fetch_into(source, &url, &mut frontier).await {
            tracing::warn!("Failed to fetch {}: {}", url, e);
            frontier.forget(&url);
        }

        // Be polite: one request per interval to the same site
        tokio::time::sleep(settings.request_interval).await;
    }

    frontier.into_results()
}

async fn fetch_into(
    source: &dyn LinkSource,
    url: &str,
    frontier: &mut Frontier,
) -> Result<(), FetchError> {
    source
        .fetch_links(url, &mut |href: String| {
            frontier.discover(&href);
        })
        .await
}
