// src/fetch/mod.rs
// =============================================================================
// This module turns a url into the links found on that page.
//
// Submodules:
// - http: downloads a page with reqwest and streams it into the extractor
// - links: incremental <a href> extraction on top of the html5ever tokenizer
// - testing: an in-memory website (tests only)
//
// The crawler never talks to reqwest directly. It only knows the LinkSource
// trait below, which makes it easy to crawl a fake, in-memory website in
// tests.
// =============================================================================

mod http;
mod links;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;

use crate::error::FetchError;

pub use http::HttpFetcher;
pub use links::LinkExtractor;
#[cfg(test)]
pub use links::extract_links;

/// Anything that can list the link targets of a page.
///
/// `on_link` is called once per `<a href>` in document order, while the page
/// is being read. The call only returns once the page is fully processed or
/// has failed; links reported before a failure stay reported.
#[async_trait]
pub trait LinkSource: Send + Sync {
    async fn fetch_links(
        &self,
        url: &str,
        on_link: &mut (dyn FnMut(String) + Send),
    ) -> Result<(), FetchError>;
}
