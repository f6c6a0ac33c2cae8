// src/fetch/testing.rs
// =============================================================================
// An in-memory website for tests.
//
// Pages are plain HTML strings keyed by the exact url the crawler will ask
// for. Every request is recorded so tests can check what was fetched and in
// which order. Urls listed as failing return an error; urls listed as slow
// sleep before answering. Unparsable urls report their links and then fail,
// like a page whose tokenizer dies halfway through.
// =============================================================================

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{extract_links, LinkSource};
use crate::error::FetchError;

#[derive(Debug, Default)]
pub struct StaticSite {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    unparsable: HashSet<String>,
    slow: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn unparsable(mut self, url: &str) -> Self {
        self.unparsable.insert(url.to_string());
        self
    }

    pub fn slow(mut self, url: &str, delay: Duration) -> Self {
        self.slow.insert(url.to_string(), delay);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests().iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait]
impl LinkSource for StaticSite {
    async fn fetch_links(
        &self,
        url: &str,
        on_link: &mut (dyn FnMut(String) + Send),
    ) -> Result<(), FetchError> {
        self.requests.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.slow.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(url) {
            return Err(FetchError::Timeout);
        }

        let html = self
            .pages
            .get(url)
            .ok_or(FetchError::Status(404))?;
        for link in extract_links(html) {
            on_link(link);
        }
        if self.unparsable.contains(url) {
            return Err(FetchError::Parse("tokenizer stopped".to_string()));
        }
        Ok(())
    }
}
