// src/crawl/frontier.rs
// =============================================================================
// Per-site crawl state: what to visit next, what was visited, what was found.
//
// One Frontier exists per job and is owned by the worker crawling that job.
// It is never shared, so it needs no locks.
//
// Three collections:
// - to_visit: FIFO queue of urls waiting to be fetched (breadth-first order)
// - visited: urls already fetched or attempted; only ever grows
// - collected: urls accepted as results; capped at max_urls
//
// A url enters `collected` and `to_visit` together, when it is first
// discovered. It leaves `collected` again only if fetching it fails.
// =============================================================================

use std::collections::{HashSet, VecDeque};

#[derive(Debug)]
pub struct Frontier {
    root: String,
    max_urls: usize,
    visited: HashSet<String>,
    collected: HashSet<String>,
    to_visit: VecDeque<String>,
}

impl Frontier {
    pub fn new(root: &str, max_urls: usize) -> Self {
        Self {
            root: root.to_string(),
            max_urls,
            visited: HashSet::new(),
            collected: HashSet::new(),
            to_visit: VecDeque::new(),
        }
    }

    // The root counts against the cap before any of its links do
    pub fn start(&mut self) {
        self.visited.insert(self.root.clone());
        self.collected.insert(self.root.clone());
    }

    pub fn is_full(&self) -> bool {
        self.collected.len() >= self.max_urls
    }

    /// Offers a raw href found on a page.
    ///
    /// Returns true if the url was new and there was room for it.
    pub fn discover(&mut self, href: &str) -> bool {
        let url = resolve(&self.root, href);

        if self.visited.contains(&url) || self.collected.contains(&url) || self.is_full() {
            return false;
        }

        self.collected.insert(url.clone());
        if !self.to_visit.contains(&url) {
            self.to_visit.push_back(url);
        }
        true
    }

    /// Next url to look at, or None once the queue is empty or the cap is hit.
    pub fn next(&mut self) -> Option<String> {
        if self.is_full() {
            return None;
        }
        self.to_visit.pop_front()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn mark_visited(&mut self, url: &str) {
        self.visited.insert(url.to_string());
    }

    // A url that could not be fetched is no longer a result,
    // but stays visited so it is not tried again
    pub fn forget(&mut self, url: &str) {
        self.collected.remove(url);
    }

    #[cfg(test)]
    pub fn collected(&self) -> &HashSet<String> {
        &self.collected
    }

    pub fn into_results(self) -> HashSet<String> {
        self.collected
    }
}

// Resolves an href against the root url
//
// Deliberately naive: "/path" is appended to the root as text, everything
// else is taken as-is. No "..", fragment or query handling.
//
// Example:
//   root = "example.com", href = "/docs"  -> "example.com/docs"
//   root = "example.com", href = "http://other.org" -> "http://other.org"
pub fn resolve(root: &str, href: &str) -> String {
    if href.starts_with('/') {
        format!("{}{}", root, href)
    } else {
        href.to_string()
    }
}
