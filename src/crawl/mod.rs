// src/crawl/mod.rs
// =============================================================================
// This module handles crawling a single site.
//
// Features:
// - Breadth-first crawling starting from the seed url
// - Stays on the seed's site (configurable scope policy)
// - Collects at most a fixed number of urls per site
// - Polite crawling with a delay between requests
//
// Rust concepts:
// - Async programming: the crawl waits on the network without blocking a thread
// - Collections: HashSet for visited/collected urls, VecDeque for the queue
// =============================================================================

mod frontier;
mod site;

pub use frontier::Frontier;
pub use site::crawl_site;
