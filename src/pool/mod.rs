// src/pool/mod.rs
// =============================================================================
// The worker pool that crawls many sites at once.
//
// Submodules:
// - queue: bounded FIFO of jobs shared by all workers
// - worker: the take-crawl-publish loop each worker runs
// - orchestrator: creates jobs, starts workers, waits, merges, shuts down
// =============================================================================

mod orchestrator;
mod queue;
mod worker;

pub use orchestrator::{CrawlOutcome, Orchestrator};
pub use queue::JobQueue;
