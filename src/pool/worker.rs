// src/pool/worker.rs
// =============================================================================
// One worker of the pool: take a job, crawl it, publish it, repeat.
//
// Workers are plain tokio tasks. Everything a crawl needs (frontier, visited
// and collected sets) is created fresh inside crawl_site for each job, so no
// per-job state is ever shared between workers.
//
// What IS shared (see PoolShared):
// - the job queue (and its active counter)
// - the list of completed jobs
// - the stop flag
// - a Notify poked every time a job finishes
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use super::JobQueue;
use crate::config::CrawlSettings;
use crate::crawl::crawl_site;
use crate::fetch::LinkSource;
use crate::job::CompletedJob;

#[derive(Debug)]
pub struct PoolShared {
    pub queue: JobQueue,
    completed: Mutex<Vec<CompletedJob>>,
    stop: AtomicBool,
    pub finished: Notify,
}

impl PoolShared {
    pub fn new(queue: JobQueue) -> Self {
        Self {
            queue,
            completed: Mutex::new(Vec::new()),
            stop: AtomicBool::new(false),
            finished: Notify::new(),
        }
    }

    pub fn completed(&self) -> MutexGuard<'_, Vec<CompletedJob>> {
        self.completed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, job: CompletedJob) {
        self.completed().push(job);
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

// The worker loop
//
// An empty poll is not an error: the worker simply polls again, unless it
// has been told to stop in the meantime.
pub async fn run_worker(
    id: usize,
    shared: Arc<PoolShared>,
    source: Arc<dyn LinkSource>,
    settings: Arc<CrawlSettings>,
) {
    tracing::debug!(worker = id, "worker started");

    while !shared.is_stopped() {
        // Wait up to queue_poll for a job; on timeout, check the stop flag
        // and try again
        let Some(claimed) = shared.queue.poll(settings.queue_poll).await else {
            continue;
        };
        // `active` keeps this job counted as in progress until it is dropped
        let (job, active) = claimed.into_parts();

        // Fresh crawl state for every job, nothing carries over
        let results = crawl_site(source.as_ref(), &job, &settings).await;
        let done = job.complete(results);

        tracing::info!(
            worker = id,
            site = done.url(),
            collected = done.results().len(),
            max_urls = done.max_urls(),
            queued = shared.queue.len(),
            "job done"
        );

        // Publish before releasing the active slot, so a drained queue
        // always means every result is already in `completed`
        shared.publish(done);
        drop(active);

        // Wake the orchestrator so it re-checks completion right away
        shared.finished.notify_one();

        if shared.queue.is_empty() {
            tracing::debug!(worker = id, "no jobs left in the queue");
        }
    }

    tracing::debug!(worker = id, "worker stopped");
}
