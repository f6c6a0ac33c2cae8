// src/pool/queue.rs
// =============================================================================
// The shared job queue that feeds the worker pool.
//
// - Bounded FIFO: its capacity is fixed when it is created (one slot per
//   seed), so submitting the initial jobs never waits
// - Many workers poll it concurrently; each job goes to exactly one of them
// - Taking a job and counting its worker as "active" happen under the same
//   lock, so "queue empty and nobody active" can be checked without a window
//   where a job is in nobody's hands
//
// Rust concepts:
// - Drop: ActiveGuard lowers the active count when it goes out of scope,
//   even if the task holding it is aborted
// - Notify: lets a waiting worker sleep until a job is submitted
// =============================================================================

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{timeout_at, Instant};

use crate::error::CrawlError;
use crate::job::CrawlJob;

#[derive(Debug)]
pub struct JobQueue {
    jobs: Mutex<VecDeque<CrawlJob>>,
    capacity: usize,
    available: Notify,
    active: Arc<AtomicUsize>,
}

impl JobQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            jobs: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            available: Notify::new(),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    // A poisoned lock only means another worker panicked while holding it;
    // the VecDeque itself is still consistent
    fn lock(&self) -> MutexGuard<'_, VecDeque<CrawlJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a job, failing if the queue is already at capacity.
    pub fn submit(&self, job: CrawlJob) -> Result<(), CrawlError> {
        {
            let mut jobs = self.lock();
            if jobs.len() >= self.capacity {
                return Err(CrawlError::QueueFull {
                    capacity: self.capacity,
                });
            }
            jobs.push_back(job);
        }
        self.available.notify_one();
        Ok(())
    }

    /// Takes the oldest job, waiting up to `wait` for one to show up.
    ///
    /// The returned job already counts as active until its guard is dropped.
    pub async fn poll(&self, wait: Duration) -> Option<ClaimedJob> {
        let deadline = Instant::now() + wait;
        loop {
            let notified = self.available.notified();
            if let Some(claimed) = self.try_take() {
                return Some(claimed);
            }
            if timeout_at(deadline, notified).await.is_err() {
                return self.try_take();
            }
        }
    }

    fn try_take(&self) -> Option<ClaimedJob> {
        let mut jobs = self.lock();
        let job = jobs.pop_front()?;
        self.active.fetch_add(1, Ordering::SeqCst);
        Some(ClaimedJob {
            job,
            guard: ActiveGuard(self.active.clone()),
        })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of jobs currently being crawled.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// True once no job is waiting and no job is being worked on.
    pub fn is_drained(&self) -> bool {
        let jobs = self.lock();
        jobs.is_empty() && self.active.load(Ordering::SeqCst) == 0
    }
}

/// A job handed to one worker, together with its slot in the active count.
#[derive(Debug)]
pub struct ClaimedJob {
    job: CrawlJob,
    guard: ActiveGuard,
}

impl ClaimedJob {
    pub fn into_parts(self) -> (CrawlJob, ActiveGuard) {
        (self.job, self.guard)
    }
}

#[derive(Debug)]
pub struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_beyond_capacity_fails() {
        let queue = JobQueue::new(2);
        queue.submit(CrawlJob::new("a.test", 1)).unwrap();
        queue.submit(CrawlJob::new("b.test", 1)).unwrap();

        let result = queue.submit(CrawlJob::new("c.test", 1));

        assert!(matches!(result, Err(CrawlError::QueueFull { capacity: 2 })));
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn test_poll_is_fifo_and_counts_active() {
        let queue = JobQueue::new(2);
        queue.submit(CrawlJob::new("a.test", 1)).unwrap();
        queue.submit(CrawlJob::new("b.test", 1)).unwrap();

        let wait = Duration::from_millis(10);
        let (first, first_guard) = queue.poll(wait).await.unwrap().into_parts();
        let (second, second_guard) = queue.poll(wait).await.unwrap().into_parts();

        assert_eq!(first.url(), "a.test");
        assert_eq!(second.url(), "b.test");
        assert!(queue.is_empty());
        assert_eq!(queue.active(), 2);
        assert!(!queue.is_drained());

        drop(first_guard);
        assert_eq!(queue.active(), 1);
        drop(second_guard);
        assert!(queue.is_drained());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_times_out_on_empty_queue() {
        let queue = JobQueue::new(1);

        let started = Instant::now();
        let claimed = queue.poll(Duration::from_millis(1000)).await;

        assert!(claimed.is_none());
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert!(queue.is_drained());
    }

    #[tokio::test]
    async fn test_poll_wakes_up_on_submit() {
        let queue = Arc::new(JobQueue::new(1));

        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.poll(Duration::from_secs(5)).await.is_some() })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.submit(CrawlJob::new("late.test", 1)).unwrap();

        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_each_job_goes_to_one_worker() {
        let queue = Arc::new(JobQueue::new(50));
        for i in 0..50 {
            queue.submit(CrawlJob::new(format!("site{}.test", i), 1)).unwrap();
        }

        let mut handles = Vec::new();
        for _ in 0..8 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                let mut taken = Vec::new();
                while let Some(claimed) = queue.poll(Duration::from_millis(10)).await {
                    let (job, _guard) = claimed.into_parts();
                    taken.push(job.url().to_string());
                }
                taken
            }));
        }

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.await.unwrap());
        }
        assert_eq!(all.len(), 50);
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 50);
        assert!(queue.is_drained());
    }
}
