// src/pool/orchestrator.rs
// =============================================================================
// Runs a whole crawl: one job per seed, a pool of workers, one merged result.
//
// Lifecycle:
// 1. launch()   - queue one job per seed, start cores * load_factor workers
// 2. wait()     - report progress until the queue is empty and no worker is
//                 busy
// 3. collect()  - union of every completed job's urls
// 4. shutdown() - stop and abort all workers, then join them
//
// Completion is checked on a fixed interval (1s by default). A worker that
// finishes a job also wakes the orchestrator up early, so the check usually
// runs right away instead of waiting for the next tick.
// =============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use super::worker::{run_worker, PoolShared};
use super::JobQueue;
use crate::config::CrawlSettings;
use crate::error::CrawlError;
use crate::fetch::LinkSource;
use crate::job::{CompletedJob, CrawlJob};

/// Snapshot of the pool, for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub queued: usize,
    pub active: usize,
    pub completed: usize,
}

/// Everything a finished crawl produced.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub urls: BTreeSet<String>,
    pub jobs: Vec<CompletedJob>,
    /// Number of workers the crawl ran with
    pub workers: usize,
}

pub struct Orchestrator {
    settings: Arc<CrawlSettings>,
    shared: Arc<PoolShared>,
    workers: Vec<JoinHandle<()>>,
}

impl Orchestrator {
    // Queues one job per seed and starts the worker pool
    //
    // Parameters:
    //   seeds: deduplicated seed urls
    //   source: where pages come from (shared by all workers)
    //   settings: cap, pool sizing, timeouts
    //
    // Must be called from inside a tokio runtime (workers are spawned tasks)
    pub fn launch(
        seeds: &[String],
        source: Arc<dyn LinkSource>,
        settings: Arc<CrawlSettings>,
    ) -> Result<Self, CrawlError> {
        settings.validate()?;

        let queue = JobQueue::new(seeds.len());
        for seed in seeds {
            queue.submit(CrawlJob::new(seed.clone(), settings.max_urls_per_site))?;
        }
        let shared = Arc::new(PoolShared::new(queue));

        let pool_size = settings.pool_size();
        tracing::info!(
            seeds = shared.queue.capacity(),
            workers = pool_size,
            max_urls_per_site = settings.max_urls_per_site,
            "starting crawl"
        );

        let workers = (0..pool_size)
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    shared.clone(),
                    source.clone(),
                    settings.clone(),
                ))
            })
            .collect();

        Ok(Self {
            settings,
            shared,
            workers,
        })
    }

    pub fn pool_size(&self) -> usize {
        self.workers.len()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            queued: self.shared.queue.len(),
            active: self.shared.queue.active(),
            completed: self.shared.completed().len(),
        }
    }

    /// True once the queue is empty and no worker is busy.
    pub fn is_complete(&self) -> bool {
        self.shared.queue.is_drained()
    }

    /// True while at least one worker task is still alive.
    pub fn is_running(&self) -> bool {
        self.workers.iter().any(|worker| !worker.is_finished())
    }

    /// Blocks until every job has been crawled, logging progress on each tick.
    ///
    /// Also returns if every worker has stopped, since nothing could finish
    /// the queue anymore.
    pub async fn wait(&self) {
        loop {
            let progress = self.progress();
            tracing::info!(
                queued = progress.queued,
                active = progress.active,
                completed = progress.completed,
                "crawl progress"
            );
            if self.is_complete() {
                return;
            }
            // Nobody left to take the remaining jobs
            if !self.is_running() {
                tracing::warn!(
                    queued = progress.queued,
                    "all workers stopped before the queue was drained"
                );
                return;
            }
            // Either a job finished or the interval elapsed; both mean re-check
            let _ = timeout(
                self.settings.progress_interval,
                self.shared.finished.notified(),
            )
            .await;
        }
    }

    /// Union of the urls of every completed job.
    pub fn collect(&self) -> BTreeSet<String> {
        self.shared
            .completed()
            .iter()
            .flat_map(|job| job.results().iter().cloned())
            .collect()
    }

    pub fn completed_jobs(&self) -> Vec<CompletedJob> {
        self.shared.completed().clone()
    }

    // Stops the pool right away. Jobs still in progress are dropped,
    // jobs still queued are never started
    pub async fn shutdown(self) {
        self.shared.stop();
        for worker in &self.workers {
            worker.abort();
        }
        for result in join_all(self.workers).await {
            if let Err(e) = result {
                if !e.is_cancelled() {
                    tracing::warn!("worker ended abnormally: {}", e);
                }
            }
        }
        tracing::debug!("worker pool shut down");
    }

    /// Runs a complete crawl: launch, wait, collect, shut down.
    pub async fn run(
        seeds: &[String],
        source: Arc<dyn LinkSource>,
        settings: Arc<CrawlSettings>,
    ) -> Result<CrawlOutcome, CrawlError> {
        let orchestrator = Self::launch(seeds, source, settings)?;
        orchestrator.wait().await;

        let outcome = CrawlOutcome {
            urls: orchestrator.collect(),
            jobs: orchestrator.completed_jobs(),
            workers: orchestrator.pool_size(),
        };
        orchestrator.shutdown().await;

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticSite;
    use crate::fetch::HttpFetcher;
    use httpmock::{Method::GET, MockServer};
    use std::time::Duration;

    fn settings() -> CrawlSettings {
        CrawlSettings {
            workers: Some(4),
            request_interval: Duration::ZERO,
            queue_poll: Duration::from_millis(20),
            progress_interval: Duration::from_millis(20),
            ..Default::default()
        }
    }

    fn seeds(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[tokio::test]
    async fn test_results_are_the_union_of_all_jobs() {
        let site = Arc::new(
            StaticSite::new()
                .page("one.test", r#"<a href="/a">a</a><a href="http://shared.org/">s</a>"#)
                .page("one.test/a", "")
                .page("two.test", r#"<a href="http://shared.org/">s</a>"#),
        );

        let outcome = Orchestrator::run(
            &seeds(&["one.test", "two.test"]),
            site,
            Arc::new(settings()),
        )
        .await
        .unwrap();

        let expected: BTreeSet<String> = ["one.test", "one.test/a", "http://shared.org/", "two.test"]
            .iter()
            .map(|u| u.to_string())
            .collect();
        assert_eq!(outcome.urls, expected);
        assert_eq!(outcome.jobs.len(), 2);
    }

    #[tokio::test]
    async fn test_jobs_do_not_share_state() {
        // both sites link to the same relative paths
        let site = Arc::new(
            StaticSite::new()
                .page("red.test", r#"<a href="/p">p</a>"#)
                .page("red.test/p", r#"<a href="/q">q</a>"#)
                .page("red.test/q", "")
                .page("blue.test", r#"<a href="/p">p</a>"#)
                .page("blue.test/p", r#"<a href="/q">q</a>"#)
                .page("blue.test/q", ""),
        );

        let outcome = Orchestrator::run(
            &seeds(&["red.test", "blue.test"]),
            site.clone(),
            Arc::new(settings()),
        )
        .await
        .unwrap();

        for job in &outcome.jobs {
            assert_eq!(job.results().len(), 3);
            assert!(job.results().iter().all(|url| url.starts_with(job.url())));
        }
        assert_eq!(site.requests().len(), 6);
    }

    #[tokio::test]
    async fn test_slow_job_does_not_end_the_crawl_early() {
        let site = Arc::new(
            StaticSite::new()
                .page("slow.test", "")
                .slow("slow.test", Duration::from_millis(300)),
        );

        let orchestrator =
            Orchestrator::launch(&seeds(&["slow.test"]), site, Arc::new(settings())).unwrap();
        orchestrator.wait().await;

        let progress = orchestrator.progress();
        assert_eq!(
            progress,
            Progress {
                queued: 0,
                active: 0,
                completed: 1
            }
        );
        assert!(orchestrator.collect().contains("slow.test"));
        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_no_seeds_completes_immediately() {
        let site = Arc::new(StaticSite::new());

        let outcome = Orchestrator::run(&[], site, Arc::new(settings())).await.unwrap();

        assert!(outcome.urls.is_empty());
        assert!(outcome.jobs.is_empty());
        assert_eq!(outcome.workers, 4);
    }

    #[tokio::test]
    async fn test_wait_returns_when_every_worker_has_stopped() {
        let site = Arc::new(StaticSite::new().page("left.test", ""));
        let orchestrator =
            Orchestrator::launch(&seeds(&["left.test"]), site, Arc::new(settings())).unwrap();
        // stopped before any worker got to run, so the job is never taken
        orchestrator.shared.stop();

        timeout(Duration::from_secs(2), orchestrator.wait())
            .await
            .expect("wait hung with no workers left");

        assert!(!orchestrator.is_running());
        assert!(!orchestrator.is_complete());
        assert_eq!(orchestrator.progress().queued, 1);
        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_pool_size_follows_settings() {
        let site = Arc::new(StaticSite::new());
        let orchestrator = Orchestrator::launch(&[], site, Arc::new(settings())).unwrap();

        assert_eq!(orchestrator.pool_size(), 4);
        assert!(orchestrator.is_running());
        orchestrator.shutdown().await;
    }

    #[tokio::test]
    async fn test_invalid_settings_are_rejected() {
        let site = Arc::new(StaticSite::new());
        let bad = CrawlSettings {
            max_urls_per_site: 0,
            ..settings()
        };

        let result = Orchestrator::launch(&seeds(&["a.test"]), site, Arc::new(bad));

        assert!(matches!(result, Err(CrawlError::InvalidSettings(_))));
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_in_flight_jobs() {
        let site = Arc::new(
            StaticSite::new()
                .page("stuck.test", "")
                .slow("stuck.test", Duration::from_secs(60)),
        );
        let orchestrator =
            Orchestrator::launch(&seeds(&["stuck.test"]), site, Arc::new(settings())).unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(orchestrator.progress().active, 1);

        let shutdown = timeout(Duration::from_secs(2), orchestrator.shutdown()).await;
        assert!(shutdown.is_ok(), "shutdown did not interrupt the stuck fetch");
    }

    #[tokio::test]
    async fn test_end_to_end_cap_is_reached_before_deeper_pages() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200)
                    .header("content-type", "text/html")
                    .body(r#"<a href="/a">a</a><a href="/b">b</a>"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/a");
                then.status(200)
                    .header("content-type", "text/html")
                    .body(r#"<a href="/c">c</a>"#);
            })
            .await;

        // no scheme on the seed, like a line of the input file
        let root = server.address().to_string();
        let settings = Arc::new(CrawlSettings {
            max_urls_per_site: 3,
            ..settings()
        });
        let fetcher = Arc::new(HttpFetcher::new(&settings).unwrap());

        let outcome = Orchestrator::run(&seeds(&[root.as_str()]), fetcher, settings)
            .await
            .unwrap();

        let expected: BTreeSet<String> = [root.clone(), format!("{}/a", root), format!("{}/b", root)]
            .into_iter()
            .collect();
        assert_eq!(outcome.urls, expected);
    }

    #[tokio::test]
    async fn test_end_to_end_timed_out_link_is_dropped() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200)
                    .header("content-type", "text/html")
                    .body(r#"<a href="/slow">slow</a><a href="/fast">fast</a>"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200)
                    .header("content-type", "text/html")
                    .delay(Duration::from_secs(2))
                    .body(r#"<a href="/never">never</a>"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/fast");
                then.status(200)
                    .header("content-type", "text/html")
                    .body(r#"<a href="/after">after</a>"#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/after");
                then.status(200).header("content-type", "text/html").body("");
            })
            .await;

        let root = server.base_url();
        let settings = Arc::new(CrawlSettings {
            read_timeout: Duration::from_millis(300),
            ..settings()
        });
        let fetcher = Arc::new(HttpFetcher::new(&settings).unwrap());

        let outcome = Orchestrator::run(&seeds(&[root.as_str()]), fetcher, settings)
            .await
            .unwrap();

        let expected: BTreeSet<String> = [
            root.clone(),
            format!("{}/fast", root),
            format!("{}/after", root),
        ]
        .into_iter()
        .collect();
        assert_eq!(outcome.urls, expected);
    }
}
