//! Crawler coordinator - lifecycle of one crawl run
//!
//! This module ties the pipeline together:
//! - Compiling selectors, building the HTTP client and creating the output directory
//! - Owning the cancellation signal and the time-budget timer that sets it
//! - Spawning the worker pool and running link discovery
//! - Joining every worker before reporting the run

use crate::config::{validate, Config, NavigatorKind};
use crate::crawler::discovery::LinkDiscovery;
use crate::crawler::navigator::{BrowserNavigator, HttpNavigator, ListingNavigator};
use crate::crawler::queue::work_queue;
use crate::crawler::worker::{run_worker, WorkerContext};
use crate::crawler::build_http_client;
use crate::listing::SiteSelectors;
use crate::output::{CrawlStats, CrawlSummary, JsonStore};
use crate::CrawlError;
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
    selectors: Arc<SiteSelectors>,
    store: JsonStore,
    cancel: CancellationToken,
    started: Instant,
    timer: JoinHandle<()>,
}

impl Coordinator {
    /// Prepares a run and starts its time budget
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run; the budget timer is already counting
    /// * `Err(CrawlError)` - Invalid configuration, HTTP client failure, or the
    ///   output directory could not be created
    pub async fn new(config: Config) -> Result<Self, CrawlError> {
        validate(&config)?;

        let selectors = Arc::new(SiteSelectors::compile(&config.site)?);
        let client = build_http_client(&config.http)?;
        let store = JsonStore::for_today(Path::new(&config.output.root)).await?;
        tracing::info!("Output directory: {}", store.dir().display());

        let cancel = CancellationToken::new();
        let timer = spawn_budget_timer(config.crawler.time_budget(), cancel.clone());

        Ok(Self {
            config: Arc::new(config),
            client,
            selectors,
            store,
            cancel,
            started: Instant::now(),
            timer,
        })
    }

    /// Token observed by discovery; cancel it to stop the run early
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn output_dir(&self) -> &Path {
        self.store.dir()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn selectors(&self) -> Arc<SiteSelectors> {
        Arc::clone(&self.selectors)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs discovery over `navigator` and the worker pool to completion
    ///
    /// Discovery runs on the calling task while the workers drain the queue.
    /// Returns once discovery has stopped and every worker has returned.
    pub async fn run<N: ListingNavigator>(self, navigator: N) -> CrawlSummary {
        let crawler = &self.config.crawler;
        tracing::info!(
            "Starting crawl of {} with {} workers, queue capacity {}, time budget {}s",
            crawler.listing_url,
            crawler.worker_count,
            crawler.queue_capacity,
            crawler.time_budget
        );

        let output_dir = self.store.dir().to_path_buf();
        let context = Arc::new(WorkerContext {
            client: self.client,
            selectors: self.selectors,
            store: self.store,
            stats: CrawlStats::new(),
        });

        let (sender, receiver) = work_queue(crawler.queue_capacity);

        let mut workers = JoinSet::new();
        for id in 1..=crawler.worker_count {
            workers.spawn(run_worker(id, receiver.clone(), Arc::clone(&context)));
        }
        drop(receiver);

        let discovery = LinkDiscovery::new(navigator, sender, self.cancel.clone())
            .run()
            .await;

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Worker task failed: {}", e);
            }
        }
        tracing::info!("All workers finished");

        self.timer.abort();

        CrawlSummary {
            discovery,
            workers: context.stats.snapshot(),
            output_dir,
            elapsed: self.started.elapsed(),
        }
    }
}

fn spawn_budget_timer(budget: std::time::Duration, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(budget) => {
                tracing::info!("Time budget of {}s expired, stopping discovery", budget.as_secs());
                cancel.cancel();
            }
            _ = cancel.cancelled() => {}
        }
    })
}

/// Runs a complete crawl with the navigator named in the configuration
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - The run finished, whatever stopped discovery
/// * `Err(CrawlError)` - Setup failed before any worker started
pub async fn run_crawl(config: Config) -> Result<CrawlSummary, CrawlError> {
    let coordinator = Coordinator::new(config).await?;
    let listing_url = coordinator.config().crawler.listing_url.clone();

    let summary = match coordinator.config().crawler.navigator {
        NavigatorKind::Browser => {
            let navigator = BrowserNavigator::launch(
                &coordinator.config().browser,
                &coordinator.config().site,
                &listing_url,
            )
            .await?;
            coordinator.run(navigator).await
        }
        NavigatorKind::Http => {
            let navigator = HttpNavigator::new(
                coordinator.client().clone(),
                coordinator.selectors(),
                &listing_url,
            )?;
            coordinator.run(navigator).await
        }
    };

    Ok(summary)
}
