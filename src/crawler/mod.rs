//! Crawler module for listing discovery and detail-page processing
//!
//! This module contains the crawl pipeline, including:
//! - Walking the paginated listing through a page-navigation collaborator
//! - The bounded work queue and the set of already enqueued URLs
//! - The worker pool that fetches, extracts and persists detail pages
//! - Overall run coordination under a time budget

mod coordinator;
mod discovery;
mod fetcher;
mod navigator;
mod queue;
mod worker;

pub use coordinator::{run_crawl, Coordinator};
pub use discovery::{DiscoveryOutcome, DiscoveryReport, LinkDiscovery};
pub use fetcher::{build_http_client, fetch_page, FetchResult};
pub use navigator::{BrowserNavigator, HttpNavigator, ListingNavigator};
pub use queue::{work_queue, HandOff, QueueReceiver, QueueSender, SeenUrls};
pub use worker::{process_listing, run_worker, WorkerContext};
