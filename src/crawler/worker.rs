//! Detail-page workers
//!
//! Each worker takes URLs off the work queue until it is closed and drained,
//! and for each one runs fetch, extract, resolve, serialize and persist. A
//! failure anywhere in that chain drops the one record and the worker moves
//! on to the next URL.

use crate::crawler::fetcher::{fetch_page, FetchResult};
use crate::crawler::queue::QueueReceiver;
use crate::listing::{extract_listing, resolve_identifier, ExtractionReport, Listing, SiteSelectors};
use crate::output::{CrawlStats, JsonStore};
use crate::CrawlError;
use reqwest::Client;
use scraper::Html;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a worker needs, shared by the whole pool
pub struct WorkerContext {
    pub client: Client,
    pub selectors: Arc<SiteSelectors>,
    pub store: JsonStore,
    pub stats: CrawlStats,
}

/// Runs one worker until the queue is closed and empty
pub async fn run_worker(id: usize, queue: QueueReceiver, context: Arc<WorkerContext>) {
    while let Some(url) = queue.next().await {
        tracing::debug!("Worker {} started {}", id, url);
        context.stats.record_processed();

        match process_listing(&context, &url).await {
            Ok(_) => context.stats.record_persisted(),
            Err(e) => {
                context.stats.record_failed();
                tracing::warn!("Worker {} dropped {}: {}", id, url, e);
            }
        }

        tracing::debug!("Worker {} ended {}", id, url);
    }

    tracing::debug!("Worker {} exiting, queue drained", id);
}

/// Fetches one detail page and persists its record
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written record
/// * `Err(CrawlError)` - The record was not written
pub async fn process_listing(context: &WorkerContext, url: &str) -> Result<PathBuf, CrawlError> {
    tracing::info!("Visiting: {}", url);

    let body = match fetch_page(&context.client, url).await {
        FetchResult::Success {
            final_url,
            status_code,
            body,
        } => {
            if final_url != url {
                tracing::debug!("{} redirected to {}", url, final_url);
            }
            tracing::debug!("Fetched {} ({}, {} bytes)", url, status_code, body.len());
            body
        }
        FetchResult::HttpError { status_code } => {
            return Err(CrawlError::HttpStatus {
                url: url.to_string(),
                status: status_code,
            })
        }
        FetchResult::NetworkError { error } => {
            return Err(CrawlError::Fetch {
                url: url.to_string(),
                message: error,
            })
        }
    };

    let (listing, report) = build_listing(url, &body, &context.selectors)?;

    context
        .stats
        .record_extraction(report.unmatched_labels.len(), report.unlabeled_rows);
    if !report.unmatched_labels.is_empty() {
        tracing::debug!("{}: unmatched labels {:?}", url, report.unmatched_labels);
    }

    let identifier = resolve_identifier(url)?;
    context.store.write(&identifier, &listing).await
}

/// Parses a fetched body and extracts its record
///
/// Kept synchronous so the parsed document never lives across an await.
fn build_listing(
    url: &str,
    body: &[u8],
    selectors: &SiteSelectors,
) -> Result<(Listing, ExtractionReport), CrawlError> {
    let markup = std::str::from_utf8(body).map_err(|e| CrawlError::Parse {
        url: url.to_string(),
        message: format!("body is not valid UTF-8: {}", e),
    })?;

    let document = Html::parse_document(markup);
    let mut listing = Listing::new(url);
    let report = extract_listing(&document, selectors, &mut listing);

    Ok((listing, report))
}
