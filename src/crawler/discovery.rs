//! Link discovery over the paginated listing
//!
//! The single producer of the work queue. Per listing page it:
//! 1. Waits for the page to settle
//! 2. Collects every item's detail link in document order
//! 3. Skips empty and already-enqueued links, hands the rest to the queue
//! 4. Activates the next-page control, or stops when there is none
//!
//! Cancellation is checked between every step and interrupts waits on the
//! navigator or on a full queue. Navigation failures end discovery without
//! retry. However discovery ends, the queue is closed so workers can drain.

use crate::crawler::navigator::ListingNavigator;
use crate::crawler::queue::{HandOff, QueueSender, SeenUrls};
use crate::NavigationError;
use tokio_util::sync::CancellationToken;

/// Why discovery stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// The last listing page had no next-page control
    Exhausted,
    /// The cancellation signal fired
    Cancelled,
    /// Every worker is gone, nothing can be enqueued
    QueueClosed,
    /// The navigator failed; carries the error message
    Failed(String),
}

/// Counts gathered over one discovery run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub pages_visited: usize,
    /// Distinct URLs accepted by the queue
    pub enqueued: usize,
    pub skipped_empty: usize,
    pub skipped_duplicate: usize,
    /// Accepted URLs that first found the queue full
    pub waited_for_capacity: usize,
    pub outcome: DiscoveryOutcome,
}

impl DiscoveryReport {
    fn new() -> Self {
        Self {
            pages_visited: 0,
            enqueued: 0,
            skipped_empty: 0,
            skipped_duplicate: 0,
            waited_for_capacity: 0,
            outcome: DiscoveryOutcome::Exhausted,
        }
    }
}

/// Walks the listing and feeds the work queue
pub struct LinkDiscovery<N> {
    navigator: N,
    queue: QueueSender,
    seen: SeenUrls,
    cancel: CancellationToken,
}

impl<N: ListingNavigator> LinkDiscovery<N> {
    pub fn new(navigator: N, queue: QueueSender, cancel: CancellationToken) -> Self {
        Self {
            navigator,
            queue,
            seen: SeenUrls::new(),
            cancel,
        }
    }

    /// Runs discovery to completion and closes the queue
    pub async fn run(mut self) -> DiscoveryReport {
        let mut report = DiscoveryReport::new();
        report.outcome = self.walk(&mut report).await;

        tracing::info!(
            "Discovery finished ({:?}): {} pages, {} links enqueued, {} empty, {} duplicate",
            report.outcome,
            report.pages_visited,
            report.enqueued,
            report.skipped_empty,
            report.skipped_duplicate
        );

        // Dropping self drops the only QueueSender, closing the queue
        report
    }

    async fn walk(&mut self, report: &mut DiscoveryReport) -> DiscoveryOutcome {
        let navigator = &mut self.navigator;
        let queue = &self.queue;
        let seen = &mut self.seen;
        let cancel = &self.cancel;

        loop {
            if cancel.is_cancelled() {
                return DiscoveryOutcome::Cancelled;
            }

            let links = tokio::select! {
                biased;
                _ = cancel.cancelled() => return DiscoveryOutcome::Cancelled,
                result = load_links(navigator) => match result {
                    Ok(links) => links,
                    Err(e) => return navigation_failed(e),
                },
            };

            report.pages_visited += 1;
            tracing::info!(
                "Listing page {}: found {} items",
                report.pages_visited,
                links.len()
            );

            for url in links {
                if cancel.is_cancelled() {
                    return DiscoveryOutcome::Cancelled;
                }

                if url.trim().is_empty() {
                    tracing::debug!("URL is empty");
                    report.skipped_empty += 1;
                    continue;
                }

                if seen.contains(&url) {
                    tracing::debug!("{} is already visited.", url);
                    report.skipped_duplicate += 1;
                    continue;
                }

                match queue.hand_off(url.clone(), cancel).await {
                    HandOff::Accepted => tracing::debug!("Sent: {}", url),
                    HandOff::AcceptedAfterWait => {
                        tracing::debug!("Sent after waiting for capacity: {}", url);
                        report.waited_for_capacity += 1;
                    }
                    HandOff::Cancelled => {
                        tracing::debug!("Cancelled while waiting to send {}", url);
                        return DiscoveryOutcome::Cancelled;
                    }
                    HandOff::Closed => {
                        tracing::warn!("Work queue closed, dropping {}", url);
                        return DiscoveryOutcome::QueueClosed;
                    }
                }

                seen.mark(url);
                report.enqueued += 1;
            }

            let advanced = tokio::select! {
                biased;
                _ = cancel.cancelled() => return DiscoveryOutcome::Cancelled,
                result = navigator.next_page() => result,
            };

            match advanced {
                Ok(true) => tracing::debug!("Moved to listing page {}", report.pages_visited + 1),
                Ok(false) => {
                    tracing::info!("No next page, listing exhausted");
                    return DiscoveryOutcome::Exhausted;
                }
                Err(e) => return navigation_failed(e),
            }
        }
    }
}

async fn load_links<N: ListingNavigator>(navigator: &mut N) -> Result<Vec<String>, NavigationError> {
    navigator.wait_stable().await?;
    navigator.item_links().await
}

fn navigation_failed(error: NavigationError) -> DiscoveryOutcome {
    tracing::error!("Listing navigation failed, stopping discovery: {}", error);
    DiscoveryOutcome::Failed(error.to_string())
}
