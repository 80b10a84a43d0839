//! Run statistics
//!
//! Workers share one `CrawlStats` and bump its counters as items finish;
//! the coordinator folds the final counts and the discovery report into a
//! `CrawlSummary` once every worker has returned.

use crate::crawler::{DiscoveryOutcome, DiscoveryReport};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters updated concurrently by the worker pool
#[derive(Debug, Default)]
pub struct CrawlStats {
    processed: AtomicU64,
    persisted: AtomicU64,
    failed: AtomicU64,
    unmatched_labels: AtomicU64,
    unlabeled_rows: AtomicU64,
}

/// Point-in-time copy of `CrawlStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// URLs taken off the queue
    pub processed: u64,
    /// Records written to disk
    pub persisted: u64,
    /// URLs dropped after a fetch, parse, resolve or write failure
    pub failed: u64,
    /// Labeled rows whose label matched no known field
    pub unmatched_labels: u64,
    /// Rows skipped for lacking a label attribute
    pub unlabeled_rows: u64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persisted(&self) {
        self.persisted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_extraction(&self, unmatched_labels: usize, unlabeled_rows: usize) {
        self.unmatched_labels
            .fetch_add(unmatched_labels as u64, Ordering::Relaxed);
        self.unlabeled_rows
            .fetch_add(unlabeled_rows as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            persisted: self.persisted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            unmatched_labels: self.unmatched_labels.load(Ordering::Relaxed),
            unlabeled_rows: self.unlabeled_rows.load(Ordering::Relaxed),
        }
    }
}

/// Everything known about a finished run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub discovery: DiscoveryReport,
    pub workers: StatsSnapshot,
    pub output_dir: PathBuf,
    pub elapsed: Duration,
}

/// Prints a run summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Discovery:");
    println!("  Outcome: {}", describe_outcome(&summary.discovery.outcome));
    println!("  Listing pages visited: {}", summary.discovery.pages_visited);
    println!("  Links enqueued: {}", summary.discovery.enqueued);
    println!("  Empty links skipped: {}", summary.discovery.skipped_empty);
    println!(
        "  Duplicate links skipped: {}",
        summary.discovery.skipped_duplicate
    );
    println!(
        "  Hand-offs that waited for capacity: {}",
        summary.discovery.waited_for_capacity
    );
    println!();

    println!("Workers:");
    println!("  Processed: {}", summary.workers.processed);
    println!("  Persisted: {}", summary.workers.persisted);
    println!("  Failed: {}", summary.workers.failed);
    println!();

    if summary.workers.unmatched_labels > 0 || summary.workers.unlabeled_rows > 0 {
        println!("Extraction Diagnostics:");
        println!("  Unmatched labels: {}", summary.workers.unmatched_labels);
        println!("  Rows without label: {}", summary.workers.unlabeled_rows);
        println!();
    }

    println!("Output: {}", summary.output_dir.display());
    println!("Elapsed: {:.1}s", summary.elapsed.as_secs_f64());
}

fn describe_outcome(outcome: &DiscoveryOutcome) -> String {
    match outcome {
        DiscoveryOutcome::Exhausted => "listing exhausted".to_string(),
        DiscoveryOutcome::Cancelled => "time budget expired".to_string(),
        DiscoveryOutcome::QueueClosed => "work queue closed".to_string(),
        DiscoveryOutcome::Failed(reason) => format!("navigation failed ({})", reason),
    }
}
