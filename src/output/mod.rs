//! Output module for persisted records and run reporting
//!
//! This module handles:
//! - Writing one JSON file per detail page into the dated output directory
//! - Counting worker outcomes and printing the end-of-run summary

mod json;
pub mod stats;

pub use json::JsonStore;
pub use stats::{print_summary, CrawlStats, CrawlSummary, StatsSnapshot};
