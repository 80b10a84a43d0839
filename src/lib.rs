//! Kost-Crawler: a time-boxed listing crawler
//!
//! This crate walks a paginated listing site, hands every detail-page link it
//! finds to a bounded work queue, and lets a fixed pool of workers fetch,
//! extract and persist one JSON record per detail page.

pub mod config;
pub mod crawler;
pub mod listing;
pub mod output;

use thiserror::Error;

/// Main error type for Kost-Crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("Cannot resolve record identifier: {0}")]
    Resolve(#[from] ResolveError),

    #[error("HTML parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: String,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}' for {key}")]
    InvalidSelector { key: &'static str, selector: String },
}

/// Errors raised while deriving a record identifier from a detail-page URL
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Failed to parse URL '{url}': {source}")]
    Parse {
        url: String,
        source: ::url::ParseError,
    },

    #[error("URL '{0}' has no non-empty path segment")]
    NoPathSegment(String),

    #[error("URL '{0}' resolves to an empty identifier")]
    EmptyIdentifier(String),
}

/// Errors from the page-navigation collaborator
///
/// Any of these stops link discovery; already queued work still drains.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("No element matches '{selector}'")]
    ElementNotFound { selector: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Failed to load listing page {url}: {message}")]
    Http { url: String, message: String },

    #[error("Script evaluation failed: {0}")]
    Script(String),
}

/// Result type alias for Kost-Crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator};
pub use listing::{extract_listing, resolve_identifier, Listing, Location};
