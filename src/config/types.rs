use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Kost-Crawler
///
/// Every section falls back to the reference values, so an empty file (or no
/// file at all) reproduces the reference crawl.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Which page-navigation collaborator walks the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigatorKind {
    /// Headless Chrome, clicks the next-page control
    Browser,
    /// Plain HTTP, follows the next-page control's href
    Http,
}

/// Crawl pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// First page of the paginated listing
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Number of concurrent detail-page workers
    #[serde(rename = "worker-count")]
    pub worker_count: usize,

    /// Capacity of the work queue between discovery and workers
    #[serde(rename = "queue-capacity")]
    pub queue_capacity: usize,

    /// Wall-clock budget for discovery (seconds)
    #[serde(rename = "time-budget")]
    pub time_budget: u64,

    pub navigator: NavigatorKind,
}

impl CrawlerConfig {
    pub fn time_budget(&self) -> Duration {
        Duration::from_secs(self.time_budget)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            listing_url: "https://www.sewakost.com/kost.html".to_string(),
            worker_count: 10,
            queue_capacity: 100,
            time_budget: 20,
            navigator: NavigatorKind::Browser,
        }
    }
}

/// HTTP client configuration for detail-page fetches
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout")]
    pub connect_timeout: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("kost-crawler/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: 30,
            connect_timeout: 10,
        }
    }
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,

    /// Delay between DOM size samples while waiting for a stable page (milliseconds)
    #[serde(rename = "stable-interval")]
    pub stable_interval: u64,

    /// Give up waiting for a stable page after this long (milliseconds)
    #[serde(rename = "stable-timeout")]
    pub stable_timeout: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            stable_interval: 500,
            stable_timeout: 10_000,
        }
    }
}

/// CSS selectors describing the target site's markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// One listing entry on a listing page
    pub item: String,

    /// Detail-page anchor inside an item
    #[serde(rename = "item-link")]
    pub item_link: String,

    /// Pagination control leading to the next listing page
    #[serde(rename = "next-page")]
    pub next_page: String,

    /// Labeled rows of the location block
    #[serde(rename = "location-row")]
    pub location_row: String,

    /// Labeled rows of the common-information block
    #[serde(rename = "common-row")]
    pub common_row: String,

    /// Element inside a row carrying the label in its `title` attribute
    #[serde(rename = "row-label")]
    pub row_label: String,

    /// Element inside a row (or the description container) holding the value
    #[serde(rename = "row-value")]
    pub row_value: String,

    /// Free-text description container
    pub description: String,

    pub title: String,

    #[serde(rename = "rent-price")]
    pub rent_price: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            item: ".item".to_string(),
            item_link: ".picture a".to_string(),
            next_page: "#controller_area > ul > li.navigator.rs > a".to_string(),
            location_row: "div.location div.table-cell.clearfix".to_string(),
            common_row: "div.common.row div.table-cell.clearfix".to_string(),
            row_label: "div.name".to_string(),
            row_value: "div.value".to_string(),
            description: "#df_field_additional_information".to_string(),
            title: "h1".to_string(),
            rent_price: "div.price-tag".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory under which the dated run directory is created
    pub root: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: "data".to_string(),
        }
    }
}
