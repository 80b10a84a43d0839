use crate::config::types::{
    BrowserConfig, Config, CrawlerConfig, HttpConfig, OutputConfig, SiteConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

const MAX_WORKERS: usize = 256;
const MAX_QUEUE_CAPACITY: usize = 100_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_browser_config(&config.browser)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl pipeline configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.listing_url).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "Invalid listing-url '{}': {}",
            config.listing_url, e
        ))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "listing-url '{}' must use http or https",
            config.listing_url
        )));
    }

    if config.worker_count < 1 || config.worker_count > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "worker-count must be between 1 and {}, got {}",
            MAX_WORKERS, config.worker_count
        )));
    }

    if config.queue_capacity < 1 || config.queue_capacity > MAX_QUEUE_CAPACITY {
        return Err(ConfigError::Validation(format!(
            "queue-capacity must be between 1 and {}, got {}",
            MAX_QUEUE_CAPACITY, config.queue_capacity
        )));
    }

    if config.time_budget == 0 {
        return Err(ConfigError::Validation(
            "time-budget must be at least 1 second".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout == 0 || config.connect_timeout == 0 {
        return Err(ConfigError::Validation(format!(
            "HTTP timeouts must be positive, got request-timeout={} connect-timeout={}",
            config.request_timeout, config.connect_timeout
        )));
    }

    Ok(())
}

/// Validates headless browser configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.stable_interval == 0 {
        return Err(ConfigError::Validation(
            "stable-interval must be positive".to_string(),
        ));
    }

    if config.stable_interval > config.stable_timeout {
        return Err(ConfigError::Validation(format!(
            "stable-interval ({}ms) cannot exceed stable-timeout ({}ms)",
            config.stable_interval, config.stable_timeout
        )));
    }

    Ok(())
}

/// Validates that every site selector is non-empty and parses as CSS
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let selectors = [
        ("item", &config.item),
        ("item-link", &config.item_link),
        ("next-page", &config.next_page),
        ("location-row", &config.location_row),
        ("common-row", &config.common_row),
        ("row-label", &config.row_label),
        ("row-value", &config.row_value),
        ("description", &config.description),
        ("title", &config.title),
        ("rent-price", &config.rent_price),
    ];

    for (key, selector) in selectors {
        validate_selector(key, selector)?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.is_empty() {
        return Err(ConfigError::Validation(
            "output root cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a single CSS selector
pub(crate) fn validate_selector(key: &'static str, selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() || Selector::parse(selector).is_err() {
        return Err(ConfigError::InvalidSelector {
            key,
            selector: selector.to_string(),
        });
    }
    Ok(())
}
