//! Listing-page navigation
//!
//! Link discovery drives the paginated listing through the
//! `ListingNavigator` trait. Two implementations are provided:
//! - `BrowserNavigator` renders the listing in headless Chrome and clicks the
//!   next-page control
//! - `HttpNavigator` fetches server-rendered listing pages and follows the
//!   next-page control's `href`
//!
//! Every error returned here is fatal to link discovery.

use crate::config::{BrowserConfig, SiteConfig};
use crate::listing::SiteSelectors;
use crate::NavigationError;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use reqwest::Client;
use scraper::Html;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Page-navigation collaborator for a paginated listing
#[async_trait]
pub trait ListingNavigator: Send {
    /// Blocks until the current listing page has settled
    async fn wait_stable(&mut self) -> Result<(), NavigationError>;

    /// Detail-page link of every item on the current page, in document order
    ///
    /// Links are absolute when the page provides a resolvable `href`; an item
    /// whose anchor has an empty `href` yields an empty string. An item with
    /// no anchor at all is an error.
    async fn item_links(&mut self) -> Result<Vec<String>, NavigationError>;

    /// Activates the next-page control
    ///
    /// Returns `Ok(false)` when the current page has no next-page control,
    /// meaning the listing is exhausted.
    async fn next_page(&mut self) -> Result<bool, NavigationError>;
}

/// Navigates the listing in a headless Chrome tab
///
/// The underlying browser API is blocking, so each call runs on the blocking
/// thread pool.
pub struct BrowserNavigator {
    // Dropping the browser closes the tab
    _browser: Browser,
    tab: Arc<Tab>,
    site: SiteConfig,
    stable_interval: Duration,
    stable_timeout: Duration,
}

impl BrowserNavigator {
    /// Launches Chrome and opens `listing_url`
    pub async fn launch(
        config: &BrowserConfig,
        site: &SiteConfig,
        listing_url: &str,
    ) -> Result<Self, NavigationError> {
        tracing::info!("Launching headless Chrome...");

        let headless = config.headless;
        let listing_url = listing_url.to_string();

        let (browser, tab) = tokio::task::spawn_blocking(move || {
            let options = LaunchOptions::default_builder()
                .headless(headless)
                .build()
                .map_err(|e| NavigationError::Browser(format!("Invalid launch options: {}", e)))?;

            let browser = Browser::new(options).map_err(browser_error)?;
            let tab = browser.new_tab().map_err(browser_error)?;

            tracing::info!("Opening listing page {}", listing_url);
            tab.navigate_to(&listing_url).map_err(browser_error)?;
            tab.wait_until_navigated().map_err(browser_error)?;

            Ok::<_, NavigationError>((browser, tab))
        })
        .await
        .map_err(join_error)??;

        Ok(Self {
            _browser: browser,
            tab,
            site: site.clone(),
            stable_interval: Duration::from_millis(config.stable_interval),
            stable_timeout: Duration::from_millis(config.stable_timeout),
        })
    }

    /// Runs a blocking closure against the tab
    async fn with_tab<T, F>(&self, f: F) -> Result<T, NavigationError>
    where
        T: Send + 'static,
        F: FnOnce(&Tab) -> Result<T, NavigationError> + Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || f(&tab))
            .await
            .map_err(join_error)?
    }
}

#[async_trait]
impl ListingNavigator for BrowserNavigator {
    async fn wait_stable(&mut self) -> Result<(), NavigationError> {
        let interval = self.stable_interval;
        let timeout = self.stable_timeout;

        self.with_tab(move |tab| {
            let started = Instant::now();
            let mut previous = dom_size(tab)?;

            loop {
                std::thread::sleep(interval);
                let current = dom_size(tab)?;
                if current == previous {
                    return Ok(());
                }
                if started.elapsed() >= timeout {
                    tracing::debug!("Listing page still changing after {:?}, continuing", timeout);
                    return Ok(());
                }
                previous = current;
            }
        })
        .await
    }

    async fn item_links(&mut self) -> Result<Vec<String>, NavigationError> {
        let script = format!(
            "JSON.stringify(Array.from(document.querySelectorAll({item})).map(function (item) {{ \
                var link = item.querySelector({link}); \
                if (link === null) {{ return null; }} \
                var raw = link.getAttribute('href'); \
                return (raw === null || raw.trim() === '') ? '' : link.href; \
            }}))",
            item = js_string(&self.site.item)?,
            link = js_string(&self.site.item_link)?,
        );
        let link_selector = self.site.item_link.clone();

        let links: Vec<Option<String>> = self
            .with_tab(move |tab| {
                let value = evaluate(tab, &script)?;
                let json = value
                    .as_str()
                    .ok_or_else(|| NavigationError::Script("item links not a string".to_string()))?;
                serde_json::from_str(json).map_err(|e| NavigationError::Script(e.to_string()))
            })
            .await?;

        links
            .into_iter()
            .map(|link| {
                link.ok_or_else(|| NavigationError::ElementNotFound {
                    selector: link_selector.clone(),
                })
            })
            .collect()
    }

    async fn next_page(&mut self) -> Result<bool, NavigationError> {
        let selector = self.site.next_page.clone();
        let presence = format!("document.querySelector({}) !== null", js_string(&selector)?);
        let interval = self.stable_interval;
        let timeout = self.stable_timeout;

        self.with_tab(move |tab| {
            let present = evaluate(tab, &presence)?.as_bool().unwrap_or(false);
            if !present {
                return Ok(false);
            }

            let previous = current_location(tab)?;
            let button = tab
                .find_element(&selector)
                .map_err(|_| NavigationError::ElementNotFound {
                    selector: selector.clone(),
                })?;
            button.click().map_err(browser_error)?;
            tab.wait_until_navigated().map_err(browser_error)?;

            // The click only starts the load; the old document can still answer
            if !wait_for_location_change(&previous, || current_location(tab), interval, timeout) {
                tracing::debug!(
                    "Location still {} after {:?}, assuming in-page pagination",
                    previous,
                    timeout
                );
            }
            Ok(true)
        })
        .await
    }
}

/// Navigates a server-rendered listing over plain HTTP
pub struct HttpNavigator {
    client: Client,
    selectors: Arc<SiteSelectors>,
    current_url: Url,
    body: Option<String>,
}

impl HttpNavigator {
    pub fn new(
        client: Client,
        selectors: Arc<SiteSelectors>,
        listing_url: &str,
    ) -> Result<Self, NavigationError> {
        let current_url = Url::parse(listing_url).map_err(|e| NavigationError::Http {
            url: listing_url.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            client,
            selectors,
            current_url,
            body: None,
        })
    }

    /// URL of the listing page currently loaded
    pub fn current_url(&self) -> &Url {
        &self.current_url
    }

    async fn load(&mut self) -> Result<&str, NavigationError> {
        if self.body.is_none() {
            let url = self.current_url.to_string();
            tracing::debug!("Loading listing page {}", url);

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .and_then(|response| response.error_for_status())
                .map_err(|e| NavigationError::Http {
                    url: url.clone(),
                    message: e.to_string(),
                })?;
            let body = response.text().await.map_err(|e| NavigationError::Http {
                url,
                message: e.to_string(),
            })?;

            self.body = Some(body);
        }

        Ok(self.body.as_deref().unwrap_or_default())
    }
}

#[async_trait]
impl ListingNavigator for HttpNavigator {
    async fn wait_stable(&mut self) -> Result<(), NavigationError> {
        self.load().await.map(|_| ())
    }

    async fn item_links(&mut self) -> Result<Vec<String>, NavigationError> {
        let base = self.current_url.clone();
        let selectors = Arc::clone(&self.selectors);
        let body = self.load().await?;

        let document = Html::parse_document(body);
        let mut links = Vec::new();
        for item in document.select(&selectors.item) {
            let anchor = item.select(&selectors.item_link).next().ok_or_else(|| {
                NavigationError::ElementNotFound {
                    selector: selectors.source.item_link.clone(),
                }
            })?;
            let href = anchor.value().attr("href").unwrap_or("").trim();
            links.push(absolutize(&base, href));
        }

        Ok(links)
    }

    async fn next_page(&mut self) -> Result<bool, NavigationError> {
        let base = self.current_url.clone();
        let selectors = Arc::clone(&self.selectors);
        let body = self.load().await?;

        let next = {
            let document = Html::parse_document(body);
            document
                .select(&selectors.next_page)
                .next()
                .and_then(|control| control.value().attr("href"))
                .map(str::trim)
                .filter(|href| !href.is_empty())
                .and_then(|href| base.join(href).ok())
        };

        match next {
            Some(url) => {
                tracing::debug!("Advancing listing to {}", url);
                self.current_url = url;
                self.body = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Resolves `href` against the page URL the way a browser's `href` property does
fn absolutize(base: &Url, href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }
    base.join(href)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

fn current_location(tab: &Tab) -> Result<String, NavigationError> {
    evaluate(tab, "window.location.href")?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| NavigationError::Script("location is not a string".to_string()))
}

/// Polls `read` until it reports a location other than `previous`
///
/// Read errors count as "still loading", since the old execution context is
/// torn down mid-navigation. Returns false if the location never changed
/// within `timeout`.
fn wait_for_location_change<F>(
    previous: &str,
    mut read: F,
    interval: Duration,
    timeout: Duration,
) -> bool
where
    F: FnMut() -> Result<String, NavigationError>,
{
    let started = Instant::now();
    loop {
        if let Ok(location) = read() {
            if location != previous {
                return true;
            }
        }
        if started.elapsed() >= timeout {
            return false;
        }
        std::thread::sleep(interval);
    }
}

fn dom_size(tab: &Tab) -> Result<u64, NavigationError> {
    evaluate(tab, "document.documentElement.outerHTML.length")?
        .as_u64()
        .ok_or_else(|| NavigationError::Script("DOM size is not a number".to_string()))
}

fn evaluate(tab: &Tab, expression: &str) -> Result<serde_json::Value, NavigationError> {
    tab.evaluate(expression, false)
        .map_err(|e| NavigationError::Script(e.to_string()))?
        .value
        .ok_or_else(|| NavigationError::Script(format!("no value from `{}`", expression)))
}

/// Quotes a selector as a JavaScript string literal
fn js_string(value: &str) -> Result<String, NavigationError> {
    serde_json::to_string(value).map_err(|e| NavigationError::Script(e.to_string()))
}

fn browser_error(e: impl std::fmt::Display) -> NavigationError {
    NavigationError::Browser(e.to_string())
}

fn join_error(e: tokio::task::JoinError) -> NavigationError {
    NavigationError::Browser(format!("browser task failed: {}", e))
}
