//! Compiled CSS selectors for the target site

use crate::config::SiteConfig;
use crate::ConfigError;
use scraper::Selector;

/// Site selectors parsed once at startup and shared by every worker
#[derive(Debug, Clone)]
pub struct SiteSelectors {
    pub item: Selector,
    pub item_link: Selector,
    pub next_page: Selector,
    pub location_row: Selector,
    pub common_row: Selector,
    pub row_label: Selector,
    pub row_value: Selector,
    pub description: Selector,
    pub title: Selector,
    pub rent_price: Selector,

    /// The selector text these were compiled from
    pub source: SiteConfig,
}

impl SiteSelectors {
    /// Parses every selector in `config`
    ///
    /// # Returns
    ///
    /// * `Ok(SiteSelectors)` - All selectors parsed
    /// * `Err(ConfigError::InvalidSelector)` - The first selector that failed to parse
    pub fn compile(config: &SiteConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            item: parse("item", &config.item)?,
            item_link: parse("item-link", &config.item_link)?,
            next_page: parse("next-page", &config.next_page)?,
            location_row: parse("location-row", &config.location_row)?,
            common_row: parse("common-row", &config.common_row)?,
            row_label: parse("row-label", &config.row_label)?,
            row_value: parse("row-value", &config.row_value)?,
            description: parse("description", &config.description)?,
            title: parse("title", &config.title)?,
            rent_price: parse("rent-price", &config.rent_price)?,
            source: config.clone(),
        })
    }
}

fn parse(key: &'static str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
        key,
        selector: selector.to_string(),
    })
}
