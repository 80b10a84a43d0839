//! Field extraction from a parsed detail page
//!
//! Detail pages present their data as labeled key/value rows in no fixed
//! order, so extraction dispatches on the row label rather than on position:
//! - Location rows fill the province, city and address
//! - The description container yields the free-text description verbatim
//! - Common-information rows fill the category and the amenity flags
//!
//! Each section is an independent pass over the document. Rows without a
//! label attribute are skipped, unknown labels are ignored, and neither is an
//! error. When a label repeats, the last row wins.

use crate::listing::record::Listing;
use crate::listing::selectors::SiteSelectors;
use scraper::{ElementRef, Html, Selector};

pub const LABEL_ADDRESS: &str = "Alamat";
pub const LABEL_PROVINCE: &str = "Provinsi";
pub const LABEL_CITY: &str = "Kota";
pub const LABEL_CATEGORY: &str = "Jenis Kost";
pub const LABEL_AIR_CONDITIONING: &str = "AC";
pub const LABEL_WIFI: &str = "Free WiFi";
pub const LABEL_PRIVATE_BATHROOM: &str = "Kamar Mandi Dalam";

/// Value marking an amenity as present
pub const YES_TOKEN: &str = "Ya";

/// Diagnostics gathered while extracting one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Rows skipped because their label element had no `title` attribute
    pub unlabeled_rows: usize,

    /// Labels that matched no known field, in document order
    pub unmatched_labels: Vec<String>,
}

/// One key/value row with both sides trimmed
struct LabeledRow {
    label: String,
    value: String,
}

/// Populates `listing` from `document`
///
/// The listing's URL is never touched. Returns diagnostics about rows that
/// could not be mapped to a field.
///
/// # Example
///
/// ```
/// use kost_crawler::config::SiteConfig;
/// use kost_crawler::listing::{extract_listing, Listing, SiteSelectors};
/// use scraper::Html;
///
/// let html = r#"<div class="common row"><div class="table-cell clearfix">
///     <div class="name" title="AC"></div><div class="value">Ya</div>
/// </div></div>"#;
/// let selectors = SiteSelectors::compile(&SiteConfig::default()).unwrap();
/// let mut listing = Listing::new("https://example.com/kost/a.html");
/// extract_listing(&Html::parse_document(html), &selectors, &mut listing);
/// assert!(listing.has_air_conditioning);
/// ```
pub fn extract_listing(
    document: &Html,
    selectors: &SiteSelectors,
    listing: &mut Listing,
) -> ExtractionReport {
    let mut report = ExtractionReport::default();

    extract_headline(document, selectors, listing);
    extract_location(document, selectors, listing, &mut report);
    extract_description(document, selectors, listing);
    extract_common_information(document, selectors, listing, &mut report);

    report
}

/// Title and rent price, each from the first matching element
fn extract_headline(document: &Html, selectors: &SiteSelectors, listing: &mut Listing) {
    if let Some(title) = first_text(document, &selectors.title) {
        listing.title = title;
    }
    if let Some(price) = first_text(document, &selectors.rent_price) {
        listing.rent_price = price;
    }
}

fn extract_location(
    document: &Html,
    selectors: &SiteSelectors,
    listing: &mut Listing,
    report: &mut ExtractionReport,
) {
    for row in document.select(&selectors.location_row) {
        let Some(row) = read_row(row, selectors) else {
            tracing::info!("{} doesn't have any location", listing.url());
            report.unlabeled_rows += 1;
            continue;
        };

        match row.label.as_str() {
            LABEL_ADDRESS => listing.location.address = row.value,
            LABEL_PROVINCE => listing.location.province = row.value,
            LABEL_CITY => listing.location.city = row.value,
            _ => report.unmatched_labels.push(row.label),
        }
    }
}

/// Description text is kept verbatim, internal whitespace included
fn extract_description(document: &Html, selectors: &SiteSelectors, listing: &mut Listing) {
    listing.description = document
        .select(&selectors.description)
        .flat_map(|container| container.select(&selectors.row_value))
        .flat_map(|value| value.text())
        .collect();
}

fn extract_common_information(
    document: &Html,
    selectors: &SiteSelectors,
    listing: &mut Listing,
    report: &mut ExtractionReport,
) {
    for row in document.select(&selectors.common_row) {
        let Some(row) = read_row(row, selectors) else {
            tracing::info!("{} doesn't have any common information", listing.url());
            report.unlabeled_rows += 1;
            continue;
        };

        match row.label.as_str() {
            LABEL_CATEGORY => listing.category = row.value,
            LABEL_AIR_CONDITIONING => listing.has_air_conditioning = is_yes(&row.value),
            LABEL_WIFI => listing.has_wifi = is_yes(&row.value),
            LABEL_PRIVATE_BATHROOM => listing.has_private_bathroom = is_yes(&row.value),
            _ => report.unmatched_labels.push(row.label),
        }
    }
}

/// Reads the label attribute and value text of one row
///
/// Returns `None` when the row has no label element or the label element
/// has no `title` attribute.
fn read_row(row: ElementRef<'_>, selectors: &SiteSelectors) -> Option<LabeledRow> {
    let label = row
        .select(&selectors.row_label)
        .next()?
        .value()
        .attr("title")?
        .trim()
        .to_string();

    let value = row
        .select(&selectors.row_value)
        .flat_map(|element| element.text())
        .collect::<String>()
        .trim()
        .to_string();

    Some(LabeledRow { label, value })
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}

/// Exact, case-sensitive comparison against the yes-token
pub fn is_yes(value: &str) -> bool {
    value == YES_TOKEN
}
