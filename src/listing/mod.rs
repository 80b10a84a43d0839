//! Listing records and everything needed to build one from a detail page
//!
//! - `record`: the persisted data model
//! - `selectors`: site selectors compiled once from configuration
//! - `extract`: label-driven field extraction
//! - `path`: output identifier derivation from the page URL

mod extract;
mod path;
mod record;
mod selectors;

pub use extract::{extract_listing, is_yes, ExtractionReport, YES_TOKEN};
pub use path::resolve_identifier;
pub use record::{Listing, Location};
pub use selectors::SiteSelectors;
