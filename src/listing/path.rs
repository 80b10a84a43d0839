//! Record identifier derivation
//!
//! A detail page is persisted as `<identifier>.json`, where the identifier is
//! the last non-empty path segment of its URL with every literal `.html`
//! removed. The removal is a plain substring replacement: `odd.html.html`
//! becomes `odd`, and `a.htmlb` becomes `ab`. Two URLs that end in the same
//! segment share an identifier, and the later write replaces the earlier one.
//!
//! The segment is used exactly as it appears in the parsed URL, percent
//! encoding included: `kamar%20murah.html` becomes `kamar%20murah`, and an
//! encoded `%2F` never turns into a path separator in the output filename.

use crate::ResolveError;
use url::Url;

const HTML_SUFFIX: &str = ".html";

/// Derives the output filename stem for a detail-page URL
///
/// # Returns
///
/// * `Ok(String)` - The identifier
/// * `Err(ResolveError::Parse)` - The URL could not be parsed
/// * `Err(ResolveError::NoPathSegment)` - The URL has no non-empty path segment
/// * `Err(ResolveError::EmptyIdentifier)` - Nothing is left after removing `.html`
///
/// # Example
///
/// ```
/// use kost_crawler::listing::resolve_identifier;
///
/// let id = resolve_identifier("https://x.test/a/b/listing-42.html").unwrap();
/// assert_eq!(id, "listing-42");
/// ```
pub fn resolve_identifier(url: &str) -> Result<String, ResolveError> {
    let parsed = Url::parse(url).map_err(|source| ResolveError::Parse {
        url: url.to_string(),
        source,
    })?;

    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.rfind(|segment| !segment.is_empty()))
        .ok_or_else(|| ResolveError::NoPathSegment(url.to_string()))?;

    let identifier = segment.replace(HTML_SUFFIX, "");
    if identifier.is_empty() {
        return Err(ResolveError::EmptyIdentifier(url.to_string()));
    }

    Ok(identifier)
}
