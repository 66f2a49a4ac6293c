//! Detail link extraction from listing pages

use crate::crawler::selector;
use crate::ParseError;
use scraper::Html;
use url::Url;

/// Extracts detail-page links from the listing table, in page order
///
/// The first row of `table.hp` is a header and is skipped. Rows without an `a[href]` are
/// skipped silently; only a missing table is an error.
///
/// # Example
///
/// ```
/// use asn_harvest::crawler::extract_links;
/// use scraper::Html;
///
/// let html = r#"<table class="hp">
///     <tr><th>date</th></tr>
///     <tr><td><a href="/wikibase/1">05-JAN-2024</a></td></tr>
/// </table>"#;
/// let links = extract_links(&Html::parse_document(html), "https://asn.flightsafety.org").unwrap();
/// assert_eq!(links, vec!["https://asn.flightsafety.org/wikibase/1"]);
/// ```
pub fn extract_links(document: &Html, base_url: &str) -> Result<Vec<String>, ParseError> {
    let table_selector = selector("table.hp")?;
    let row_selector = selector("tr")?;
    let link_selector = selector("a[href]")?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or(ParseError::MissingAnchor("Listing table"))?;

    let mut links = Vec::new();
    for row in table.select(&row_selector).skip(1) {
        let href = row
            .select(&link_selector)
            .next()
            .and_then(|anchor| anchor.value().attr("href"));

        match href.and_then(|href| absolute_link(base_url, href)) {
            Some(link) => links.push(link),
            None => tracing::trace!("Skipping listing row without a usable link"),
        }
    }

    Ok(links)
}

/// Makes a listing href absolute by appending it to the base origin
///
/// Absolute and protocol-relative hrefs are kept when they point at http(s). Empty,
/// fragment-only and non-navigable hrefs (`mailto:`, `javascript:`, ...) yield `None`.
pub fn absolute_link(base_url: &str, href: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match Url::parse(href) {
        Ok(url) => return navigable(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {}
        Err(_) => return None,
    }

    if href.starts_with("//") {
        let resolved = Url::parse(base_url).ok()?.join(href).ok()?;
        return navigable(resolved);
    }

    // root-relative links are appended to the base as-is, path prefix included
    let base = base_url.trim_end_matches('/');
    if href.starts_with('/') {
        Some(format!("{}{}", base, href))
    } else {
        Some(format!("{}/{}", base, href))
    }
}

fn navigable(url: Url) -> Option<String> {
    match url.scheme() {
        "http" | "https" => Some(url.to_string()),
        _ => None,
    }
}
