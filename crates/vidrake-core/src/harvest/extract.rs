//! Anchor extraction and link resolution.

use scraper::{Html, Selector};
use url::Url;

/// Scans `html` for anchor hrefs pointing at media files.
///
/// Each href is split on whitespace and every token containing `source_ext`
/// becomes a candidate link, resolved against the page URL. Order follows
/// document order.
pub fn extract_links(html: &str, base: &Url, scheme: &str, source_ext: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").unwrap();

    let mut links = Vec::new();
    for element in document.select(&anchors) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        // Some pages stuff several URLs into one href; treat each
        // whitespace-separated token as its own candidate.
        for token in href.split_whitespace() {
            if !token.contains(source_ext) {
                continue;
            }
            if let Some(resolved) = resolve_link(base, scheme, token) {
                links.push(resolved);
            }
        }
    }
    links
}

/// Turns an href token into an absolute URL.
///
/// Scheme-relative tokens (`//host/path`) get the configured scheme
/// prepended, absolute URLs pass through untouched, and anything else is
/// joined against the page URL. Unresolvable tokens are dropped.
fn resolve_link(base: &Url, scheme: &str, token: &str) -> Option<String> {
    if token.starts_with("//") {
        return Some(format!("{scheme}:{token}"));
    }
    if Url::parse(token).is_ok() {
        return Some(token.to_string());
    }
    match base.join(token) {
        Ok(url) => Some(url.to_string()),
        Err(err) => {
            tracing::debug!(token, %err, "skipping unresolvable link");
            None
        }
    }
}
