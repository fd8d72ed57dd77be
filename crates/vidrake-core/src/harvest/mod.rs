//! Media link harvesting.
//!
//! Fetches a web page, pulls anchor hrefs that look like media files, and
//! returns the deduplicated list in page order.

mod dedup;
mod extract;
mod fetch;

use anyhow::{Context, Result};
use url::Url;

pub use dedup::dedup_links;
pub use extract::extract_links;
pub use fetch::fetch_page;

/// Outcome of scanning one page.
#[derive(Debug, Clone)]
pub struct Harvest {
    /// Unique links, first occurrence first.
    pub links: Vec<String>,
    /// Matches before deduplication.
    pub found: usize,
}

/// Fetches `page_url` and extracts media links matching `source_ext`.
///
/// `scheme` is used to complete scheme-relative hrefs. The blocking fetch and
/// parse run on the blocking pool.
pub async fn harvest_links(page_url: &str, source_ext: &str, scheme: &str) -> Result<Harvest> {
    let base = Url::parse(page_url).with_context(|| format!("invalid page URL {page_url}"))?;
    let url = page_url.to_string();
    let ext = source_ext.to_string();
    let scheme = scheme.to_string();

    let (links, found) = tokio::task::spawn_blocking(move || -> Result<(Vec<String>, usize)> {
        let html = fetch::fetch_page(&url)?;
        let all = extract::extract_links(&html, &base, &scheme, &ext);
        let found = all.len();
        Ok((dedup::dedup_links(all), found))
    })
    .await
    .map_err(|err| anyhow::anyhow!("harvest task panicked: {err}"))??;

    tracing::info!(page = page_url, found, unique = links.len(), "harvested media links");
    Ok(Harvest { links, found })
}
