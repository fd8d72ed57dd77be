//! Duplicate-link removal.

use std::collections::HashSet;

/// Drops repeated links, keeping the first occurrence so download order
/// matches page order.
pub fn dedup_links(links: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(links.len());
    links
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .collect()
}
