//! `vidrake harvest` – print the unique media links found on a page.

use anyhow::Result;
use vidrake_core::config::VidrakeConfig;
use vidrake_core::harvest;

pub async fn run_harvest(
    cfg: &VidrakeConfig,
    page_url: &str,
    ext: Option<String>,
    scheme: Option<String>,
) -> Result<()> {
    let ext = ext.unwrap_or_else(|| cfg.source_ext.clone());
    let scheme = scheme.unwrap_or_else(|| cfg.scheme.clone());

    let harvest = harvest::harvest_links(page_url, &ext, &scheme).await?;
    if harvest.links.is_empty() {
        println!("No matching links found.");
        return Ok(());
    }
    for link in &harvest.links {
        println!("{link}");
    }
    Ok(())
}
