//! Page retrieval for link harvesting.

use anyhow::{Context, Result};
use std::time::Duration;

/// Fetches `url` and returns the response body as text.
///
/// Follows redirects and fails on a non-2xx terminal status. Invalid UTF-8 is
/// replaced rather than rejected, since we only scan the markup for links.
/// Blocking; call from `spawn_blocking` in async code.
pub fn fetch_page(url: &str) -> Result<String> {
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.useragent(concat!("vidrake/", env!("CARGO_PKG_VERSION")))?;
    easy.connect_timeout(Duration::from_secs(15))?;
    easy.timeout(Duration::from_secs(60))?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer
            .perform()
            .with_context(|| format!("fetching page {url}"))?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}
