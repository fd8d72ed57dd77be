//! HTTP HEAD probing for the total download size.
//!
//! Uses the curl crate (libcurl) to fetch response headers and read
//! `Content-Length` before the real GET starts. The size feeds the progress
//! monitor; a server that omits or mangles the header downgrades progress to
//! bytes-only display instead of failing the download.

use anyhow::{Context, Result};
use std::str;
use std::time::Duration;

/// Result of a HEAD request.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// Total size in bytes, if `Content-Length` was present and parseable.
    pub content_length: Option<u64>,
}

/// Performs a HEAD request and returns the parsed metadata.
///
/// Follows redirects; a transport failure or non-2xx terminal status is an
/// error. Runs in the current thread; call from `spawn_blocking` when used
/// from async code.
pub fn probe(url: &str) -> Result<ProbeResult> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.nobody(true)?; // HEAD request
    easy.follow_location(true)?;
    easy.connect_timeout(Duration::from_secs(15))?;
    easy.timeout(Duration::from_secs(30))?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform().context("HEAD request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("HEAD {} returned HTTP {}", url, code);
    }

    Ok(ProbeResult {
        content_length: parse_content_length(&headers),
    })
}

/// Picks `Content-Length` out of collected header lines.
///
/// With redirects the lines span every response in the chain; the last
/// occurrence wins so the terminal response takes precedence.
fn parse_content_length(lines: &[String]) -> Option<u64> {
    let mut content_length = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.trim().parse::<u64>() {
                    content_length = Some(n);
                }
            }
        }
    }
    content_length
}
