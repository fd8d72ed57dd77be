//! Streaming GET into storage.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::storage::StorageWriter;

/// Downloads `url` into `storage` and returns the number of bytes written.
///
/// Body chunks are written at their running offset as they arrive, so the
/// temp file's on-disk size tracks transfer progress. A failed disk write
/// aborts the transfer. Blocking; run on the blocking pool.
pub fn stream_to_storage(url: &str, storage: &StorageWriter) -> Result<u64> {
    let written = Arc::new(AtomicU64::new(0));

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.useragent(concat!("vidrake/", env!("CARGO_PKG_VERSION")))?;
    easy.connect_timeout(Duration::from_secs(15))?;
    // Stall guard rather than a total timeout, large files take a while.
    easy.low_speed_limit(1)?;
    easy.low_speed_time(Duration::from_secs(60))?;

    {
        let mut transfer = easy.transfer();
        let storage = storage.clone();
        let written = Arc::clone(&written);
        transfer.write_function(move |data| {
            let offset = written.fetch_add(data.len() as u64, Ordering::SeqCst);
            match storage.write_at(offset, data) {
                Ok(()) => Ok(data.len()),
                Err(err) => {
                    tracing::error!(%err, "disk write failed, aborting transfer");
                    // Short count makes curl abort with a write error.
                    Ok(0)
                }
            }
        })?;
        transfer
            .perform()
            .with_context(|| format!("transfer from {url} failed"))?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }

    Ok(written.load(Ordering::SeqCst))
}
