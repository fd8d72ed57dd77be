//! Single-file download orchestration.
//!
//! One download is a HEAD probe for the total size, a temp-file writer, a
//! spawned monitor polling that temp file for progress, and a blocking curl
//! transfer streaming into it. On success the temp file is renamed into place
//! and the monitor receives the final byte count over a oneshot; the
//! downloader never waits for the monitor to wind down.

mod stream;

pub use stream::stream_to_storage;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};

use crate::probe;
use crate::progress::{self, ProgressSample};
use crate::storage::StorageWriter;

/// A finished download.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub url: String,
    pub file_name: String,
    pub path: PathBuf,
    pub bytes: u64,
    pub elapsed: Duration,
}

/// Downloads `url` into `dest_dir` as `file_name`, publishing progress on
/// `progress_tx`.
///
/// The caller decides the file name; the pipeline derives one per link and
/// untangles collisions for the whole run before dispatch. Errors here are
/// fatal to the run; there is no retry or resume. A server that reports no
/// `Content-Length` downgrades progress to a bytes-only display.
pub async fn download_file(
    url: &str,
    dest_dir: &Path,
    file_name: &str,
    progress_tx: mpsc::Sender<ProgressSample>,
    progress_interval: Duration,
) -> Result<DownloadOutcome> {
    let file_name = file_name.to_string();
    let final_path = dest_dir.join(&file_name);

    let probe_url = url.to_string();
    let head = tokio::task::spawn_blocking(move || probe::probe(&probe_url))
        .await
        .map_err(|err| anyhow::anyhow!("probe task panicked: {err}"))?
        .with_context(|| format!("probing {url}"))?;
    let total = head.content_length;
    if total.is_none() {
        tracing::warn!(url, "no Content-Length, progress will show bytes only");
    }

    let storage = StorageWriter::create(&final_path)?;
    let (done_tx, done_rx) = oneshot::channel();
    tokio::spawn(progress::monitor_file(
        storage.temp_path().to_path_buf(),
        file_name.clone(),
        total,
        progress_interval,
        done_rx,
        progress_tx,
    ));

    let started = Instant::now();
    let stream_url = url.to_string();
    let stream_storage = storage.clone();
    let transferred =
        tokio::task::spawn_blocking(move || stream::stream_to_storage(&stream_url, &stream_storage))
            .await
            .map_err(|err| anyhow::anyhow!("download task panicked: {err}"))
            .and_then(|res| res);

    let finished = match transferred {
        Ok(bytes) => finish_transfer(storage.clone(), bytes, total).map(|path| (bytes, path)),
        Err(err) => Err(err),
    };

    match finished {
        Ok((bytes, path)) => {
            let _ = done_tx.send(bytes);
            let elapsed = started.elapsed();
            tracing::info!(
                file = %file_name,
                bytes,
                elapsed_ms = elapsed.as_millis() as u64,
                "download complete"
            );
            Ok(DownloadOutcome {
                url: url.to_string(),
                file_name,
                path,
                bytes,
                elapsed,
            })
        }
        Err(err) => {
            // Dropping done_tx on return stops the monitor without a final
            // sample.
            storage.discard();
            Err(err.context(format!("downloading {url}")))
        }
    }
}

/// Verifies the byte count against the probed total, then syncs and renames
/// the temp file into place.
fn finish_transfer(storage: StorageWriter, bytes: u64, total: Option<u64>) -> Result<PathBuf> {
    if let Some(expected) = total {
        if bytes != expected {
            anyhow::bail!("expected {expected} bytes, received {bytes}");
        }
    }
    storage.sync()?;
    storage.finalize()
}
