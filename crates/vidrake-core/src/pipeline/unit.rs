//! One download-convert unit.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::convert::{ConvertOutcome, Transcoder};
use crate::downloader::{self, DownloadOutcome};
use crate::progress::ProgressSample;

/// Dependencies shared by every unit in a run.
pub struct UnitContext {
    pub download_dir: PathBuf,
    pub transcoder: Transcoder,
    pub progress_tx: mpsc::Sender<ProgressSample>,
    pub progress_interval: Duration,
}

/// What one link produced.
#[derive(Debug)]
pub struct UnitOutcome {
    pub download: DownloadOutcome,
    pub convert: ConvertOutcome,
}

/// Downloads one link as `file_name` and immediately converts the result.
///
/// A download error propagates and ends the run; a conversion failure is
/// carried inside the outcome.
pub async fn run_unit(
    ctx: Arc<UnitContext>,
    link: String,
    file_name: String,
) -> Result<UnitOutcome> {
    let download = downloader::download_file(
        &link,
        &ctx.download_dir,
        &file_name,
        ctx.progress_tx.clone(),
        ctx.progress_interval,
    )
    .await?;
    let convert = ctx.transcoder.convert(&download.path).await;
    Ok(UnitOutcome { download, convert })
}
