//! Pipeline coordination.
//!
//! Harvest once, dedup once, then run one download-convert unit per unique
//! link, fanned out across a bounded set of concurrent tasks or one at a time
//! in serial mode. Returns only after every unit finished. A download error
//! ends the run early; conversion failures are tallied and reported.

mod parallel;
mod summary;
mod unit;

pub use parallel::run_units_parallel;
pub use summary::{ConversionFailure, PipelineSummary};
pub use unit::{run_unit, UnitContext, UnitOutcome};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::convert::Transcoder;
use crate::harvest;
use crate::progress::ProgressSample;
use crate::url_model;

/// Resolved settings for one run, config merged with command-line overrides.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub page_url: String,
    pub download_dir: PathBuf,
    pub source_ext: String,
    pub target_ext: String,
    pub scheme: String,
    pub ffmpeg_path: PathBuf,
    pub serial: bool,
    pub max_concurrent: usize,
    pub keep_source: bool,
    pub progress_interval: Duration,
}

/// Runs the whole harvest-download-convert pipeline.
pub async fn run_pipeline(
    opts: &PipelineOptions,
    progress_tx: mpsc::Sender<ProgressSample>,
) -> Result<PipelineSummary> {
    let harvest = harvest::harvest_links(&opts.page_url, &opts.source_ext, &opts.scheme).await?;
    let links = harvest.links;
    let unique_links = links.len();
    if links.is_empty() {
        tracing::info!(page = %opts.page_url, "no matching links found");
        return Ok(PipelineSummary {
            links_found: harvest.found,
            ..Default::default()
        });
    }

    // Assign every destination name up front so no two units ever share a
    // file, even when distinct links reduce to the same basename.
    let names = url_model::assign_filenames(&links);

    tokio::fs::create_dir_all(&opts.download_dir)
        .await
        .with_context(|| format!("creating {}", opts.download_dir.display()))?;

    let ctx = Arc::new(UnitContext {
        download_dir: opts.download_dir.clone(),
        transcoder: Transcoder::new(
            opts.ffmpeg_path.clone(),
            opts.target_ext.clone(),
            opts.keep_source,
        ),
        progress_tx,
        progress_interval: opts.progress_interval,
    });

    let outcomes = if opts.serial {
        tracing::debug!(units = unique_links, "running serialized");
        let mut outcomes = Vec::with_capacity(unique_links);
        for (link, file_name) in links.into_iter().zip(names) {
            outcomes.push(unit::run_unit(Arc::clone(&ctx), link, file_name).await?);
        }
        outcomes
    } else {
        tracing::debug!(
            units = unique_links,
            max_concurrent = opts.max_concurrent,
            "running concurrently"
        );
        let tasks = links.into_iter().zip(names).collect();
        parallel::run_units_parallel(Arc::clone(&ctx), tasks, opts.max_concurrent).await?
    };

    let summary = PipelineSummary::from_outcomes(harvest.found, unique_links, &outcomes);
    tracing::info!(
        downloaded = summary.downloaded,
        converted = summary.converted,
        failed_conversions = summary.failed_conversions(),
        "pipeline finished"
    );
    Ok(summary)
}
