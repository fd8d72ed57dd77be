//! `vidrake run` – harvest a page and run the download-convert pipeline.

use anyhow::Result;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use vidrake_core::config::VidrakeConfig;
use vidrake_core::pipeline::{self, PipelineOptions};
use vidrake_core::progress::ProgressSample;

/// Flags of the `run` subcommand; `None` means "use the config value".
#[derive(Debug)]
pub struct RunArgs {
    pub page_url: String,
    pub serial: bool,
    pub jobs: Option<usize>,
    pub download_dir: Option<PathBuf>,
    pub ext: Option<String>,
    pub to: Option<String>,
    pub scheme: Option<String>,
    pub ffmpeg: Option<PathBuf>,
    pub keep_source: bool,
}

pub async fn run_pipeline_command(cfg: &VidrakeConfig, args: RunArgs) -> Result<()> {
    let download_dir = match args.download_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let opts = PipelineOptions {
        page_url: args.page_url,
        download_dir,
        source_ext: args.ext.unwrap_or_else(|| cfg.source_ext.clone()),
        target_ext: args.to.unwrap_or_else(|| cfg.target_ext.clone()),
        scheme: args.scheme.unwrap_or_else(|| cfg.scheme.clone()),
        ffmpeg_path: args
            .ffmpeg
            .unwrap_or_else(|| PathBuf::from(&cfg.ffmpeg_path)),
        serial: args.serial,
        max_concurrent: args.jobs.unwrap_or(cfg.max_concurrent),
        keep_source: args.keep_source || cfg.keep_source,
        progress_interval: Duration::from_millis(cfg.progress_interval_ms),
    };

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressSample>(64);
    let progress_handle = tokio::spawn(async move {
        while let Some(sample) = progress_rx.recv().await {
            match sample.percent() {
                Some(pct) => println!("{}: {}%", sample.file_name, pct),
                None => println!("{}: {} bytes", sample.file_name, sample.bytes),
            }
        }
    });

    let started = Instant::now();
    let summary = pipeline::run_pipeline(&opts, progress_tx).await?;
    let _ = progress_handle.await;

    if summary.unique_links == 0 {
        println!("No matching links found.");
        return Ok(());
    }
    println!(
        "{} link(s) found, {} unique. Downloaded {}, converted {}, {} conversion failure(s). Took {:.1}s.",
        summary.links_found,
        summary.unique_links,
        summary.downloaded,
        summary.converted,
        summary.failed_conversions(),
        started.elapsed().as_secs_f64()
    );
    for failure in &summary.failures {
        println!("{} failed: {}", failure.file, failure.error);
    }
    Ok(())
}
