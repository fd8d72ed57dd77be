//! CLI for the vidrake media pipeline.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vidrake_core::config;

use commands::{run_convert, run_harvest, run_pipeline_command, RunArgs};

/// Top-level CLI for the vidrake media pipeline.
#[derive(Debug, Parser)]
#[command(name = "vidrake")]
#[command(
    about = "vidrake: harvest media links from a page, download and convert them",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Harvest a page and run the full download-convert pipeline.
    Run {
        /// Page URL to harvest media links from.
        page_url: String,

        /// Process links one at a time instead of concurrently.
        #[arg(long)]
        serial: bool,

        /// Run up to N download-convert units concurrently.
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,

        /// Directory downloads land in (defaults to the current directory).
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,

        /// Extension substring identifying media links (e.g. "webm").
        #[arg(long, value_name = "EXT")]
        ext: Option<String>,

        /// Target extension to convert to (e.g. "mp4").
        #[arg(long, value_name = "EXT")]
        to: Option<String>,

        /// Scheme for scheme-relative links: "http" or "https".
        #[arg(long)]
        scheme: Option<String>,

        /// Path to the transcoder binary.
        #[arg(long, value_name = "PATH")]
        ffmpeg: Option<PathBuf>,

        /// Keep the downloaded originals after conversion.
        #[arg(long)]
        keep_source: bool,
    },

    /// Print the unique media links found on a page, one per line.
    Harvest {
        /// Page URL to harvest media links from.
        page_url: String,

        /// Extension substring identifying media links (e.g. "webm").
        #[arg(long, value_name = "EXT")]
        ext: Option<String>,

        /// Scheme for scheme-relative links: "http" or "https".
        #[arg(long)]
        scheme: Option<String>,
    },

    /// Convert already-downloaded files through the transcoder.
    Convert {
        /// Files to convert.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Target extension to convert to (e.g. "mp4").
        #[arg(long, value_name = "EXT")]
        to: Option<String>,

        /// Path to the transcoder binary.
        #[arg(long, value_name = "PATH")]
        ffmpeg: Option<PathBuf>,

        /// Keep the source files instead of removing them after conversion.
        #[arg(long)]
        keep_source: bool,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                page_url,
                serial,
                jobs,
                download_dir,
                ext,
                to,
                scheme,
                ffmpeg,
                keep_source,
            } => {
                run_pipeline_command(
                    &cfg,
                    RunArgs {
                        page_url,
                        serial,
                        jobs,
                        download_dir,
                        ext,
                        to,
                        scheme,
                        ffmpeg,
                        keep_source,
                    },
                )
                .await?;
            }
            CliCommand::Harvest {
                page_url,
                ext,
                scheme,
            } => run_harvest(&cfg, &page_url, ext, scheme).await?,
            CliCommand::Convert {
                files,
                to,
                ffmpeg,
                keep_source,
            } => run_convert(&cfg, files, to, ffmpeg, keep_source).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
