//! `vidrake convert` – run the transcoder over local files.

use anyhow::Result;
use std::path::PathBuf;
use vidrake_core::config::VidrakeConfig;
use vidrake_core::convert::Transcoder;

pub async fn run_convert(
    cfg: &VidrakeConfig,
    files: Vec<PathBuf>,
    to: Option<String>,
    ffmpeg: Option<PathBuf>,
    keep_source: bool,
) -> Result<()> {
    let target_ext = to.unwrap_or_else(|| cfg.target_ext.clone());
    let ffmpeg_path = ffmpeg.unwrap_or_else(|| PathBuf::from(&cfg.ffmpeg_path));
    let transcoder = Transcoder::new(ffmpeg_path, target_ext, keep_source || cfg.keep_source);

    let total = files.len();
    let mut failed = 0usize;
    for file in files {
        let outcome = transcoder.convert(&file).await;
        match &outcome.result {
            Ok(()) => println!(
                "{} -> {}",
                outcome.input.display(),
                outcome.output.display()
            ),
            Err(err) => {
                failed += 1;
                eprintln!("{}: {err}", outcome.input.display());
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {total} conversion(s) failed");
    }
    Ok(())
}
