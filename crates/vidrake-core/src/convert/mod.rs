//! External transcoding.
//!
//! Runs the configured transcoder binary with an ffmpeg-compatible argument
//! shape (`-y -i <input> <output>`) and captures its stderr. A failed
//! conversion is reported in the outcome, never propagated as a pipeline
//! error. The source file is removed after the attempt, success or not,
//! unless configured otherwise.

mod error;

pub use error::TranscodeError;

use std::io;
use std::path::{Path, PathBuf};

use tokio::process::Command;

/// Converts downloaded files via an external transcoder process.
#[derive(Debug, Clone)]
pub struct Transcoder {
    ffmpeg_path: PathBuf,
    target_ext: String,
    keep_source: bool,
}

/// Result of one conversion attempt.
#[derive(Debug)]
pub struct ConvertOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: Result<(), TranscodeError>,
    pub source_removed: bool,
}

impl ConvertOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

impl Transcoder {
    pub fn new(
        ffmpeg_path: impl Into<PathBuf>,
        target_ext: impl Into<String>,
        keep_source: bool,
    ) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            target_ext: target_ext.into(),
            keep_source,
        }
    }

    /// Output path for `input`: same directory and stem, target extension.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        input.with_extension(&self.target_ext)
    }

    /// Converts `input` and cleans up the source.
    ///
    /// A stale output from an earlier run is removed first. The source is
    /// removed after the attempt whenever it is still present, regardless of
    /// whether the transcoder succeeded, except when keeping sources is
    /// configured or the output path equals the input path.
    pub async fn convert(&self, input: &Path) -> ConvertOutcome {
        let output = self.output_path(input);
        if output == input {
            tracing::warn!(path = %input.display(), "source and target extension match, skipping");
            return ConvertOutcome {
                input: input.to_path_buf(),
                output,
                result: Err(TranscodeError::SamePath {
                    path: input.to_path_buf(),
                }),
                source_removed: false,
            };
        }

        remove_if_present(&output);

        let result = self.run_transcoder(input, &output).await;
        match &result {
            Ok(()) => {
                tracing::info!(input = %input.display(), output = %output.display(), "converted");
            }
            Err(err) => {
                tracing::warn!(input = %input.display(), %err, "conversion failed");
            }
        }

        let source_removed = !self.keep_source && remove_source(input);
        ConvertOutcome {
            input: input.to_path_buf(),
            output,
            result,
            source_removed,
        }
    }

    async fn run_transcoder(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        let out = Command::new(&self.ffmpeg_path)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg(output)
            .output()
            .await
            .map_err(|source| TranscodeError::Spawn {
                program: self.ffmpeg_path.clone(),
                source,
            })?;

        if !out.status.success() {
            return Err(TranscodeError::Failed {
                program: self.ffmpeg_path.clone(),
                status: out.status,
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

/// Best-effort removal of a stale file, ignoring a missing one.
fn remove_if_present(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed stale output"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => tracing::debug!(path = %path.display(), %err, "could not remove stale output"),
    }
}

/// Removes the source file if it is still present. Returns whether a file was
/// actually removed.
fn remove_source(input: &Path) -> bool {
    if !input.exists() {
        return false;
    }
    match std::fs::remove_file(input) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(path = %input.display(), %err, "could not remove source file");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_swaps_extension() {
        let t = Transcoder::new("/usr/bin/ffmpeg", "mp4", false);
        assert_eq!(
            t.output_path(Path::new("/media/clip.webm")),
            Path::new("/media/clip.mp4")
        );
    }

    #[test]
    fn output_path_only_touches_last_extension() {
        let t = Transcoder::new("/usr/bin/ffmpeg", "mp4", false);
        assert_eq!(
            t.output_path(Path::new("/media/clip.webm.webm")),
            Path::new("/media/clip.webm.mp4")
        );
    }

    #[cfg(unix)]
    fn stub_transcoder(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("transcoder.sh");
        std::fs::write(&path, body).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_conversion_removes_source() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.webm");
        std::fs::write(&input, b"source").unwrap();
        // $1=-y $2=-i $3=input $4=output
        let stub = stub_transcoder(dir.path(), "#!/bin/sh\necho data > \"$4\"\nexit 0\n");

        let t = Transcoder::new(&stub, "mp4", false);
        let outcome = t.convert(&input).await;

        assert!(outcome.succeeded());
        assert!(outcome.source_removed);
        assert!(!input.exists());
        assert!(dir.path().join("clip.mp4").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_conversion_still_removes_source() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.webm");
        std::fs::write(&input, b"source").unwrap();
        let stub = stub_transcoder(dir.path(), "#!/bin/sh\necho boom >&2\nexit 1\n");

        let t = Transcoder::new(&stub, "mp4", false);
        let outcome = t.convert(&input).await;

        match &outcome.result {
            Err(TranscodeError::Failed { stderr, .. }) => assert!(stderr.contains("boom")),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(outcome.source_removed);
        assert!(!input.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn keep_source_skips_removal() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.webm");
        std::fs::write(&input, b"source").unwrap();
        let stub = stub_transcoder(dir.path(), "#!/bin/sh\necho data > \"$4\"\nexit 0\n");

        let t = Transcoder::new(&stub, "mp4", true);
        let outcome = t.convert(&input).await;

        assert!(outcome.succeeded());
        assert!(!outcome.source_removed);
        assert!(input.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stale_output_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.webm");
        std::fs::write(&input, b"source").unwrap();
        let stale = dir.path().join("clip.mp4");
        std::fs::write(&stale, b"old run").unwrap();
        let stub = stub_transcoder(dir.path(), "#!/bin/sh\necho fresh > \"$4\"\nexit 0\n");

        let t = Transcoder::new(&stub, "mp4", false);
        let outcome = t.convert(&input).await;

        assert!(outcome.succeeded());
        assert_eq!(std::fs::read(&stale).unwrap(), b"fresh\n");
    }

    #[tokio::test]
    async fn missing_binary_reports_spawn_error_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.webm");
        std::fs::write(&input, b"source").unwrap();

        let t = Transcoder::new(dir.path().join("no-such-binary"), "mp4", false);
        let outcome = t.convert(&input).await;

        assert!(matches!(outcome.result, Err(TranscodeError::Spawn { .. })));
        assert!(outcome.source_removed);
        assert!(!input.exists());
    }

    #[tokio::test]
    async fn matching_extensions_never_touch_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.webm");
        std::fs::write(&input, b"source").unwrap();

        // Binary path is bogus on purpose: a SamePath outcome must be decided
        // before any spawn attempt.
        let t = Transcoder::new("/no/such/transcoder", "webm", false);
        let outcome = t.convert(&input).await;

        assert!(matches!(outcome.result, Err(TranscodeError::SamePath { .. })));
        assert!(!outcome.source_removed);
        assert!(input.exists());
    }
}
