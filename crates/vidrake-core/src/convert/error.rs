//! Transcode failure taxonomy.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Why a transcode produced no output.
///
/// The pipeline records these and keeps going; download errors are the ones
/// that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    /// The transcoder binary could not be started at all.
    #[error("could not start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The transcoder ran and exited non-zero.
    #[error("{} exited with {status}: {stderr}", program.display())]
    Failed {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    /// Output path equals the input path, running would clobber the source.
    #[error("output path equals input path: {}", path.display())]
    SamePath { path: PathBuf },
}
