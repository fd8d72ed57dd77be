//! On-disk storage for in-flight downloads.
//!
//! Bytes land in a `<name>.part` file next to the final path and are renamed
//! into place once the transfer completes, so a crash never leaves a
//! half-written file under the final name. The part file is NOT preallocated:
//! the progress monitor polls its on-disk size, which must track the bytes
//! actually received.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Positional writer over the temp file of one download.
///
/// Clones share the same open file, so the curl write callback can own a copy
/// while the caller keeps another for `sync` and `finalize`.
#[derive(Clone)]
pub struct StorageWriter {
    file: Arc<File>,
    temp_path: PathBuf,
    final_path: PathBuf,
}

impl StorageWriter {
    /// Creates (truncating) the temp file for `final_path`.
    pub fn create(final_path: &Path) -> Result<Self> {
        let temp = temp_path(final_path);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp)
            .with_context(|| format!("creating temp file {}", temp.display()))?;
        Ok(Self {
            file: Arc::new(file),
            temp_path: temp,
            final_path: final_path.to_path_buf(),
        })
    }

    /// Writes `buf` at `offset` without moving a shared cursor.
    #[cfg(unix)]
    pub fn write_at(&self, offset: u64, buf: &[u8]) -> std::io::Result<()> {
        use std::os::unix::fs::FileExt;
        self.file.write_all_at(buf, offset)
    }

    #[cfg(windows)]
    pub fn write_at(&self, offset: u64, buf: &[u8]) -> std::io::Result<()> {
        use std::os::windows::fs::FileExt;
        let mut written = 0usize;
        while written < buf.len() {
            let n = self.file.seek_write(&buf[written..], offset + written as u64)?;
            if n == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "failed to write whole buffer",
                ));
            }
            written += n;
        }
        Ok(())
    }

    /// Flushes file data and metadata to disk.
    pub fn sync(&self) -> Result<()> {
        self.file
            .sync_all()
            .with_context(|| format!("syncing {}", self.temp_path.display()))
    }

    /// Renames the temp file to the final path and returns it.
    pub fn finalize(self) -> Result<PathBuf> {
        fs::rename(&self.temp_path, &self.final_path).with_context(|| {
            format!(
                "renaming {} to {}",
                self.temp_path.display(),
                self.final_path.display()
            )
        })?;
        Ok(self.final_path)
    }

    /// Removes the temp file after a failed transfer.
    pub fn discard(self) {
        if let Err(err) = fs::remove_file(&self.temp_path) {
            tracing::debug!(path = %self.temp_path.display(), %err, "could not remove temp file");
        }
    }

    /// Path of the temp file backing this writer.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }
}

/// Temp-file path for a download target: `movie.webm` becomes `movie.webm.part`.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut name = final_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    final_path.with_file_name(name)
}
