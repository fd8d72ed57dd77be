//! Per-file download progress.
//!
//! Progress is observed from the outside: a monitor task polls the on-disk
//! size of the temp file at a fixed interval and publishes samples on an mpsc
//! channel. The downloader signals completion over a oneshot carrying the
//! final byte count, which the monitor republishes as a last sample so
//! consumers always see the end state even if the last poll missed it.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

/// One observation of a file's download progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSample {
    /// Name shown to the user, not the temp path.
    pub file_name: String,
    /// Bytes on disk at sample time.
    pub bytes: u64,
    /// Expected total, when the server reported one.
    pub total: Option<u64>,
}

impl ProgressSample {
    /// Completion percentage, capped at 100. `None` when the total is
    /// unknown. A zero total is floored to one byte so the division is
    /// defined for empty files.
    pub fn percent(&self) -> Option<u8> {
        let total = self.total?.max(1);
        Some((self.bytes.saturating_mul(100) / total).min(100) as u8)
    }
}

/// Polls `path` every `interval` and sends a [`ProgressSample`] per tick.
///
/// Runs until `done_rx` resolves: `Ok(final_bytes)` means the transfer
/// finished and one final sample with that count is sent; a closed channel
/// means the download failed and the monitor exits quietly. A failed stat
/// (file not created yet, already renamed) skips the tick instead of
/// aborting.
pub async fn monitor_file(
    path: PathBuf,
    file_name: String,
    total: Option<u64>,
    interval: Duration,
    mut done_rx: oneshot::Receiver<u64>,
    tx: mpsc::Sender<ProgressSample>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            done = &mut done_rx => {
                if let Ok(final_bytes) = done {
                    let _ = tx
                        .send(ProgressSample {
                            file_name: file_name.clone(),
                            bytes: final_bytes,
                            total,
                        })
                        .await;
                }
                break;
            }
            _ = ticker.tick() => {
                match tokio::fs::metadata(&path).await {
                    Ok(meta) => {
                        // try_send: a slow consumer drops samples, never
                        // stalls the monitor.
                        let _ = tx.try_send(ProgressSample {
                            file_name: file_name.clone(),
                            bytes: meta.len(),
                            total,
                        });
                    }
                    Err(err) => {
                        tracing::trace!(
                            path = %path.display(),
                            %err,
                            "stat failed, skipping progress sample"
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(bytes: u64, total: Option<u64>) -> ProgressSample {
        ProgressSample {
            file_name: "clip.webm".to_string(),
            bytes,
            total,
        }
    }

    #[test]
    fn percent_basics() {
        assert_eq!(sample(0, Some(200)).percent(), Some(0));
        assert_eq!(sample(100, Some(200)).percent(), Some(50));
        assert_eq!(sample(200, Some(200)).percent(), Some(100));
    }

    #[test]
    fn percent_unknown_total() {
        assert_eq!(sample(4096, None).percent(), None);
    }

    #[test]
    fn percent_zero_total_floors_to_one() {
        assert_eq!(sample(0, Some(0)).percent(), Some(0));
    }

    #[test]
    fn percent_caps_at_hundred() {
        assert_eq!(sample(300, Some(200)).percent(), Some(100));
    }

    #[tokio::test]
    async fn final_sample_carries_reported_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.webm.part");
        std::fs::write(&path, b"12345").unwrap();

        let (done_tx, done_rx) = oneshot::channel();
        let (tx, mut rx) = mpsc::channel(16);
        let handle = tokio::spawn(monitor_file(
            path,
            "clip.webm".to_string(),
            Some(5),
            Duration::from_secs(60),
            done_rx,
            tx,
        ));

        done_tx.send(5).unwrap();
        handle.await.unwrap();

        let mut last = None;
        while let Some(s) = rx.recv().await {
            last = Some(s);
        }
        let last = last.expect("expected at least the final sample");
        assert_eq!(last.bytes, 5);
        assert_eq!(last.percent(), Some(100));
    }

    #[tokio::test]
    async fn dropped_done_channel_stops_monitor_without_final_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.webm.part");

        let (done_tx, done_rx) = oneshot::channel::<u64>();
        let (tx, mut rx) = mpsc::channel(16);
        let handle = tokio::spawn(monitor_file(
            path,
            "clip.webm".to_string(),
            None,
            Duration::from_secs(60),
            done_rx,
            tx,
        ));

        drop(done_tx);
        handle.await.unwrap();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn samples_track_growing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.webm.part");
        std::fs::write(&path, b"").unwrap();

        let (done_tx, done_rx) = oneshot::channel();
        let (tx, mut rx) = mpsc::channel(64);
        let handle = tokio::spawn(monitor_file(
            path.clone(),
            "clip.webm".to_string(),
            Some(10),
            Duration::from_millis(10),
            done_rx,
            tx,
        ));

        tokio::time::sleep(Duration::from_millis(35)).await;
        std::fs::write(&path, b"0123456789").unwrap();
        tokio::time::sleep(Duration::from_millis(35)).await;
        done_tx.send(10).unwrap();
        handle.await.unwrap();

        let mut samples = Vec::new();
        while let Some(s) = rx.recv().await {
            samples.push(s);
        }
        assert!(!samples.is_empty());
        // File only grows, so observed byte counts never decrease.
        for pair in samples.windows(2) {
            assert!(pair[0].bytes <= pair[1].bytes);
        }
        assert_eq!(samples.last().unwrap().bytes, 10);
    }
}
