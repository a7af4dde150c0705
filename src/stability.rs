//! File stability detection.
//!
//! A file is considered stable once two consecutive size polls agree, as a
//! heuristic proxy for "download finished". It cannot tell a finished file
//! from a paused download whose size holds still across the poll window;
//! that limitation is accepted rather than papered over.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// How a stability wait resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    /// Two consecutive polls reported the same size.
    Stable,
    /// The path disappeared mid-wait (deleted, renamed away, download
    /// cancelled). Reported, not a failure.
    Vanished,
    /// Shutdown was requested before the file settled.
    Cancelled,
}

// Sleep slice so cancellation takes effect well before a full poll
// interval elapses.
const CANCEL_SLICE: Duration = Duration::from_millis(100);

/// Polls the file's size at `interval` until two consecutive reads agree.
///
/// At least one full interval always elapses before `Stable` is returned,
/// even for a file whose size never changes. A file that never settles is
/// polled indefinitely, pinning only the calling thread.
pub fn wait_for_stable(path: &Path, interval: Duration, shutdown: &AtomicBool) -> Stability {
    let mut last_size: Option<u64> = None;
    loop {
        if shutdown.load(Ordering::SeqCst) {
            return Stability::Cancelled;
        }

        let size = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Stability::Vanished,
            Err(err) => {
                tracing::warn!("failed to stat {}: {}", path.display(), err);
                return Stability::Vanished;
            }
        };

        if last_size == Some(size) {
            return Stability::Stable;
        }
        last_size = Some(size);

        if !sleep_interruptible(interval, shutdown) {
            return Stability::Cancelled;
        }
    }
}

/// Sleeps for `total`, waking every [`CANCEL_SLICE`] to check the shutdown
/// flag. Returns false if shutdown was requested.
fn sleep_interruptible(total: Duration, shutdown: &AtomicBool) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if shutdown.load(Ordering::SeqCst) {
            return false;
        }
        let slice = remaining.min(CANCEL_SLICE);
        thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
    !shutdown.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Instant;
    use tempfile::TempDir;

    #[test]
    fn test_constant_size_is_stable_after_one_interval() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("done.bin");
        fs::write(&path, b"finished").unwrap();

        let shutdown = AtomicBool::new(false);
        let interval = Duration::from_millis(30);
        let start = Instant::now();

        let result = wait_for_stable(&path, interval, &shutdown);

        assert_eq!(result, Stability::Stable);
        assert!(start.elapsed() >= interval);
    }

    #[test]
    fn test_growing_file_needs_two_equal_reads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("incoming.bin");
        fs::write(&path, b"chunk").unwrap();

        // Grow the file once, shortly after the first poll has read it.
        let writer_path = path.clone();
        let writer = std::thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            let mut file = OpenOptions::new().append(true).open(&writer_path).unwrap();
            file.write_all(b"more").unwrap();
        });

        let shutdown = AtomicBool::new(false);
        let interval = Duration::from_millis(80);
        let start = Instant::now();

        let result = wait_for_stable(&path, interval, &shutdown);
        writer.join().unwrap();

        assert_eq!(result, Stability::Stable);
        // The size change after the first poll forces at least one extra
        // round: two full intervals minimum.
        assert!(start.elapsed() >= interval * 2);
    }

    #[test]
    fn test_missing_file_is_vanished() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("never-existed.iso");

        let shutdown = AtomicBool::new(false);
        let result = wait_for_stable(&path, Duration::from_millis(20), &shutdown);

        assert_eq!(result, Stability::Vanished);
    }

    #[test]
    fn test_deletion_mid_wait_is_vanished() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cancelled.zip");
        fs::write(&path, b"partial").unwrap();

        let victim = path.clone();
        let deleter = std::thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            fs::remove_file(&victim).unwrap();
        });

        let shutdown = AtomicBool::new(false);
        let result = wait_for_stable(&path, Duration::from_millis(80), &shutdown);
        deleter.join().unwrap();

        assert_eq!(result, Stability::Vanished);
    }

    #[test]
    fn test_shutdown_cancels_immediately() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("whatever.bin");
        fs::write(&path, b"data").unwrap();

        let shutdown = AtomicBool::new(true);
        let result = wait_for_stable(&path, Duration::from_secs(60), &shutdown);

        assert_eq!(result, Stability::Cancelled);
    }

    #[test]
    fn test_shutdown_cancels_mid_sleep() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("slow.bin");
        fs::write(&path, b"data").unwrap();

        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = shutdown.clone();
        let canceller = std::thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            flag.store(true, Ordering::SeqCst);
        });

        let start = Instant::now();
        let result = wait_for_stable(&path, Duration::from_secs(60), &shutdown);
        canceller.join().unwrap();

        assert_eq!(result, Stability::Cancelled);
        // Well short of the full interval.
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
