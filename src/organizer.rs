//! The watch-and-classify engine: startup sweep plus the per-event
//! pipeline (skip-check, stability wait, classify, move). Each incoming
//! event is handled on its own thread so one slow stability wait never
//! delays another file.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;

use crate::classifier::{folder_name, Classification, Classifier};
use crate::config::{OrganizerConfig, FALLBACK_CATEGORY};
use crate::events::{MoveRecord, WatchedEvent, WatchedEventKind};
use crate::mover::move_into_category;
use crate::stability::{wait_for_stable, Stability};
use crate::watcher::{initial_files, EventSource};

#[derive(Clone)]
pub struct Organizer {
    classifier: Arc<Classifier>,
    poll_interval: Duration,
    emit_json: bool,
    shutdown: Arc<AtomicBool>,
}

impl Organizer {
    pub fn new(config: &OrganizerConfig, shutdown: Arc<AtomicBool>, emit_json: bool) -> Self {
        Self {
            classifier: Arc::new(Classifier::new(config)),
            poll_interval: config.poll_interval(),
            emit_json,
            shutdown,
        }
    }

    /// One-time reconciliation pass over files already sitting in the
    /// watched root. Pre-existing files are assumed complete (nothing is
    /// actively writing to them at startup), so no stability wait is
    /// performed. Returns the number of files moved.
    pub fn sweep(&self, root: &Path) -> Result<usize> {
        let mut moved = 0;
        for path in initial_files(root)? {
            if let Some(file_name) = file_name_of(&path) {
                if self.classify_and_move(root, &file_name) {
                    moved += 1;
                }
            }
        }
        Ok(moved)
    }

    /// Consumes events until shutdown is requested or the source
    /// disconnects, spawning one handler thread per event.
    pub fn run(&self, root: &Path, source: &impl EventSource) {
        let mut handlers: Vec<JoinHandle<()>> = Vec::new();
        while !self.shutdown.load(Ordering::SeqCst) {
            match source.recv_timeout(Duration::from_millis(100)) {
                Ok(event) => {
                    handlers.retain(|handle| !handle.is_finished());
                    let worker = self.clone();
                    let root = root.to_path_buf();
                    handlers.push(thread::spawn(move || worker.handle_event(&root, event)));
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        // In-flight stability waits observe the shutdown flag, so the
        // joins return promptly after an interrupt.
        for handle in handlers {
            let _ = handle.join();
        }
    }

    fn handle_event(&self, root: &Path, event: WatchedEvent) {
        let Some(file_name) = file_name_of(&event.path) else {
            return;
        };

        match event.kind {
            WatchedEventKind::Created => tracing::info!("created: {}", event.path.display()),
            WatchedEventKind::MovedInto => tracing::info!("moved in: {}", event.path.display()),
        }

        if self.classifier.is_partial_download(&file_name) {
            tracing::info!("skipped partial download: {}", file_name);
            return;
        }

        match wait_for_stable(&event.path, self.poll_interval, &self.shutdown) {
            Stability::Stable => {}
            Stability::Vanished => {
                tracing::info!("gone before it settled: {}", file_name);
                return;
            }
            Stability::Cancelled => {
                tracing::debug!("shutdown during stability wait: {}", file_name);
                return;
            }
        }

        self.classify_and_move(root, &file_name);
    }

    /// Classify one file and place it. Returns whether a move happened;
    /// failures are logged and never propagate.
    fn classify_and_move(&self, root: &Path, file_name: &str) -> bool {
        let category = match self.classifier.classify(file_name) {
            Classification::SkippedTemp => {
                tracing::info!("skipped partial download: {}", file_name);
                return false;
            }
            Classification::Matched(category) => category.to_string(),
            Classification::Fallback { empty_extension } => {
                if empty_extension {
                    tracing::warn!(
                        "no extension on {}, filing under {}",
                        file_name,
                        FALLBACK_CATEGORY
                    );
                }
                FALLBACK_CATEGORY.to_string()
            }
        };

        let folder = folder_name(&category);
        match move_into_category(root, file_name, &folder) {
            Ok(destination) => {
                tracing::info!("moved {} -> {}", file_name, destination.display());
                if self.emit_json {
                    let record =
                        MoveRecord::new(file_name.to_string(), folder, destination);
                    match serde_json::to_string(&record) {
                        Ok(line) => println!("{}", line),
                        Err(err) => tracing::error!("failed to serialize move record: {}", err),
                    }
                }
                true
            }
            Err(err) => {
                tracing::error!("failed to move {}: {:#}", file_name, err);
                false
            }
        }
    }
}

fn file_name_of(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn organizer() -> Organizer {
        Organizer::new(
            &OrganizerConfig::default(),
            Arc::new(AtomicBool::new(false)),
            false,
        )
    }

    #[test]
    fn test_sweep_sorts_backlog() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("report.pdf"), "pdf").unwrap();
        fs::write(root.join("song.mp3"), "mp3").unwrap();
        fs::write(root.join("data.xyz"), "???").unwrap();
        fs::write(root.join("README"), "no extension").unwrap();

        let moved = organizer().sweep(root).unwrap();

        assert_eq!(moved, 4);
        assert!(root.join("Documents").join("report.pdf").exists());
        assert!(root.join("Audios").join("song.mp3").exists());
        assert!(root.join("Others").join("data.xyz").exists());
        assert!(root.join("Others").join("README").exists());
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("photo.jpg"), "jpg").unwrap();

        let organizer = organizer();
        assert_eq!(organizer.sweep(root).unwrap(), 1);
        // Everything is already in its category folder; nothing left to do.
        assert_eq!(organizer.sweep(root).unwrap(), 0);
        assert!(root.join("Images").join("photo.jpg").exists());
    }

    #[test]
    fn test_sweep_leaves_partial_downloads_alone() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("installer.exe.crdownload"), "partial").unwrap();

        let moved = organizer().sweep(root).unwrap();

        assert_eq!(moved, 0);
        assert!(root.join("installer.exe.crdownload").exists());
    }

    #[test]
    fn test_sweep_disambiguates_collisions() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("Documents")).unwrap();
        fs::write(root.join("Documents").join("report.pdf"), "old").unwrap();
        fs::write(root.join("report.pdf"), "new").unwrap();

        let moved = organizer().sweep(root).unwrap();

        assert_eq!(moved, 1);
        assert!(root.join("Documents").join("report (1).pdf").exists());
    }
}
