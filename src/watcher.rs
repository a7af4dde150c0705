use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::events::{WatchedEvent, WatchedEventKind};

/// Source of watched-directory events. Production code uses
/// [`DirWatcher`]; tests inject synthetic events through a plain channel
/// receiver.
pub trait EventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<WatchedEvent, RecvTimeoutError>;
}

impl EventSource for Receiver<WatchedEvent> {
    fn recv_timeout(&self, timeout: Duration) -> Result<WatchedEvent, RecvTimeoutError> {
        Receiver::recv_timeout(self, timeout)
    }
}

/// Bridges OS filesystem notifications on the watched root onto a channel
/// of [`WatchedEvent`]s. Non-recursive: only files arriving directly in
/// the root qualify.
pub struct DirWatcher {
    _watcher: RecommendedWatcher,
    event_rx: Receiver<WatchedEvent>,
}

impl DirWatcher {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        let (raw_tx, raw_rx) = mpsc::channel::<notify::Result<notify::Event>>();
        let (event_tx, event_rx) = mpsc::channel::<WatchedEvent>();

        let mut watcher =
            notify::recommended_watcher(raw_tx).context("failed to create file system watcher")?;
        watcher
            .watch(&root, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", root.display()))?;

        // Forward raw notify events as WatchedEvents, dropping anything
        // that is not a file sitting directly in the watched root.
        thread::spawn(move || {
            while let Ok(result) = raw_rx.recv() {
                match result {
                    Ok(event) => {
                        let kind = match event.kind {
                            EventKind::Create(_) => WatchedEventKind::Created,
                            EventKind::Modify(ModifyKind::Name(
                                RenameMode::To | RenameMode::Both,
                            )) => WatchedEventKind::MovedInto,
                            _ => continue,
                        };
                        for path in event.paths {
                            if path.parent() != Some(root.as_path()) || !path.is_file() {
                                continue;
                            }
                            if event_tx.send(WatchedEvent::new(path, kind)).is_err() {
                                return; // Receiver dropped, exit thread
                            }
                        }
                    }
                    Err(err) => {
                        tracing::error!("file watcher error: {}", err);
                    }
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            event_rx,
        })
    }
}

impl EventSource for DirWatcher {
    fn recv_timeout(&self, timeout: Duration) -> Result<WatchedEvent, RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }
}

/// Regular files sitting directly in the watched root, for the startup
/// sweep. Category folders are directories and therefore never listed.
pub fn initial_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries =
        fs::read_dir(root).with_context(|| format!("failed to read {}", root.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", root.display()))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}
