use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchedEventKind {
    Created,
    MovedInto,
}

/// A qualifying filesystem event on the watched root: a file appeared,
/// either freshly created or renamed into place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchedEvent {
    pub path: PathBuf,
    pub kind: WatchedEventKind,
}

impl WatchedEvent {
    pub fn new(path: PathBuf, kind: WatchedEventKind) -> Self {
        Self { path, kind }
    }
}

/// Record of one completed move, emitted as a JSON line in `--output json`
/// mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    pub file_name: String,
    pub category: String,
    pub destination: PathBuf,
    pub timestamp: DateTime<Utc>,
}

impl MoveRecord {
    pub fn new(file_name: String, category: String, destination: PathBuf) -> Self {
        Self {
            file_name,
            category,
            destination,
            timestamp: Utc::now(),
        }
    }
}
