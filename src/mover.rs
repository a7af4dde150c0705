//! Collision-safe file placement.
//!
//! Moves a file from the watched root into a category folder, creating the
//! folder on demand and disambiguating the destination name with a counter
//! (`report (1).pdf`) when it is already taken. The existence check and
//! the rename are not atomic together; a single watcher instance per
//! destination tree is assumed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

// Stem used when the conventional stem/extension split would leave the
// stem empty (dotfiles such as `.gitignore`).
const PLACEHOLDER_STEM: &str = "no_name";

/// Moves `<root>/<file_name>` into `<root>/<folder>/`, returning the path
/// the file ended up at. The file is left in place on any failure.
pub fn move_into_category(root: &Path, file_name: &str, folder: &str) -> Result<PathBuf> {
    let dest_dir = root.join(folder);
    fs::create_dir_all(&dest_dir)
        .with_context(|| format!("failed to create category folder {}", dest_dir.display()))?;

    let source = root.join(file_name);
    let mut destination = dest_dir.join(file_name);
    if destination.exists() {
        destination = disambiguate(&dest_dir, file_name);
    }

    fs::rename(&source, &destination).with_context(|| {
        format!(
            "failed to move {} to {}",
            source.display(),
            destination.display()
        )
    })?;

    Ok(destination)
}

/// First unused `stem (n)ext` variant of `file_name` inside `dest_dir`.
fn disambiguate(dest_dir: &Path, file_name: &str) -> PathBuf {
    let (stem, extension) = split_name(file_name);
    let mut counter = 1u32;
    loop {
        let candidate = dest_dir.join(format!("{} ({}){}", stem, counter, extension));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Splits a filename at its last dot. A dotfile keeps its whole name as
/// the extension and gets the placeholder stem, so the counter still has
/// somewhere to go and nothing is overwritten.
fn split_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => (&file_name[..idx], &file_name[idx..]),
        Some(_) => (PLACEHOLDER_STEM, file_name),
        None => (file_name, ""),
    }
}
