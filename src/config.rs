//! Configuration management for sortd
//!
//! The configuration is a single immutable object built once at startup:
//! the stability poll interval, the partial-download suffixes to skip, and
//! the ordered extension-to-category table that drives classification.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Catch-all category for files whose extension matches no rule. It does
/// not need to appear in the table.
pub const FALLBACK_CATEGORY: &str = "others";

/// One entry of the category table: a category name and the extensions it
/// claims. Extensions are lowercase and carry the leading dot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub extensions: Vec<String>,
}

/// Global configuration for the organizer daemon.
///
/// Rule order is significant: the first category whose extension set
/// contains a file's extension wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerConfig {
    /// Seconds between stability polls on a newly arrived file
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Filename suffixes marking an in-progress download
    #[serde(default = "default_skip_suffixes")]
    pub skip_suffixes: Vec<String>,
    /// Ordered extension-to-category table
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryRule>,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            skip_suffixes: default_skip_suffixes(),
            categories: default_categories(),
        }
    }
}

impl OrganizerConfig {
    /// Load configuration from a file or fall back to the built-in table.
    ///
    /// Lookup order:
    /// 1. An explicitly provided path (errors if unreadable)
    /// 2. `sortd.toml` in the current directory
    /// 3. `~/.config/sortd/config.toml`
    /// 4. Compiled-in defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local = PathBuf::from("sortd.toml");
        if local.exists() {
            return Self::load_from_file(&local);
        }

        if let Some(home) = home_dir() {
            let user = home.join(".config").join("sortd").join("config.toml");
            if user.exists() {
                return Self::load_from_file(&user);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        if let Err(reason) = config.validate() {
            bail!("invalid config file {}: {}", path.display(), reason);
        }
        Ok(config)
    }

    /// Get the stability poll interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval_secs == 0 {
            return Err("poll_interval_secs must be greater than 0".to_string());
        }

        for suffix in &self.skip_suffixes {
            if !suffix.starts_with('.') || suffix.len() < 2 {
                return Err(format!("skip suffix '{}' must start with a dot", suffix));
            }
        }

        for rule in &self.categories {
            if rule.name.is_empty() {
                return Err("category names must not be empty".to_string());
            }
            let mut seen = HashSet::new();
            for ext in &rule.extensions {
                if !ext.starts_with('.') || ext.len() < 2 {
                    return Err(format!(
                        "extension '{}' in category '{}' must start with a dot",
                        ext, rule.name
                    ));
                }
                if *ext != ext.to_lowercase() {
                    return Err(format!(
                        "extension '{}' in category '{}' must be lowercase",
                        ext, rule.name
                    ));
                }
                if !seen.insert(ext.as_str()) {
                    return Err(format!(
                        "duplicate extension '{}' in category '{}'",
                        ext, rule.name
                    ));
                }
            }
        }

        Ok(())
    }
}

pub(crate) fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_skip_suffixes() -> Vec<String> {
    [".crdownload", ".part", ".tmp", ".winmd"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub(crate) fn rule(name: &str, extensions: &[&str]) -> CategoryRule {
    CategoryRule {
        name: name.to_string(),
        extensions: extensions.iter().map(|e| e.to_string()).collect(),
    }
}

fn default_categories() -> Vec<CategoryRule> {
    vec![
        rule(
            "images",
            &[
                ".svg", ".png", ".bmp", ".jpg", ".webp", ".tiff", ".ico", ".gif", ".avif",
                ".jpeg",
            ],
        ),
        rule(
            "documents",
            &[
                ".pdf", ".doc", ".docx", ".txt", ".odt", ".rtf", ".md", ".epub", ".xls",
                ".xlsx", ".ppt", ".pptx",
            ],
        ),
        rule(
            "videos",
            &[".mp4", ".mkv", ".avi", ".mov", ".flv", ".wmv", ".webm", ".3gp"],
        ),
        rule(
            "audios",
            &[".mp3", ".wav", ".aac", ".ogg", ".flac", ".wma", ".m4a"],
        ),
        rule(
            "archives",
            &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz", ".iso"],
        ),
        rule(
            "executables",
            &[
                ".exe", ".msi", ".bat", ".cmd", ".app", ".dmg", ".pkg", ".sh", ".bin",
                ".run", ".appimage", ".deb", ".rpm", ".apk", ".jar", ".py",
            ],
        ),
        rule(
            "web_files",
            &[
                ".html", ".htm", ".css", ".scss", ".sass", ".less", ".js", ".mjs", ".ts",
                ".tsx", ".ejs", ".hbs", ".mustache", ".pug", ".jinja", ".twig", ".json",
                ".xml", ".yaml", ".yml", ".env", ".ini", ".conf", ".config", ".manifest",
                ".webmanifest", ".woff", ".woff2", ".ttf", ".otf", ".eot", ".php", ".asp",
                ".aspx", ".jsp", ".cfm",
            ],
        ),
        rule("others", &[".csv", ".db", ".sqlite3", ".log"]),
    ]
}
