use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::home_dir;

#[derive(Parser)]
#[command(name = "sortd")]
#[command(version)]
#[command(about = "A downloads-folder organizer that watches for completed downloads and files them by category")]
#[command(
    long_about = "sortd watches a directory for newly completed downloads, waits for each file to stop growing, and moves it into a category subfolder chosen by its extension. Files already present at startup are sorted in one reconciliation sweep."
)]
pub struct Cli {
    /// Directory to watch for downloads
    #[arg(value_name = "PATH", help = "Directory to watch (defaults to ~/Downloads)")]
    pub path: Option<PathBuf>,

    /// Configuration file with the category table
    #[arg(short, long, value_name = "FILE", help = "Path to a sortd.toml config file")]
    pub config: Option<PathBuf>,

    /// Stability poll interval in seconds
    #[arg(long, value_name = "SECS", help = "Override the stability poll interval")]
    pub interval: Option<u64>,

    /// Output format for move records
    #[arg(long, default_value = "text", help = "Output format")]
    pub output: OutputFormat,

    /// Log file path
    #[arg(long, value_name = "FILE", help = "Log file (defaults to ./sortd.log)")]
    pub log_file: Option<PathBuf>,

    /// Skip the startup sweep
    #[arg(long, help = "Do not sort files already present at startup")]
    pub no_sweep: bool,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable log lines on the console
    Text,
    /// One JSON move record per line on stdout, log lines to file only
    Json,
}

impl Cli {
    pub fn watch_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            home_dir()
                .map(|home| home.join("Downloads"))
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("sortd.log"))
    }

    pub fn validate(&self) -> Result<(), String> {
        let path = self.watch_path();

        if !path.exists() {
            return Err(format!("Path does not exist: {}", path.display()));
        }

        if !path.is_dir() {
            return Err(format!("Path is not a directory: {}", path.display()));
        }

        if self.interval == Some(0) {
            return Err("Poll interval must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Installs the log sink: timestamped events to the log file always,
    /// and to the console unless stdout is reserved for JSON records.
    pub fn setup_logging(&self) -> Result<()> {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        let log_path = self.log_path();
        let file = File::create(&log_path)
            .with_context(|| format!("failed to create log file {}", log_path.display()))?;

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Arc::new(file));

        let registry = tracing_subscriber::registry()
            .with(tracing_subscriber::filter::LevelFilter::from_level(level))
            .with(file_layer);

        if self.output == OutputFormat::Json {
            registry.init();
        } else {
            let console_layer = tracing_subscriber::fmt::layer().with_target(false);
            registry.with(console_layer).init();
        }

        Ok(())
    }
}
