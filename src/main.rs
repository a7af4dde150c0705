use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use sortd::{Cli, DirWatcher, Organizer, OrganizerConfig, OutputFormat};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = cli.validate() {
        eprintln!("Error: {}", err);
        process::exit(1);
    }

    cli.setup_logging()?;

    let mut config = OrganizerConfig::load(cli.config.as_deref())?;
    if let Some(interval) = cli.interval {
        config.poll_interval_secs = interval;
    }

    let watch_path = cli.watch_path();
    tracing::info!("watching folder: {}", watch_path.display());

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .context("failed to install interrupt handler")?;

    let organizer = Organizer::new(&config, shutdown, cli.output == OutputFormat::Json);

    // Subscribe before the sweep so files arriving mid-sweep are not lost;
    // their events queue on the channel until the loop starts.
    let watcher = DirWatcher::new(&watch_path)?;

    if !cli.no_sweep {
        let moved = organizer.sweep(&watch_path)?;
        tracing::info!("startup sweep moved {} file(s)", moved);
    }

    organizer.run(&watch_path, &watcher);
    tracing::info!("shutting down");

    Ok(())
}
