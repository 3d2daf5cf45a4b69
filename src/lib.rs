// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{CoordinatorConfig, format_duration, load_and_validate};
use crate::engine::{Coordinator, CoordinatorEvent, RunOutcome, spawn_signal_listener};
use crate::exec::{RealBuildBackend, RealProcessBackend, Sequencer, Supervisor};
use crate::fs::RealFileSystem;
use crate::watch::{Detector, spawn_detector};

/// Capacity of the coordinator inbox.
pub const INBOX_CAPACITY: usize = 64;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - change detector task
/// - supervisor / sequencer with the real process backends
/// - Ctrl-C / SIGTERM handling
/// - the coordinator loop, which owns everything until it terminates
pub async fn run(args: CliArgs) -> Result<RunOutcome> {
    let cfg = load_and_validate(&args.config);

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(RunOutcome::Shutdown);
    }

    log_summary(&cfg);

    let (tx, rx) = mpsc::channel::<CoordinatorEvent>(INBOX_CAPACITY);

    let detector = match Detector::new(&cfg.watch, Arc::new(RealFileSystem)) {
        Ok(detector) => Some(spawn_detector(detector, cfg.watch.poll_interval, tx.clone())),
        Err(err) => {
            // Surfaces after the initial build, like any other detector failure.
            tx.send(CoordinatorEvent::FatalError(err))
                .await
                .context("coordinator inbox closed before start")?;
            None
        }
    };

    let signals = spawn_signal_listener(tx.clone());
    // Only the producers hold senders from here on.
    drop(tx);

    let supervisor = Supervisor::new(RealProcessBackend::new());
    let sequencer = Sequencer::new(RealBuildBackend::new());
    let mut coordinator = Coordinator::new(cfg.build.clone(), rx, sequencer, supervisor);
    if let Some(detector) = detector {
        coordinator.attach_detector(detector);
    }

    let outcome = coordinator.run().await;
    signals.abort();
    Ok(outcome)
}

fn log_summary(cfg: &CoordinatorConfig) {
    let exts: Vec<&str> = cfg.watch.extensions.iter().map(String::as_str).collect();
    info!(
        main_file = %cfg.build.main_file,
        binary = %cfg.binary_name,
        watch_dir = %cfg.watch.root_dir.display(),
        extensions = ?exts,
        interval = %format_duration(cfg.watch.poll_interval),
        max_watchers = cfg.watch.max_watched_files,
        use_hash = cfg.watch.use_hash,
        "pulse configuration"
    );
    if !cfg.watch.exclude.is_empty() {
        info!(exclude = ?cfg.watch.exclude, "excluded paths");
    }
}

/// Print the resolved configuration without building or watching.
fn print_dry_run(cfg: &CoordinatorConfig) {
    println!("pulse dry-run");
    println!("  main_file      = {}", cfg.build.main_file);
    println!("  binary_name    = {}", cfg.binary_name);
    println!("  watch_dir      = {}", cfg.watch.root_dir.display());
    let exts: Vec<&str> = cfg.watch.extensions.iter().map(String::as_str).collect();
    println!("  watch_exts     = {}", exts.join(", "));
    println!("  watch_interval = {}", format_duration(cfg.watch.poll_interval));
    println!("  max_watchers   = {}", cfg.watch.max_watched_files);
    println!("  use_hash       = {}", cfg.watch.use_hash);
    if !cfg.watch.exclude.is_empty() {
        println!("  exclude        = {}", cfg.watch.exclude.join(", "));
    }
    println!();
    println!("build: {}", cfg.build.build_command_spec());
    println!("run:   {}", cfg.build.run_command_spec());

    debug!("dry-run complete (no execution)");
}
