// src/watch/detector.rs

//! Polling change detector.
//!
//! [`Detector`] is the synchronous part: it walks the watch root and compares
//! what it finds against its [`FingerprintTable`]. [`spawn_detector`] drives a
//! detector from a Tokio interval and forwards one coalesced
//! [`CoordinatorEvent::RebuildRequested`] per tick that saw changes.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::{self, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::WatchConfig;
use crate::engine::CoordinatorEvent;
use crate::errors::{PulseError, Result};
use crate::fs::{FileMeta, FileSystem};
use crate::watch::fingerprint::{Fingerprint, FingerprintTable};
use crate::watch::hash::compute_file_hash;
use crate::watch::patterns::WatchFilter;

/// Owns the fingerprint table for one watch root.
#[derive(Debug)]
pub struct Detector {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    filter: WatchFilter,
    max_files: usize,
    use_hash: bool,
    table: FingerprintTable,
    primed: bool,
    last_matched: usize,
}

impl Detector {
    /// Build a detector for `config.root_dir`.
    ///
    /// Fails with [`PulseError::TreeWalkFailed`] if the root cannot be
    /// resolved, and with [`PulseError::ConfigError`] on a broken exclude glob.
    pub fn new(config: &WatchConfig, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let root = fs
            .canonicalize(&config.root_dir)
            .map_err(|source| PulseError::TreeWalkFailed {
                path: config.root_dir.clone(),
                source,
            })?;

        Ok(Self {
            fs,
            root,
            filter: WatchFilter::from_config(config)?,
            max_files: config.max_watched_files,
            use_hash: config.use_hash,
            table: FingerprintTable::new(),
            primed: false,
            last_matched: 0,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table(&self) -> &FingerprintTable {
        &self.table
    }

    /// Number of files matched by the most recent pass.
    pub fn watched_files(&self) -> usize {
        self.last_matched
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Initial full walk: record every matching file without reporting
    /// anything as changed. Returns the number of watched files.
    pub fn prime(&mut self) -> Result<usize> {
        let fs = self.fs.as_ref();
        let table = &mut self.table;
        let use_hash = self.use_hash;

        let matched = walk_matching(fs, &self.root, &self.filter, self.max_files, |path, meta| {
            let hash = if use_hash {
                Some(compute_file_hash(fs, path)?)
            } else {
                None
            };
            table.insert(
                path.to_path_buf(),
                Fingerprint {
                    modified: meta.modified,
                    hash,
                },
            );
            Ok(())
        })?;

        self.primed = true;
        self.last_matched = matched;
        debug!(files = matched, root = %self.root.display(), "initial scan complete");
        Ok(matched)
    }

    /// One detection pass. Returns `true` if at least one watched file is
    /// new or has a strictly newer modification time than last seen.
    ///
    /// The first call on an unprimed detector performs the initial scan and
    /// reports no change.
    pub fn poll(&mut self) -> Result<bool> {
        if !self.primed {
            self.prime()?;
            return Ok(false);
        }

        let fs = self.fs.as_ref();
        let table = &mut self.table;
        let use_hash = self.use_hash;
        let mut changed: Vec<PathBuf> = Vec::new();

        let matched = walk_matching(fs, &self.root, &self.filter, self.max_files, |path, meta| {
            let previous = table.get(path);
            let advanced = match previous {
                None => true,
                Some(fp) => meta.modified > fp.modified,
            };
            if !advanced {
                return Ok(());
            }

            let hash = if use_hash {
                Some(compute_file_hash(fs, path)?)
            } else {
                None
            };
            let content_changed = match (previous, &hash) {
                (Some(fp), Some(new_hash)) => fp.hash.as_deref() != Some(new_hash.as_str()),
                _ => true,
            };

            table.insert(
                path.to_path_buf(),
                Fingerprint {
                    modified: meta.modified,
                    hash,
                },
            );
            if content_changed {
                changed.push(path.to_path_buf());
            } else {
                debug!(path = %path.display(), "timestamp advanced but content unchanged");
            }
            Ok(())
        })?;

        self.last_matched = matched;
        for path in &changed {
            info!(path = %path.display(), "file changed");
        }
        Ok(!changed.is_empty())
    }
}

/// Walk `root` depth-first, calling `visit` for every watched file.
///
/// Entries are visited in lexical order within each directory. Symbolic
/// links are never followed. Returns the number of watched files, or
/// [`PulseError::WatchLimitExceeded`] as soon as that number would pass
/// `limit`.
fn walk_matching<F>(
    fs: &dyn FileSystem,
    root: &Path,
    filter: &WatchFilter,
    limit: usize,
    mut visit: F,
) -> Result<usize>
where
    F: FnMut(&Path, &FileMeta) -> io::Result<()>,
{
    let walk_failed = |path: &Path, source: io::Error| PulseError::TreeWalkFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut matched = 0usize;
    let mut record = |path: &Path, meta: &FileMeta| -> Result<()> {
        matched += 1;
        if matched > limit {
            return Err(PulseError::WatchLimitExceeded { limit });
        }
        visit(path, meta).map_err(|e| walk_failed(path, e))
    };

    let root_meta = fs.symlink_metadata(root).map_err(|e| walk_failed(root, e))?;
    if !root_meta.is_dir {
        if filter.matches_extension(root) {
            record(root, &root_meta)?;
        }
        drop(record);
        return Ok(matched);
    }

    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let mut entries = fs.read_dir(&dir).map_err(|e| walk_failed(&dir, e))?;
        entries.sort();

        let mut subdirs = Vec::new();
        for path in entries {
            let meta = fs
                .symlink_metadata(&path)
                .map_err(|e| walk_failed(&path, e))?;
            let rel = path.strip_prefix(root).unwrap_or(&path);

            if filter.is_excluded(rel) {
                continue;
            }
            if meta.is_dir {
                subdirs.push(path);
                continue;
            }
            if filter.matches_extension(&path) {
                record(&path, &meta)?;
            }
        }

        // Reverse so the lexically first subdirectory is popped first.
        stack.extend(subdirs.into_iter().rev());
    }

    drop(record);
    Ok(matched)
}

/// Handle for a running detector task.
///
/// Dropping the handle also stops the task (its cancel channel closes), but
/// [`DetectorHandle::cancel`] additionally waits for it to finish.
#[derive(Debug)]
pub struct DetectorHandle {
    cancel: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl DetectorHandle {
    /// Request cancellation and wait until the detector task has exited.
    pub async fn cancel(self) {
        let Self { cancel, join } = self;
        if let Some(cancel) = cancel {
            // Err means the task already stopped on its own (e.g. fatal error).
            let _ = cancel.send(());
        }
        if let Err(e) = join.await {
            warn!(error = %e, "file watcher task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Spawn the polling loop for `detector`.
///
/// - The first action is the initial scan (skipped if the detector is
///   already primed); failures there are fatal.
/// - Afterwards the tree is re-scanned every `interval` (first tick one full
///   interval after start). Late ticks are delayed, never bunched up.
/// - Each tick with changes sends exactly one `RebuildRequested`.
/// - A scan error sends one `FatalError` and ends the task.
/// - Scans run on the blocking pool so directory walks and hashing never
///   stall the runtime.
/// - Cancellation is honoured between ticks, during a scan and while
///   waiting for room in the coordinator's inbox.
pub fn spawn_detector(
    detector: Detector,
    interval: Duration,
    events: mpsc::Sender<CoordinatorEvent>,
) -> DetectorHandle {
    let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
    let interval = interval.max(Duration::from_millis(1));

    let join = tokio::spawn(async move {
        let mut detector = if detector.is_primed() {
            detector
        } else {
            match scan_blocking(detector, &mut cancel_rx, Detector::prime).await {
                Scan::Done(detector, Ok(_)) => detector,
                Scan::Done(_, Err(err)) | Scan::Crashed(err) => {
                    error!(error = %err, "initial scan failed");
                    deliver(&events, CoordinatorEvent::FatalError(err), &mut cancel_rx).await;
                    return;
                }
                Scan::Cancelled => {
                    info!("stopping file watcher");
                    return;
                }
            }
        };
        info!(
            files = detector.watched_files(),
            root = %detector.root().display(),
            "watching for file changes"
        );

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = &mut cancel_rx => {
                    info!("stopping file watcher");
                    return;
                }
                _ = ticker.tick() => {}
            }

            let changed = match scan_blocking(detector, &mut cancel_rx, Detector::poll).await {
                Scan::Done(scanned, Ok(changed)) => {
                    detector = scanned;
                    changed
                }
                Scan::Done(_, Err(err)) | Scan::Crashed(err) => {
                    error!(error = %err, "file watcher failed");
                    deliver(&events, CoordinatorEvent::FatalError(err), &mut cancel_rx).await;
                    return;
                }
                Scan::Cancelled => {
                    info!("stopping file watcher");
                    return;
                }
            };

            if changed
                && !deliver(&events, CoordinatorEvent::RebuildRequested, &mut cancel_rx).await
            {
                return;
            }
        }
    });

    DetectorHandle {
        cancel: Some(cancel_tx),
        join,
    }
}

/// How a scan on the blocking pool ended.
enum Scan<T> {
    /// The detector comes back together with the scan result.
    Done(Detector, Result<T>),
    Cancelled,
    /// The blocking task panicked; the detector is lost.
    Crashed(PulseError),
}

/// Run `op` on the blocking pool, racing it against cancellation.
///
/// A cancelled scan is left to finish in the background; its result is
/// dropped.
async fn scan_blocking<T, F>(
    detector: Detector,
    cancel_rx: &mut oneshot::Receiver<()>,
    op: F,
) -> Scan<T>
where
    T: Send + 'static,
    F: FnOnce(&mut Detector) -> Result<T> + Send + 'static,
{
    let work = task::spawn_blocking(move || {
        let mut detector = detector;
        let result = op(&mut detector);
        (detector, result)
    });

    tokio::select! {
        biased;
        _ = cancel_rx => Scan::Cancelled,
        joined = work => match joined {
            Ok((detector, result)) => Scan::Done(detector, result),
            Err(e) => {
                Scan::Crashed(PulseError::Other(anyhow::anyhow!("file scan task failed: {e}")))
            }
        },
    }
}

/// Send `event` unless cancelled first. Returns false if the detector should
/// stop (cancelled, or nobody is listening any more).
async fn deliver(
    events: &mpsc::Sender<CoordinatorEvent>,
    event: CoordinatorEvent,
    cancel_rx: &mut oneshot::Receiver<()>,
) -> bool {
    tokio::select! {
        biased;
        _ = cancel_rx => {
            info!("stopping file watcher");
            false
        }
        sent = events.send(event) => {
            if sent.is_err() {
                debug!("coordinator inbox closed; stopping file watcher");
                return false;
            }
            true
        }
    }
}
