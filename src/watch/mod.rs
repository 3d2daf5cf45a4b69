// src/watch/mod.rs

//! Polling change detection.
//!
//! This module is responsible for:
//! - Filtering files by extension and `exclude` globs.
//! - Walking the watch root and keeping a fingerprint per watched file.
//! - (Optionally) hashing contents so a bare timestamp bump is ignored.
//! - Running the poll loop as a Tokio task that feeds the coordinator.

pub mod detector;
pub mod fingerprint;
pub mod hash;
pub mod patterns;

pub use detector::{Detector, DetectorHandle, spawn_detector};
pub use fingerprint::{Fingerprint, FingerprintTable};
pub use hash::compute_file_hash;
pub use patterns::WatchFilter;
