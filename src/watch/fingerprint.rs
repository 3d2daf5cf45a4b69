// src/watch/fingerprint.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Last observed state of one watched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub modified: SystemTime,
    /// Content hash, only recorded when hashing is enabled.
    pub hash: Option<String>,
}

/// Absolute path → last observed fingerprint.
///
/// Entries are never removed: a renamed or deleted file leaves its old entry
/// behind. Lookups for the new path simply miss and count as a change.
#[derive(Debug, Default)]
pub struct FingerprintTable {
    entries: HashMap<PathBuf, Fingerprint>,
}

impl FingerprintTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&Fingerprint> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn insert(&mut self, path: PathBuf, fingerprint: Fingerprint) {
        self.entries.insert(path, fingerprint);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
