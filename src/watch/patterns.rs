// src/watch/patterns.rs

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::WatchConfig;
use crate::errors::{PulseError, Result};

/// Decides which paths under the watch root are of interest.
///
/// A file is watched when its name ends with one of the configured
/// extensions and its root-relative path matches no exclude glob. Excluded
/// directories are not descended at all.
#[derive(Clone)]
pub struct WatchFilter {
    extensions: BTreeSet<String>,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for WatchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchFilter")
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl WatchFilter {
    pub fn new(extensions: BTreeSet<String>, exclude: &[String]) -> Result<Self> {
        Ok(Self {
            extensions,
            exclude_set: compile_globs(exclude)?,
        })
    }

    pub fn from_config(config: &WatchConfig) -> Result<Self> {
        Self::new(config.extensions.clone(), &config.exclude)
    }

    /// Suffix match on the file name.
    pub fn matches_extension(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    /// Whether `rel_path` (relative to the watch root) is excluded.
    pub fn is_excluded(&self, rel_path: &Path) -> bool {
        match &self.exclude_set {
            Some(set) => set.is_match(rel_path),
            None => false,
        }
    }
}

fn compile_globs(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            PulseError::ConfigError(format!("invalid exclude pattern {pattern:?}: {e}"))
        })?;
        builder.add(glob);
    }

    let set = builder
        .build()
        .map_err(|e| PulseError::ConfigError(format!("building exclude globset: {e}")))?;
    Ok(Some(set))
}
