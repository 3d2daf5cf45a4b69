// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// More files matched the watch filters than `max_watchers` allows.
    #[error("watch limit exceeded: more than {limit} files match the watch filters")]
    WatchLimitExceeded { limit: usize },

    /// The directory walk hit an IO error (permission denied, vanished path, ...).
    #[error("failed to walk {path:?}: {source}")]
    TreeWalkFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("failed to launch '{command}': {source}")]
    LaunchFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PulseError>;
