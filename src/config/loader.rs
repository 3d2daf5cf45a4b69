// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::config::model::{CoordinatorConfig, RawConfigFile};
use crate::config::validate::resolve_config;
use crate::errors::Result;

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "pulse.json";

/// On-disk format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Load a configuration file and return the raw `RawConfigFile`.
///
/// This only deserializes; defaults and clamps are applied by
/// [`load_and_validate`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    parse_config(&contents, ConfigFormat::from_path(path))
}

pub fn parse_config(contents: &str, format: ConfigFormat) -> Result<RawConfigFile> {
    let config = match format {
        ConfigFormat::Json => serde_json::from_str(contents)?,
        ConfigFormat::Toml => toml::from_str(contents)?,
    };
    Ok(config)
}

/// Load the config at `path` and resolve it into a [`CoordinatorConfig`].
///
/// A broken config never stops the supervisor:
///
/// - missing file → built-in defaults;
/// - unreadable or unparsable file → warning, built-in defaults;
/// - out-of-range values → warning, nearest bound or default.
pub fn load_and_validate(path: impl AsRef<Path>) -> CoordinatorConfig {
    let path = path.as_ref();
    info!(path = %path.display(), "loading configuration");

    let raw = if !path.exists() {
        info!(path = %path.display(), "config file not found; using defaults");
        RawConfigFile::default()
    } else {
        match load_from_path(path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not load config file; using defaults");
                RawConfigFile::default()
            }
        }
    };

    let (config, issues) = resolve_config(raw);
    for issue in &issues {
        warn!("{issue}");
    }

    config
}
