#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pulse::config::{ConfigInvalid, CoordinatorConfig, RawConfigFile, WatchConfig, resolve_config};

/// Builder for `RawConfigFile` to simplify test setup.
#[derive(Debug, Default)]
pub struct RawConfigBuilder {
    raw: RawConfigFile,
}

impl RawConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn main_file(mut self, main: &str) -> Self {
        self.raw.main_file = Some(main.to_string());
        self
    }

    pub fn binary_name(mut self, name: &str) -> Self {
        self.raw.binary_name = Some(name.to_string());
        self
    }

    pub fn watch_dir(mut self, dir: &str) -> Self {
        self.raw.watch_dir = Some(dir.to_string());
        self
    }

    pub fn watch_ext(mut self, ext: &str) -> Self {
        self.raw
            .watch_exts
            .get_or_insert_with(Vec::new)
            .push(ext.to_string());
        self
    }

    pub fn watch_interval(mut self, interval: &str) -> Self {
        self.raw.watch_interval = Some(interval.to_string());
        self
    }

    pub fn max_watchers(mut self, max: i64) -> Self {
        self.raw.max_watchers = Some(max);
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.raw
            .exclude
            .get_or_insert_with(Vec::new)
            .push(pattern.to_string());
        self
    }

    pub fn use_hash(mut self, val: bool) -> Self {
        self.raw.use_hash = Some(val);
        self
    }

    pub fn build_cmd(mut self, parts: &[&str]) -> Self {
        self.raw.build_cmd = Some(parts.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn run_arg(mut self, arg: &str) -> Self {
        self.raw
            .run_args
            .get_or_insert_with(Vec::new)
            .push(arg.to_string());
        self
    }

    pub fn build(self) -> RawConfigFile {
        self.raw
    }

    /// Apply defaults and clamps, returning the warnings as well.
    pub fn resolve(self) -> (CoordinatorConfig, Vec<ConfigInvalid>) {
        resolve_config(self.raw)
    }
}

/// Builder for `WatchConfig`, starting from the built-in defaults.
#[derive(Debug)]
pub struct WatchConfigBuilder {
    config: WatchConfig,
}

impl WatchConfigBuilder {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            config: WatchConfig {
                root_dir: PathBuf::from(root.as_ref()),
                ..WatchConfig::default()
            },
        }
    }

    /// Replace the extension set.
    pub fn extensions(mut self, exts: &[&str]) -> Self {
        self.config.extensions = exts.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>();
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.exclude.push(pattern.to_string());
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn max_files(mut self, max: usize) -> Self {
        self.config.max_watched_files = max;
        self
    }

    pub fn use_hash(mut self, val: bool) -> Self {
        self.config.use_hash = val;
        self
    }

    pub fn build(self) -> WatchConfig {
        self.config
    }
}
