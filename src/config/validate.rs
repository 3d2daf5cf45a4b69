// src/config/validate.rs

//! Turn a [`RawConfigFile`] into a [`CoordinatorConfig`].
//!
//! Nothing in here fails. Bad values are replaced by the nearest bound or by
//! the default, and each replacement is reported as a [`ConfigInvalid`] so
//! the caller can log it.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use globset::Glob;

use crate::config::duration::{format_duration, parse_signed_duration};
use crate::config::model::{
    BuildSpec, CoordinatorConfig, DEFAULT_BINARY_NAME, DEFAULT_BUILD_CMD, DEFAULT_MAIN_FILE,
    DEFAULT_MAX_WATCHERS, DEFAULT_WATCH_DIR, DEFAULT_WATCH_EXTS, DEFAULT_WATCH_INTERVAL,
    MAX_WATCHERS_LIMIT, MAX_WATCH_INTERVAL, MIN_WATCH_INTERVAL, RawConfigFile, WatchConfig,
    artifact_path_for,
};

/// A configuration value that was replaced during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigInvalid {
    IntervalUnparsable { value: String, reason: String },
    IntervalNegative { value: String },
    IntervalTooShort { requested: Duration },
    IntervalTooLong { requested: Duration },
    WatchersDefaulted { requested: i64 },
    WatchersClamped { requested: i64 },
    ExcludePatternInvalid { pattern: String, reason: String },
}

impl fmt::Display for ConfigInvalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigInvalid::IntervalUnparsable { value, reason } => write!(
                f,
                "invalid watch_interval {value:?} ({reason}), using default of {}",
                format_duration(DEFAULT_WATCH_INTERVAL)
            ),
            ConfigInvalid::IntervalNegative { value } => write!(
                f,
                "watch_interval {value} is negative, using minimum of {}",
                format_duration(MIN_WATCH_INTERVAL)
            ),
            ConfigInvalid::IntervalTooShort { requested } => write!(
                f,
                "watch_interval {} too short, using minimum of {}",
                format_duration(*requested),
                format_duration(MIN_WATCH_INTERVAL)
            ),
            ConfigInvalid::IntervalTooLong { requested } => write!(
                f,
                "watch_interval {} too long, using maximum of {}",
                format_duration(*requested),
                format_duration(MAX_WATCH_INTERVAL)
            ),
            ConfigInvalid::WatchersDefaulted { requested } => write!(
                f,
                "max_watchers must be at least 1 (got {requested}), using default of {DEFAULT_MAX_WATCHERS}"
            ),
            ConfigInvalid::WatchersClamped { requested } => write!(
                f,
                "max_watchers {requested} too large, using maximum of {MAX_WATCHERS_LIMIT}"
            ),
            ConfigInvalid::ExcludePatternInvalid { pattern, reason } => {
                write!(f, "ignoring invalid exclude pattern {pattern:?}: {reason}")
            }
        }
    }
}

impl From<RawConfigFile> for CoordinatorConfig {
    fn from(raw: RawConfigFile) -> Self {
        resolve_config(raw).0
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig::from(RawConfigFile::default())
    }
}

/// Apply defaults and clamps, collecting a note for every replaced value.
pub fn resolve_config(raw: RawConfigFile) -> (CoordinatorConfig, Vec<ConfigInvalid>) {
    let mut issues = Vec::new();

    let main_file = non_empty(raw.main_file).unwrap_or_else(|| DEFAULT_MAIN_FILE.to_string());
    let binary_name =
        non_empty(raw.binary_name).unwrap_or_else(|| DEFAULT_BINARY_NAME.to_string());
    let watch_dir = non_empty(raw.watch_dir).unwrap_or_else(|| DEFAULT_WATCH_DIR.to_string());

    let extensions: BTreeSet<String> = match raw.watch_exts {
        Some(exts) if exts.iter().any(|e| !e.trim().is_empty()) => exts
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect(),
        _ => DEFAULT_WATCH_EXTS.iter().map(|s| s.to_string()).collect(),
    };

    let poll_interval = clamp_interval(raw.watch_interval.as_deref(), &mut issues);
    let max_watched_files = clamp_watchers(raw.max_watchers, &mut issues);
    let exclude = valid_excludes(raw.exclude.unwrap_or_default(), &mut issues);

    let build_cmd: Vec<String> = match raw.build_cmd {
        Some(cmd) if cmd.first().is_some_and(|p| !p.trim().is_empty()) => cmd,
        _ => DEFAULT_BUILD_CMD.iter().map(|s| s.to_string()).collect(),
    };

    let build = BuildSpec::from_parts(
        &build_cmd,
        artifact_path_for(&binary_name),
        main_file,
        raw.run_args.unwrap_or_default(),
    );

    let watch = WatchConfig {
        root_dir: PathBuf::from(watch_dir),
        extensions,
        exclude,
        poll_interval,
        max_watched_files,
        use_hash: raw.use_hash.unwrap_or(false),
    };

    let config = CoordinatorConfig {
        watch,
        build,
        binary_name,
    };

    (config, issues)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse `watch_interval` and clamp it into `[MIN_WATCH_INTERVAL, MAX_WATCH_INTERVAL]`.
pub fn clamp_interval(value: Option<&str>, issues: &mut Vec<ConfigInvalid>) -> Duration {
    let Some(value) = value else {
        return DEFAULT_WATCH_INTERVAL;
    };

    let requested = match parse_signed_duration(value) {
        Ok((true, _)) => {
            issues.push(ConfigInvalid::IntervalNegative {
                value: value.trim().to_string(),
            });
            return MIN_WATCH_INTERVAL;
        }
        Ok((false, d)) => d,
        Err(reason) => {
            issues.push(ConfigInvalid::IntervalUnparsable {
                value: value.to_string(),
                reason,
            });
            return DEFAULT_WATCH_INTERVAL;
        }
    };

    if requested < MIN_WATCH_INTERVAL {
        issues.push(ConfigInvalid::IntervalTooShort { requested });
        MIN_WATCH_INTERVAL
    } else if requested > MAX_WATCH_INTERVAL {
        issues.push(ConfigInvalid::IntervalTooLong { requested });
        MAX_WATCH_INTERVAL
    } else {
        requested
    }
}

/// Clamp `max_watchers` into `[1, MAX_WATCHERS_LIMIT]`; zero or negative
/// values mean "use the default".
pub fn clamp_watchers(value: Option<i64>, issues: &mut Vec<ConfigInvalid>) -> usize {
    match value {
        None => DEFAULT_MAX_WATCHERS,
        Some(n) if n < 1 => {
            issues.push(ConfigInvalid::WatchersDefaulted { requested: n });
            DEFAULT_MAX_WATCHERS
        }
        Some(n) if n > MAX_WATCHERS_LIMIT as i64 => {
            issues.push(ConfigInvalid::WatchersClamped { requested: n });
            MAX_WATCHERS_LIMIT
        }
        Some(n) => n as usize,
    }
}

fn valid_excludes(patterns: Vec<String>, issues: &mut Vec<ConfigInvalid>) -> Vec<String> {
    patterns
        .into_iter()
        .filter(|pattern| match Glob::new(pattern) {
            Ok(_) => true,
            Err(e) => {
                issues.push(ConfigInvalid::ExcludePatternInvalid {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                });
                false
            }
        })
        .collect()
}
