// src/config/model.rs

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_MAIN_FILE: &str = "main.go";
pub const DEFAULT_BINARY_NAME: &str = "app";
pub const DEFAULT_WATCH_DIR: &str = ".";
pub const DEFAULT_WATCH_EXTS: [&str; 3] = [".go", ".mod", ".sum"];
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(1);
pub const MIN_WATCH_INTERVAL: Duration = Duration::from_millis(500);
pub const MAX_WATCH_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_WATCHERS: usize = 100;
pub const MAX_WATCHERS_LIMIT: usize = 500;
pub const DEFAULT_BUILD_CMD: [&str; 3] = ["go", "build", "-o"];

/// Configuration as read from disk, before defaults and clamps are applied.
///
/// ```json
/// {
///   "main_file": "main.go",
///   "binary_name": "app",
///   "watch_dir": ".",
///   "watch_exts": [".go", ".mod", ".sum"],
///   "watch_interval": "1s",
///   "max_watchers": 100
/// }
/// ```
///
/// Every field is optional; anything missing or empty falls back to the
/// built-in default during validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub main_file: Option<String>,

    #[serde(default)]
    pub binary_name: Option<String>,

    #[serde(default)]
    pub watch_dir: Option<String>,

    #[serde(default)]
    pub watch_exts: Option<Vec<String>>,

    /// Duration string such as `"500ms"` or `"2s"`.
    #[serde(default)]
    pub watch_interval: Option<String>,

    /// Upper bound on the number of watched files. Signed so that nonsense
    /// like `-3` can be recovered from instead of failing deserialization.
    #[serde(default)]
    pub max_watchers: Option<i64>,

    /// Glob patterns (relative to `watch_dir`) that are never watched.
    #[serde(default)]
    pub exclude: Option<Vec<String>>,

    /// Only count a file as changed when its content hash changed too.
    #[serde(default)]
    pub use_hash: Option<bool>,

    /// Build program and leading arguments; the artifact path and main file
    /// are appended.
    #[serde(default)]
    pub build_cmd: Option<Vec<String>>,

    /// Extra arguments passed to the built program.
    #[serde(default)]
    pub run_args: Option<Vec<String>>,
}

/// Immutable snapshot of what the change detector watches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub root_dir: PathBuf,
    /// Suffixes a file name must end with to be watched (e.g. `".go"`).
    pub extensions: BTreeSet<String>,
    pub exclude: Vec<String>,
    pub poll_interval: Duration,
    pub max_watched_files: usize,
    pub use_hash: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_WATCH_DIR),
            extensions: DEFAULT_WATCH_EXTS.iter().map(|s| s.to_string()).collect(),
            exclude: Vec::new(),
            poll_interval: DEFAULT_WATCH_INTERVAL,
            max_watched_files: DEFAULT_MAX_WATCHERS,
            use_hash: false,
        }
    }
}

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How to produce the artifact and how to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    pub build_command: String,
    /// Full argument list, already ending in `<artifact_path> <main_file>`.
    pub build_args: Vec<String>,
    pub artifact_path: PathBuf,
    pub main_file: String,
    pub run_args: Vec<String>,
}

impl BuildSpec {
    /// Assemble a spec from a build command prefix (`["go", "build", "-o"]`),
    /// the artifact path and the entry point.
    pub fn from_parts(
        build_cmd: &[String],
        artifact_path: PathBuf,
        main_file: impl Into<String>,
        run_args: Vec<String>,
    ) -> Self {
        let main_file = main_file.into();
        let (build_command, prefix_args) = match build_cmd.split_first() {
            Some((program, rest)) => (program.clone(), rest.to_vec()),
            None => (
                DEFAULT_BUILD_CMD[0].to_string(),
                DEFAULT_BUILD_CMD[1..].iter().map(|s| s.to_string()).collect(),
            ),
        };

        let mut build_args = prefix_args;
        build_args.push(artifact_path.to_string_lossy().into_owned());
        build_args.push(main_file.clone());

        Self {
            build_command,
            build_args,
            artifact_path,
            main_file,
            run_args,
        }
    }

    pub fn build_command_spec(&self) -> CommandSpec {
        CommandSpec::new(self.build_command.clone()).args(self.build_args.iter().cloned())
    }

    /// The command that launches the freshly built artifact.
    pub fn run_command_spec(&self) -> CommandSpec {
        CommandSpec::new(self.artifact_path.to_string_lossy().into_owned())
            .args(self.run_args.iter().cloned())
    }
}

impl Default for BuildSpec {
    fn default() -> Self {
        let build_cmd: Vec<String> = DEFAULT_BUILD_CMD.iter().map(|s| s.to_string()).collect();
        Self::from_parts(
            &build_cmd,
            artifact_path_for(DEFAULT_BINARY_NAME),
            DEFAULT_MAIN_FILE,
            Vec::new(),
        )
    }
}

/// `./<binary_name>` for bare names, the name itself for anything that
/// already carries a directory component.
pub fn artifact_path_for(binary_name: &str) -> PathBuf {
    let path = PathBuf::from(binary_name);
    if path.is_absolute() || path.components().count() > 1 {
        path
    } else {
        PathBuf::from(".").join(path)
    }
}

/// Fully resolved configuration handed to the wiring layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub watch: WatchConfig,
    pub build: BuildSpec,
    /// The `binary_name` as configured, kept for display.
    pub binary_name: String,
}
