// src/config/mod.rs

//! Configuration loading and validation for pulse.
//!
//! Responsibilities:
//! - Define the serde data model and the resolved config (`model.rs`).
//! - Load a JSON or TOML config file from disk (`loader.rs`).
//! - Apply defaults and clamps (`validate.rs`).
//! - Parse duration strings such as `"500ms"` (`duration.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::{format_duration, parse_duration, parse_signed_duration};
pub use loader::{ConfigFormat, DEFAULT_CONFIG_PATH, load_and_validate, load_from_path, parse_config};
pub use model::{BuildSpec, CommandSpec, CoordinatorConfig, RawConfigFile, WatchConfig};
pub use validate::{ConfigInvalid, resolve_config};
