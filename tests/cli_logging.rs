// tests/cli_logging.rs

use clap::Parser;
use tracing::Level;

use pulse::cli::{CliArgs, LogLevel};
use pulse::logging::resolve_level;

#[test]
fn cli_defaults() {
    let args = CliArgs::try_parse_from(["pulse"]).unwrap();
    assert_eq!(args.config, "pulse.json");
    assert!(args.log_level.is_none());
    assert!(!args.dry_run);
}

#[test]
fn cli_flags() {
    let args = CliArgs::try_parse_from([
        "pulse",
        "-c",
        "dev/pulse.toml",
        "--log-level",
        "debug",
        "--dry-run",
    ])
    .unwrap();

    assert_eq!(args.config, "dev/pulse.toml");
    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    assert!(args.dry_run);
}

#[test]
fn cli_version_flag_short_circuits() {
    let err = CliArgs::try_parse_from(["pulse", "-v"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
}

#[test]
fn cli_rejects_unknown_log_level() {
    assert!(CliArgs::try_parse_from(["pulse", "--log-level", "loud"]).is_err());
}

#[test]
fn log_level_priority() {
    assert_eq!(resolve_level(None, None), Level::INFO);
    assert_eq!(resolve_level(None, Some("debug")), Level::DEBUG);
    assert_eq!(resolve_level(None, Some(" WARNING ")), Level::WARN);
    assert_eq!(resolve_level(None, Some("chatty")), Level::INFO);
    assert_eq!(resolve_level(Some(LogLevel::Error), Some("trace")), Level::ERROR);
}
