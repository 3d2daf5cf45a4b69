// tests/config_validation.rs

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use pulse::config::model::{DEFAULT_MAX_WATCHERS, MAX_WATCHERS_LIMIT};
use pulse::config::{
    ConfigFormat, ConfigInvalid, CoordinatorConfig, format_duration, load_and_validate,
    load_from_path, parse_config, parse_duration, parse_signed_duration,
};
use pulse::errors::PulseError;
use pulse_test_utils::builders::RawConfigBuilder;
use pulse_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn defaults_when_nothing_is_configured() {
    let (cfg, issues) = RawConfigBuilder::new().resolve();
    assert!(issues.is_empty());

    assert_eq!(cfg.build.main_file, "main.go");
    assert_eq!(cfg.binary_name, "app");
    assert_eq!(cfg.build.artifact_path, PathBuf::from("./app"));
    assert_eq!(cfg.watch.root_dir, PathBuf::from("."));
    assert_eq!(
        cfg.watch.extensions.iter().cloned().collect::<Vec<_>>(),
        vec![".go", ".mod", ".sum"]
    );
    assert_eq!(cfg.watch.poll_interval, Duration::from_secs(1));
    assert_eq!(cfg.watch.max_watched_files, DEFAULT_MAX_WATCHERS);
    assert!(!cfg.watch.use_hash);
    assert_eq!(cfg, CoordinatorConfig::default());
}

#[test]
fn build_and_run_commands_from_config() {
    let (cfg, _) = RawConfigBuilder::new()
        .main_file("cmd/server/main.go")
        .binary_name("server")
        .run_arg("--port")
        .run_arg("8080")
        .resolve();

    assert_eq!(
        cfg.build.build_command_spec().to_string(),
        "go build -o ./server cmd/server/main.go"
    );
    assert_eq!(cfg.build.run_command_spec().to_string(), "./server --port 8080");
}

#[test]
fn custom_build_command_gets_artifact_and_main_appended() {
    let (cfg, _) = RawConfigBuilder::new()
        .build_cmd(&["tinygo", "build", "-opt=2", "-o"])
        .binary_name("bin/app")
        .resolve();

    let build = cfg.build.build_command_spec();
    assert_eq!(build.program, "tinygo");
    assert_eq!(build.args, vec!["build", "-opt=2", "-o", "bin/app", "main.go"]);
    assert_eq!(cfg.build.run_command_spec().program, "bin/app");
}

#[test]
fn empty_values_fall_back_to_defaults() {
    let (cfg, issues) = RawConfigBuilder::new()
        .main_file("")
        .binary_name("  ")
        .watch_dir("")
        .watch_ext("")
        .build_cmd(&[])
        .resolve();

    assert!(issues.is_empty());
    assert_eq!(cfg, CoordinatorConfig::default());
}

#[test]
fn negative_interval_is_raised_to_minimum() {
    let (cfg, issues) = RawConfigBuilder::new().watch_interval("-1s").resolve();
    assert_eq!(cfg.watch.poll_interval, Duration::from_millis(500));
    assert_eq!(
        issues,
        vec![ConfigInvalid::IntervalNegative {
            value: "-1s".to_string()
        }]
    );
    assert_eq!(
        issues[0].to_string(),
        "watch_interval -1s is negative, using minimum of 500ms"
    );
}

#[test]
fn short_interval_is_raised_to_minimum() {
    let (cfg, issues) = RawConfigBuilder::new().watch_interval("300ms").resolve();
    assert_eq!(cfg.watch.poll_interval, Duration::from_millis(500));
    assert_eq!(
        issues,
        vec![ConfigInvalid::IntervalTooShort {
            requested: Duration::from_millis(300)
        }]
    );
}

#[test]
fn long_interval_is_lowered_to_maximum() {
    let (cfg, issues) = RawConfigBuilder::new().watch_interval("2h").resolve();
    assert_eq!(cfg.watch.poll_interval, Duration::from_secs(3600));
    assert!(matches!(issues[..], [ConfigInvalid::IntervalTooLong { .. }]));
}

#[test]
fn interval_bounds_are_inclusive() {
    let (cfg, issues) = RawConfigBuilder::new().watch_interval("500ms").resolve();
    assert_eq!(cfg.watch.poll_interval, Duration::from_millis(500));
    assert!(issues.is_empty());

    let (cfg, issues) = RawConfigBuilder::new().watch_interval("1h").resolve();
    assert_eq!(cfg.watch.poll_interval, Duration::from_secs(3600));
    assert!(issues.is_empty());
}

#[test]
fn unparsable_interval_uses_default() {
    let (cfg, issues) = RawConfigBuilder::new().watch_interval("soon").resolve();
    assert_eq!(cfg.watch.poll_interval, Duration::from_secs(1));
    assert!(matches!(
        &issues[..],
        [ConfigInvalid::IntervalUnparsable { value, .. }] if value == "soon"
    ));
}

#[test]
fn zero_watchers_uses_default() {
    let (cfg, issues) = RawConfigBuilder::new().max_watchers(0).resolve();
    assert_eq!(cfg.watch.max_watched_files, 100);
    assert_eq!(issues, vec![ConfigInvalid::WatchersDefaulted { requested: 0 }]);

    let (cfg, _) = RawConfigBuilder::new().max_watchers(-7).resolve();
    assert_eq!(cfg.watch.max_watched_files, 100);
}

#[test]
fn too_many_watchers_is_clamped() {
    let (cfg, issues) = RawConfigBuilder::new().max_watchers(1000).resolve();
    assert_eq!(cfg.watch.max_watched_files, MAX_WATCHERS_LIMIT);
    assert_eq!(issues, vec![ConfigInvalid::WatchersClamped { requested: 1000 }]);
    assert!(issues[0].to_string().contains("500"));
}

#[test]
fn invalid_exclude_pattern_is_dropped() {
    let (cfg, issues) = RawConfigBuilder::new()
        .exclude("vendor/**")
        .exclude("a[")
        .resolve();

    assert_eq!(cfg.watch.exclude, vec!["vendor/**".to_string()]);
    assert!(matches!(
        &issues[..],
        [ConfigInvalid::ExcludePatternInvalid { pattern, .. }] if pattern == "a["
    ));
}

#[test]
fn parse_json_config() -> TestResult {
    let raw = parse_config(
        r#"{
            "main_file": "cmd/api/main.go",
            "binary_name": "api",
            "watch_dir": "./src",
            "watch_exts": [".go", ".tmpl"],
            "watch_interval": "2s",
            "max_watchers": 250,
            "use_hash": true
        }"#,
        ConfigFormat::Json,
    )?;

    let cfg = CoordinatorConfig::from(raw);
    assert_eq!(cfg.build.main_file, "cmd/api/main.go");
    assert_eq!(cfg.watch.root_dir, PathBuf::from("./src"));
    assert!(cfg.watch.extensions.contains(".tmpl"));
    assert!(!cfg.watch.extensions.contains(".mod"));
    assert_eq!(cfg.watch.poll_interval, Duration::from_secs(2));
    assert_eq!(cfg.watch.max_watched_files, 250);
    assert!(cfg.watch.use_hash);
    Ok(())
}

#[test]
fn parse_toml_config() -> TestResult {
    let raw = parse_config(
        r#"
main_file = "main.go"
binary_name = "svc"
watch_interval = "750ms"
exclude = ["vendor/**"]
run_args = ["-v"]
"#,
        ConfigFormat::Toml,
    )?;

    let cfg = CoordinatorConfig::from(raw);
    assert_eq!(cfg.binary_name, "svc");
    assert_eq!(cfg.watch.poll_interval, Duration::from_millis(750));
    assert_eq!(cfg.build.run_args, vec!["-v".to_string()]);
    Ok(())
}

#[test]
fn format_is_chosen_by_extension() {
    assert_eq!(ConfigFormat::from_path("pulse.toml".as_ref()), ConfigFormat::Toml);
    assert_eq!(ConfigFormat::from_path("pulse.TOML".as_ref()), ConfigFormat::Toml);
    assert_eq!(ConfigFormat::from_path("pulse.json".as_ref()), ConfigFormat::Json);
    assert_eq!(ConfigFormat::from_path("pulse".as_ref()), ConfigFormat::Json);
}

#[test]
fn malformed_json_is_an_error_when_loading_directly() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("pulse.json");
    fs::write(&path, "{ not json")?;

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, PulseError::JsonError(_)));
    Ok(())
}

#[test]
fn missing_config_file_yields_defaults() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let cfg = load_and_validate(dir.path().join("does-not-exist.json"));
    assert_eq!(cfg, CoordinatorConfig::default());
    Ok(())
}

#[test]
fn unparsable_config_file_yields_defaults() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("pulse.json");
    fs::write(&path, r#"{"watch_interval": 5"#)?;

    let cfg = load_and_validate(&path);
    assert_eq!(cfg, CoordinatorConfig::default());
    Ok(())
}

#[test]
fn config_file_values_are_clamped_on_load() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("pulse.json");
    fs::write(
        &path,
        r#"{"watch_interval": "100ms", "max_watchers": 9000, "binary_name": "srv"}"#,
    )?;

    let cfg = load_and_validate(&path);
    assert_eq!(cfg.watch.poll_interval, Duration::from_millis(500));
    assert_eq!(cfg.watch.max_watched_files, 500);
    assert_eq!(cfg.binary_name, "srv");
    Ok(())
}

#[test]
fn duration_strings() -> TestResult {
    assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
    assert_eq!(parse_duration("1s")?, Duration::from_secs(1));
    assert_eq!(parse_duration("1.5s")?, Duration::from_millis(1500));
    assert_eq!(parse_duration("1h30m")?, Duration::from_secs(5400));
    assert_eq!(parse_duration("250us")?, Duration::from_micros(250));
    assert_eq!(parse_duration("0")?, Duration::ZERO);

    assert!(parse_duration("").is_err());
    assert!(parse_duration("10").is_err());
    assert!(parse_duration("3 days").is_err());
    assert!(parse_duration("ms").is_err());
    Ok(())
}

#[test]
fn signed_duration_strings() -> TestResult {
    assert_eq!(parse_duration("+1s")?, Duration::from_secs(1));
    assert!(parse_duration("-1s").is_err());

    assert_eq!(
        parse_signed_duration("-1.5s")?,
        (true, Duration::from_millis(1500))
    );
    assert_eq!(parse_signed_duration("+2m")?, (false, Duration::from_secs(120)));
    assert_eq!(parse_signed_duration("-0")?, (false, Duration::ZERO));
    assert!(parse_signed_duration("-").is_err());
    assert!(parse_signed_duration("--1s").is_err());
    Ok(())
}

#[test]
fn durations_render_compactly() {
    assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    assert_eq!(format_duration(Duration::from_secs(1)), "1s");
    assert_eq!(format_duration(Duration::from_secs(3600)), "1h");
    assert_eq!(format_duration(Duration::from_secs(5400)), "1h30m");
    assert_eq!(format_duration(Duration::from_millis(1500)), "1.500s");
}
