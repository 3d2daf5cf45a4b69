// tests/properties.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use pulse::config::model::{MAX_WATCHERS_LIMIT, MAX_WATCH_INTERVAL, MIN_WATCH_INTERVAL};
use pulse::config::validate::{clamp_interval, clamp_watchers};
use pulse::engine::{CoordinatorCore, CoordinatorEvent, CoreCommand};
use pulse::errors::PulseError;
use pulse::fs::mock::MockFileSystem;
use pulse::watch::Detector;
use pulse_test_utils::builders::WatchConfigBuilder;

const ROOT: &str = "/prop";
const FILES: usize = 12;

fn file(i: usize) -> PathBuf {
    Path::new(ROOT).join(format!("d{}/f{i:02}.go", i % 3))
}

#[derive(Debug, Clone)]
enum Ev {
    Rebuild,
    Fatal,
    Shutdown,
}

fn event_strategy() -> impl Strategy<Value = Ev> {
    prop_oneof![
        6 => Just(Ev::Rebuild),
        1 => Just(Ev::Fatal),
        1 => Just(Ev::Shutdown),
    ]
}

proptest! {
    /// Any number of edits between two polls yields exactly one positive
    /// poll, and the next poll is quiet again.
    #[test]
    fn edits_in_one_interval_coalesce(
        rounds in proptest::collection::vec(
            proptest::collection::btree_set(0..FILES, 0..FILES),
            1..6,
        )
    ) {
        let fs = MockFileSystem::with_root(ROOT);
        for i in 0..FILES {
            fs.add_file(file(i), "package main");
        }
        let cfg = WatchConfigBuilder::new(ROOT).build();
        let mut det = Detector::new(&cfg, Arc::new(fs.clone())).unwrap();
        det.prime().unwrap();

        for touched in rounds {
            for &i in &touched {
                fs.touch(file(i));
            }
            prop_assert_eq!(det.poll().unwrap(), !touched.is_empty());
            prop_assert!(!det.poll().unwrap());
        }
    }

    #[test]
    fn interval_always_within_bounds(millis in 0u64..10_000_000) {
        let mut issues = Vec::new();
        let value = format!("{millis}ms");
        let interval = clamp_interval(Some(value.as_str()), &mut issues);

        prop_assert!(interval >= MIN_WATCH_INTERVAL);
        prop_assert!(interval <= MAX_WATCH_INTERVAL);
        let requested = Duration::from_millis(millis);
        if requested >= MIN_WATCH_INTERVAL && requested <= MAX_WATCH_INTERVAL {
            prop_assert_eq!(interval, requested);
            prop_assert!(issues.is_empty());
        } else {
            prop_assert_eq!(issues.len(), 1);
        }
    }

    #[test]
    fn negative_interval_uses_minimum(millis in 1u64..10_000_000) {
        let mut issues = Vec::new();
        let value = format!("-{millis}ms");
        let interval = clamp_interval(Some(value.as_str()), &mut issues);

        prop_assert_eq!(interval, MIN_WATCH_INTERVAL);
        prop_assert_eq!(issues.len(), 1);
    }

    #[test]
    fn watchers_always_within_bounds(requested in any::<i64>()) {
        let mut issues = Vec::new();
        let max = clamp_watchers(Some(requested), &mut issues);

        prop_assert!(max >= 1);
        prop_assert!(max <= MAX_WATCHERS_LIMIT);
        if (1..=MAX_WATCHERS_LIMIT as i64).contains(&requested) {
            prop_assert_eq!(max as i64, requested);
        }
    }

    /// The core never asks for a build without stopping first, drains at
    /// most once, and does nothing after the drain started.
    #[test]
    fn core_drains_once_and_then_ignores_everything(
        events in proptest::collection::vec(event_strategy(), 0..40)
    ) {
        let mut core = CoordinatorCore::new();
        core.start();
        core.initial_build_done();

        let mut drains = 0;
        let mut rebuilds_before_drain = 0u64;
        let mut rebuilds_after_drain = 0u64;

        for ev in events {
            let draining = drains > 0;
            let event = match ev {
                Ev::Rebuild => {
                    if draining {
                        rebuilds_after_drain += 1;
                    } else {
                        rebuilds_before_drain += 1;
                    }
                    CoordinatorEvent::RebuildRequested
                }
                Ev::Fatal => CoordinatorEvent::FatalError(PulseError::WatchLimitExceeded { limit: 1 }),
                Ev::Shutdown => CoordinatorEvent::ShutdownRequested,
            };

            let step = core.step(event);
            if draining {
                prop_assert!(step.commands.is_empty());
                prop_assert!(step.outcome.is_none());
                continue;
            }

            if let Some(pos) = step.commands.iter().position(|c| *c == CoreCommand::BuildAndRun) {
                prop_assert!(pos > 0);
                prop_assert_eq!(step.commands[pos - 1], CoreCommand::StopProcess);
            }
            if step.outcome.is_some() {
                drains += 1;
                prop_assert!(!step.keep_running);
            }
        }

        prop_assert!(drains <= 1);
        prop_assert_eq!(core.rebuilds(), rebuilds_before_drain);
        prop_assert_eq!(core.discarded(), rebuilds_after_drain);
    }
}
