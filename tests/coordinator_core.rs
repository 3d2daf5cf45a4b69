// tests/coordinator_core.rs

use pulse::engine::{
    CoordinatorCore, CoordinatorEvent, CoordinatorState, CoreCommand, RunOutcome,
};
use pulse::errors::PulseError;

fn running_core() -> CoordinatorCore {
    let mut core = CoordinatorCore::new();
    assert_eq!(core.start(), vec![CoreCommand::BuildAndRun]);
    core.initial_build_done();
    core
}

#[test]
fn starts_with_a_single_build() {
    let mut core = CoordinatorCore::new();
    assert_eq!(core.state(), CoordinatorState::Starting);
    assert_eq!(core.start(), vec![CoreCommand::BuildAndRun]);

    core.initial_build_done();
    assert_eq!(core.state(), CoordinatorState::Running);
    assert!(core.start().is_empty());
}

#[test]
fn rebuild_stops_before_building() {
    let mut core = running_core();
    let step = core.step(CoordinatorEvent::RebuildRequested);

    assert_eq!(
        step.commands,
        vec![CoreCommand::StopProcess, CoreCommand::BuildAndRun]
    );
    assert!(step.keep_running);
    assert!(step.outcome.is_none());
    assert_eq!(core.rebuilds(), 1);
    assert_eq!(core.state(), CoordinatorState::Running);
}

#[test]
fn shutdown_drains_with_clean_outcome() {
    let mut core = running_core();
    let step = core.step(CoordinatorEvent::ShutdownRequested);

    assert_eq!(
        step.commands,
        vec![CoreCommand::StopProcess, CoreCommand::CancelDetector]
    );
    assert!(!step.keep_running);
    let outcome = step.outcome.unwrap();
    assert!(!outcome.is_fatal());
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(core.state(), CoordinatorState::Draining);
}

#[test]
fn fatal_error_drains_with_exit_code_one() {
    let mut core = running_core();
    let step = core.step(CoordinatorEvent::FatalError(
        PulseError::WatchLimitExceeded { limit: 100 },
    ));

    assert_eq!(
        step.commands,
        vec![CoreCommand::StopProcess, CoreCommand::CancelDetector]
    );
    assert!(!step.keep_running);
    match step.outcome {
        Some(RunOutcome::Fatal(PulseError::WatchLimitExceeded { limit })) => {
            assert_eq!(limit, 100)
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(core.state(), CoordinatorState::Draining);
}

#[test]
fn events_after_drain_are_discarded() {
    let mut core = running_core();
    core.step(CoordinatorEvent::ShutdownRequested);

    let step = core.step(CoordinatorEvent::RebuildRequested);
    assert!(step.commands.is_empty());
    assert!(!step.keep_running);
    assert!(step.outcome.is_none());

    let step = core.step(CoordinatorEvent::ShutdownRequested);
    assert!(step.commands.is_empty());
    assert!(step.outcome.is_none());

    assert_eq!(core.discarded(), 1);
    assert_eq!(core.rebuilds(), 0);

    core.finish();
    assert_eq!(core.state(), CoordinatorState::Terminated);
    assert!(core.step(CoordinatorEvent::RebuildRequested).commands.is_empty());
    assert_eq!(core.discarded(), 2);
}

#[test]
fn events_before_initial_build_completes_are_still_handled() {
    let mut core = CoordinatorCore::new();
    let step = core.step(CoordinatorEvent::RebuildRequested);
    assert_eq!(
        step.commands,
        vec![CoreCommand::StopProcess, CoreCommand::BuildAndRun]
    );
}

#[test]
fn outcome_display() {
    assert_eq!(RunOutcome::Shutdown.to_string(), "clean shutdown");
    let fatal = RunOutcome::Fatal(PulseError::WatchLimitExceeded { limit: 5 });
    assert!(fatal.to_string().starts_with("fatal error: watch limit exceeded"));
}
