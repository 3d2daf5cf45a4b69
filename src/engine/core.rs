// src/engine/core.rs

//! Pure coordinator state machine.
//!
//! [`CoordinatorCore`] consumes [`CoordinatorEvent`]s and answers with the
//! list of actions the async shell must perform, in order. It has no
//! channels, no Tokio types and performs no IO, so every transition can be
//! unit tested directly.

use tracing::debug;

use crate::engine::{CoordinatorEvent, CoordinatorState, RunOutcome};

/// Action requested by the core, executed by the shell in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand {
    /// Kill and reap the current child, if any.
    StopProcess,
    /// Run the build and, on success, launch the artifact.
    BuildAndRun,
    /// Stop the change detector and wait for it.
    CancelDetector,
}

/// Decision returned by the core for a single event.
#[derive(Debug)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the shell should keep reading events afterwards.
    pub keep_running: bool,
    /// Set when this event started the drain.
    pub outcome: Option<RunOutcome>,
}

impl CoreStep {
    fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
            outcome: None,
        }
    }

    fn drain(outcome: RunOutcome) -> Self {
        Self {
            commands: vec![CoreCommand::StopProcess, CoreCommand::CancelDetector],
            keep_running: false,
            outcome: Some(outcome),
        }
    }

    fn ignored(keep_running: bool) -> Self {
        Self {
            commands: Vec::new(),
            keep_running,
            outcome: None,
        }
    }
}

#[derive(Debug)]
pub struct CoordinatorCore {
    state: CoordinatorState,
    rebuilds: u64,
    discarded: u64,
}

impl Default for CoordinatorCore {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinatorCore {
    pub fn new() -> Self {
        Self {
            state: CoordinatorState::Starting,
            rebuilds: 0,
            discarded: 0,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Rebuild cycles started after the initial build.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Rebuild requests dropped because they arrived while draining.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Commands for the initial build. Only meaningful while `Starting`.
    pub fn start(&self) -> Vec<CoreCommand> {
        match self.state {
            CoordinatorState::Starting => vec![CoreCommand::BuildAndRun],
            _ => Vec::new(),
        }
    }

    /// The initial build-and-run returned (whatever its result).
    pub fn initial_build_done(&mut self) {
        if self.state == CoordinatorState::Starting {
            self.state = CoordinatorState::Running;
        }
    }

    /// Cleanup after a drain has completed.
    pub fn finish(&mut self) {
        self.state = CoordinatorState::Terminated;
    }

    /// Handle a single event.
    pub fn step(&mut self, event: CoordinatorEvent) -> CoreStep {
        match self.state {
            CoordinatorState::Starting | CoordinatorState::Running => self.step_active(event),
            CoordinatorState::Draining | CoordinatorState::Terminated => {
                if matches!(event, CoordinatorEvent::RebuildRequested) {
                    self.discarded += 1;
                }
                debug!(?event, state = ?self.state, "discarding event after drain started");
                CoreStep::ignored(false)
            }
        }
    }

    fn step_active(&mut self, event: CoordinatorEvent) -> CoreStep {
        match event {
            CoordinatorEvent::RebuildRequested => {
                self.rebuilds += 1;
                CoreStep::continue_with(vec![CoreCommand::StopProcess, CoreCommand::BuildAndRun])
            }
            CoordinatorEvent::FatalError(err) => {
                self.state = CoordinatorState::Draining;
                CoreStep::drain(RunOutcome::Fatal(err))
            }
            CoordinatorEvent::ShutdownRequested => {
                self.state = CoordinatorState::Draining;
                CoreStep::drain(RunOutcome::Shutdown)
            }
        }
    }
}
