// src/engine/mod.rs

//! Coordination engine for pulse.
//!
//! A single coordinating task owns the child-process slot and reacts, one at
//! a time and in arrival order, to:
//! - rebuild requests from the change detector
//! - fatal errors (detector failures)
//! - shutdown requests (SIGINT / SIGTERM)
//!
//! The pure state machine lives in [`core`]; the async shell that reads the
//! inbox and performs process work is [`runtime`]; OS signal plumbing is in
//! [`signals`].

use std::fmt;

use crate::errors::PulseError;

/// Events flowing into the coordinator's inbox.
///
/// The inbox is a bounded `mpsc` channel with exactly one consumer, the
/// [`Coordinator`]. Producers are the detector task and the signal listener.
#[derive(Debug)]
pub enum CoordinatorEvent {
    /// One or more watched files changed during the last poll interval.
    RebuildRequested,
    /// Something that must end the supervisor (walk failure, watch limit).
    FatalError(PulseError),
    /// Graceful shutdown requested (Ctrl-C / SIGTERM).
    ShutdownRequested,
}

/// Lifecycle of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Running the initial build-and-run; no events consumed yet.
    Starting,
    /// Consuming events.
    Running,
    /// Stopping the child and the detector; new rebuilds are discarded.
    Draining,
    /// Cleanup finished.
    Terminated,
}

/// How the coordinator ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Signal-initiated (or all producers went away).
    Shutdown,
    /// A fatal error drained the loop.
    Fatal(PulseError),
}

impl RunOutcome {
    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Shutdown => 0,
            RunOutcome::Fatal(_) => 1,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, RunOutcome::Fatal(_))
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Shutdown => write!(f, "clean shutdown"),
            RunOutcome::Fatal(err) => write!(f, "fatal error: {err}"),
        }
    }
}

pub mod core;
pub mod runtime;
pub mod signals;

pub use self::core::{CoordinatorCore, CoreCommand, CoreStep};
pub use runtime::Coordinator;
pub use signals::{spawn_shutdown_forwarder, spawn_signal_listener};
