// src/exec/backend.rs

//! Pluggable process backends.
//!
//! The supervisor and the sequencer talk to a [`ProcessBackend`] and a
//! [`BuildBackend`] instead of `tokio::process` directly. Production uses
//! [`RealProcessBackend`] / [`RealBuildBackend`]; tests swap in fakes that
//! record what would have been spawned or killed.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::debug;

use crate::config::CommandSpec;
use crate::errors::{PulseError, Result};

/// Boxed future returned by backend methods.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Exit status of a finished build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStatus {
    pub success: bool,
    /// `None` when the build was terminated by a signal.
    pub code: Option<i32>,
}

impl BuildStatus {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    pub fn failed(code: i32) -> Self {
        Self {
            success: false,
            code: Some(code),
        }
    }
}

/// Runs a build command to completion.
pub trait BuildBackend: Send {
    /// Run `command` and wait for it.
    ///
    /// `Err` means the command could not be started at all; a command that
    /// ran and exited non-zero is `Ok` with `success == false`.
    fn run_build<'a>(&'a mut self, command: &'a CommandSpec)
    -> BackendFuture<'a, Result<BuildStatus>>;
}

/// Starts and stops long-running child processes.
pub trait ProcessBackend: Send {
    /// Opaque handle for one running child.
    type Handle: Send + fmt::Debug;

    /// Start `command` without waiting for it.
    fn spawn(&mut self, command: &CommandSpec) -> Result<Self::Handle>;

    /// Kill the child and wait until it has been reaped.
    ///
    /// A child that already exited on its own is not an error.
    fn kill(&mut self, handle: Self::Handle) -> BackendFuture<'_, Result<()>>;

    /// OS process id, for logging.
    fn pid(&self, handle: &Self::Handle) -> Option<u32>;
}

/// Runs builds with `tokio::process`.
///
/// Standard output of the build is discarded; its error stream is passed
/// through so compiler diagnostics reach the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealBuildBackend;

impl RealBuildBackend {
    pub fn new() -> Self {
        Self
    }
}

impl BuildBackend for RealBuildBackend {
    fn run_build<'a>(
        &'a mut self,
        command: &'a CommandSpec,
    ) -> BackendFuture<'a, Result<BuildStatus>> {
        Box::pin(async move {
            let status = Command::new(&command.program)
                .args(&command.args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::inherit())
                .kill_on_drop(true)
                .status()
                .await
                .map_err(|e| PulseError::BuildFailed(format!("could not start '{command}': {e}")))?;

            Ok(BuildStatus {
                success: status.success(),
                code: status.code(),
            })
        })
    }
}

/// Spawns the built program with `tokio::process`.
///
/// Both output streams are inherited. Children are created with
/// `kill_on_drop` so an abandoned handle never leaks a process.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealProcessBackend;

impl RealProcessBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessBackend for RealProcessBackend {
    type Handle = Child;

    fn spawn(&mut self, command: &CommandSpec) -> Result<Child> {
        Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PulseError::LaunchFailed {
                command: command.to_string(),
                source,
            })
    }

    fn kill(&mut self, mut child: Child) -> BackendFuture<'_, Result<()>> {
        Box::pin(async move {
            if let Err(e) = child.start_kill() {
                debug!(error = %e, "child already exited before kill");
            }
            let status = child.wait().await?;
            debug!(?status, "child reaped");
            Ok(())
        })
    }

    fn pid(&self, handle: &Child) -> Option<u32> {
        handle.id()
    }
}
