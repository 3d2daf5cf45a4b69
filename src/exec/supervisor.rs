// src/exec/supervisor.rs

use std::fmt;
use std::io;

use tracing::{debug, info, warn};

use crate::config::CommandSpec;
use crate::errors::{PulseError, Result};
use crate::exec::backend::ProcessBackend;

/// Owns the single child-process slot.
///
/// At most one handle is ever held. [`Supervisor::launch`] refuses to start
/// a second child; callers stop the current one first with
/// [`Supervisor::terminate`].
pub struct Supervisor<P: ProcessBackend> {
    backend: P,
    current: Option<P::Handle>,
}

impl<P: ProcessBackend> fmt::Debug for Supervisor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl<P: ProcessBackend> Supervisor<P> {
    pub fn new(backend: P) -> Self {
        Self {
            backend,
            current: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    /// 0 or 1.
    pub fn live_handles(&self) -> usize {
        usize::from(self.current.is_some())
    }

    pub fn backend(&self) -> &P {
        &self.backend
    }

    /// Start `command` as the supervised child.
    ///
    /// On failure nothing is recorded, so the slot stays empty.
    pub fn launch(&mut self, command: &CommandSpec) -> Result<()> {
        if self.current.is_some() {
            return Err(PulseError::LaunchFailed {
                command: command.to_string(),
                source: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "a supervised process is still running",
                ),
            });
        }

        let handle = self.backend.spawn(command)?;
        info!(pid = ?self.backend.pid(&handle), command = %command, "program started");
        self.current = Some(handle);
        Ok(())
    }

    /// Kill and reap the current child, if any.
    ///
    /// Safe to call with no child and safe to call repeatedly. Failures are
    /// logged; the slot is cleared either way.
    pub async fn terminate(&mut self) {
        let Some(handle) = self.current.take() else {
            debug!("no running program to stop");
            return;
        };

        let pid = self.backend.pid(&handle);
        info!(?pid, "stopping program");
        match self.backend.kill(handle).await {
            Ok(()) => debug!(?pid, "program stopped"),
            Err(e) => warn!(?pid, error = %e, "failed to stop program cleanly"),
        }
    }
}
