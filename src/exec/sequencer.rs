// src/exec/sequencer.rs

use std::time::Instant;

use tracing::{error, info};

use crate::config::BuildSpec;
use crate::errors::PulseError;
use crate::exec::backend::{BuildBackend, ProcessBackend};
use crate::exec::supervisor::Supervisor;

/// Result of one build-and-run attempt. None of these are fatal.
#[derive(Debug)]
pub enum SequenceOutcome {
    /// Build succeeded and the artifact is running under the supervisor.
    Launched,
    /// The build did not start or exited non-zero; nothing was launched.
    BuildFailed(PulseError),
    /// The build succeeded but the artifact could not be started.
    LaunchFailed(PulseError),
}

impl SequenceOutcome {
    pub fn is_launched(&self) -> bool {
        matches!(self, SequenceOutcome::Launched)
    }
}

/// Runs the build command and, only if it succeeds, launches the artifact.
#[derive(Debug)]
pub struct Sequencer<B: BuildBackend> {
    builder: B,
}

impl<B: BuildBackend> Sequencer<B> {
    pub fn new(builder: B) -> Self {
        Self { builder }
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// Build `spec` and hand the artifact to `supervisor`.
    ///
    /// Expects the previous child to have been stopped already.
    pub async fn build_and_run<P: ProcessBackend>(
        &mut self,
        spec: &BuildSpec,
        supervisor: &mut Supervisor<P>,
    ) -> SequenceOutcome {
        let build = spec.build_command_spec();
        info!(command = %build, "building");
        let started = Instant::now();

        match self.builder.run_build(&build).await {
            Ok(status) if status.success => {
                info!(elapsed_ms = started.elapsed().as_millis() as u64, "build successful");
            }
            Ok(status) => {
                let exit = status
                    .code
                    .map_or_else(|| "a signal".to_string(), |c| format!("status {c}"));
                let err = PulseError::BuildFailed(format!("'{build}' exited with {exit}"));
                error!(error = %err, "build failed; waiting for the next change");
                return SequenceOutcome::BuildFailed(err);
            }
            Err(err) => {
                error!(error = %err, "build failed; waiting for the next change");
                return SequenceOutcome::BuildFailed(err);
            }
        }

        let run = spec.run_command_spec();
        match supervisor.launch(&run) {
            Ok(()) => SequenceOutcome::Launched,
            Err(err) => {
                error!(error = %err, "could not start program; waiting for the next change");
                SequenceOutcome::LaunchFailed(err)
            }
        }
    }
}
