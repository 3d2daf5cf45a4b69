// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::BuildSpec;
use crate::exec::{BuildBackend, ProcessBackend, Sequencer, Supervisor};
use crate::watch::DetectorHandle;

use super::core::CoordinatorCore;
use super::{CoordinatorEvent, CoordinatorState, CoreCommand, RunOutcome};

/// Async shell around [`CoordinatorCore`].
///
/// Reads the single inbox, feeds each event to the core and performs the
/// returned commands to completion before reading the next event. That
/// serialization is what guarantees at most one build-and-run in flight.
pub struct Coordinator<B: BuildBackend, P: ProcessBackend> {
    core: CoordinatorCore,
    event_rx: mpsc::Receiver<CoordinatorEvent>,
    build: BuildSpec,
    sequencer: Sequencer<B>,
    supervisor: Supervisor<P>,
    detector: Option<DetectorHandle>,
}

impl<B: BuildBackend, P: ProcessBackend> fmt::Debug for Coordinator<B, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("core", &self.core)
            .field("build", &self.build)
            .finish_non_exhaustive()
    }
}

impl<B: BuildBackend, P: ProcessBackend> Coordinator<B, P> {
    pub fn new(
        build: BuildSpec,
        event_rx: mpsc::Receiver<CoordinatorEvent>,
        sequencer: Sequencer<B>,
        supervisor: Supervisor<P>,
    ) -> Self {
        Self {
            core: CoordinatorCore::new(),
            event_rx,
            build,
            sequencer,
            supervisor,
            detector: None,
        }
    }

    /// Hand over the detector so it is cancelled during the drain.
    pub fn attach_detector(&mut self, detector: DetectorHandle) {
        self.detector = Some(detector);
    }

    pub fn state(&self) -> CoordinatorState {
        self.core.state()
    }

    /// Main event loop.
    ///
    /// - Runs the initial build-and-run (its failure does not abort).
    /// - Consumes events one at a time until a fatal error or a shutdown.
    /// - Drains: stops the child, cancels the detector, discards whatever
    ///   is still queued.
    pub async fn run(mut self) -> RunOutcome {
        info!("pulse coordinator started");

        for command in self.core.start() {
            self.execute(command).await;
        }
        self.core.initial_build_done();

        let outcome = loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("coordinator inbox closed; shutting down");
                    CoordinatorEvent::ShutdownRequested
                }
            };

            debug!(?event, "coordinator received event");
            report(&event);

            let step = self.core.step(event);
            if !step.keep_running {
                // Nothing new may queue up while cleaning up.
                self.event_rx.close();
            }

            for command in step.commands {
                self.execute(command).await;
            }

            if !step.keep_running {
                break step.outcome.unwrap_or(RunOutcome::Shutdown);
            }
        };

        while let Ok(event) = self.event_rx.try_recv() {
            self.core.step(event);
        }
        self.core.finish();

        info!(
            outcome = %outcome,
            rebuilds = self.core.rebuilds(),
            discarded = self.core.discarded(),
            "coordinator terminated"
        );
        outcome
    }

    async fn execute(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::StopProcess => {
                self.supervisor.terminate().await;
            }
            CoreCommand::BuildAndRun => {
                let outcome = self
                    .sequencer
                    .build_and_run(&self.build, &mut self.supervisor)
                    .await;
                debug!(?outcome, "build-and-run finished");
            }
            CoreCommand::CancelDetector => {
                if let Some(detector) = self.detector.take() {
                    detector.cancel().await;
                }
            }
        }
    }
}

fn report(event: &CoordinatorEvent) {
    match event {
        CoordinatorEvent::RebuildRequested => info!("change detected; rebuilding"),
        CoordinatorEvent::FatalError(err) => error!(error = %err, "fatal error; shutting down"),
        CoordinatorEvent::ShutdownRequested => info!("pulse shutting down"),
    }
}
