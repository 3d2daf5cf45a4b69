use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Notify;

use pulse::config::CommandSpec;
use pulse::errors::{PulseError, Result};
use pulse::exec::{BackendFuture, BuildBackend, BuildStatus, ProcessBackend};

/// Something a fake backend was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A build ran; carries the rendered command line.
    Build(String),
    /// A child with this id was started.
    Spawn(u32),
    /// The child with this id was killed and reaped.
    Kill(u32),
}

/// Ordered log shared by the fake backends.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    actions: Arc<Mutex<Vec<Action>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Action>> {
        self.actions.lock().unwrap()
    }

    pub fn record(&self, action: Action) {
        self.lock().push(action);
    }

    pub fn actions(&self) -> Vec<Action> {
        self.lock().clone()
    }

    pub fn builds(&self) -> usize {
        self.lock()
            .iter()
            .filter(|a| matches!(a, Action::Build(_)))
            .count()
    }

    pub fn spawns(&self) -> usize {
        self.lock()
            .iter()
            .filter(|a| matches!(a, Action::Spawn(_)))
            .count()
    }

    pub fn kills(&self) -> usize {
        self.lock()
            .iter()
            .filter(|a| matches!(a, Action::Kill(_)))
            .count()
    }
}

/// Scripted result for one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildScript {
    Succeed,
    ExitWith(i32),
    /// The build program could not be started at all.
    CannotStart,
}

/// Lets a test hold a specific build open.
#[derive(Debug, Clone, Default)]
pub struct BuildGate {
    /// Notified once the gated build has started.
    pub started: Arc<Notify>,
    /// Notify to let the gated build finish.
    pub release: Arc<Notify>,
}

/// Build backend that records builds and returns scripted results.
///
/// Builds not covered by the script succeed.
#[derive(Debug)]
pub struct FakeBuildBackend {
    journal: Journal,
    script: VecDeque<BuildScript>,
    gate: Option<(usize, BuildGate)>,
    calls: usize,
}

impl FakeBuildBackend {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            script: VecDeque::new(),
            gate: None,
            calls: 0,
        }
    }

    /// Queue results for the next builds, in order.
    pub fn script(mut self, results: &[BuildScript]) -> Self {
        self.script.extend(results.iter().copied());
        self
    }

    /// Block the `n`-th build (1-based) until the returned gate is released.
    pub fn pause_on(mut self, n: usize) -> (Self, BuildGate) {
        let gate = BuildGate::default();
        self.gate = Some((n, gate.clone()));
        (self, gate)
    }
}

impl BuildBackend for FakeBuildBackend {
    fn run_build<'a>(
        &'a mut self,
        command: &'a CommandSpec,
    ) -> BackendFuture<'a, Result<BuildStatus>> {
        Box::pin(async move {
            self.calls += 1;
            self.journal.record(Action::Build(command.to_string()));

            if let Some((n, gate)) = &self.gate {
                if *n == self.calls {
                    gate.started.notify_one();
                    gate.release.notified().await;
                }
            }

            match self.script.pop_front().unwrap_or(BuildScript::Succeed) {
                BuildScript::Succeed => Ok(BuildStatus::succeeded()),
                BuildScript::ExitWith(code) => Ok(BuildStatus::failed(code)),
                BuildScript::CannotStart => Err(PulseError::BuildFailed(format!(
                    "could not start '{command}': not found"
                ))),
            }
        })
    }
}

/// Handle returned by [`FakeProcessBackend`].
#[derive(Debug, PartialEq, Eq)]
pub struct FakeChild {
    pub id: u32,
}

#[derive(Debug, Default)]
struct ProcessState {
    next_id: u32,
    live: usize,
    max_live: usize,
    failing_spawns: usize,
    launched: Vec<String>,
}

/// Process backend that only counts children.
///
/// Clones share state, so a test can keep one to inspect after handing the
/// other to a supervisor.
#[derive(Debug, Clone)]
pub struct FakeProcessBackend {
    journal: Journal,
    state: Arc<Mutex<ProcessState>>,
}

impl FakeProcessBackend {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            state: Arc::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProcessState> {
        self.state.lock().unwrap()
    }

    /// Make the next `n` spawns fail as if the executable were missing.
    pub fn fail_next_spawns(&self, n: usize) {
        self.lock().failing_spawns = n;
    }

    /// Children started and not yet killed.
    pub fn live(&self) -> usize {
        self.lock().live
    }

    /// Highest number of simultaneously live children ever seen.
    pub fn max_live(&self) -> usize {
        self.lock().max_live
    }

    /// Rendered command lines of every successful spawn.
    pub fn launched(&self) -> Vec<String> {
        self.lock().launched.clone()
    }
}

impl ProcessBackend for FakeProcessBackend {
    type Handle = FakeChild;

    fn spawn(&mut self, command: &CommandSpec) -> Result<FakeChild> {
        let mut state = self.lock();
        if state.failing_spawns > 0 {
            state.failing_spawns -= 1;
            return Err(PulseError::LaunchFailed {
                command: command.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
            });
        }

        state.next_id += 1;
        state.live += 1;
        state.max_live = state.max_live.max(state.live);
        state.launched.push(command.to_string());
        let id = state.next_id;
        drop(state);

        self.journal.record(Action::Spawn(id));
        Ok(FakeChild { id })
    }

    fn kill(&mut self, handle: FakeChild) -> BackendFuture<'_, Result<()>> {
        Box::pin(async move {
            self.lock().live -= 1;
            self.journal.record(Action::Kill(handle.id));
            Ok(())
        })
    }

    fn pid(&self, handle: &FakeChild) -> Option<u32> {
        Some(handle.id)
    }
}
