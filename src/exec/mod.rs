// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] abstracts how builds run and how children are spawned and
//!   killed, with `tokio::process` implementations for production.
//! - [`supervisor`] owns the single running child.
//! - [`sequencer`] runs the build and, on success, launches the artifact.

pub mod backend;
pub mod sequencer;
pub mod supervisor;

pub use backend::{
    BackendFuture, BuildBackend, BuildStatus, ProcessBackend, RealBuildBackend,
    RealProcessBackend,
};
pub use sequencer::{SequenceOutcome, Sequencer};
pub use supervisor::Supervisor;
