//! Progress reporting seam between the supervisor and whatever renders it.

use std::path::Path;
use std::process::ExitStatus;

use liftoff_core::{CommandSpec, ServerUrls};

use crate::shutdown::ShutdownOutcome;
use crate::signals::ShutdownSignal;

/// Synchronous pipeline phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Install,
    Build,
}

impl Step {
    pub fn label(self) -> &'static str {
        match self {
            Step::Install => "Installing dependencies",
            Step::Build => "Building production bundle",
        }
    }
}

/// Receives supervisor progress events. Every method defaults to a no-op.
pub trait LaunchObserver {
    fn dependencies_present(&self, _dir: &Path) {}

    fn dependencies_missing(&self, _dir: &Path) {}

    fn step_started(&self, _step: Step, _command: &CommandSpec) {}

    fn step_succeeded(&self, _step: Step) {}

    fn step_failed(&self, _step: Step, _code: Option<i32>) {}

    /// The server process has been spawned.
    fn server_ready(&self, _urls: &ServerUrls) {}

    /// The server exited while no shutdown was in progress.
    fn child_exited(&self, _status: ExitStatus) {}

    fn shutdown_requested(&self, _signal: ShutdownSignal) {}

    fn server_stopped(&self, _outcome: &ShutdownOutcome) {}
}
