//! Ownership of the server child and its bounded shutdown.
//!
//! ```text
//!   Running ──signal──▶ ShuttingDown ──exit within timeout──▶ Stopped (Graceful)
//!      │                      └──────timeout, forced kill──▶ Stopped (Killed)
//!      └──────────child exits on its own──────────────────▶ Stopped (Graceful)
//! ```

use std::process::ExitStatus;
use std::time::Duration;

use liftoff_core::{CommandSpec, LaunchConfig};
use tokio::process::{Child, Command};

use crate::error::SupervisorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Running,
    ShuttingDown,
    Stopped,
}

/// How the server child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Exited by itself, or within the shutdown window after a terminate request.
    Graceful(ExitStatus),
    /// Still alive when the shutdown window elapsed; killed.
    Killed(ExitStatus),
}

impl ShutdownOutcome {
    pub fn status(&self) -> ExitStatus {
        match self {
            ShutdownOutcome::Graceful(status) | ShutdownOutcome::Killed(status) => *status,
        }
    }
}

/// Exclusive owner of the server process handle.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    child: Child,
    command: String,
    timeout: Duration,
    state: SupervisorState,
    outcome: Option<ShutdownOutcome>,
}

impl ShutdownCoordinator {
    /// Spawn `spec` in the project directory with the config's child environment.
    pub fn spawn(spec: &CommandSpec, config: &LaunchConfig) -> Result<Self, SupervisorError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(&config.project_dir)
            .envs(config.child_env())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|source| SupervisorError::Spawn {
            command: spec.to_string(),
            source,
        })?;
        tracing::debug!(pid = child.id(), command = %spec, "spawned server");
        Ok(Self::from_child(child, spec.to_string(), config.shutdown_timeout))
    }

    /// Take ownership of an already running child.
    pub fn from_child(child: Child, command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            child,
            command: command.into(),
            timeout,
            state: SupervisorState::Running,
            outcome: None,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// `None` once the child has been reaped.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the child to exit on its own. Cancel-safe.
    pub async fn wait(&mut self) -> Result<ExitStatus, SupervisorError> {
        if let Some(outcome) = self.outcome {
            return Ok(outcome.status());
        }
        let status = self.child.wait().await.map_err(|source| SupervisorError::Wait {
            command: self.command.clone(),
            source,
        })?;
        Ok(self.finish(ShutdownOutcome::Graceful(status)).status())
    }

    /// Ask the child to terminate, wait up to the shutdown timeout, then kill it.
    ///
    /// Calling this after the child has stopped returns the recorded outcome.
    /// A retry after a failed wait skips the terminate request and goes
    /// straight to the bounded wait and kill.
    pub async fn request_shutdown(&mut self) -> Result<ShutdownOutcome, SupervisorError> {
        if let Some(outcome) = self.outcome {
            return Ok(outcome);
        }
        if self.state == SupervisorState::Running {
            self.state = SupervisorState::ShuttingDown;
            self.send_terminate()?;
        }

        match tokio::time::timeout(self.timeout, self.child.wait()).await {
            Ok(Ok(status)) => Ok(self.finish(ShutdownOutcome::Graceful(status))),
            Ok(Err(source)) => Err(SupervisorError::Wait {
                command: self.command.clone(),
                source,
            }),
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.timeout.as_secs(),
                    command = %self.command,
                    "server ignored terminate request, killing"
                );
                self.child.kill().await.map_err(|source| SupervisorError::Wait {
                    command: self.command.clone(),
                    source,
                })?;
                let status = self.child.wait().await.map_err(|source| SupervisorError::Wait {
                    command: self.command.clone(),
                    source,
                })?;
                Ok(self.finish(ShutdownOutcome::Killed(status)))
            }
        }
    }

    fn finish(&mut self, outcome: ShutdownOutcome) -> ShutdownOutcome {
        self.state = SupervisorState::Stopped;
        self.outcome = Some(outcome);
        outcome
    }

    #[cfg(unix)]
    fn send_terminate(&mut self) -> Result<(), SupervisorError> {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            // ESRCH: exited between the id() check and the signal.
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(errno) => Err(SupervisorError::Terminate {
                pid,
                message: errno.to_string(),
            }),
        }
    }

    #[cfg(not(unix))]
    fn send_terminate(&mut self) -> Result<(), SupervisorError> {
        let pid = self.child.id().unwrap_or_default();
        self.child
            .start_kill()
            .map_err(|err| SupervisorError::Terminate {
                pid,
                message: err.to_string(),
            })
    }
}
