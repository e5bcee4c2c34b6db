//! Termination signal listeners.
//!
//! Listeners must be registered before the server is spawned; once registered,
//! SIGINT/SIGTERM no longer terminate the supervisor and are delivered here.

use std::fmt;
use std::time::Duration;

use crate::error::SupervisorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownSignal::Interrupt => f.write_str("SIGINT"),
            ShutdownSignal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

#[cfg(unix)]
pub struct ShutdownSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    /// Must be called from within a tokio runtime.
    pub fn register() -> Result<Self, SupervisorError> {
        use tokio::signal::unix::{signal, SignalKind};

        let interrupt = signal(SignalKind::interrupt()).map_err(|source| {
            SupervisorError::Signal {
                signal: "SIGINT",
                source,
            }
        })?;
        let terminate = signal(SignalKind::terminate()).map_err(|source| {
            SupervisorError::Signal {
                signal: "SIGTERM",
                source,
            }
        })?;
        Ok(Self {
            interrupt,
            terminate,
        })
    }

    /// Resolves on the next SIGINT or SIGTERM.
    pub async fn recv(&mut self) -> ShutdownSignal {
        tokio::select! {
            _ = self.interrupt.recv() => ShutdownSignal::Interrupt,
            _ = self.terminate.recv() => ShutdownSignal::Terminate,
        }
    }
}

#[cfg(windows)]
pub struct ShutdownSignals {
    ctrl_c: tokio::signal::windows::CtrlC,
    ctrl_break: tokio::signal::windows::CtrlBreak,
}

#[cfg(windows)]
impl ShutdownSignals {
    pub fn register() -> Result<Self, SupervisorError> {
        use tokio::signal::windows::{ctrl_break, ctrl_c};

        let ctrl_c = ctrl_c().map_err(|source| SupervisorError::Signal {
            signal: "CTRL_C",
            source,
        })?;
        let ctrl_break = ctrl_break().map_err(|source| SupervisorError::Signal {
            signal: "CTRL_BREAK",
            source,
        })?;
        Ok(Self { ctrl_c, ctrl_break })
    }

    pub async fn recv(&mut self) -> ShutdownSignal {
        tokio::select! {
            _ = self.ctrl_c.recv() => ShutdownSignal::Interrupt,
            _ = self.ctrl_break.recv() => ShutdownSignal::Terminate,
        }
    }
}

impl ShutdownSignals {
    /// A signal already delivered, or arriving within `grace`.
    pub async fn pending_within(&mut self, grace: Duration) -> Option<ShutdownSignal> {
        tokio::time::timeout(grace, self.recv()).await.ok()
    }
}
