use std::time::Duration;

use thiserror::Error;

/// Error surface for the install, build, and serve phases.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The external program could not be started at all.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A synchronous phase (install or build) exited unsuccessfully.
    #[error("{label} failed ({})", describe_exit(.code))]
    StepFailed { label: &'static str, code: Option<i32> },

    #[error("failed waiting for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to register {signal} handler: {source}")]
    Signal {
        signal: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to send terminate request to pid {pid}: {message}")]
    Terminate { pid: u32, message: String },

    /// The server ignored the terminate request for the whole shutdown window.
    #[error("server did not stop within {}s and was killed", .timeout.as_secs())]
    ForcedKill { timeout: Duration },

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// `exit code 3`, or `terminated by signal` when there is no code.
pub fn describe_exit(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}
