//! Error types for liftoff-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while assembling a [`crate::LaunchConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading the manifest or resolving the project directory.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `liftoff.yaml` exists but is not valid for the manifest schema.
    #[error("failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A command vector without a program.
    #[error("command must name a program; got an empty list")]
    EmptyCommand,

    #[error("unknown package manager '{0}'; expected: npm, yarn, pnpm, bun")]
    UnknownPackageManager(String),

    #[error("port must be between 1 and 65535, got {0}")]
    InvalidPort(u16),

    #[error("shutdown timeout must be at least one second")]
    InvalidShutdownTimeout,
}
