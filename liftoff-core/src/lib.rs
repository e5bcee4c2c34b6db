//! Liftoff core library — launch configuration, command specs, network helpers, errors.
//!
//! Public API surface:
//! - [`types`] — package managers and command vectors
//! - [`config`] — [`LaunchConfig`] and the optional `liftoff.yaml` manifest
//! - [`network`] — local IP probe and advertised server URLs
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod network;
pub mod types;

pub use config::{LaunchConfig, LaunchOverrides, Manifest, ProjectHints};
pub use error::ConfigError;
pub use network::ServerUrls;
pub use types::{CommandSet, CommandSpec, PackageManager};
