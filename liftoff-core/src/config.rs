//! Launch configuration.
//!
//! A [`LaunchConfig`] is assembled once at startup from four layers, highest
//! priority first:
//!
//! 1. [`LaunchOverrides`] — CLI flags (and `$PORT`, which clap folds into `--port`)
//! 2. [`Manifest`] — optional `<project>/liftoff.yaml`
//! 3. [`ProjectHints`] — what the detector found in `package.json` / lockfiles
//! 4. built-in defaults
//!
//! Per-step commands in the manifest always win over the package manager's
//! generated commands, whichever layer picked the package manager.

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::network::ServerUrls;
use crate::types::{CommandSet, CommandSpec, PackageManager};

pub const MANIFEST_FILE: &str = "liftoff.yaml";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DEPENDENCY_DIR: &str = "node_modules";
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);
pub const WILDCARD_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Child environment variable carrying the listening port.
pub const PORT_ENV: &str = "PORT";
/// Child environment variable carrying the bind address.
pub const HOSTNAME_ENV: &str = "HOSTNAME";

// ---------------------------------------------------------------------------
// Manifest (liftoff.yaml)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<PackageManager>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutdown_timeout_secs: Option<u64>,
    #[serde(default)]
    pub commands: ManifestCommands,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestCommands {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<CommandSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<CommandSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<CommandSpec>,
}

impl Manifest {
    /// Parse manifest YAML. `path` is only used for error context.
    pub fn from_yaml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `<project_dir>/liftoff.yaml` — pure, no I/O.
pub fn manifest_path(project_dir: &Path) -> PathBuf {
    project_dir.join(MANIFEST_FILE)
}

/// Load `<project_dir>/liftoff.yaml`, or `None` when the file does not exist.
pub fn load_manifest(project_dir: &Path) -> Result<Option<Manifest>, ConfigError> {
    let path = manifest_path(project_dir);
    if !path.is_file() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Manifest::from_yaml(&path, &content).map(Some)
}

// ---------------------------------------------------------------------------
// Override layers
// ---------------------------------------------------------------------------

/// Values supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOverrides {
    pub port: Option<u16>,
    pub package_manager: Option<PackageManager>,
    pub shutdown_timeout: Option<Duration>,
}

/// Values inferred from the project on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectHints {
    pub app_name: Option<String>,
    pub package_manager: Option<PackageManager>,
}

// ---------------------------------------------------------------------------
// LaunchConfig
// ---------------------------------------------------------------------------

/// Immutable launch settings, constructed once and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub project_dir: PathBuf,
    pub app_name: String,
    pub tagline: Option<String>,
    pub port: u16,
    pub bind_address: IpAddr,
    pub dependency_dir: PathBuf,
    pub package_manager: PackageManager,
    pub commands: CommandSet,
    pub shutdown_timeout: Duration,
}

impl LaunchConfig {
    /// Defaults for `project_dir`: npm, port 3000, `node_modules`, 10 s shutdown.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        Self {
            app_name: dir_name(&project_dir),
            project_dir,
            tagline: None,
            port: DEFAULT_PORT,
            bind_address: WILDCARD_ADDRESS,
            dependency_dir: PathBuf::from(DEFAULT_DEPENDENCY_DIR),
            package_manager: PackageManager::default(),
            commands: CommandSet::default(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Merge all layers into a final configuration.
    pub fn resolve(
        project_dir: impl Into<PathBuf>,
        manifest: Option<Manifest>,
        hints: ProjectHints,
        overrides: LaunchOverrides,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::new(project_dir);
        let manifest = manifest.unwrap_or_default();

        if let Some(name) = manifest.name.or(hints.app_name) {
            config.app_name = name;
        }
        config.tagline = manifest.tagline;

        config.port = match overrides.port.or(manifest.port) {
            Some(0) => return Err(ConfigError::InvalidPort(0)),
            Some(port) => port,
            None => DEFAULT_PORT,
        };

        if let Some(dir) = manifest.dependency_dir {
            config.dependency_dir = dir;
        }

        config.shutdown_timeout = match overrides
            .shutdown_timeout
            .or(manifest.shutdown_timeout_secs.map(Duration::from_secs))
        {
            Some(timeout) if timeout < Duration::from_secs(1) => {
                return Err(ConfigError::InvalidShutdownTimeout)
            }
            Some(timeout) => timeout,
            None => DEFAULT_SHUTDOWN_TIMEOUT,
        };

        config.package_manager = overrides
            .package_manager
            .or(manifest.package_manager)
            .or(hints.package_manager)
            .unwrap_or_default();

        let generated = config.package_manager.commands();
        let ManifestCommands {
            install,
            build,
            start,
        } = manifest.commands;
        config.commands = CommandSet {
            install: install.unwrap_or(generated.install),
            build: build.unwrap_or(generated.build),
            start: start.unwrap_or(generated.start),
        };

        Ok(config)
    }

    /// Absolute location of the dependency directory whose presence skips install.
    pub fn dependency_path(&self) -> PathBuf {
        self.project_dir.join(&self.dependency_dir)
    }

    /// Environment overrides handed to the server process on top of the inherited env.
    pub fn child_env(&self) -> [(&'static str, String); 2] {
        [
            (PORT_ENV, self.port.to_string()),
            (HOSTNAME_ENV, self.bind_address.to_string()),
        ]
    }

    /// Advertised URLs for a given network address.
    pub fn urls(&self, network_ip: IpAddr) -> ServerUrls {
        ServerUrls::new(self.port, network_ip)
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "app".to_string())
}
