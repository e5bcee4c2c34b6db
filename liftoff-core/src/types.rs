//! Domain types shared by the detector, supervisor, and CLI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Package managers
// ---------------------------------------------------------------------------

/// Node package manager used to install, build, and start the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    pub const ALL: [PackageManager; 4] = [
        PackageManager::Npm,
        PackageManager::Yarn,
        PackageManager::Pnpm,
        PackageManager::Bun,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Bun => "bun",
        }
    }

    /// Executable to invoke on the current target.
    ///
    /// npm, yarn and pnpm ship as `.cmd` shims on Windows, which `CreateProcess`
    /// will not resolve from a bare name.
    pub fn executable(self) -> &'static str {
        if cfg!(windows) {
            match self {
                PackageManager::Npm => "npm.cmd",
                PackageManager::Yarn => "yarn.cmd",
                PackageManager::Pnpm => "pnpm.cmd",
                PackageManager::Bun => "bun.exe",
            }
        } else {
            self.name()
        }
    }

    /// `<pm> install`
    pub fn install(self) -> CommandSpec {
        CommandSpec::new(self.executable(), ["install"])
    }

    /// `<pm> run <script>`
    pub fn run_script(self, script: &str) -> CommandSpec {
        CommandSpec::new(self.executable(), ["run", script])
    }

    /// Install / build / start commands for this package manager.
    pub fn commands(self) -> CommandSet {
        CommandSet {
            install: self.install(),
            build: self.run_script("build"),
            start: self.run_script("start"),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PackageManager {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "npm" => Ok(Self::Npm),
            "yarn" => Ok(Self::Yarn),
            "pnpm" => Ok(Self::Pnpm),
            "bun" => Ok(Self::Bun),
            other => Err(ConfigError::UnknownPackageManager(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Command vectors
// ---------------------------------------------------------------------------

/// An external program plus its argument vector. Never passed through a shell.
///
/// Serialized as a flat YAML/JSON list: `["pnpm", "run", "build"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for CommandSpec {
    type Error = ConfigError;

    fn try_from(argv: Vec<String>) -> Result<Self, Self::Error> {
        let mut argv = argv.into_iter();
        let program = argv
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or(ConfigError::EmptyCommand)?;
        Ok(Self {
            program,
            args: argv.collect(),
        })
    }
}

impl From<CommandSpec> for Vec<String> {
    fn from(spec: CommandSpec) -> Self {
        std::iter::once(spec.program).chain(spec.args).collect()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// The three commands the launcher sequences, in pipeline order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSet {
    pub install: CommandSpec,
    pub build: CommandSpec,
    pub start: CommandSpec,
}

impl Default for CommandSet {
    fn default() -> Self {
        PackageManager::default().commands()
    }
}
