//! `liftoff start` — install if needed, build, and supervise the production server.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use liftoff_core::LaunchOverrides;
use liftoff_supervisor::{launch_blocking, LaunchPlan};

use super::{load_config, ProjectArgs};
use crate::output::ConsoleObserver;

/// argv for a bare `liftoff`; argv[0] becomes the name in usage and errors.
const BARE_ARGV: [&str; 1] = ["liftoff"];

#[derive(Parser, Debug)]
pub struct StartArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Port the server listens on and the URLs advertise.
    #[arg(long, short = 'p', env = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Do not install dependencies even when node_modules is missing.
    #[arg(long)]
    pub skip_install: bool,

    /// Start the server from the existing build output.
    #[arg(long)]
    pub skip_build: bool,

    /// Seconds to wait for the server after a terminate request before killing it.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub shutdown_timeout: Option<u64>,
}

impl StartArgs {
    /// Arguments for a bare `liftoff` invocation: defaults plus `$PORT`.
    pub fn from_env() -> Self {
        Self::parse_from(BARE_ARGV)
    }

    pub fn run(self) -> Result<()> {
        let overrides = LaunchOverrides {
            port: self.port,
            shutdown_timeout: self.shutdown_timeout.map(Duration::from_secs),
            ..LaunchOverrides::default()
        };
        let (config, _) = load_config(&self.project, overrides)?;
        let observer = ConsoleObserver::new(&config);
        observer.banner();

        let plan = LaunchPlan {
            install: !self.skip_install,
            build: !self.skip_build,
            serve: true,
        };
        launch_blocking(&config, plan, &observer).map_err(|err| observer.fatal(err))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn bare_invocation_uses_binary_name() {
        let mut cmd = StartArgs::command();
        let err = cmd
            .try_get_matches_from_mut(BARE_ARGV.into_iter().chain(["--port", "0"]))
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert_eq!(cmd.get_bin_name(), Some("liftoff"));
    }
}
