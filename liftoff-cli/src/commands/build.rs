//! `liftoff build` — install if needed and build, without serving.

use anyhow::Result;
use clap::Args;

use liftoff_core::LaunchOverrides;
use liftoff_supervisor::{launch_blocking, LaunchPlan};

use super::{load_config, ProjectArgs};
use crate::output::ConsoleObserver;

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Do not install dependencies even when node_modules is missing.
    #[arg(long)]
    pub skip_install: bool,
}

impl BuildArgs {
    pub fn run(self) -> Result<()> {
        let (config, _) = load_config(&self.project, LaunchOverrides::default())?;
        let observer = ConsoleObserver::new(&config);

        let plan = LaunchPlan {
            install: !self.skip_install,
            build: true,
            serve: false,
        };
        launch_blocking(&config, plan, &observer).map_err(|err| observer.fatal(err))?;
        observer.prepared();
        Ok(())
    }
}
