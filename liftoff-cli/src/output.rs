//! Console rendering of supervisor progress.

use std::path::Path;
use std::process::ExitStatus;

use colored::Colorize;

use liftoff_core::{CommandSpec, LaunchConfig, ServerUrls};
use liftoff_supervisor::{
    describe_exit, LaunchObserver, ShutdownOutcome, ShutdownSignal, Step, SupervisorError,
};

const RULE_WIDTH: usize = 56;

const LOGO: &str = r"
  ██╗     ██╗███████╗████████╗ ██████╗ ███████╗███████╗
  ██║     ██║██╔════╝╚══██╔══╝██╔═══██╗██╔════╝██╔════╝
  ██║     ██║█████╗     ██║   ██║   ██║█████╗  █████╗
  ██║     ██║██╔══╝     ██║   ██║   ██║██╔══╝  ██╔══╝
  ███████╗██║██║        ██║   ╚██████╔╝██║     ██║
  ╚══════╝╚═╝╚═╝        ╚═╝    ╚═════╝ ╚═╝     ╚═╝";

/// Human-readable status output on stdout.
pub struct ConsoleObserver {
    app_name: String,
    tagline: Option<String>,
}

impl ConsoleObserver {
    pub fn new(config: &LaunchConfig) -> Self {
        Self {
            app_name: config.app_name.clone(),
            tagline: config.tagline.clone(),
        }
    }

    pub fn banner(&self) {
        println!("{}", LOGO.cyan().bold());
        println!();
        match &self.tagline {
            Some(tagline) => println!(
                "  {} {}",
                self.app_name.bold(),
                format!("— {tagline}").dimmed()
            ),
            None => println!("  {}", self.app_name.bold()),
        }
    }

    /// Final line of `liftoff build`.
    pub fn prepared(&self) {
        println!(
            "\n{}",
            format!(
                "✔  {} is built. Run `liftoff start --skip-build` to serve it.",
                self.app_name
            )
            .green()
        );
    }

    /// Report an error that no observer event has described yet, and hand it back.
    pub fn fatal(&self, err: SupervisorError) -> anyhow::Error {
        match &err {
            SupervisorError::StepFailed { .. } | SupervisorError::ForcedKill { .. } => {}
            other => println!("{}", format!("✖  {other}").red()),
        }
        err.into()
    }

    fn rule() -> String {
        "─".repeat(RULE_WIDTH).bold().to_string()
    }
}

impl LaunchObserver for ConsoleObserver {
    fn dependencies_present(&self, _dir: &Path) {
        println!("{}", "✔  Dependencies already installed".green());
    }

    fn dependencies_missing(&self, dir: &Path) {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        println!(
            "{}",
            format!("📦 {name} not found — installing dependencies...").yellow()
        );
    }

    fn step_started(&self, step: Step, command: &CommandSpec) {
        println!("\n{}", format!("⏳ {}...", step.label()).yellow());
        println!("{}", format!("   $ {command}").dimmed());
    }

    fn step_succeeded(&self, step: Step) {
        println!("{}", format!("✔  {} complete", step.label()).green());
    }

    fn step_failed(&self, step: Step, code: Option<i32>) {
        println!(
            "{}",
            format!("✖  {} failed ({})", step.label(), describe_exit(&code)).red()
        );
    }

    fn server_ready(&self, urls: &ServerUrls) {
        println!();
        println!("{}", Self::rule());
        println!("{}", format!("  ✔  {} is ready!", self.app_name).green().bold());
        println!();
        println!("  {}     {}", "Local:".bold(), urls.local.cyan());
        println!("  {}   {}", "Network:".bold(), urls.network.cyan());
        println!();
        println!("{}", "  Press Ctrl+C to stop the server".dimmed());
        println!("{}", Self::rule());
        println!();
    }

    fn child_exited(&self, status: ExitStatus) {
        if status.success() {
            println!("{}", format!("⏹  {} exited.", self.app_name).dimmed());
        } else {
            println!(
                "{}",
                format!("⚠  {} exited ({})", self.app_name, describe_exit(&status.code()))
                    .yellow()
            );
        }
    }

    fn shutdown_requested(&self, _signal: ShutdownSignal) {
        println!("\n{}", format!("⏹  Shutting down {}...", self.app_name).yellow());
    }

    fn server_stopped(&self, outcome: &ShutdownOutcome) {
        match outcome {
            ShutdownOutcome::Graceful(_) => println!("{}", "✔  Server stopped.".green()),
            ShutdownOutcome::Killed(_) => {
                println!("{}", "✖  Server did not stop in time and was killed.".red())
            }
        }
    }
}
