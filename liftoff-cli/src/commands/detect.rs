//! `liftoff detect` — show the resolved launch plan without running anything.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use liftoff_core::{LaunchOverrides, PackageManager};
use liftoff_detector::ManagerSource;

use super::{load_config, ProjectArgs};

#[derive(Args, Debug)]
pub struct DetectArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Port to report; same source as `liftoff start --port`.
    #[arg(long, short = 'p', env = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Emit JSON instead of a human-readable summary.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct DetectReport {
    project_dir: PathBuf,
    app_name: String,
    package_json: bool,
    package_manager: PackageManager,
    manager_source: Option<ManagerSource>,
    framework: Option<String>,
    scripts: BTreeSet<String>,
    port: u16,
    install: String,
    build: String,
    start: String,
}

impl DetectArgs {
    pub fn run(self) -> Result<()> {
        let overrides = LaunchOverrides {
            port: self.port,
            ..LaunchOverrides::default()
        };
        let (config, project) = load_config(&self.project, overrides)?;

        let report = DetectReport {
            project_dir: config.project_dir.clone(),
            app_name: config.app_name.clone(),
            package_json: project.is_some(),
            package_manager: config.package_manager,
            manager_source: project.as_ref().map(|p| p.manager_source.clone()),
            framework: project.as_ref().and_then(|p| p.framework.clone()),
            scripts: project.map(|p| p.scripts).unwrap_or_default(),
            port: config.port,
            install: config.commands.install.to_string(),
            build: config.commands.build.to_string(),
            start: config.commands.start.to_string(),
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to render detect JSON")?
            );
            return Ok(());
        }

        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &DetectReport) {
    println!("{}", report.app_name.bold());
    println!("  {:<16}{}", "directory", report.project_dir.display());
    if !report.package_json {
        println!("  {:<16}{}", "package.json", "not found".yellow());
    }
    let source = match &report.manager_source {
        Some(ManagerSource::PackageManagerField) => "packageManager field".to_string(),
        Some(ManagerSource::Lockfile(name)) => name.clone(),
        Some(ManagerSource::Default) | None => "default".to_string(),
    };
    println!(
        "  {:<16}{} {}",
        "package manager",
        report.package_manager,
        format!("({source})").dimmed()
    );
    if let Some(framework) = &report.framework {
        println!("  {:<16}{}", "framework", framework);
    }
    if report.package_json {
        for script in ["build", "start"] {
            let mark = if report.scripts.contains(script) {
                "✓".green()
            } else {
                "✗".red()
            };
            println!("  {:<16}{}", format!("script {script}"), mark);
        }
    }
    println!("  {:<16}{}", "port", report.port);
    println!("  {:<16}{}", "install", report.install);
    println!("  {:<16}{}", "build", report.build);
    println!("  {:<16}{}", "start", report.start);
}
