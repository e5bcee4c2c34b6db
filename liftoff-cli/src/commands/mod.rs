pub mod build;
pub mod detect;
pub mod start;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use liftoff_core::config::load_manifest;
use liftoff_core::{LaunchConfig, LaunchOverrides, PackageManager, ProjectHints};
use liftoff_detector::{detect_project, DetectError, NodeProject};

/// Project selection flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Directory containing package.json (and optionally liftoff.yaml).
    #[arg(long, short = 'C', value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Package manager to drive: npm | yarn | pnpm | bun. Detected when omitted.
    #[arg(long, value_name = "PM")]
    pub package_manager: Option<PackageManager>,
}

impl ProjectArgs {
    pub fn canonical_dir(&self) -> Result<PathBuf> {
        self.project_dir
            .canonicalize()
            .with_context(|| format!("cannot resolve path '{}'", self.project_dir.display()))
    }
}

/// Detect the project, tolerating a missing package.json.
fn detect_or_warn(dir: &Path) -> Result<Option<NodeProject>> {
    match detect_project(dir) {
        Ok(project) => {
            let missing = project.missing_scripts(&["build", "start"]);
            if !missing.is_empty() {
                tracing::warn!(
                    scripts = ?missing,
                    "package.json does not define every script liftoff runs"
                );
            }
            Ok(Some(project))
        }
        Err(DetectError::ManifestNotFound { path }) => {
            tracing::warn!(path = %path.display(), "no package.json found, assuming npm");
            Ok(None)
        }
        Err(err) => Err(err).context("failed to inspect package.json"),
    }
}

/// Assemble the launch configuration for `project` with CLI overrides applied.
///
/// Also returns the detected project, `None` when there is no package.json.
pub fn load_config(
    project: &ProjectArgs,
    mut overrides: LaunchOverrides,
) -> Result<(LaunchConfig, Option<NodeProject>)> {
    let dir = project.canonical_dir()?;
    let manifest = load_manifest(&dir).context("failed to load liftoff.yaml")?;
    let detected = detect_or_warn(&dir)?;
    let hints = detected
        .as_ref()
        .map(NodeProject::hints)
        .unwrap_or_else(ProjectHints::default);

    overrides.package_manager = overrides.package_manager.or(project.package_manager);
    let config = LaunchConfig::resolve(dir, manifest, hints, overrides)
        .context("invalid launch configuration")?;
    tracing::debug!(?config, "resolved launch configuration");
    Ok((config, detected))
}
