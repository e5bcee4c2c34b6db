//! Node project detection for `liftoff-detector`.
//!
//! `detect_project(path)` reads `package.json` in a project root and reports the
//! application name, the package manager to drive, the web framework, and which
//! npm scripts are defined. Package manager checks are ordered by authority: the
//! `packageManager` field first, then lockfiles, then the npm default.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use liftoff_core::{PackageManager, ProjectHints};
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Where the package manager decision came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ManagerSource {
    /// `"packageManager": "pnpm@9.1.0"` in `package.json`.
    PackageManagerField,
    /// A lockfile in the project root.
    Lockfile(String),
    /// Nothing matched; npm assumed.
    Default,
}

/// A detected Node web application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeProject {
    /// `name` from `package.json`, if set.
    pub name: Option<String>,
    pub package_manager: PackageManager,
    pub manager_source: ManagerSource,
    /// Framework inferred from dependencies (e.g. `"Next.js"`).
    pub framework: Option<String>,
    /// Names of the scripts defined in `package.json`.
    pub scripts: BTreeSet<String>,
}

impl NodeProject {
    pub fn has_script(&self, name: &str) -> bool {
        self.scripts.contains(name)
    }

    /// The subset of `required` that `package.json` does not define.
    pub fn missing_scripts<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|s| !self.has_script(s))
            .collect()
    }

    /// The parts of the detection that feed [`liftoff_core::LaunchConfig::resolve`].
    pub fn hints(&self) -> ProjectHints {
        ProjectHints {
            app_name: self.name.clone(),
            package_manager: Some(self.package_manager),
        }
    }
}

/// Errors from project detection.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("no package.json found in '{path}'")]
    ManifestNotFound { path: PathBuf },
}

/// Lockfiles in priority order.
const LOCKFILES: &[(&str, PackageManager)] = &[
    ("bun.lockb", PackageManager::Bun),
    ("bun.lock", PackageManager::Bun),
    ("pnpm-lock.yaml", PackageManager::Pnpm),
    ("yarn.lock", PackageManager::Yarn),
    ("package-lock.json", PackageManager::Npm),
    ("npm-shrinkwrap.json", PackageManager::Npm),
];

/// Framework detection — precedence from most specific to most generic.
const FRAMEWORKS: &[(&[&str], &str)] = &[
    (&["next"], "Next.js"),
    (&["nuxt", "nuxt3"], "Nuxt"),
    (&["@remix-run/node", "@remix-run/react"], "Remix"),
    (&["astro"], "Astro"),
    (&["gatsby"], "Gatsby"),
    (&["@sveltejs/kit"], "SvelteKit"),
    (&["@angular/core"], "Angular"),
    (&["@nestjs/core"], "NestJS"),
    (&["express"], "Express"),
    (&["fastify"], "Fastify"),
    (&["vite"], "Vite"),
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Detect the Node project rooted at `path`.
pub fn detect_project(path: &Path) -> Result<NodeProject, DetectError> {
    let file = path.join("package.json");
    if !file.is_file() {
        return Err(DetectError::ManifestNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(&file)?;
    let json: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| DetectError::ParseError {
            path: file.clone(),
            message: e.to_string(),
        })?;
    if !json.is_object() {
        return Err(DetectError::ParseError {
            path: file,
            message: "expected a JSON object at the top level".to_string(),
        });
    }

    let (package_manager, manager_source) = detect_package_manager(path, &json);
    let deps = collect_package_json_deps(&json);

    Ok(NodeProject {
        name: json
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        package_manager,
        manager_source,
        framework: detect_framework(&deps).map(str::to_string),
        scripts: collect_scripts(&json),
    })
}

// ---------------------------------------------------------------------------
// Detectors
// ---------------------------------------------------------------------------

fn detect_package_manager(path: &Path, json: &serde_json::Value) -> (PackageManager, ManagerSource) {
    if let Some(pm) = json
        .get("packageManager")
        .and_then(|v| v.as_str())
        .and_then(parse_package_manager_field)
    {
        return (pm, ManagerSource::PackageManagerField);
    }

    for (lockfile, pm) in LOCKFILES {
        if path.join(lockfile).exists() {
            return (*pm, ManagerSource::Lockfile((*lockfile).to_string()));
        }
    }

    (PackageManager::default(), ManagerSource::Default)
}

/// `"pnpm@9.1.0+sha512.abc"` → `Pnpm`. Unknown names yield `None`.
fn parse_package_manager_field(value: &str) -> Option<PackageManager> {
    let name = value.split('@').next()?;
    name.parse().ok()
}

fn detect_framework(deps: &HashSet<String>) -> Option<&'static str> {
    FRAMEWORKS
        .iter()
        .find(|(packages, _)| packages.iter().any(|p| deps.contains(*p)))
        .map(|(_, name)| *name)
}

fn collect_package_json_deps(json: &serde_json::Value) -> HashSet<String> {
    let mut deps = HashSet::new();
    for key in &["dependencies", "devDependencies", "peerDependencies"] {
        if let Some(obj) = json.get(key).and_then(|v| v.as_object()) {
            deps.extend(obj.keys().cloned());
        }
    }
    deps
}

fn collect_scripts(json: &serde_json::Value) -> BTreeSet<String> {
    json.get("scripts")
        .and_then(|v| v.as_object())
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_manager_field_strips_version_and_hash() {
        assert_eq!(
            parse_package_manager_field("pnpm@9.1.0+sha512.deadbeef"),
            Some(PackageManager::Pnpm)
        );
        assert_eq!(parse_package_manager_field("yarn"), Some(PackageManager::Yarn));
        assert_eq!(parse_package_manager_field("deno@2.0.0"), None);
    }

    #[test]
    fn framework_order_prefers_meta_frameworks_over_vite() {
        let deps: HashSet<String> = ["vite", "@sveltejs/kit"].iter().map(|s| s.to_string()).collect();
        assert_eq!(detect_framework(&deps), Some("SvelteKit"));
    }
}
