//! Parameterised project detection tests for `liftoff-detector`.
//!
//! Each `#[case]` gets an isolated `TempDir` — no shared state.

use liftoff_core::PackageManager;
use liftoff_detector::{detect_project, DetectError, ManagerSource};
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

fn make_dir() -> TempDir {
    TempDir::new().expect("tempdir")
}

fn write(dir: &TempDir, filename: &str, content: &str) {
    fs::write(dir.path().join(filename), content).expect("write fixture");
}

const NEXT_APP: &str = r#"{
  "name": "42drive",
  "scripts": { "dev": "next dev", "build": "next build", "start": "next start" },
  "dependencies": { "next": "14.2.3", "react": "18.3.1" }
}"#;

// ---------------------------------------------------------------------------
// Package manager
// ---------------------------------------------------------------------------

#[rstest]
#[case("bun.lockb", PackageManager::Bun)]
#[case("bun.lock", PackageManager::Bun)]
#[case("pnpm-lock.yaml", PackageManager::Pnpm)]
#[case("yarn.lock", PackageManager::Yarn)]
#[case("package-lock.json", PackageManager::Npm)]
fn lockfile_selects_package_manager(#[case] lockfile: &str, #[case] expected: PackageManager) {
    let dir = make_dir();
    write(&dir, "package.json", NEXT_APP);
    write(&dir, lockfile, "");

    let project = detect_project(dir.path()).expect("detect");
    assert_eq!(project.package_manager, expected);
    assert_eq!(
        project.manager_source,
        ManagerSource::Lockfile(lockfile.to_string())
    );
}

#[test]
fn package_manager_field_beats_lockfile() {
    let dir = make_dir();
    write(
        &dir,
        "package.json",
        r#"{"name": "app", "packageManager": "pnpm@9.1.0"}"#,
    );
    write(&dir, "yarn.lock", "");

    let project = detect_project(dir.path()).expect("detect");
    assert_eq!(project.package_manager, PackageManager::Pnpm);
    assert_eq!(project.manager_source, ManagerSource::PackageManagerField);
}

#[test]
fn unknown_package_manager_field_falls_through_to_lockfile() {
    let dir = make_dir();
    write(
        &dir,
        "package.json",
        r#"{"name": "app", "packageManager": "deno@2.0.0"}"#,
    );
    write(&dir, "yarn.lock", "");

    let project = detect_project(dir.path()).expect("detect");
    assert_eq!(project.package_manager, PackageManager::Yarn);
}

#[test]
fn bun_lockfile_outranks_npm_lockfile() {
    let dir = make_dir();
    write(&dir, "package.json", NEXT_APP);
    write(&dir, "package-lock.json", "{}");
    write(&dir, "bun.lockb", "");

    let project = detect_project(dir.path()).expect("detect");
    assert_eq!(project.package_manager, PackageManager::Bun);
}

#[test]
fn no_lockfile_defaults_to_npm() {
    let dir = make_dir();
    write(&dir, "package.json", NEXT_APP);

    let project = detect_project(dir.path()).expect("detect");
    assert_eq!(project.package_manager, PackageManager::Npm);
    assert_eq!(project.manager_source, ManagerSource::Default);
}

// ---------------------------------------------------------------------------
// Framework, name, scripts
// ---------------------------------------------------------------------------

#[rstest]
#[case("next", "Next.js")]
#[case("nuxt", "Nuxt")]
#[case("@remix-run/node", "Remix")]
#[case("astro", "Astro")]
#[case("@sveltejs/kit", "SvelteKit")]
#[case("express", "Express")]
#[case("vite", "Vite")]
fn framework_detection(#[case] dep: &str, #[case] framework: &str) {
    let dir = make_dir();
    write(
        &dir,
        "package.json",
        &format!(r#"{{"dependencies": {{"{dep}": "^1.0.0"}}}}"#),
    );

    let project = detect_project(dir.path()).expect("detect");
    assert_eq!(project.framework.as_deref(), Some(framework));
}

#[test]
fn next_app_reports_name_and_scripts() {
    let dir = make_dir();
    write(&dir, "package.json", NEXT_APP);

    let project = detect_project(dir.path()).expect("detect");
    assert_eq!(project.name.as_deref(), Some("42drive"));
    assert_eq!(project.framework.as_deref(), Some("Next.js"));
    assert!(project.has_script("build"));
    assert!(project.missing_scripts(&["build", "start"]).is_empty());

    let hints = project.hints();
    assert_eq!(hints.app_name.as_deref(), Some("42drive"));
    assert_eq!(hints.package_manager, Some(PackageManager::Npm));
}

#[test]
fn missing_scripts_are_listed() {
    let dir = make_dir();
    write(&dir, "package.json", r#"{"scripts": {"build": "vite build"}}"#);

    let project = detect_project(dir.path()).expect("detect");
    assert!(project.name.is_none());
    assert_eq!(project.missing_scripts(&["build", "start"]), vec!["start"]);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn missing_package_json_is_reported() {
    let dir = make_dir();
    let err = detect_project(dir.path()).unwrap_err();
    assert!(matches!(err, DetectError::ManifestNotFound { .. }));
}

#[rstest]
#[case("{ not json")]
#[case("[1, 2, 3]")]
fn malformed_package_json_is_a_parse_error(#[case] content: &str) {
    let dir = make_dir();
    write(&dir, "package.json", content);

    let err = detect_project(dir.path()).unwrap_err();
    match err {
        DetectError::ParseError { path, .. } => {
            assert_eq!(path, dir.path().join("package.json"));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}
