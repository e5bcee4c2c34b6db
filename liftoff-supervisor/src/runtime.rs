use std::net::IpAddr;
use std::process::ExitStatus;
use std::time::Duration;

use liftoff_core::network::local_ip;
use liftoff_core::{CommandSpec, LaunchConfig};
use tokio::process::Command;

use crate::error::SupervisorError;
use crate::observer::{LaunchObserver, Step};
use crate::shutdown::{ShutdownCoordinator, ShutdownOutcome};
use crate::signals::{ShutdownSignal, ShutdownSignals};

/// How long a child exit waits for a signal that may have killed it.
const PENDING_SIGNAL_GRACE: Duration = Duration::from_millis(50);

/// Which phases to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchPlan {
    pub install: bool,
    pub build: bool,
    pub serve: bool,
}

impl Default for LaunchPlan {
    fn default() -> Self {
        Self {
            install: true,
            build: true,
            serve: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyState {
    AlreadyPresent,
    Installed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeOutcome {
    /// The server exited without being asked to.
    ChildExited(ExitStatus),
    /// A signal arrived and the server stopped within the shutdown window.
    Stopped {
        signal: ShutdownSignal,
        status: ExitStatus,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Install/build finished and serving was not requested.
    Prepared,
    Served(ServeOutcome),
}

/// Sequences install, build, and serve for one [`LaunchConfig`].
pub struct Supervisor<'a, O: LaunchObserver> {
    config: &'a LaunchConfig,
    observer: &'a O,
}

impl<'a, O: LaunchObserver> Supervisor<'a, O> {
    pub fn new(config: &'a LaunchConfig, observer: &'a O) -> Self {
        Self { config, observer }
    }

    /// Run the install command unless the dependency directory already exists.
    pub async fn install_dependencies_if_missing(&self) -> Result<DependencyState, SupervisorError> {
        let dir = self.config.dependency_path();
        if dir.is_dir() {
            self.observer.dependencies_present(&dir);
            return Ok(DependencyState::AlreadyPresent);
        }
        self.observer.dependencies_missing(&dir);
        self.run_step(Step::Install, &self.config.commands.install)
            .await?;
        Ok(DependencyState::Installed)
    }

    pub async fn build(&self) -> Result<(), SupervisorError> {
        self.run_step(Step::Build, &self.config.commands.build).await
    }

    /// Spawn the server and block until it exits or a shutdown signal arrives.
    pub async fn start_server(&self) -> Result<ServeOutcome, SupervisorError> {
        self.start_server_advertising(local_ip()).await
    }

    /// [`Self::start_server`] with an explicit network address for the banner.
    pub async fn start_server_advertising(
        &self,
        network_ip: IpAddr,
    ) -> Result<ServeOutcome, SupervisorError> {
        let mut signals = ShutdownSignals::register()?;
        let mut coordinator = ShutdownCoordinator::spawn(&self.config.commands.start, self.config)?;
        tracing::info!(
            pid = coordinator.pid(),
            port = self.config.port,
            "server started"
        );
        self.observer.server_ready(&self.config.urls(network_ip));

        // Ctrl+C reaches the whole process group, so the child may die of the
        // same SIGINT before its delivery here is observed.
        let signal = tokio::select! {
            biased;
            signal = signals.recv() => signal,
            status = coordinator.wait() => {
                let status = status?;
                match signals.pending_within(PENDING_SIGNAL_GRACE).await {
                    Some(signal) => signal,
                    None => {
                        tracing::info!(%status, "server exited");
                        self.observer.child_exited(status);
                        return Ok(ServeOutcome::ChildExited(status));
                    }
                }
            }
        };

        tracing::info!(%signal, "received shutdown signal");
        self.observer.shutdown_requested(signal);
        let outcome = coordinator.request_shutdown().await?;
        self.observer.server_stopped(&outcome);
        match outcome {
            ShutdownOutcome::Graceful(status) => Ok(ServeOutcome::Stopped { signal, status }),
            ShutdownOutcome::Killed(_) => Err(SupervisorError::ForcedKill {
                timeout: self.config.shutdown_timeout,
            }),
        }
    }

    async fn run_step(&self, step: Step, spec: &CommandSpec) -> Result<(), SupervisorError> {
        self.observer.step_started(step, spec);
        tracing::debug!(step = step.label(), command = %spec, "running step");

        let status = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&self.config.project_dir)
            .status()
            .await
            .map_err(|source| SupervisorError::Spawn {
                command: spec.to_string(),
                source,
            })?;

        if status.success() {
            self.observer.step_succeeded(step);
            return Ok(());
        }
        tracing::error!(step = step.label(), code = status.code(), "step failed");
        self.observer.step_failed(step, status.code());
        Err(SupervisorError::StepFailed {
            label: step.label(),
            code: status.code(),
        })
    }
}

/// Run the phases selected by `plan`, in order, stopping at the first failure.
pub async fn launch<O: LaunchObserver>(
    config: &LaunchConfig,
    plan: LaunchPlan,
    observer: &O,
) -> Result<LaunchOutcome, SupervisorError> {
    let supervisor = Supervisor::new(config, observer);
    if plan.install {
        supervisor.install_dependencies_if_missing().await?;
    }
    if plan.build {
        supervisor.build().await?;
    }
    if !plan.serve {
        return Ok(LaunchOutcome::Prepared);
    }
    supervisor.start_server().await.map(LaunchOutcome::Served)
}

/// Start a current-thread runtime and block on [`launch`].
pub fn launch_blocking<O: LaunchObserver>(
    config: &LaunchConfig,
    plan: LaunchPlan,
    observer: &O,
) -> Result<LaunchOutcome, SupervisorError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(SupervisorError::Runtime)?;
    runtime.block_on(launch(config, plan, observer))
}

/// Diagnostics go to stderr so they never interleave with the status banner.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::net::Ipv4Addr;
    use std::path::Path;

    use liftoff_core::ServerUrls;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingObserver {
        events: RefCell<Vec<String>>,
    }

    impl RecordingObserver {
        fn push(&self, event: impl Into<String>) {
            self.events.borrow_mut().push(event.into());
        }

        fn events(&self) -> Vec<String> {
            self.events.borrow().clone()
        }
    }

    impl LaunchObserver for RecordingObserver {
        fn dependencies_present(&self, _dir: &Path) {
            self.push("deps:present");
        }
        fn dependencies_missing(&self, _dir: &Path) {
            self.push("deps:missing");
        }
        fn step_started(&self, step: Step, _command: &CommandSpec) {
            self.push(format!("start:{step:?}"));
        }
        fn step_succeeded(&self, step: Step) {
            self.push(format!("ok:{step:?}"));
        }
        fn step_failed(&self, step: Step, code: Option<i32>) {
            self.push(format!("fail:{step:?}:{code:?}"));
        }
        fn server_ready(&self, urls: &ServerUrls) {
            self.push(format!("ready:{}", urls.local));
        }
        fn child_exited(&self, status: ExitStatus) {
            self.push(format!("exited:{:?}", status.code()));
        }
    }

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh", ["-c", script])
    }

    fn fixture(install: &str, build: &str, start: &str) -> (TempDir, LaunchConfig) {
        let dir = TempDir::new().expect("tempdir");
        let mut config = LaunchConfig::new(dir.path());
        config.commands.install = sh(install);
        config.commands.build = sh(build);
        config.commands.start = sh(start);
        (dir, config)
    }

    fn calls(dir: &TempDir) -> Vec<String> {
        fs::read_to_string(dir.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn missing_dependencies_install_once_before_build() {
        let (dir, config) = fixture(
            "echo install >> calls.log",
            "echo build >> calls.log",
            "exit 0",
        );
        let observer = RecordingObserver::default();
        let plan = LaunchPlan {
            serve: false,
            ..LaunchPlan::default()
        };

        let outcome = launch(&config, plan, &observer).await.expect("launch");
        assert_eq!(outcome, LaunchOutcome::Prepared);
        assert_eq!(calls(&dir), vec!["install", "build"]);
        assert_eq!(
            observer.events(),
            vec![
                "deps:missing",
                "start:Install",
                "ok:Install",
                "start:Build",
                "ok:Build"
            ]
        );
    }

    #[tokio::test]
    async fn present_dependencies_skip_install() {
        let (dir, config) = fixture(
            "echo install >> calls.log",
            "echo build >> calls.log",
            "exit 0",
        );
        fs::create_dir(dir.path().join("node_modules")).expect("mkdir node_modules");
        let supervisor_observer = RecordingObserver::default();
        let supervisor = Supervisor::new(&config, &supervisor_observer);

        let state = supervisor
            .install_dependencies_if_missing()
            .await
            .expect("install check");
        assert_eq!(state, DependencyState::AlreadyPresent);
        assert!(calls(&dir).is_empty());
        assert_eq!(supervisor_observer.events(), vec!["deps:present"]);
    }

    #[tokio::test]
    async fn failed_install_stops_before_build() {
        let (dir, config) = fixture(
            "echo install >> calls.log; exit 7",
            "echo build >> calls.log",
            "echo start >> calls.log",
        );
        let observer = RecordingObserver::default();

        let err = launch(&config, LaunchPlan::default(), &observer)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SupervisorError::StepFailed {
                label: "Installing dependencies",
                code: Some(7)
            }
        ));
        assert_eq!(err.to_string(), "Installing dependencies failed (exit code 7)");
        assert_eq!(calls(&dir), vec!["install"]);
        assert!(observer.events().contains(&"fail:Install:Some(7)".to_string()));
    }

    #[tokio::test]
    async fn failed_build_never_spawns_server() {
        let (dir, config) = fixture(
            "echo install >> calls.log",
            "echo build >> calls.log; exit 1",
            "echo start >> calls.log",
        );
        let observer = RecordingObserver::default();

        let err = launch(&config, LaunchPlan::default(), &observer)
            .await
            .unwrap_err();
        assert!(matches!(err, SupervisorError::StepFailed { code: Some(1), .. }));
        assert_eq!(calls(&dir), vec!["install", "build"]);
        assert!(!observer.events().iter().any(|e| e.starts_with("ready:")));
    }

    #[tokio::test]
    async fn server_exit_is_reported_without_error() {
        let (dir, mut config) = fixture("exit 0", "exit 0", "echo start >> calls.log; exit 4");
        config.port = 5000;
        let observer = RecordingObserver::default();
        let supervisor = Supervisor::new(&config, &observer);

        let outcome = supervisor
            .start_server_advertising(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .await
            .expect("serve");
        match outcome {
            ServeOutcome::ChildExited(status) => assert_eq!(status.code(), Some(4)),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(calls(&dir), vec!["start"]);
        assert_eq!(
            observer.events(),
            vec!["ready:http://localhost:5000", "exited:Some(4)"]
        );
    }

    #[tokio::test]
    async fn missing_build_program_is_a_spawn_error() {
        let (_dir, mut config) = fixture("exit 0", "exit 0", "exit 0");
        config.commands.build = CommandSpec::new("liftoff-missing-build-tool", ["run"]);
        let observer = RecordingObserver::default();
        let supervisor = Supervisor::new(&config, &observer);

        let err = supervisor.build().await.unwrap_err();
        assert!(matches!(err, SupervisorError::Spawn { .. }));
    }
}
