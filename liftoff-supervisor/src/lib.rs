//! Process supervisor: dependency install, build, and the long-lived server child.
//!
//! Phases run strictly in order (install → build → start). The server phase
//! relays SIGINT/SIGTERM to the child and waits a bounded time for it to exit.

mod error;
pub mod observer;
mod runtime;
pub mod shutdown;
pub mod signals;

pub use error::{describe_exit, SupervisorError};
pub use observer::{LaunchObserver, Step};
pub use runtime::{
    init_tracing, launch, launch_blocking, DependencyState, LaunchOutcome, LaunchPlan,
    ServeOutcome, Supervisor,
};
pub use shutdown::{ShutdownCoordinator, ShutdownOutcome, SupervisorState};
pub use signals::{ShutdownSignal, ShutdownSignals};
