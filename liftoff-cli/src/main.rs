//! Liftoff — install, build, and serve a Node web application in production mode.
//!
//! # Usage
//!
//! ```text
//! liftoff                      # same as `liftoff start`
//! liftoff start [--project-dir DIR] [--port N] [--skip-install] [--skip-build]
//!               [--package-manager npm|yarn|pnpm|bun] [--shutdown-timeout SECS]
//! liftoff build [--project-dir DIR] [--skip-install]
//! liftoff detect [--project-dir DIR] [--json]
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{build::BuildArgs, detect::DetectArgs, start::StartArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "liftoff",
    version,
    about = "Install, build, and start a web application's production server",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Disable colored output (also honored via NO_COLOR).
    #[arg(long, global = true)]
    no_color: bool,

    /// Print debug diagnostics to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install dependencies if missing, build, then run the production server.
    Start(StartArgs),

    /// Install dependencies if missing and build, without starting the server.
    Build(BuildArgs),

    /// Show what liftoff detects about a project.
    Detect(DetectArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    liftoff_supervisor::init_tracing(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command.unwrap_or_else(|| Commands::Start(StartArgs::from_env())) {
        Commands::Start(args) => args.run(),
        Commands::Build(args) => args.run(),
        Commands::Detect(args) => args.run(),
    }
}
