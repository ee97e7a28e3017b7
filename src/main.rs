//! `testrig` binary: CLI wrapper around [`testrig::Controller`].
//!
//! ```text
//! testrig test start [--config testrig.toml] [--debug]
//! ```
//!
//! The process exit code equals the suite failure count (0 on full
//! success); configuration and startup errors exit 1 after teardown.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use testrig::{exit_code, Controller, RigConfig};

#[derive(Parser)]
#[command(name = "testrig", version, about = "Run a test suite against live dependency processes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Test orchestration commands.
    Test {
        #[command(subcommand)]
        action: TestAction,
    },
}

#[derive(Subcommand)]
enum TestAction {
    /// Start dependencies, run the suite, tear everything down.
    Start {
        /// Path to the rig configuration file.
        #[arg(long, default_value = "testrig.toml")]
        config: PathBuf,

        /// Forward dependency stdout/stderr to this process's streams.
        #[arg(long)]
        debug: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let Command::Test {
        action: TestAction::Start { config, debug },
    } = cli.command;

    let mut cfg = match RigConfig::load(&config) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("ERROR[testrig]: {err}");
            return ExitCode::from(1);
        }
    };
    // Either surface may enable forwarding: the config file or the flag.
    cfg.debug = cfg.debug || debug;

    match Controller::new(cfg).run().await {
        Ok(failures) => ExitCode::from(exit_code(failures) as u8),
        Err(err) => {
            eprintln!("ERROR[testrig]: {err}");
            ExitCode::from(1)
        }
    }
}
