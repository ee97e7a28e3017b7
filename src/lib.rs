//! # testrig
//!
//! **testrig** starts declared background dependency processes (local
//! emulators, mock servers), waits for each to signal readiness, runs a
//! test suite against them, and tears everything down afterwards — one
//! linear run per invocation, then exit.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌────────────────┐   ┌────────────────┐   ┌────────────────┐
//!     │ DependencySpec │   │ DependencySpec │   │ DependencySpec │
//!     │ (blocking)     │   │ (blocking)     │   │ (non-blocking) │
//!     └───────┬────────┘   └───────┬────────┘   └───────┬────────┘
//!             ▼                    ▼                    ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Controller (run orchestrator)                                    │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to subscribers, LogWriter built in)    │
//! │  - ProcessRegistry (owns every spawned child)                     │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        ▼
//!   Sequencer ──► Launcher ──► child process ──► ReadyGate
//!        │          (spawn,      (stdout line     (one-shot:
//!        │           register)    DEPENDENCY:READY) signal+settle)
//!        ▼
//!   Suite (one child process per test file, failure count out)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Controller::run()
//!   ├─► announce HARNESS:READY to own parent
//!   ├─► Phase 1: blocking dependencies, strictly sequential
//!   │     launch ─► registry.register ─► gate.settled ─► next
//!   ├─► Phase 2: non-blocking dependencies, concurrent
//!   │     launch all ─► await all gates
//!   ├─► settle delay (unconditional)
//!   ├─► Suite::run() ─► failure count
//!   └─► teardown: kill registry, flush subscribers,
//!       exit code = failure count
//!
//! An OS termination signal at any point jumps straight to teardown.
//! A live dependency that never signals readiness suspends the run
//! indefinitely — there is no readiness timeout.
//! ```
//!
//! ## Features
//! | Area            | Description                                         | Key types                       |
//! |-----------------|-----------------------------------------------------|---------------------------------|
//! | **Config**      | One TOML file, validated before anything spawns.    | [`RigConfig`], [`DependencySpec`] |
//! | **Startup**     | Two-phase launch with per-child readiness gates.    | [`Sequencer`], [`Launcher`], [`ReadyGate`] |
//! | **Ownership**   | Every child killable, teardown idempotent.          | [`ProcessRegistry`]             |
//! | **Suite**       | Files in, failure count out.                        | [`Suite`]                       |
//! | **Observability** | Run events fanned out to subscribers.             | [`Subscribe`], [`LogWriter`]    |
//! | **Errors**      | Typed, labeled, fail-fast configuration.            | [`RigError`], [`ConfigError`]   |
//!
//! ## Example
//! ```no_run
//! use testrig::{Controller, RigConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = RigConfig::load(std::path::Path::new("testrig.toml"))?;
//!     let failures = Controller::new(cfg).run().await?;
//!     std::process::exit(testrig::exit_code(failures));
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod launch;
mod sequence;
mod subscribers;
mod suite;

// ---- Public re-exports ----

pub use config::{DependencySpec, RigConfig};
pub use core::{exit_code, Controller, HARNESS_SENTINEL};
pub use error::{ConfigError, RigError};
pub use events::{Bus, Event, EventKind};
pub use launch::{Launcher, ProcessRegistry, ReadyGate, READY_SENTINEL};
pub use sequence::Sequencer;
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use suite::Suite;
