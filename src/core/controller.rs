//! # Lifecycle controller: drives one complete run.
//!
//! [`Controller`] owns the run state machine:
//!
//! ```text
//! INIT ──► STARTING_DEPENDENCIES ──► SETTLING ──► RUNNING_TESTS ──► SHUTTING_DOWN
//!  │              │                                                     ▲
//!  │              └── startup error ────────────────────────────────────┤
//!  └── OS termination signal (any phase) ──────────────────────────────┘
//! ```
//!
//! - **INIT**: spawns the bus→subscriber listener, announces the rig's own
//!   readiness to its parent (the [`HARNESS_SENTINEL`] line — deliberately
//!   a different signal from the one dependencies send *us*), and arms the
//!   signal safety net.
//! - **STARTING_DEPENDENCIES**: delegates to the
//!   [`Sequencer`](crate::sequence::Sequencer). Errors are not locally
//!   recovered; they skip straight to teardown.
//! - **SETTLING**: an unconditional delay after the sequencer resolves,
//!   a grace period for dependencies' internal readiness beyond their
//!   explicit signal.
//! - **RUNNING_TESTS**: runs the [`Suite`](crate::suite::Suite); a failing
//!   test is an outcome, not an error.
//! - **SHUTTING_DOWN**: kills every registered child (best-effort,
//!   idempotent), flushes subscribers, and reports the failure count as
//!   the process exit code.
//!
//! Teardown runs on every path — normal completion, startup error, and
//! external signal — and converges on the same idempotent registry drain.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio_util::sync::CancellationToken;

use crate::config::RigConfig;
use crate::core::shutdown;
use crate::error::RigError;
use crate::events::{Bus, Event, EventKind};
use crate::launch::{Launcher, ProcessRegistry};
use crate::sequence::Sequencer;
use crate::subscribers::{LogWriter, Subscribe, SubscriberSet};
use crate::suite::Suite;

/// Sentinel line the rig prints on its own stdout once it is initialized,
/// for whoever spawned *it*. Distinct from
/// [`READY_SENTINEL`](crate::launch::READY_SENTINEL), which dependencies
/// send to the rig.
pub const HARNESS_SENTINEL: &str = "HARNESS:READY";

/// Ring-buffer capacity of the run's event bus.
const BUS_CAPACITY: usize = 256;

/// Maps a suite failure count to a process exit code.
///
/// Clamped to 255 so large counts cannot wrap modulo 256 and read as
/// success.
pub fn exit_code(failures: u32) -> i32 {
    failures.min(255) as i32
}

/// How the raced run portion ended.
enum Outcome {
    /// The run drove itself to an end (suite result or startup error).
    Finished(Result<u32, RigError>),
    /// An OS termination signal cut the run short.
    Interrupted,
}

/// Top-level orchestrator for one run.
pub struct Controller {
    cfg: RigConfig,
    bus: Bus,
    registry: Arc<ProcessRegistry>,
    token: CancellationToken,
    subs: SubscriberSet,
}

impl Controller {
    /// Creates a controller with the built-in [`LogWriter`] subscriber.
    pub fn new(cfg: RigConfig) -> Self {
        Self::with_subscribers(cfg, vec![Arc::new(LogWriter)])
    }

    /// Creates a controller with custom subscribers.
    pub fn with_subscribers(cfg: RigConfig, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(BUS_CAPACITY);
        let subs = SubscriberSet::new(subscribers, bus.clone());
        Self {
            cfg,
            bus,
            registry: Arc::new(ProcessRegistry::new()),
            token: CancellationToken::new(),
            subs,
        }
    }

    /// Drives the run to completion and returns the suite failure count.
    ///
    /// Teardown (kill all children, flush subscribers) happens before this
    /// returns, on success, error and signal alike. On a signal the
    /// last-known failure count is returned — zero if the suite never
    /// reported.
    pub async fn run(self) -> Result<u32, RigError> {
        let Self {
            cfg,
            bus,
            registry,
            token,
            subs,
        } = self;

        let listener = Self::spawn_subscriber_listener(&bus, &token, subs);

        println!("{HARNESS_SENTINEL}");
        bus.publish(Event::now(EventKind::HarnessReady));

        let launcher = Launcher::new(
            bus.clone(),
            Arc::clone(&registry),
            token.clone(),
            cfg.debug,
            cfg.ready_settle(),
        );
        let sequencer = Sequencer::new(launcher, bus.clone());

        let last_failures = AtomicU32::new(0);
        let outcome = tokio::select! {
            res = Self::drive(&cfg, &sequencer, &bus, &last_failures) => Outcome::Finished(res),
            _ = shutdown::wait_for_termination() => Outcome::Interrupted,
        };

        let reason = match &outcome {
            Outcome::Finished(Ok(_)) => "complete",
            Outcome::Finished(Err(_)) => "error",
            Outcome::Interrupted => "signal",
        };
        bus.publish(Event::now(EventKind::ShutdownRequested).with_reason(reason));
        registry.kill_all(&bus).await;
        token.cancel();
        let _ = listener.await;

        match outcome {
            Outcome::Finished(res) => res,
            Outcome::Interrupted => Ok(last_failures.load(Ordering::Relaxed)),
        }
    }

    /// The linear run portion: startup → settle → suite.
    async fn drive(
        cfg: &RigConfig,
        sequencer: &Sequencer,
        bus: &Bus,
        last_failures: &AtomicU32,
    ) -> Result<u32, RigError> {
        sequencer.run(&cfg.dependencies).await?;

        // Unconditional grace period between readiness and the suite; not
        // skipped even when there are no dependencies.
        tokio::time::sleep(cfg.suite_settle()).await;

        bus.publish(Event::now(EventKind::SuiteStarting).with_count(cfg.tests.len()));
        let mut suite = Suite::new();
        for file in &cfg.tests {
            suite.add_file(file.clone());
        }
        let failures = suite.run().await?;
        last_failures.store(failures, Ordering::Relaxed);
        bus.publish(Event::now(EventKind::SuiteFinished).with_failures(failures));
        Ok(failures)
    }

    /// Forwards bus events to the subscriber set until cancelled, then
    /// flushes what is already buffered and drains the workers.
    fn spawn_subscriber_listener(
        bus: &Bus,
        token: &CancellationToken,
        subs: SubscriberSet,
    ) -> tokio::task::JoinHandle<()> {
        let mut rx = bus.subscribe();
        let token = token.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    ev = rx.recv() => match ev {
                        Ok(ev) => subs.emit(&ev),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    }
                }
            }
            loop {
                match rx.try_recv() {
                    Ok(ev) => subs.emit(&ev),
                    Err(TryRecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }
            subs.drain().await;
        })
    }
}
