//! # Run events emitted by the controller, launcher and sequencer.
//!
//! The [`EventKind`] enum classifies event types across the phases of a run:
//! - **Startup events**: dependency launch and readiness flow
//! - **Suite events**: test execution start and result
//! - **Shutdown events**: teardown of the process registry
//!
//! The [`Event`] struct carries optional metadata such as the dependency
//! name, the child pid, the suite failure count and a free-form reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of run events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Startup events ===
    /// The rig announced its own readiness to its parent process.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    HarnessReady,

    /// A dependency is about to be spawned.
    ///
    /// Sets:
    /// - `dep`: dependency name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DependencyStarting,

    /// A dependency signaled readiness and its settle delay elapsed.
    ///
    /// Sets:
    /// - `dep`: dependency name
    /// - `pid`: child process id, when still known
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DependencyReady,

    /// Both startup phases completed; every dependency is ready.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DependenciesReady,

    // === Suite events ===
    /// The test suite is about to run.
    ///
    /// Sets:
    /// - `count`: number of test files loaded
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SuiteStarting,

    /// The test suite finished.
    ///
    /// Sets:
    /// - `failures`: number of failed test files
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SuiteFinished,

    // === Shutdown events ===
    /// Teardown began (normal completion or OS signal).
    ///
    /// Sets:
    /// - `reason`: `"complete"` or `"signal"`
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ShutdownRequested,

    /// A registered dependency process was killed and reaped.
    ///
    /// Sets:
    /// - `dep`: dependency name
    /// - `pid`: child process id, when still known
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DependencyStopped,

    // === Subscriber events ===
    /// A subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `dep`: subscriber name
    /// - `reason`: `"full"` or `"closed"`
    SubscriberOverflow,

    /// A subscriber panicked while processing an event.
    ///
    /// Sets:
    /// - `dep`: subscriber name
    /// - `reason`: panic message
    SubscriberPanicked,
}

/// Run event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Dependency (or subscriber) name, if applicable.
    pub dep: Option<Arc<str>>,
    /// Child process id, if applicable and still known.
    pub pid: Option<u32>,
    /// Suite failure count (`SuiteFinished` only).
    pub failures: Option<u32>,
    /// Number of test files (`SuiteStarting` only).
    pub count: Option<usize>,
    /// Human-readable reason (shutdown cause, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            dep: None,
            pid: None,
            failures: None,
            count: None,
            reason: None,
        }
    }

    /// Attaches a dependency (or subscriber) name.
    #[inline]
    pub fn with_dep(mut self, dep: impl Into<Arc<str>>) -> Self {
        self.dep = Some(dep.into());
        self
    }

    /// Attaches a child process id.
    #[inline]
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Attaches a suite failure count.
    #[inline]
    pub fn with_failures(mut self, failures: u32) -> Self {
        self.failures = Some(failures);
        self
    }

    /// Attaches a test-file count.
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::now(EventKind::SubscriberOverflow)
            .with_dep(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::now(EventKind::SubscriberPanicked)
            .with_dep(subscriber)
            .with_reason(info)
    }
}
