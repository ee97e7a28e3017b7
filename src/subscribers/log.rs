//! # Logging subscriber.
//!
//! [`LogWriter`] prints one informational line per run step, matching the
//! output the rig's users grep for in CI logs.
//!
//! ## Output format
//! ```text
//! INFO[testrig]: Harness ready
//! INFO[testrig]: Starting dynamodb-local
//! INFO[testrig]: dynamodb-local ready (pid 4242)
//! INFO[testrig]: All dependencies ready
//! INFO[testrig]: Running 3 test file(s)
//! INFO[testrig]: Suite finished, 0 failure(s)
//! INFO[testrig]: Shutting down (complete)
//! INFO[testrig]: Stopped dynamodb-local
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Prefix applied to every informational line.
pub const LOG_PREFIX: &str = "INFO[testrig]: ";

/// Stdout logging subscriber.
///
/// Announces each startup step, the suite result and teardown. Implement a
/// custom [`Subscribe`] for structured logging or metrics collection.
pub struct LogWriter;

impl LogWriter {
    fn line(msg: &str) {
        println!("{LOG_PREFIX}{msg}");
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, event: &Event) {
        match event.kind {
            EventKind::HarnessReady => Self::line("Harness ready"),
            EventKind::DependencyStarting => {
                if let Some(dep) = &event.dep {
                    Self::line(&format!("Starting {dep}"));
                }
            }
            EventKind::DependencyReady => {
                if let Some(dep) = &event.dep {
                    match event.pid {
                        Some(pid) => Self::line(&format!("{dep} ready (pid {pid})")),
                        None => Self::line(&format!("{dep} ready")),
                    }
                }
            }
            EventKind::DependenciesReady => Self::line("All dependencies ready"),
            EventKind::SuiteStarting => {
                let count = event.count.unwrap_or(0);
                Self::line(&format!("Running {count} test file(s)"));
            }
            EventKind::SuiteFinished => {
                let failures = event.failures.unwrap_or(0);
                Self::line(&format!("Suite finished, {failures} failure(s)"));
            }
            EventKind::ShutdownRequested => {
                let reason = event.reason.as_deref().unwrap_or("requested");
                Self::line(&format!("Shutting down ({reason})"));
            }
            EventKind::DependencyStopped => {
                if let Some(dep) = &event.dep {
                    Self::line(&format!("Stopped {dep}"));
                }
            }
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
                if let (Some(name), Some(reason)) = (&event.dep, &event.reason) {
                    eprintln!("WARN[testrig]: subscriber {name} dropped event: {reason}");
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
