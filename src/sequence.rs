//! # Two-phase dependency startup sequencer.
//!
//! Orders dependency startup into a blocking phase followed by a
//! non-blocking phase, using the [`Launcher`] per dependency:
//!
//! ```text
//! Phase 1 (blocking, strictly sequential):
//!   launch(b1) ─► gate(b1) ─► launch(b2) ─► gate(b2) ─► ...
//!
//! Phase 2 (non-blocking, concurrent):
//!   launch(n1), launch(n2), ... launch(nM)     (no awaits in between)
//!   then await all gates together
//! ```
//!
//! ## Rules
//! - Relative order among blocking dependencies follows declaration order;
//!   dependency *i+1* is not launched until *i*'s gate has settled.
//! - A failure (or hang) of any blocking dependency halts all subsequent
//!   startup; nothing else launches.
//! - Non-blocking dependencies are all launched before any of their gates
//!   is awaited; the phase completes only once every gate has settled, in
//!   whatever order the signals arrive.
//! - No overall timeout across phases: total suspension is whatever the
//!   individual gates take.

use futures::future::try_join_all;

use crate::config::DependencySpec;
use crate::error::RigError;
use crate::events::{Bus, Event, EventKind};
use crate::launch::{Launcher, ReadyGate};

/// Drives both startup phases for one run.
pub struct Sequencer {
    launcher: Launcher,
    bus: Bus,
}

impl Sequencer {
    /// Creates a sequencer over the given launcher.
    pub fn new(launcher: Launcher, bus: Bus) -> Self {
        Self { launcher, bus }
    }

    /// Suspends until every dependency is ready.
    ///
    /// Publishes `DependenciesReady` once both phases are complete. An
    /// empty dependency list completes immediately.
    pub async fn run(&self, dependencies: &[DependencySpec]) -> Result<(), RigError> {
        for dep in dependencies.iter().filter(|d| d.blocking) {
            self.launcher.launch(dep)?.settled().await?;
        }

        let mut gates: Vec<ReadyGate> = Vec::new();
        for dep in dependencies.iter().filter(|d| !d.blocking) {
            gates.push(self.launcher.launch(dep)?);
        }
        try_join_all(gates.into_iter().map(ReadyGate::settled)).await?;

        self.bus.publish(Event::now(EventKind::DependenciesReady));
        Ok(())
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use crate::launch::ProcessRegistry;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn rig(bus: &Bus) -> (Sequencer, Arc<ProcessRegistry>) {
        let registry = Arc::new(ProcessRegistry::new());
        let launcher = Launcher::new(
            bus.clone(),
            Arc::clone(&registry),
            CancellationToken::new(),
            false,
            Duration::from_millis(10),
        );
        (Sequencer::new(launcher, bus.clone()), registry)
    }

    fn sh_dep(name: &str, script: &str, blocking: bool) -> DependencySpec {
        DependencySpec {
            name: name.to_string(),
            run: "/bin/sh".into(),
            args: vec!["-c".to_string(), script.to_string()],
            cwd: None,
            blocking,
            debug: false,
        }
    }

    #[tokio::test]
    async fn test_empty_dependency_list_completes_immediately() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let (sequencer, _registry) = rig(&bus);

        sequencer.run(&[]).await.expect("nothing to start");
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::DependenciesReady);
    }

    #[tokio::test]
    async fn test_blocking_failure_halts_startup() {
        let bus = Bus::new(64);
        let (sequencer, registry) = rig(&bus);

        let deps = vec![
            sh_dep("dies", "exit 1", true),
            sh_dep("never-started", "echo DEPENDENCY:READY; sleep 60", true),
            sh_dep("also-never-started", "echo DEPENDENCY:READY; sleep 60", false),
        ];
        let err = sequencer.run(&deps).await.unwrap_err();
        assert_eq!(err.as_label(), "readiness_lost");
        assert_eq!(
            registry.len(),
            1,
            "nothing past the failed blocking dependency may launch"
        );

        registry.kill_all(&bus).await;
    }

    #[tokio::test]
    async fn test_non_blocking_phase_runs_concurrently() {
        let bus = Bus::new(64);
        let (sequencer, registry) = rig(&bus);

        // Each child takes ~300ms to signal. Run sequentially this would
        // take ~900ms; concurrently it stays well under that.
        let script = "sleep 0.3; echo DEPENDENCY:READY; sleep 60";
        let deps = vec![
            sh_dep("n1", script, false),
            sh_dep("n2", script, false),
            sh_dep("n3", script, false),
        ];

        let started = std::time::Instant::now();
        sequencer.run(&deps).await.expect("all should become ready");
        let elapsed = started.elapsed();
        assert!(
            elapsed < Duration::from_millis(800),
            "non-blocking startup took {elapsed:?}, looks sequential"
        );

        registry.kill_all(&bus).await;
    }
}
