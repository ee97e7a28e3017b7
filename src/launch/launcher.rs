//! # Process launcher: one child per dependency descriptor.
//!
//! [`Launcher::launch`] spawns the dependency's executable, registers the
//! child with the shared [`ProcessRegistry`] immediately (before anything
//! waits on readiness), wires up output forwarding, and hands back a
//! [`ReadyGate`] for the caller to await.
//!
//! ## Output wiring
//! - stdout is always piped: it carries the readiness sentinel. In debug
//!   mode the watcher echoes every line to the rig's own stdout; otherwise
//!   the lines are consumed and discarded.
//! - stderr is inherited in debug mode and silenced otherwise.
//! - stdin is always null; dependencies are not interactive.

use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::config::DependencySpec;
use crate::error::RigError;
use crate::events::{Bus, Event, EventKind};
use crate::launch::gate::{self, ReadyGate};
use crate::launch::registry::ProcessRegistry;

/// Spawns dependency processes and wires them into the run.
pub struct Launcher {
    bus: Bus,
    registry: Arc<ProcessRegistry>,
    token: CancellationToken,
    debug: bool,
    ready_settle: Duration,
}

impl Launcher {
    /// Creates a launcher for one run.
    ///
    /// `debug` is the global flag; a per-dependency `debug` in the spec
    /// enables forwarding for that child alone.
    pub fn new(
        bus: Bus,
        registry: Arc<ProcessRegistry>,
        token: CancellationToken,
        debug: bool,
        ready_settle: Duration,
    ) -> Self {
        Self {
            bus,
            registry,
            token,
            debug,
            ready_settle,
        }
    }

    /// Spawns one dependency and returns its readiness gate.
    ///
    /// The child is registered before this function returns, so it is
    /// killable even if it never signals readiness. Spawn failures (bad
    /// path, cwd, permissions) are not retried.
    pub fn launch(&self, spec: &DependencySpec) -> Result<ReadyGate, RigError> {
        self.bus
            .publish(Event::now(EventKind::DependencyStarting).with_dep(spec.name.as_str()));

        let forward = self.debug || spec.debug;
        let mut cmd = Command::new(&spec.run);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(if forward {
                Stdio::inherit()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }

        let mut child = cmd.spawn().map_err(|source| RigError::Spawn {
            dependency: spec.name.clone(),
            source,
        })?;
        let pid = child.id();
        let stdout = child.stdout.take().ok_or_else(|| RigError::Spawn {
            dependency: spec.name.clone(),
            source: io::Error::new(io::ErrorKind::BrokenPipe, "child stdout was not captured"),
        })?;

        self.registry.register(&spec.name, child);

        Ok(gate::watch(
            spec.name.clone(),
            pid,
            stdout,
            forward,
            self.ready_settle,
            self.bus.clone(),
            self.token.clone(),
        ))
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use crate::config::DependencySpec;

    fn launcher(bus: &Bus, registry: &Arc<ProcessRegistry>) -> Launcher {
        Launcher::new(
            bus.clone(),
            Arc::clone(registry),
            CancellationToken::new(),
            false,
            Duration::from_millis(10),
        )
    }

    fn sh_dep(name: &str, script: &str) -> DependencySpec {
        DependencySpec {
            name: name.to_string(),
            run: "/bin/sh".into(),
            args: vec!["-c".to_string(), script.to_string()],
            cwd: None,
            blocking: false,
            debug: false,
        }
    }

    #[tokio::test]
    async fn test_launch_registers_before_readiness() {
        let bus = Bus::new(16);
        let registry = Arc::new(ProcessRegistry::new());
        let launcher = launcher(&bus, &registry);

        // The child sleeps before signaling; the registry entry must exist
        // anyway.
        let gate = launcher
            .launch(&sh_dep("slow", "sleep 60"))
            .expect("spawn should succeed");
        assert_eq!(registry.len(), 1, "registered on spawn, not on readiness");
        assert_eq!(gate.dependency(), "slow");

        registry.kill_all(&bus).await;
    }

    #[tokio::test]
    async fn test_launch_resolves_on_sentinel() {
        let bus = Bus::new(16);
        let registry = Arc::new(ProcessRegistry::new());
        let launcher = launcher(&bus, &registry);

        let gate = launcher
            .launch(&sh_dep("fast", "echo DEPENDENCY:READY; sleep 60"))
            .expect("spawn should succeed");
        gate.settled().await.expect("gate should settle");

        registry.kill_all(&bus).await;
    }

    #[tokio::test]
    async fn test_spawn_failure_is_descriptive() {
        let bus = Bus::new(16);
        let registry = Arc::new(ProcessRegistry::new());
        let launcher = launcher(&bus, &registry);

        let mut spec = sh_dep("ghost", "true");
        spec.run = "/nonexistent/definitely-not-here".into();
        let err = launcher.launch(&spec).unwrap_err();
        assert_eq!(err.as_label(), "dependency_spawn");
        assert!(err.to_string().contains("ghost"), "names the dependency");
        assert!(registry.is_empty(), "failed spawn must not register");
    }

    #[tokio::test]
    async fn test_dead_child_loses_readiness() {
        let bus = Bus::new(16);
        let registry = Arc::new(ProcessRegistry::new());
        let launcher = launcher(&bus, &registry);

        let gate = launcher
            .launch(&sh_dep("dying", "exit 3"))
            .expect("spawn should succeed");
        let err = gate.settled().await.unwrap_err();
        assert_eq!(err.as_label(), "readiness_lost");

        registry.kill_all(&bus).await;
    }
}
