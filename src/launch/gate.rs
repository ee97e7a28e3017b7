//! # One-shot readiness gate per launched process.
//!
//! A dependency signals readiness by printing the exact sentinel line
//! [`READY_SENTINEL`] on its stdout. The gate is a one-shot synchronization
//! primitive over that signal:
//!
//! ```text
//! WAITING ──(sentinel line)──► SIGNALED ──(settle delay)──► SETTLED
//! ```
//!
//! The transition out of WAITING is idempotent: the watcher stops matching
//! after the first sentinel, and the underlying oneshot channel can resolve
//! at most once, so duplicate signals are ignored. Every other line is not
//! a control message and is left alone (echoed in debug mode, discarded
//! otherwise).
//!
//! ## Rules
//! - No timeout: a live child that never prints the sentinel suspends the
//!   waiter indefinitely.
//! - A child that closes its stdout **before** signaling (it died) resolves
//!   the gate to [`RigError::ReadinessLost`] instead of hanging.
//! - After the sentinel the watcher keeps draining stdout so the child can
//!   never block on a full pipe.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::RigError;
use crate::events::{Bus, Event, EventKind};

/// Sentinel line a dependency prints on stdout to signal readiness.
pub const READY_SENTINEL: &str = "DEPENDENCY:READY";

/// Resolves once the associated dependency has signaled readiness and its
/// settle delay has elapsed.
///
/// Returned by [`Launcher::launch`](crate::launch::Launcher::launch); await
/// [`ReadyGate::settled`] to block on the dependency.
#[derive(Debug)]
pub struct ReadyGate {
    dependency: String,
    rx: oneshot::Receiver<()>,
}

impl ReadyGate {
    /// Name of the dependency this gate belongs to.
    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    /// Suspends until the gate settles.
    ///
    /// Returns [`RigError::ReadinessLost`] when the child closed its stdout
    /// without ever signaling. Never returns early on a live, silent child.
    pub async fn settled(self) -> Result<(), RigError> {
        self.rx.await.map_err(|_| RigError::ReadinessLost {
            dependency: self.dependency,
        })
    }
}

/// Spawns a stdout watcher for one child and returns its gate.
///
/// The watcher scans `stdout` line by line. In debug mode (`forward`) every
/// line is echoed to the rig's own stdout. On the first sentinel line it
/// waits `settle`, publishes `DependencyReady`, and resolves the gate.
pub(crate) fn watch<R>(
    dependency: String,
    pid: Option<u32>,
    stdout: R,
    forward: bool,
    settle: Duration,
    bus: Bus,
    token: CancellationToken,
) -> ReadyGate
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let gate = ReadyGate {
        dependency: dependency.clone(),
        rx,
    };

    tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        let mut tx = Some(tx);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if forward {
                            println!("{line}");
                        }
                        if line.trim() != READY_SENTINEL {
                            continue;
                        }
                        // WAITING → SIGNALED; later sentinels find `tx`
                        // already taken and are ignored.
                        if let Some(tx) = tx.take() {
                            let bus = bus.clone();
                            let dep = dependency.clone();
                            tokio::spawn(async move {
                                tokio::time::sleep(settle).await;
                                let mut ev = Event::now(EventKind::DependencyReady).with_dep(dep);
                                if let Some(pid) = pid {
                                    ev = ev.with_pid(pid);
                                }
                                bus.publish(ev);
                                let _ = tx.send(());
                            });
                        }
                    }
                    // stdout closed: if `tx` is still held it is dropped
                    // here and the gate resolves to ReadinessLost.
                    Ok(None) | Err(_) => break,
                }
            }
        }
    });

    gate
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    fn test_gate<R>(stdout: R, bus: &Bus) -> ReadyGate
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        watch(
            "dep".to_string(),
            Some(1),
            stdout,
            false,
            Duration::from_millis(100),
            bus.clone(),
            CancellationToken::new(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_sentinel_settles_gate() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let (mut writer, reader) = tokio::io::duplex(256);

        let gate = test_gate(reader, &bus);
        writer.write_all(b"booting...\nDEPENDENCY:READY\n").await.unwrap();

        gate.settled().await.expect("gate should settle");
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::DependencyReady);
        assert_eq!(ev.dep.as_deref(), Some("dep"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_sentinels_resolve_once() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let (mut writer, reader) = tokio::io::duplex(256);

        let gate = test_gate(reader, &bus);
        writer
            .write_all(b"DEPENDENCY:READY\nDEPENDENCY:READY\nDEPENDENCY:READY\n")
            .await
            .unwrap();

        gate.settled().await.expect("gate should settle");
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::DependencyReady);

        // The watcher is still draining; give it room to misbehave, then
        // verify no second DependencyReady was published.
        writer.write_all(b"DEPENDENCY:READY\n").await.unwrap();
        drop(writer);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(
            rx.try_recv().is_err(),
            "duplicate sentinel must not publish a second event"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_sentinel_lines_are_ignored() {
        let bus = Bus::new(16);
        let (mut writer, reader) = tokio::io::duplex(256);

        let gate = test_gate(reader, &bus);
        writer
            .write_all(b"DEPENDENCY:READY extra\nalmost DEPENDENCY:READY\n")
            .await
            .unwrap();
        writer.write_all(b"DEPENDENCY:READY\n").await.unwrap();

        gate.settled().await.expect("only the exact line counts");
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_stdout_before_sentinel_is_lost() {
        let bus = Bus::new(16);
        let (mut writer, reader) = tokio::io::duplex(256);

        let gate = test_gate(reader, &bus);
        writer.write_all(b"crashing\n").await.unwrap();
        drop(writer);

        let err = gate.settled().await.unwrap_err();
        assert_eq!(err.as_label(), "readiness_lost");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sentinel_tolerates_surrounding_whitespace() {
        let bus = Bus::new(16);
        let (mut writer, reader) = tokio::io::duplex(256);

        let gate = test_gate(reader, &bus);
        writer.write_all(b"  DEPENDENCY:READY \n").await.unwrap();

        gate.settled().await.expect("trimmed line should match");
    }
}
