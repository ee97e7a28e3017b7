//! # Process registry: owns every spawned dependency.
//!
//! The registry is the single owner of child process handles for the
//! lifetime of a run. It is append-only while dependencies start and is
//! drained (all children killed) exactly once during shutdown.
//!
//! ## Rules
//! - Children are registered **before** anything waits on their readiness,
//!   so a dependency that never becomes ready is still killable.
//! - [`ProcessRegistry::kill_all`] is idempotent by construction: an atomic
//!   swap guards the drain, so a second invocation is a no-op rather than
//!   an error.
//! - Killing is best-effort: a child that already died is simply reaped;
//!   one failed kill never stops the rest from being killed.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::process::Child;

use crate::events::{Bus, Event, EventKind};

/// One owned child with the metadata needed for teardown reporting.
struct Entry {
    name: String,
    pid: Option<u32>,
    child: Child,
}

/// Set of all dependency processes spawned during a run.
pub struct ProcessRegistry {
    entries: Mutex<Vec<Entry>>,
    drained: AtomicBool,
}

impl ProcessRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            drained: AtomicBool::new(false),
        }
    }

    /// Takes ownership of a freshly spawned child.
    pub fn register(&self, name: &str, child: Child) {
        let pid = child.id();
        self.lock().push(Entry {
            name: name.to_string(),
            pid,
            child,
        });
    }

    /// Number of currently owned children.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true when no children are owned (never spawned, or already
    /// drained).
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Kills and reaps every owned child, reporting each via
    /// `DependencyStopped`.
    ///
    /// Safe to call more than once: only the first call drains; kill
    /// failures on already-dead children are swallowed.
    pub async fn kill_all(&self, bus: &Bus) {
        if self.drained.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut drained: Vec<Entry> = self.lock().drain(..).collect();
        for entry in &mut drained {
            let _ = entry.child.start_kill();
        }
        for mut entry in drained {
            let _ = entry.child.wait().await;
            let mut ev = Event::now(EventKind::DependencyStopped).with_dep(entry.name);
            if let Some(pid) = entry.pid {
                ev = ev.with_pid(pid);
            }
            bus.publish(ev);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for ProcessRegistry {
    fn default() -> Self {
        Self::new()
    }
}
