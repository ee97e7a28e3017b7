//! # Event subscribers for the rig runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`]
//! fan-out machinery, and the built-in [`LogWriter`] that prints the run's
//! informational lines.
//!
//! ## Architecture
//! ```text
//! Launcher / Sequencer / Controller ── publish(Event) ──► Bus
//!                                                          │
//!                                      controller listener ┘
//!                                                          │
//!                                                 SubscriberSet::emit()
//!                                                   ┌──────┴──────┐
//!                                                   ▼             ▼
//!                                               LogWriter      Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use testrig::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::SuiteFinished {
//!             // record event.failures somewhere
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
