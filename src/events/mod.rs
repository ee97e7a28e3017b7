//! Run events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted over the course of one run.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Controller`, `Launcher`, readiness gates, `Sequencer`,
//!   `ProcessRegistry`, `SubscriberSet` workers (overflow/panic).
//! - **Consumer**: the controller's subscriber listener, which fans events
//!   out to the [`SubscriberSet`](crate::subscribers::SubscriberSet).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
