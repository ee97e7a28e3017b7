//! Run core: orchestration and lifecycle.
//!
//! The only public API from this module is [`Controller`], which drives one
//! complete run (start dependencies → settle → run suite → tear down) and
//! owns the shutdown path.
//!
//! Internal modules:
//! - [`controller`]: the run state machine and idempotent teardown;
//! - [`shutdown`]: cross-platform termination-signal handling (the
//!   safety net that guarantees teardown on external kill).

mod controller;
mod shutdown;

pub use controller::{exit_code, Controller, HARNESS_SENTINEL};
