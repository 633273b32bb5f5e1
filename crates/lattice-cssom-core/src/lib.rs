//! Core services for Lattice CSSOM.
//!
//! The pieces of the object model that are not CSS specific:
//!
//! - [`Signal`]: change notification, one per stylesheet
//! - [`logging`]: `tracing` targets and the [`PerfSpan`] timing guard

pub mod logging;
pub mod signal;

pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
