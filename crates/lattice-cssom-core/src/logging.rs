//! Logging facilities for Lattice CSSOM.
//!
//! Everything is instrumented with the `tracing` crate. Install a subscriber
//! in your application to see the output:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Recovered parse errors are logged at `warn` under [`targets::PARSER`];
//! tree mutations at `debug` and `trace` under [`targets::MUTATION`].

/// Target names for log filtering, e.g. `RUST_LOG=lattice_cssom::parser=warn`.
pub mod targets {
    /// Signal/slot system.
    pub const SIGNAL: &str = "lattice_cssom_core::signal";
    /// CSS parser.
    pub const PARSER: &str = "lattice_cssom::parser";
    /// Rule tree mutation.
    pub const MUTATION: &str = "lattice_cssom::mutation";
    /// Timing spans.
    pub const PERF: &str = "lattice_cssom::perf";
}

/// Times an operation with an `info` span that closes on drop.
///
/// ```
/// use lattice_cssom_core::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("replace_sync");
///     // ... work ...
/// }
/// ```
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    pub fn new(operation: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation);
        Self {
            _span: span.entered(),
        }
    }
}
