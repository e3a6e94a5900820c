//! Observability.
//!
//! # Data Flow
//! ```text
//! Every subsystem emits `tracing` events:
//!     → logging.rs (subscriber: env filter + fmt or JSON layer)
//!     → stdout
//! ```
//!
//! Spans: `connection` (peer, id) wraps `exchange` (request id, method,
//! path). Fault reports from the error observer go through
//! `edge_runtime::diagnostics` at error level.

pub mod logging;

pub use logging::init;
