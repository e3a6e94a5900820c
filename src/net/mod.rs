//! Transport layer: sockets, hyper connections and their native records.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind with options, accept)
//!     → connection.rs (lifecycle tracking)
//!     → hyper connection per socket
//!     → incoming.rs (IncomingRecord per request)
//!     → sink.rs (HyperSink per request, drives the hyper response)
//!
//! Sink States:
//!     Unstarted → HeadersSent → Streaming → Ended
//! ```
//!
//! # Design Decisions
//! - The record types mirror what the socket layer hands out, nothing more
//! - The response head is released on the first write or end
//! - Body writes go through a bounded channel; its capacity is the write watermark

pub mod connection;
pub mod incoming;
pub mod listener;
pub mod sink;

#[cfg(test)]
pub(crate) mod testing;

pub use incoming::{IncomingRecord, NativeHeaderValue};
pub use listener::{BindOptions, Listener, ServeError};
pub use sink::{Completion, HyperSink, ResponseSink, SinkBody, SinkError, SinkState};
