//! Listener harness.
//!
//! # Data Flow
//! ```text
//! BindOptions
//!     → net::Listener (bind + listen)
//!     → accept loop (one task, signals readiness before first accept)
//!     → service.rs (hyper connection + tower stack per socket)
//!     → EdgeRuntime::exchange per request
//! ```
//!
//! # Design Decisions
//! - `serve` returns only after the accept loop is running
//! - No connection limit: every accepted socket gets its own task
//! - Shutdown stops accepting; open connections finish on their own

mod harness;
mod service;

pub use harness::{serve, Server};
