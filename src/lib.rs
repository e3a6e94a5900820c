//! Fetch-style edge runtime on top of hyper.
//!
//! Handlers receive a standardized [`Request`] and return an optional
//! [`Response`]; the runtime translates both directions against a live
//! socket-level HTTP server.
//!
//! ```text
//!     socket ─▶ net::Listener ─▶ server (hyper + tower) ─▶ EdgeRuntime::exchange
//!                                                               │
//!            adapter::url / headers / body  ◀── IncomingRecord ─┘
//!                        │
//!                        ▼
//!                  Handler::call ─▶ adapter::finalizer ─▶ net::HyperSink ─▶ socket
//!                                                              │
//!                                              adapter::observer (fault reports)
//! ```

pub mod adapter;
pub mod config;
pub mod fetch;
pub mod lifecycle;
pub mod net;
pub mod observability;
mod runtime;
pub mod server;

pub use fetch::{Body, BoxError, Handler, Headers, Request, Response};
pub use net::BindOptions;
pub use runtime::{EdgeRuntime, DEFAULT_ORIGIN};
pub use server::Server;
