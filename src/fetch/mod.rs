//! Fetch-style value objects handed to and returned from handlers.
//!
//! # Data Flow
//! ```text
//! IncomingRecord (net)
//!     → adapter (url, headers, body)
//!     → Request (immutable, body read lazily)
//!     → Handler
//!     → Response | None
//!     → adapter::finalizer drives the ResponseSink
//! ```
//!
//! # Design Decisions
//! - Headers are case-insensitive and multi-valued, backed by `http::HeaderMap`
//! - Body absence (`None`) is distinct from an empty body stream
//! - Nothing in here knows about sockets or hyper connections

pub mod body;
pub mod handler;
pub mod headers;
pub mod request;
pub mod response;

pub use body::Body;
pub use handler::{Handler, HandlerFuture};
pub use headers::{Headers, InvalidHeader};
pub use request::{BodyNotAllowed, Request};
pub use response::Response;

/// Boxed error used for handler failures and body stream faults.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
