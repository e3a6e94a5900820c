//! Translation between the transport records and the fetch model.
//!
//! # Data Flow
//! ```text
//! Ingress:
//!     IncomingRecord
//!         → url.rs (absolute URL from target + host)
//!         → headers.rs (native list → Headers)
//!         → body.rs (native stream → Option<Body>)
//!         → Request
//!
//! Egress:
//!     Handler result
//!         → finalizer.rs (status, headers, body or end)
//!         → headers.rs (Headers → sink)
//!         → body.rs (Body piped into sink)
//!
//! Throughout:
//!     observer.rs watches the sink's completion and reports faults
//! ```
//!
//! # Design Decisions
//! - URL, header and body translation are stateless functions
//! - Only `set-cookie` is written as a multi-valued header on egress
//! - Faults are reported, never turned into synthesized responses

pub mod body;
pub mod finalizer;
pub mod headers;
pub mod observer;
pub mod url;

pub use finalizer::{end_once, respond_with, Phase};
pub use observer::{format_report, observe, BufferedDiagnostics, DiagnosticSink, TracingDiagnostics};
