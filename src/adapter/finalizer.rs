//! Response finalization.
//!
//! # States
//! ```text
//! AwaitingHandler → Ended: handler declined (no response)
//! AwaitingHandler → WritingStatus → WritingHeaders
//! WritingHeaders → NoBody → Ended: response without body
//! WritingHeaders → StreamingBody → Ended: body piped to completion
//! ```
//!
//! Each exchange reaches `Ended` at most once. A handler or body failure
//! leaves the sink un-ended and is returned to the caller.

use std::fmt;
use std::future::Future;

use crate::fetch::{BoxError, Response};
use crate::net::{ResponseSink, SinkState};

use super::body::pipe;
use super::headers::merge_into_sink;

/// Per-exchange finalizer phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingHandler,
    WritingStatus,
    WritingHeaders,
    StreamingBody,
    NoBody,
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::AwaitingHandler => "awaiting_handler",
            Phase::WritingStatus => "writing_status",
            Phase::WritingHeaders => "writing_headers",
            Phase::StreamingBody => "streaming_body",
            Phase::NoBody => "no_body",
            Phase::Ended => "ended",
        };
        f.write_str(name)
    }
}

fn enter(phase: Phase) {
    tracing::trace!(%phase, "exchange phase");
}

/// Await the handler's result and drive `sink` with it.
pub async fn respond_with<S, F>(response: F, sink: &mut S) -> Result<(), BoxError>
where
    S: ResponseSink,
    F: Future<Output = Result<Option<Response>, BoxError>>,
{
    enter(Phase::AwaitingHandler);
    let Some(response) = response.await? else {
        end_once(sink);
        enter(Phase::Ended);
        return Ok(());
    };

    let (status, status_text, headers, body) = response.into_parts();

    enter(Phase::WritingStatus);
    sink.set_status(status, status_text.as_deref())?;

    enter(Phase::WritingHeaders);
    merge_into_sink(&headers, sink)?;

    match body {
        None => {
            enter(Phase::NoBody);
            end_once(sink);
        }
        Some(body) => {
            enter(Phase::StreamingBody);
            pipe(body, sink).await?;
        }
    }
    enter(Phase::Ended);
    Ok(())
}

/// End `sink` unless it already reached its terminal state.
pub fn end_once<S: ResponseSink>(sink: &mut S) {
    if sink.state() == SinkState::Ended || (sink.headers_sent() && !sink.writable()) {
        tracing::trace!("response already sent");
        return;
    }
    sink.end();
}
