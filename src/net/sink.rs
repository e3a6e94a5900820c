//! Outgoing connection record.
//!
//! # Responsibilities
//! - Hold status, reason phrase and headers until the head is released
//! - Stream body chunks to hyper with bounded buffering
//! - Report how the response finished through a [`Completion`]
//!
//! # State Transitions
//! ```text
//! Unstarted → HeadersSent: first write() or end()
//! HeadersSent → Streaming: write()
//! * → Ended: end() or abort()
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use hyper::body::{Body, Frame, SizeHint};
use hyper::ext::ReasonPhrase;
use thiserror::Error;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot, watch};

use crate::fetch::BoxError;

/// Chunks buffered between the sink and hyper before `write` suspends.
pub const WRITE_BUFFER_CHUNKS: usize = 16;

/// Errors raised by a sink or reported through its completion.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The peer went away before the response was fully handed off.
    #[error("connection closed before the response was fully written")]
    Closed,

    /// The sink was dropped without being ended.
    #[error("response dropped before it was ended")]
    Dropped,

    /// The exchange failed and gave up on the response.
    #[error("response aborted")]
    Aborted(#[source] BoxError),

    #[error("write after end")]
    WriteAfterEnd,

    #[error("cannot modify headers after they are sent")]
    HeadersSent,

    #[error("invalid status code {0}")]
    InvalidStatus(u16),

    #[error("invalid status text {0:?}")]
    InvalidStatusText(String),
}

/// Lifecycle of an outgoing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkState {
    #[default]
    Unstarted,
    HeadersSent,
    Streaming,
    Ended,
}

/// The transport's mutable response, driven to [`SinkState::Ended`] once.
pub trait ResponseSink: Send {
    fn state(&self) -> SinkState;

    fn headers_sent(&self) -> bool {
        self.state() != SinkState::Unstarted
    }

    /// Whether the underlying channel still accepts body bytes.
    fn writable(&self) -> bool;

    fn set_status(&mut self, status: u16, text: Option<&str>) -> Result<(), SinkError>;

    /// Set a single-valued header, replacing earlier values.
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) -> Result<(), SinkError>;

    /// Set a header to a list of independent values.
    fn set_header_values(
        &mut self,
        name: HeaderName,
        values: Vec<HeaderValue>,
    ) -> Result<(), SinkError>;

    /// Write a body chunk, suspending while the write buffer is full.
    fn write(&mut self, chunk: Bytes) -> impl Future<Output = Result<(), SinkError>> + Send;

    fn end(&mut self);

    /// Give up on the response. The completion reports `reason`.
    fn abort(&mut self, reason: BoxError);

    fn completion(&self) -> Completion;
}

type Outcome = Option<Result<(), Arc<SinkError>>>;

/// Write-once record of how a response finished.
#[derive(Debug, Clone)]
pub struct Completion {
    tx: Arc<watch::Sender<Outcome>>,
}

impl Completion {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Record the outcome. Only the first call has any effect.
    pub fn complete(&self, result: Result<(), SinkError>) {
        let mut result = Some(result);
        self.tx.send_if_modified(|slot| match (slot.is_none(), result.take()) {
            (true, Some(outcome)) => {
                *slot = Some(outcome.map_err(Arc::new));
                true
            }
            _ => false,
        });
    }

    pub fn is_complete(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Resolves with the outcome once one is recorded.
    pub fn finished(&self) -> impl Future<Output = Result<(), Arc<SinkError>>> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            match rx.wait_for(Option::is_some).await {
                Ok(slot) => (*slot).clone().unwrap_or(Ok(())),
                Err(_) => Ok(()),
            }
        }
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

/// Hyper-backed [`ResponseSink`].
///
/// The paired receiver yields the response head once it is released.
pub struct HyperSink {
    state: SinkState,
    status: StatusCode,
    reason: Option<ReasonPhrase>,
    headers: HeaderMap,
    head_request: bool,
    discard_body: bool,
    head_tx: Option<oneshot::Sender<http::Response<SinkBody>>>,
    pending_body: Option<SinkBody>,
    body_tx: Option<mpsc::Sender<Bytes>>,
    ended: Arc<AtomicBool>,
    completion: Completion,
}

impl HyperSink {
    pub fn new(method: &Method) -> (Self, oneshot::Receiver<http::Response<SinkBody>>) {
        Self::with_capacity(method, WRITE_BUFFER_CHUNKS)
    }

    pub fn with_capacity(
        method: &Method,
        capacity: usize,
    ) -> (Self, oneshot::Receiver<http::Response<SinkBody>>) {
        let (head_tx, head_rx) = oneshot::channel();
        let (body_tx, body_rx) = mpsc::channel(capacity.max(1));
        let ended = Arc::new(AtomicBool::new(false));
        let completion = Completion::new();

        let body = SinkBody {
            rx: body_rx,
            ended: Arc::clone(&ended),
            completion: completion.clone(),
            empty: false,
            done: false,
            discarded: false,
        };

        let sink = Self {
            state: SinkState::Unstarted,
            status: StatusCode::OK,
            reason: None,
            headers: HeaderMap::new(),
            head_request: method == Method::HEAD,
            discard_body: false,
            head_tx: Some(head_tx),
            pending_body: Some(body),
            body_tx: Some(body_tx),
            ended,
            completion,
        };
        (sink, head_rx)
    }

    fn ensure_head_open(&self) -> Result<(), SinkError> {
        match self.state {
            SinkState::Unstarted => Ok(()),
            _ => Err(SinkError::HeadersSent),
        }
    }

    /// Release status and headers to hyper.
    fn flush_head(&mut self) {
        if self.state != SinkState::Unstarted {
            return;
        }
        self.state = SinkState::HeadersSent;
        self.discard_body = self.head_request
            || self.status.is_informational()
            || self.status == StatusCode::NO_CONTENT
            || self.status == StatusCode::NOT_MODIFIED;

        let (Some(head_tx), Some(mut body)) = (self.head_tx.take(), self.pending_body.take()) else {
            return;
        };
        // Hyper drops a bodiless response's body right away; the sink
        // records completion itself on end().
        if self.discard_body {
            body.discarded = true;
            body.empty = true;
        }
        let mut response = http::Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = std::mem::take(&mut self.headers);
        if let Some(reason) = self.reason.take() {
            response.extensions_mut().insert(reason);
        }

        // A failed send drops the body, which records `Closed`.
        if head_tx.send(response).is_err() {
            tracing::debug!("response head not delivered, connection is gone");
        }
    }
}

impl ResponseSink for HyperSink {
    fn state(&self) -> SinkState {
        self.state
    }

    fn writable(&self) -> bool {
        self.state != SinkState::Ended && self.body_tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    fn set_status(&mut self, status: u16, text: Option<&str>) -> Result<(), SinkError> {
        self.ensure_head_open()?;
        self.status = StatusCode::from_u16(status).map_err(|_| SinkError::InvalidStatus(status))?;
        self.reason = match text.filter(|text| !text.is_empty()) {
            Some(text) => Some(
                ReasonPhrase::try_from(text.as_bytes())
                    .map_err(|_| SinkError::InvalidStatusText(text.to_string()))?,
            ),
            None => None,
        };
        Ok(())
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) -> Result<(), SinkError> {
        self.ensure_head_open()?;
        self.headers.insert(name, value);
        Ok(())
    }

    fn set_header_values(
        &mut self,
        name: HeaderName,
        values: Vec<HeaderValue>,
    ) -> Result<(), SinkError> {
        self.ensure_head_open()?;
        self.headers.remove(&name);
        for value in values {
            self.headers.append(name.clone(), value);
        }
        Ok(())
    }

    async fn write(&mut self, chunk: Bytes) -> Result<(), SinkError> {
        if self.state == SinkState::Ended {
            return Err(SinkError::WriteAfterEnd);
        }
        self.flush_head();
        self.state = SinkState::Streaming;
        if self.discard_body {
            tracing::trace!(len = chunk.len(), "discarding body bytes for bodiless response");
            return Ok(());
        }
        let tx = self.body_tx.as_ref().ok_or(SinkError::WriteAfterEnd)?;
        tx.send(chunk).await.map_err(|_| SinkError::Closed)
    }

    fn end(&mut self) {
        if self.state == SinkState::Ended {
            return;
        }
        // Close the channel before hyper can observe the head.
        self.ended.store(true, Ordering::Release);
        self.body_tx = None;
        if let Some(body) = self.pending_body.as_mut() {
            body.empty = true;
        }
        self.flush_head();
        self.state = SinkState::Ended;
        if self.discard_body {
            self.completion.complete(Ok(()));
        }
    }

    fn abort(&mut self, reason: BoxError) {
        if self.state == SinkState::Ended {
            tracing::debug!(error = %reason, "abort after end ignored");
            return;
        }
        self.completion.complete(Err(SinkError::Aborted(reason)));
        self.state = SinkState::Ended;
        self.body_tx = None;
        self.head_tx = None;
        self.pending_body = None;
    }

    fn completion(&self) -> Completion {
        self.completion.clone()
    }
}

impl Drop for HyperSink {
    fn drop(&mut self) {
        if self.state != SinkState::Ended {
            self.completion.complete(Err(SinkError::Dropped));
        }
    }
}

/// Response body fed by a [`HyperSink`].
#[derive(Debug)]
pub struct SinkBody {
    rx: mpsc::Receiver<Bytes>,
    ended: Arc<AtomicBool>,
    completion: Completion,
    empty: bool,
    done: bool,
    discarded: bool,
}

impl Body for SinkBody {
    type Data = Bytes;
    type Error = SinkError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, SinkError>>> {
        let this = self.get_mut();
        if this.done || this.discarded {
            return Poll::Ready(None);
        }
        match ready!(this.rx.poll_recv(cx)) {
            Some(chunk) => Poll::Ready(Some(Ok(Frame::data(chunk)))),
            None => {
                this.done = true;
                if this.ended.load(Ordering::Acquire) {
                    this.completion.complete(Ok(()));
                    Poll::Ready(None)
                } else {
                    this.completion.complete(Err(SinkError::Dropped));
                    Poll::Ready(Some(Err(SinkError::Dropped)))
                }
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.done || self.empty
    }

    fn size_hint(&self) -> SizeHint {
        if self.empty {
            SizeHint::with_exact(0)
        } else {
            SizeHint::default()
        }
    }
}

impl Drop for SinkBody {
    fn drop(&mut self) {
        if self.done || self.discarded {
            return;
        }
        let drained = self.ended.load(Ordering::Acquire)
            && matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected));
        if drained {
            self.completion.complete(Ok(()));
        } else {
            self.completion.complete(Err(SinkError::Closed));
        }
    }
}
