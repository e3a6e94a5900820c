//! The adapter instance tying transport records to fetch-style handlers.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use tokio::task::JoinHandle;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::adapter::{self, DiagnosticSink, TracingDiagnostics};
use crate::fetch::{BoxError, Handler, Headers, Request};
use crate::net::{BindOptions, Completion, HyperSink, IncomingRecord, ResponseSink, ServeError, SinkBody, SinkError};
use crate::server::{self, Server};

/// Origin used when a request carries no host information.
pub const DEFAULT_ORIGIN: &str = "https://localhost";

/// Serves [`Handler`]s on top of hyper connections.
///
/// Cheap to clone. Holds nothing but its default origin and diagnostic
/// sink, so several instances with different defaults can coexist.
#[derive(Clone)]
pub struct EdgeRuntime {
    default_origin: Arc<Url>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl EdgeRuntime {
    pub fn new(default_origin: Url) -> Self {
        Self {
            default_origin: Arc::new(default_origin),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Parse `origin` and build a runtime around it.
    pub fn from_origin(origin: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(origin)?))
    }

    /// Send fault reports somewhere other than `tracing`.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn default_origin(&self) -> &Url {
        &self.default_origin
    }

    /// Absolute URL of the incoming request.
    pub fn to_url<B>(&self, record: &IncomingRecord<B>) -> Url {
        let host = record.header("host").and_then(|value| value.first());
        adapter::url::resolve(record.target.as_deref(), host, &self.default_origin)
    }

    pub fn to_headers<B>(&self, record: &IncomingRecord<B>) -> Headers {
        adapter::headers::to_headers(&record.headers)
    }

    /// Build the standardized request. The native body is not read here.
    pub fn to_request<B>(&self, record: IncomingRecord<B>) -> Request
    where
        B: hyper::body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let url = self.to_url(&record);
        let headers = self.to_headers(&record);
        let body = adapter::body::to_body(&record.method, record.body);
        Request::from_parts(url, record.method, headers, body)
    }

    /// Report abnormal completion of a response.
    pub fn observe(&self, completion: &Completion) -> JoinHandle<()> {
        adapter::observe(completion, Arc::clone(&self.diagnostics))
    }

    /// Bind, start accepting, and return once the listener is live.
    pub async fn serve<H: Handler>(&self, options: BindOptions, handler: H) -> Result<Server, ServeError> {
        server::serve(self.clone(), options, handler).await
    }

    /// Run one exchange. The handler runs on its own task; the returned
    /// future resolves with the response head once the sink releases it.
    pub(crate) fn exchange<B, H>(
        &self,
        request: http::Request<B>,
        handler: Arc<H>,
    ) -> impl Future<Output = Result<http::Response<SinkBody>, SinkError>> + Send + 'static
    where
        B: hyper::body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
        H: Handler,
    {
        let record = IncomingRecord::from_request(request);
        let span = tracing::debug_span!(
            "exchange",
            id = %Uuid::new_v4(),
            method = %record.method,
            path = record.target.as_deref().unwrap_or("/"),
        );

        let (mut sink, head) = HyperSink::new(&record.method);
        self.observe(&sink.completion());
        let request = self.to_request(record);

        tokio::spawn(
            async move {
                if let Err(err) = adapter::respond_with(Handler::call(handler.as_ref(), request), &mut sink).await {
                    tracing::debug!(error = %err, "exchange failed");
                    sink.abort(err);
                }
            }
            .instrument(span),
        );

        async move { head.await.map_err(|_| SinkError::Dropped) }
    }
}

impl Default for EdgeRuntime {
    fn default() -> Self {
        Self::new(Url::parse(DEFAULT_ORIGIN).expect("default origin is a valid URL"))
    }
}

impl std::fmt::Debug for EdgeRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeRuntime")
            .field("default_origin", &self.default_origin.as_str())
            .finish_non_exhaustive()
    }
}
