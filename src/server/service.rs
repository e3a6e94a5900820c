//! Per-connection hyper service.

use std::net::SocketAddr;
use std::sync::Arc;

use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpStream;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::fetch::Handler;
use crate::runtime::EdgeRuntime;

/// Drive one socket until the peer or hyper closes it.
pub(crate) async fn serve_connection<H: Handler>(
    stream: TcpStream,
    peer: SocketAddr,
    runtime: EdgeRuntime,
    handler: Arc<H>,
    http1_only: bool,
) {
    let exchange = tower::service_fn(move |request: http::Request<Incoming>| {
        runtime.exchange(request, Arc::clone(&handler))
    });
    let service = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .service(exchange);

    let mut builder = auto::Builder::new(TokioExecutor::new());
    if http1_only {
        builder = builder.http1_only();
    }

    if let Err(err) = builder
        .serve_connection(TokioIo::new(stream), TowerToHyperService::new(service))
        .await
    {
        tracing::debug!(peer_addr = %peer, error = %err, "Connection ended with error");
    }
}
