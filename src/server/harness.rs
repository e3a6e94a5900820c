//! Accept loop and the running-server handle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::fetch::Handler;
use crate::lifecycle::Shutdown;
use crate::net::connection::ConnectionTracker;
use crate::net::{BindOptions, Listener, ServeError};
use crate::runtime::EdgeRuntime;

/// Pause after a failed accept so a persistent error (e.g. fd exhaustion)
/// does not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

/// A running listener.
///
/// Dropping the handle stops accepting, same as [`Server::shutdown`]
/// without waiting.
pub struct Server {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    connections: ConnectionTracker,
    accept_task: JoinHandle<()>,
}

impl Server {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Connections currently open.
    pub fn active_connections(&self) -> u64 {
        self.connections.active_count()
    }

    /// Tracker for open connections, usable after shutdown to drain them.
    pub fn connections(&self) -> ConnectionTracker {
        self.connections.clone()
    }

    /// Stop accepting and wait for the accept loop to exit.
    pub async fn shutdown(self) {
        self.shutdown.trigger();
        if let Err(err) = self.accept_task.await {
            tracing::warn!(error = %err, "Accept loop did not exit cleanly");
        }
        tracing::info!(address = %self.local_addr, "Listener stopped");
    }
}

/// Bind per `options` and serve `handler`. Returns once listening.
pub async fn serve<H: Handler>(
    runtime: EdgeRuntime,
    options: BindOptions,
    handler: H,
) -> Result<Server, ServeError> {
    let listener = Listener::bind(&options)?;
    let local_addr = listener.local_addr().map_err(|source| ServeError::Bind {
        address: options.address,
        source,
    })?;

    let shutdown = Shutdown::new();
    let connections = ConnectionTracker::new();
    let (ready_tx, ready_rx) = oneshot::channel();

    let accept_task = tokio::spawn(accept_loop(
        listener,
        runtime,
        Arc::new(handler),
        options.http1_only,
        connections.clone(),
        shutdown.subscribe(),
        ready_tx,
    ));

    ready_rx.await.map_err(|_| ServeError::NotListening)?;
    tracing::info!(address = %local_addr, http1_only = options.http1_only, "Listening for connections");

    Ok(Server {
        local_addr,
        shutdown,
        connections,
        accept_task,
    })
}

async fn accept_loop<H: Handler>(
    listener: Listener,
    runtime: EdgeRuntime,
    handler: Arc<H>,
    http1_only: bool,
    connections: ConnectionTracker,
    mut shutdown: broadcast::Receiver<()>,
    ready: oneshot::Sender<()>,
) {
    let _ = ready.send(());

    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let guard = connections.track();
                    let span = tracing::debug_span!("connection", id = %guard.id(), peer_addr = %peer);
                    let runtime = runtime.clone();
                    let handler = Arc::clone(&handler);
                    tokio::spawn(
                        async move {
                            let _guard = guard;
                            super::service::serve_connection(stream, peer, runtime, handler, http1_only).await;
                        }
                        .instrument(span),
                    );
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }
}
