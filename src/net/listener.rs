//! TCP listener bound from a bind specification.
//!
//! # Responsibilities
//! - Apply socket options (reuse, backlog) before listening
//! - Accept incoming TCP connections
//! - Surface bind failures; accept failures are left to the caller

use std::net::{AddrParseError, SocketAddr};

use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket, TcpStream};

use crate::config::ListenerConfig;

/// Errors raised while starting to serve.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("invalid bind address {address:?}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("failed to bind {address}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to accept connection")]
    Accept(#[source] std::io::Error),

    #[error("listener stopped before it started accepting")]
    NotListening,
}

/// Where and how to listen. Passed through to the socket layer untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindOptions {
    pub address: SocketAddr,
    /// Pending connection queue length.
    pub backlog: u32,
    pub reuse_address: bool,
    /// Ignored on platforms without `SO_REUSEPORT`.
    pub reuse_port: bool,
    /// Serve HTTP/1.1 only instead of auto-detecting HTTP/2.
    pub http1_only: bool,
}

impl BindOptions {
    pub fn new(address: SocketAddr) -> Self {
        Self {
            address,
            backlog: 511,
            reuse_address: true,
            reuse_port: false,
            http1_only: false,
        }
    }
}

impl From<SocketAddr> for BindOptions {
    fn from(address: SocketAddr) -> Self {
        Self::new(address)
    }
}

impl TryFrom<&ListenerConfig> for BindOptions {
    type Error = ServeError;

    fn try_from(config: &ListenerConfig) -> Result<Self, Self::Error> {
        let address = config
            .bind_address
            .parse()
            .map_err(|source| ServeError::InvalidAddress {
                address: config.bind_address.clone(),
                source,
            })?;
        Ok(Self {
            address,
            backlog: config.backlog,
            reuse_address: config.reuse_address,
            reuse_port: config.reuse_port,
            http1_only: config.http1_only,
        })
    }
}

/// A listening TCP socket.
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Bind and start listening. Must be called inside a Tokio runtime.
    pub fn bind(options: &BindOptions) -> Result<Self, ServeError> {
        let address = options.address;
        let bind_err = |source| ServeError::Bind { address, source };

        let socket = if address.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_err)?;

        socket.set_reuseaddr(options.reuse_address).map_err(bind_err)?;
        #[cfg(all(unix, not(target_os = "solaris"), not(target_os = "illumos")))]
        socket.set_reuseport(options.reuse_port).map_err(bind_err)?;

        socket.bind(address).map_err(bind_err)?;
        let inner = socket.listen(options.backlog).map_err(bind_err)?;

        tracing::info!(
            address = %inner.local_addr().map_err(bind_err)?,
            backlog = options.backlog,
            "Listener bound"
        );

        Ok(Self { inner })
    }

    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ServeError> {
        let (stream, peer) = self.inner.accept().await.map_err(ServeError::Accept)?;
        tracing::debug!(peer_addr = %peer, "Connection accepted");
        Ok((stream, peer))
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }
}
