//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use edge_runtime::adapter::BufferedDiagnostics;
use edge_runtime::{BindOptions, EdgeRuntime, Handler, Server};

/// Ephemeral loopback bind options.
pub fn loopback() -> BindOptions {
    BindOptions::new("127.0.0.1:0".parse().unwrap())
}

/// Serve `handler` with a default runtime on an ephemeral port.
pub async fn start<H: Handler>(handler: H) -> Server {
    EdgeRuntime::default().serve(loopback(), handler).await.unwrap()
}

/// Serve `handler` with fault reports captured in memory.
pub async fn start_observed<H: Handler>(handler: H) -> (Server, Arc<BufferedDiagnostics>) {
    let diagnostics = Arc::new(BufferedDiagnostics::new());
    let runtime = EdgeRuntime::default().with_diagnostics(diagnostics.clone());
    let server = runtime.serve(loopback(), handler).await.unwrap();
    (server, diagnostics)
}

/// Write `raw` verbatim and read until the server closes the socket.
/// Requests should carry `Connection: close` or be HTTP/1.0.
pub async fn raw_request(addr: SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    let _ = tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut response)).await;
    String::from_utf8_lossy(&response).into_owned()
}

/// Header lines of a raw response whose name matches, case-insensitively.
pub fn header_lines<'a>(raw: &'a str, name: &str) -> Vec<&'a str> {
    let head = raw.split("\r\n\r\n").next().unwrap_or_default();
    head.lines()
        .skip(1)
        .filter(|line| {
            line.split_once(':')
                .is_some_and(|(key, _)| key.trim().eq_ignore_ascii_case(name))
        })
        .collect()
}

/// Poll until at least `count` reports arrived or a second passed.
pub async fn wait_for_reports(diagnostics: &BufferedDiagnostics, count: usize) -> Vec<String> {
    for _ in 0..100 {
        if diagnostics.reports().len() >= count {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    diagnostics.reports()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
