//! Edge runtime demo server.
//!
//! Serves a single echo handler through [`EdgeRuntime`]:
//!
//! ```text
//!     GET/POST /anything  → 200 JSON {method, url, headers, body}
//!     /__decline          → handler returns nothing (empty 200)
//!     /__fail             → handler errors (connection reset, fault report)
//! ```
//!
//! Configuration comes from an optional TOML file, then command-line
//! overrides, then validation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use edge_runtime::config::{load_config, validate_config, ConfigError, RuntimeConfig};
use edge_runtime::lifecycle::shutdown_signal;
use edge_runtime::{observability, BindOptions, BoxError, EdgeRuntime, Request, Response};

#[derive(Debug, Parser)]
#[command(name = "edge-runtime", version, about = "Fetch-style handler runtime on hyper")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override `default_origin`.
    #[arg(long)]
    origin: Option<String>,
}

#[derive(Debug, Serialize)]
struct Echo {
    method: String,
    url: String,
    headers: BTreeMap<String, String>,
    body: Option<String>,
}

async fn echo(request: Request) -> Result<Option<Response>, BoxError> {
    match request.url().path() {
        "/__decline" => return Ok(None),
        "/__fail" => return Err("echo handler asked to fail".into()),
        _ => {}
    }

    let mut headers = BTreeMap::new();
    for name in request.headers().iter().map(|(name, _)| name.as_str()) {
        if let Some(value) = request.headers().get(name) {
            headers.insert(name.to_string(), value);
        }
    }
    let method = request.method().to_string();
    let url = request.url().to_string();
    let body = if request.has_body() {
        Some(request.text().await?)
    } else {
        None
    };

    Ok(Some(Response::json(&Echo {
        method,
        url,
        headers,
        body,
    })?))
}

fn resolve_config(cli: &Cli) -> Result<RuntimeConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RuntimeConfig::default(),
    };
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    if let Some(origin) = &cli.origin {
        config.default_origin = origin.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    observability::init(&config.observability)?;

    tracing::info!(
        default_origin = %config.default_origin,
        bind_address = %config.listener.bind_address,
        backlog = config.listener.backlog,
        "edge-runtime v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let runtime = EdgeRuntime::from_origin(&config.default_origin)?;
    let options = BindOptions::try_from(&config.listener)?;
    let server = runtime.serve(options, echo).await?;

    shutdown_signal().await;
    let connections = server.connections();
    server.shutdown().await;
    tracing::info!(open_connections = connections.active_count(), "Shutdown complete");
    Ok(())
}
