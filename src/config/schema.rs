//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

use crate::runtime::DEFAULT_ORIGIN;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Origin used for requests without a `host` header.
    pub default_origin: String,

    pub listener: ListenerConfig,

    pub observability: ObservabilityConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_origin: DEFAULT_ORIGIN.to_string(),
            listener: ListenerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Pending-connection queue length passed to `listen(2)`.
    pub backlog: u32,

    pub reuse_address: bool,

    /// Ignored on platforms without `SO_REUSEPORT`.
    pub reuse_port: bool,

    /// Refuse HTTP/2 prior-knowledge connections.
    pub http1_only: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            backlog: 511,
            reuse_address: true,
            reuse_port: false,
            http1_only: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
