//! Configuration validation.
//!
//! # Responsibilities
//! - Default origin is an absolute http(s) URL
//! - Bind address parses as a socket address
//! - Value ranges (backlog > 0, known log level)

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::RuntimeConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check every field, collecting all failures.
pub fn validate_config(config: &RuntimeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.default_origin) {
        Ok(url) if !matches!(url.scheme(), "http" | "https") => errors.push(ValidationError::new(
            "default_origin",
            format!("scheme must be http or https, got {}", url.scheme()),
        )),
        Ok(url) if url.host_str().is_none() => {
            errors.push(ValidationError::new("default_origin", "origin has no host"))
        }
        Ok(_) => {}
        Err(err) => errors.push(ValidationError::new("default_origin", err.to_string())),
    }

    if let Err(err) = config.listener.bind_address.parse::<SocketAddr>() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("{} ({})", err, config.listener.bind_address),
        ));
    }

    if config.listener.backlog == 0 {
        errors.push(ValidationError::new("listener.backlog", "must be greater than zero"));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level {}", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
