//! Error observer for outgoing responses.
//!
//! Watches a sink's [`Completion`] and writes one indented report when the
//! response finishes abnormally. Reporting never feeds back into the
//! exchange.

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crate::net::Completion;

/// Destination for fault reports.
pub trait DiagnosticSink: Send + Sync + 'static {
    fn report(&self, message: &str);
}

/// Reports through `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, message: &str) {
        tracing::error!(target: "edge_runtime::diagnostics", "{message}");
    }
}

/// Keeps reports in memory.
#[derive(Debug, Default)]
pub struct BufferedDiagnostics {
    reports: Mutex<Vec<String>>,
}

impl BufferedDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<String> {
        match self.reports.lock() {
            Ok(reports) => reports.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for BufferedDiagnostics {
    fn report(&self, message: &str) {
        match self.reports.lock() {
            Ok(mut reports) => reports.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}

/// Render an error and its sources, every line indented by two spaces and
/// the block framed by blank lines.
pub fn format_report(err: &(dyn Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str("\ncaused by: ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    let indented: Vec<String> = message.lines().map(|line| format!("  {line}")).collect();
    format!("\n{}\n", indented.join("\n"))
}

/// Spawn a task that reports the completion's error, if any.
pub fn observe(completion: &Completion, diagnostics: Arc<dyn DiagnosticSink>) -> JoinHandle<()> {
    let finished = completion.finished();
    tokio::spawn(async move {
        if let Err(err) = finished.await {
            diagnostics.report(&format_report(&*err));
        }
    })
}
