//! Request logging.
//!
//! Failure events are emitted through [`RequestLogger`], one call per event,
//! carrying a stable numeric code so operators can grep for a failure class.
//! [`TracingLogger`] forwards them to `tracing`; tests inject a recorder.

use std::fmt;

/// Code logged when a request could not complete at the transport level.
pub const TRANSPORT_FAILURE_CODE: u32 = 1_512_153_846;

/// Code logged when upstream answered with a status other than 200.
pub const UPSTREAM_STATUS_CODE: u32 = 1_512_153_847;

/// Severity of a logged event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Failure of an operation.
    Error,
    /// Degraded but handled.
    Warning,
    /// Informational.
    Info,
    /// Diagnostic detail.
    Debug,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        f.write_str(label)
    }
}

/// Sink for request log events. Fire-and-forget.
pub trait RequestLogger: Send + Sync {
    /// Record one event.
    fn log(&self, message: &str, severity: Severity, code: u32);
}

/// Forwards events to the `tracing` subscriber with `code` as a field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl RequestLogger for TracingLogger {
    fn log(&self, message: &str, severity: Severity, code: u32) {
        match severity {
            Severity::Error => tracing::error!(code, "{message}"),
            Severity::Warning => tracing::warn!(code, "{message}"),
            Severity::Info => tracing::info!(code, "{message}"),
            Severity::Debug => tracing::debug!(code, "{message}"),
        }
    }
}

/// Recorded event, as kept by [`MemoryLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Message text
    pub message: String,
    /// Severity
    pub severity: Severity,
    /// Event code
    pub code: u32,
}

/// Keeps events in memory. Handy for asserting on failure paths.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    events: std::sync::Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Recorded events carrying `code`.
    pub fn with_code(&self, code: u32) -> Vec<LogEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.code == code)
            .collect()
    }
}

impl RequestLogger for MemoryLogger {
    fn log(&self, message: &str, severity: Severity, code: u32) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(LogEvent {
                message: message.to_string(),
                severity,
                code,
            });
    }
}
