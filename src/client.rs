//! Logging bridge for messaging/streaming clients.

use std::fmt;
use std::sync::Arc;

use crate::attr::KeyValue;
use crate::level::Level;
use crate::logger::{Context, StructuredLogger};

/// Log level as understood by a messaging client.
///
/// Clients pass levels as small integers, so values outside the named
/// constants are representable and must be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientLogLevel(pub i8);

impl ClientLogLevel {
    pub const NONE: ClientLogLevel = ClientLogLevel(0);
    pub const ERROR: ClientLogLevel = ClientLogLevel(1);
    pub const WARN: ClientLogLevel = ClientLogLevel(2);
    pub const INFO: ClientLogLevel = ClientLogLevel(3);
    pub const DEBUG: ClientLogLevel = ClientLogLevel(4);

    pub fn as_str(&self) -> &'static str {
        match *self {
            ClientLogLevel::NONE => "NONE",
            ClientLogLevel::ERROR => "ERROR",
            ClientLogLevel::WARN => "WARN",
            ClientLogLevel::INFO => "INFO",
            ClientLogLevel::DEBUG => "DEBUG",
            _ => "UNKNOWN",
        }
    }
}

impl fmt::Display for ClientLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<i8> for ClientLogLevel {
    fn from(value: i8) -> Self {
        ClientLogLevel(value)
    }
}

/// Logger contract used by a messaging client.
pub trait ClientLogger: Send + Sync {
    /// The most verbose level the client should log at.
    fn level(&self) -> ClientLogLevel;

    fn log(&self, level: ClientLogLevel, msg: &str, keyvals: &[KeyValue]);
}

/// A [`ClientLogger`] that writes to a [`StructuredLogger`].
///
/// The level reported to the client comes from the wrapped logger.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use structured_log_bridge::{ClientLogLevel, ClientLogger, KeyValue, StructuredClientLogger, TracingLogger};
///
/// let logger = StructuredClientLogger::new(Arc::new(TracingLogger::new()));
/// logger.log(ClientLogLevel::INFO, "metadata refreshed", &[KeyValue::new("brokers", 3i64)]);
/// ```
#[derive(Clone)]
pub struct StructuredClientLogger {
    logger: Arc<dyn StructuredLogger>,
}

impl StructuredClientLogger {
    pub fn new(logger: Arc<dyn StructuredLogger>) -> Self {
        Self { logger }
    }

    /// Get the wrapped structured logger.
    pub fn logger(&self) -> &Arc<dyn StructuredLogger> {
        &self.logger
    }
}

impl fmt::Debug for StructuredClientLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredClientLogger").finish_non_exhaustive()
    }
}

impl ClientLogger for StructuredClientLogger {
    /// Snapshot of the wrapped logger's verbosity. Call again to observe
    /// changes.
    fn level(&self) -> ClientLogLevel {
        // Background context: the client asks outside of any request.
        let ctx = Context::background();
        if self.logger.enabled(&ctx, Level::Debug) {
            ClientLogLevel::DEBUG
        } else if self.logger.enabled(&ctx, Level::Info) {
            ClientLogLevel::INFO
        } else if self.logger.enabled(&ctx, Level::Warn) {
            ClientLogLevel::WARN
        } else if self.logger.enabled(&ctx, Level::Error) {
            ClientLogLevel::ERROR
        } else {
            ClientLogLevel::NONE
        }
    }

    fn log(&self, level: ClientLogLevel, msg: &str, keyvals: &[KeyValue]) {
        self.logger
            .log(&Context::background(), to_level(level), msg, keyvals);
    }
}

/// Unknown client levels, `NONE` included, map to `Info`.
fn to_level(level: ClientLogLevel) -> Level {
    match level {
        ClientLogLevel::DEBUG => Level::Debug,
        ClientLogLevel::INFO => Level::Info,
        ClientLogLevel::WARN => Level::Warn,
        ClientLogLevel::ERROR => Level::Error,
        _ => Level::Info,
    }
}
