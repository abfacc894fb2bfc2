//! Query-trace logging: the database layer's logger contract and its
//! structured-logger adapter.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::attr::KeyValue;
use crate::config::{QueryLoggerConfig, QueryLoggerOption};
use crate::level::Level;
use crate::logger::{Context, StructuredLogger};

/// Row count reported when the number of affected rows is unknown.
pub const ROWS_UNKNOWN: i64 = -1;

/// Verbosity levels a database layer may request from its logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QueryLogLevel {
    Silent,
    Error,
    Warn,
    Info,
}

/// Logger contract used by a database access layer.
///
/// [`trace`](QueryLogger::trace) is called once after every executed
/// statement. `fc` renders the statement text and row count on demand and may
/// be expensive, so implementations should only call it when they log.
pub trait QueryLogger: Send + Sync {
    /// Returns a logger configured for `level`.
    fn log_mode(&self, level: QueryLogLevel) -> Self
    where
        Self: Sized;

    fn info(&self, ctx: &Context, msg: &str, data: &[KeyValue]);

    fn warn(&self, ctx: &Context, msg: &str, data: &[KeyValue]);

    fn error(&self, ctx: &Context, msg: &str, data: &[KeyValue]);

    fn trace(
        &self,
        ctx: &Context,
        begin: Instant,
        fc: &dyn Fn() -> (String, i64),
        err: Option<&dyn Error>,
    );
}

/// A [`QueryLogger`] that writes to a [`StructuredLogger`].
///
/// Which records are emitted depends only on the wrapped logger's
/// [`enabled`](StructuredLogger::enabled) predicate.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::{Duration, Instant};
/// use structured_log_bridge::{
///     with_slow_threshold, Context, QueryLogger, StructuredQueryLogger, TracingLogger,
/// };
///
/// let logger = StructuredQueryLogger::new(
///     Arc::new(TracingLogger::new()),
///     [with_slow_threshold(Duration::from_millis(250))],
/// );
/// logger.trace(
///     &Context::current(),
///     Instant::now(),
///     &|| ("SELECT 1".to_string(), 1),
///     None,
/// );
/// ```
#[derive(Clone)]
pub struct StructuredQueryLogger {
    logger: Arc<dyn StructuredLogger>,
    config: QueryLoggerConfig,
}

impl StructuredQueryLogger {
    /// Create a logger, applying `options` in order over the defaults.
    pub fn new<I>(logger: Arc<dyn StructuredLogger>, options: I) -> Self
    where
        I: IntoIterator<Item = QueryLoggerOption>,
    {
        Self::with_config(logger, QueryLoggerConfig::default().with_options(options))
    }

    /// Create a logger from a prepared configuration.
    pub fn with_config(logger: Arc<dyn StructuredLogger>, config: QueryLoggerConfig) -> Self {
        Self { logger, config }
    }

    /// Get the wrapped structured logger.
    pub fn logger(&self) -> &Arc<dyn StructuredLogger> {
        &self.logger
    }

    /// Get the configuration.
    pub fn config(&self) -> &QueryLoggerConfig {
        &self.config
    }
}

impl fmt::Debug for StructuredQueryLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredQueryLogger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl QueryLogger for StructuredQueryLogger {
    /// Returns a copy of this logger. `level` is ignored.
    ///
    /// Only here to satisfy [`QueryLogger`]; do not rely on it. Verbosity is
    /// decided by the wrapped logger's own level filtering.
    fn log_mode(&self, _level: QueryLogLevel) -> Self {
        self.clone()
    }

    fn info(&self, ctx: &Context, msg: &str, data: &[KeyValue]) {
        self.logger.info(ctx, msg, data);
    }

    fn warn(&self, ctx: &Context, msg: &str, data: &[KeyValue]) {
        self.logger.warn(ctx, msg, data);
    }

    fn error(&self, ctx: &Context, msg: &str, data: &[KeyValue]) {
        self.logger.error(ctx, msg, data);
    }

    fn trace(
        &self,
        ctx: &Context,
        begin: Instant,
        fc: &dyn Fn() -> (String, i64),
        err: Option<&dyn Error>,
    ) {
        let elapsed = begin.elapsed();
        match err {
            Some(err) if self.logger.enabled(ctx, Level::Error) => {
                let attrs = build_trace_attrs(elapsed, fc);
                self.logger.error(ctx, &err.to_string(), &attrs);
            }
            _ if elapsed > self.config.slow_threshold
                && self.logger.enabled(ctx, Level::Warn) =>
            {
                let attrs = build_trace_attrs(elapsed, fc);
                self.logger.warn(ctx, "SLOW QUERY", &attrs);
            }
            _ if self.logger.enabled(ctx, Level::Info) => {
                let attrs = build_trace_attrs(elapsed, fc);
                self.logger.info(ctx, "QUERY", &attrs);
            }
            _ => {}
        }
    }
}

fn build_trace_attrs(elapsed: Duration, fc: &dyn Fn() -> (String, i64)) -> Vec<KeyValue> {
    let (sql, rows) = fc();
    let mut attrs = vec![KeyValue::new("elapsed", elapsed), KeyValue::new("sql", sql)];
    if rows != ROWS_UNKNOWN {
        attrs.push(KeyValue::new("rows", rows));
    }
    attrs
}
