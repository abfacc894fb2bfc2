//! The structured logger both adapters write to.
//!
//! [`StructuredLogger`] is the host side of every bridge in this crate. Any
//! leveled logger that can answer "is this level enabled" and emit a message
//! with key/value attributes can implement it. [`TracingLogger`] is the
//! implementation backed by the `tracing` facade.

use std::sync::Arc;

use tracing::Span;

use crate::attr::{DisplayAttrs, KeyValue};
use crate::level::Level;

/// Target used for every event emitted by [`TracingLogger`].
pub const TARGET: &str = "structured_log_bridge";

/// Call-scoped context handed to the logger.
///
/// A context optionally carries the span the record belongs to. It never
/// cancels or times out anything on its own.
#[derive(Debug, Clone, Default)]
pub struct Context {
    span: Option<Span>,
}

impl Context {
    /// A context with no span attached. Events are parented to whatever span
    /// is current when they are emitted.
    pub fn background() -> Self {
        Self { span: None }
    }

    /// Captures the current span.
    pub fn current() -> Self {
        let span = Span::current();
        if span.is_none() {
            Self::background()
        } else {
            Self { span: Some(span) }
        }
    }

    pub fn span(&self) -> Option<&Span> {
        self.span.as_ref()
    }
}

impl From<Span> for Context {
    fn from(span: Span) -> Self {
        Self { span: Some(span) }
    }
}

/// A leveled logger whose records carry a message and key/value attributes.
pub trait StructuredLogger: Send + Sync {
    /// Reports whether records at `level` would be emitted.
    fn enabled(&self, ctx: &Context, level: Level) -> bool;

    /// Emits one record.
    fn log(&self, ctx: &Context, level: Level, msg: &str, attrs: &[KeyValue]);

    fn debug(&self, ctx: &Context, msg: &str, attrs: &[KeyValue]) {
        self.log(ctx, Level::Debug, msg, attrs);
    }

    fn info(&self, ctx: &Context, msg: &str, attrs: &[KeyValue]) {
        self.log(ctx, Level::Info, msg, attrs);
    }

    fn warn(&self, ctx: &Context, msg: &str, attrs: &[KeyValue]) {
        self.log(ctx, Level::Warn, msg, attrs);
    }

    fn error(&self, ctx: &Context, msg: &str, attrs: &[KeyValue]) {
        self.log(ctx, Level::Error, msg, attrs);
    }
}

macro_rules! forward_structured_logger {
    ($($ty:ty),+) => {
        $(
            impl<T: StructuredLogger + ?Sized> StructuredLogger for $ty {
                fn enabled(&self, ctx: &Context, level: Level) -> bool {
                    (**self).enabled(ctx, level)
                }

                fn log(&self, ctx: &Context, level: Level, msg: &str, attrs: &[KeyValue]) {
                    (**self).log(ctx, level, msg, attrs);
                }

                fn debug(&self, ctx: &Context, msg: &str, attrs: &[KeyValue]) {
                    (**self).debug(ctx, msg, attrs);
                }

                fn info(&self, ctx: &Context, msg: &str, attrs: &[KeyValue]) {
                    (**self).info(ctx, msg, attrs);
                }

                fn warn(&self, ctx: &Context, msg: &str, attrs: &[KeyValue]) {
                    (**self).warn(ctx, msg, attrs);
                }

                fn error(&self, ctx: &Context, msg: &str, attrs: &[KeyValue]) {
                    (**self).error(ctx, msg, attrs);
                }
            }
        )+
    };
}

forward_structured_logger!(&T, Arc<T>);

/// A [`StructuredLogger`] that emits `tracing` events.
///
/// Level filtering is whatever the installed subscriber decides; this type
/// never installs one. Attributes are rendered into a single `attrs` field as
/// `key=value` text, since `tracing` field names are fixed per callsite.
/// Subscribers therefore see them as one string, not as typed fields: a JSON
/// formatter writes `"attrs": "sql=\"SELECT 1\" rows=3"`, and `rows` cannot be
/// filtered on as a number.
///
/// # Example
///
/// ```rust
/// use structured_log_bridge::{Context, Level, StructuredLogger, TracingLogger};
///
/// let logger = TracingLogger::new();
/// if logger.enabled(&Context::background(), Level::Info) {
///     logger.info(&Context::background(), "connected", &[]);
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

// `tracing` needs the level as a constant at each callsite.
macro_rules! emit {
    ($ctx:expr, $lvl:expr, $msg:expr, $attrs:expr) => {
        match $ctx.span() {
            Some(span) => tracing::event!(
                target: TARGET,
                parent: span,
                $lvl,
                attrs = %DisplayAttrs($attrs),
                "{}",
                $msg
            ),
            None => tracing::event!(
                target: TARGET,
                $lvl,
                attrs = %DisplayAttrs($attrs),
                "{}",
                $msg
            ),
        }
    };
}

impl StructuredLogger for TracingLogger {
    fn enabled(&self, _ctx: &Context, level: Level) -> bool {
        match level {
            Level::Debug => tracing::enabled!(target: TARGET, tracing::Level::DEBUG),
            Level::Info => tracing::enabled!(target: TARGET, tracing::Level::INFO),
            Level::Warn => tracing::enabled!(target: TARGET, tracing::Level::WARN),
            Level::Error => tracing::enabled!(target: TARGET, tracing::Level::ERROR),
        }
    }

    fn log(&self, ctx: &Context, level: Level, msg: &str, attrs: &[KeyValue]) {
        match level {
            Level::Debug => emit!(ctx, tracing::Level::DEBUG, msg, attrs),
            Level::Info => emit!(ctx, tracing::Level::INFO, msg, attrs),
            Level::Warn => emit!(ctx, tracing::Level::WARN, msg, attrs),
            Level::Error => emit!(ctx, tracing::Level::ERROR, msg, attrs),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use tracing_subscriber::filter::LevelFilter;

    use super::*;
    use crate::testing::RecordingLogger;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn with_subscriber<F: FnOnce()>(max: LevelFilter, buf: &SharedBuf, f: F) {
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(max)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn test_enabled_follows_subscriber_level() {
        let buf = SharedBuf::default();
        with_subscriber(LevelFilter::WARN, &buf, || {
            let logger = TracingLogger::new();
            let ctx = Context::background();
            assert!(!logger.enabled(&ctx, Level::Debug));
            assert!(!logger.enabled(&ctx, Level::Info));
            assert!(logger.enabled(&ctx, Level::Warn));
            assert!(logger.enabled(&ctx, Level::Error));
        });
    }

    #[test]
    fn test_nothing_enabled_when_off() {
        let buf = SharedBuf::default();
        with_subscriber(LevelFilter::OFF, &buf, || {
            let logger = TracingLogger::new();
            assert!(!logger.enabled(&Context::background(), Level::Error));
        });
    }

    #[test]
    fn test_log_writes_message_and_attrs() {
        let buf = SharedBuf::default();
        with_subscriber(LevelFilter::DEBUG, &buf, || {
            let logger = TracingLogger::new();
            logger.warn(
                &Context::background(),
                "SLOW QUERY",
                &[KeyValue::new("sql", "SELECT 1"), KeyValue::new("rows", 3i64)],
            );
        });

        let out = buf.contents();
        assert!(out.contains("WARN"), "{out}");
        assert!(out.contains("SLOW QUERY"), "{out}");
        assert!(out.contains(r#"sql="SELECT 1" rows=3"#), "{out}");
    }

    #[test]
    fn test_log_inside_span_context() {
        let buf = SharedBuf::default();
        with_subscriber(LevelFilter::INFO, &buf, || {
            let span = tracing::info_span!("request", id = 7);
            let ctx = Context::from(span);
            TracingLogger::new().info(&ctx, "QUERY", &[]);
        });

        let out = buf.contents();
        assert!(out.contains("request{id=7}"), "{out}");
        assert!(out.contains("QUERY"), "{out}");
    }

    #[test]
    fn test_filtered_level_not_written() {
        let buf = SharedBuf::default();
        with_subscriber(LevelFilter::ERROR, &buf, || {
            TracingLogger::new().info(&Context::background(), "QUERY", &[]);
        });
        assert!(buf.contents().is_empty());
    }

    #[test]
    fn test_current_context_without_span() {
        assert!(Context::current().span().is_none());
        assert!(Context::background().span().is_none());
    }

    fn log_if_info_enabled<L: StructuredLogger>(logger: L, msg: &str) {
        let ctx = Context::background();
        if logger.enabled(&ctx, Level::Info) {
            logger.info(&ctx, msg, &[KeyValue::new("via", "wrapper")]);
        }
    }

    #[test]
    fn test_reference_forwards_to_logger() {
        let recorder = RecordingLogger::new(Level::Info);
        log_if_info_enabled(&recorder, "borrowed");

        let records = recorder.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Info);
        assert_eq!(records[0].message, "borrowed");
        assert_eq!(recorder.enabled_calls(), 1);
    }

    #[test]
    fn test_nested_arc_forwards_to_logger() {
        let recorder = Arc::new(RecordingLogger::new(Level::Info));
        log_if_info_enabled(Arc::new(recorder.clone()), "shared");

        let records = recorder.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "shared");
        assert_eq!(records[0].attrs, [KeyValue::new("via", "wrapper")]);
    }

    #[test]
    fn test_forwarding_respects_disabled_levels() {
        let recorder = RecordingLogger::new(Level::Error);
        log_if_info_enabled(&&recorder, "dropped");
        assert!(recorder.records().is_empty());
        assert_eq!(recorder.enabled_calls(), 1);
    }
}
