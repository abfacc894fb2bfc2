//! In-memory logger used by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::attr::KeyValue;
use crate::level::Level;
use crate::logger::{Context, StructuredLogger};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Record {
    pub(crate) level: Level,
    pub(crate) message: String,
    pub(crate) attrs: Vec<KeyValue>,
    pub(crate) has_span: bool,
}

/// Records everything at or above `min_level`. `None` disables every level.
#[derive(Debug)]
pub(crate) struct RecordingLogger {
    min_level: Option<Level>,
    records: Mutex<Vec<Record>>,
    enabled_calls: AtomicUsize,
}

impl RecordingLogger {
    pub(crate) fn new(min_level: Level) -> Self {
        Self {
            min_level: Some(min_level),
            records: Mutex::new(Vec::new()),
            enabled_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn disabled() -> Self {
        Self {
            min_level: None,
            records: Mutex::new(Vec::new()),
            enabled_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    pub(crate) fn enabled_calls(&self) -> usize {
        self.enabled_calls.load(Ordering::SeqCst)
    }
}

impl StructuredLogger for RecordingLogger {
    fn enabled(&self, _ctx: &Context, level: Level) -> bool {
        self.enabled_calls.fetch_add(1, Ordering::SeqCst);
        self.min_level.is_some_and(|min| level >= min)
    }

    fn log(&self, ctx: &Context, level: Level, msg: &str, attrs: &[KeyValue]) {
        self.records.lock().unwrap().push(Record {
            level,
            message: msg.to_string(),
            attrs: attrs.to_vec(),
            has_span: ctx.span().is_some(),
        });
    }
}
