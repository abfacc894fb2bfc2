//! # structured-log-bridge
//!
//! Adapters that let a structured, leveled logger act as the logging backend of
//! a database access layer and of a messaging client.
//!
//! Both adapters wrap a [`StructuredLogger`], the host application's logger.
//! [`TracingLogger`] implements it on top of `tracing`, so records end up in
//! whatever subscriber the application installs.
//!
//! ## Features
//!
//! - **Query tracing**: [`StructuredQueryLogger`] implements [`QueryLogger`] and
//!   reports each statement as `QUERY`, `SLOW QUERY` or the error text
//! - **Lazy SQL rendering**: statement text is only produced when a record is emitted
//! - **SeaORM integration**: [`TracedConnection`] drives a [`QueryLogger`] for every
//!   statement run through it
//! - **Client logging**: [`StructuredClientLogger`] implements [`ClientLogger`] for
//!   messaging clients, mapping their levels both ways
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sea_orm::Database;
//! use structured_log_bridge::TracedConnection;
//!
//! let db = Database::connect("postgres://localhost/mydb").await?;
//! let traced_db = TracedConnection::from(db);
//!
//! let users = Users::find().all(&traced_db).await?;
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use structured_log_bridge::{with_slow_threshold, StructuredQueryLogger, TracingLogger};
//!
//! let logger = StructuredQueryLogger::new(
//!     Arc::new(TracingLogger::new()),
//!     [with_slow_threshold(Duration::from_millis(100))],
//! );
//! let traced_db = db.with_query_logger(logger);
//! ```
//!
//! ## Record Attributes
//!
//! | Attribute | Description |
//! |-----------|-------------|
//! | `elapsed` | Time since the statement started |
//! | `sql` | Rendered SQL statement |
//! | `rows` | Rows returned/affected, omitted when unknown |
//!
//! The log level reported through [`QueryLogger::log_mode`] is ignored; the
//! wrapped [`StructuredLogger`] alone decides what is emitted.

mod attr;
mod client;
mod config;
mod connection;
mod level;
mod logger;
mod query;

#[cfg(test)]
mod testing;

pub use attr::{KeyValue, Value};
pub use client::{ClientLogLevel, ClientLogger, StructuredClientLogger};
pub use config::{with_slow_threshold, QueryLoggerConfig, QueryLoggerOption, DEFAULT_SLOW_THRESHOLD};
pub use connection::{QueryLoggingExt, TracedConnection};
pub use level::Level;
pub use logger::{Context, StructuredLogger, TracingLogger, TARGET};
pub use query::{QueryLogLevel, QueryLogger, StructuredQueryLogger, ROWS_UNKNOWN};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ClientLogger, QueryLogger, QueryLoggingExt, StructuredClientLogger, StructuredLogger,
        StructuredQueryLogger, TracedConnection, TracingLogger,
    };
}
