//! SeaORM connection wrapper that reports every statement to a [`QueryLogger`].

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr,
    ExecResult, IsolationLevel, QueryResult, Statement, StreamTrait, TransactionError,
    TransactionTrait,
};

use crate::config::QueryLoggerConfig;
use crate::logger::{Context, TracingLogger};
use crate::query::{QueryLogger, StructuredQueryLogger, ROWS_UNKNOWN};

/// A wrapper around SeaORM's `DatabaseConnection` that traces every query.
///
/// This wrapper implements `ConnectionTrait`, `StreamTrait`, and `TransactionTrait`,
/// making it a drop-in replacement for `DatabaseConnection`. After each statement
/// completes, [`QueryLogger::trace`] is called with the start time, a provider
/// for the rendered SQL and row count, and the error if the statement failed.
///
/// The SQL text is only rendered when the logger decides to emit a record.
///
/// Only statements run through this wrapper are reported. Transactions are
/// reported as a single `BEGIN` or `TRANSACTION` record, and statements run on
/// the returned `DatabaseTransaction` bypass the query logger.
///
/// # Example
///
/// ```rust,ignore
/// use sea_orm::Database;
/// use structured_log_bridge::TracedConnection;
///
/// let db = Database::connect("postgres://localhost/mydb").await?;
/// let traced = TracedConnection::from(db);
///
/// // Every query is now reported as QUERY / SLOW QUERY / error records
/// let users = Users::find().all(&traced).await?;
/// ```
pub struct TracedConnection {
    inner: DatabaseConnection,
    logger: Arc<dyn QueryLogger>,
}

impl TracedConnection {
    /// Create a traced connection reporting to `logger`.
    pub fn new(connection: DatabaseConnection, logger: impl QueryLogger + 'static) -> Self {
        Self {
            inner: connection,
            logger: Arc::new(logger),
        }
    }

    /// Create a traced connection logging through `tracing` with default configuration.
    pub fn wrap(connection: DatabaseConnection) -> Self {
        Self::new(
            connection,
            StructuredQueryLogger::with_config(
                Arc::new(TracingLogger::new()),
                QueryLoggerConfig::default(),
            ),
        )
    }

    /// Get a reference to the underlying `DatabaseConnection`.
    pub fn inner(&self) -> &DatabaseConnection {
        &self.inner
    }

    /// Get the query logger.
    pub fn query_logger(&self) -> &Arc<dyn QueryLogger> {
        &self.logger
    }

    /// Consume the wrapper and return the inner `DatabaseConnection`.
    pub fn into_inner(self) -> DatabaseConnection {
        self.inner
    }

    fn trace(&self, start: Instant, stmt: &Statement, rows: i64, err: Option<&dyn Error>) {
        self.logger
            .trace(&Context::current(), start, &|| (stmt.to_string(), rows), err);
    }

    /// Report the result of a statement, counting rows with `rows` on success.
    fn record<T>(
        &self,
        start: Instant,
        stmt: &Statement,
        result: &Result<T, DbErr>,
        rows: impl FnOnce(&T) -> i64,
    ) {
        match result {
            Ok(value) => self.trace(start, stmt, rows(value), None),
            Err(e) => self.trace(start, stmt, ROWS_UNKNOWN, Some(e as &dyn Error)),
        }
    }

    fn record_transaction<T, E: fmt::Display>(
        &self,
        start: Instant,
        stmt: &Statement,
        result: &Result<T, TransactionError<E>>,
    ) {
        match result {
            Ok(_) => self.trace(start, stmt, ROWS_UNKNOWN, None),
            Err(e) => {
                let failure = TransactionFailure(match e {
                    TransactionError::Connection(db_err) => db_err.to_string(),
                    TransactionError::Transaction(err) => err.to_string(),
                });
                self.trace(start, stmt, ROWS_UNKNOWN, Some(&failure as &dyn Error));
            }
        }
    }

    fn pseudo_statement(&self, sql: &str) -> Statement {
        Statement::from_string(self.get_database_backend(), sql)
    }
}

impl fmt::Debug for TracedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracedConnection")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl From<DatabaseConnection> for TracedConnection {
    fn from(connection: DatabaseConnection) -> Self {
        Self::wrap(connection)
    }
}

impl AsRef<DatabaseConnection> for TracedConnection {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.inner
    }
}

fn row_count(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[derive(Debug)]
struct TransactionFailure(String);

impl fmt::Display for TransactionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for TransactionFailure {}

#[async_trait]
impl ConnectionTrait for TracedConnection {
    fn get_database_backend(&self) -> DbBackend {
        self.inner.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        let rendered = stmt.clone();
        let start = Instant::now();

        let result = self.inner.execute(stmt).await;

        self.record(start, &rendered, &result, |r| row_count(r.rows_affected()));
        result
    }

    async fn execute_unprepared(&self, sql: &str) -> Result<ExecResult, DbErr> {
        let rendered = self.pseudo_statement(sql);
        let start = Instant::now();

        let result = self.inner.execute_unprepared(sql).await;

        self.record(start, &rendered, &result, |r| row_count(r.rows_affected()));
        result
    }

    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        let rendered = stmt.clone();
        let start = Instant::now();

        let result = self.inner.query_one(stmt).await;

        self.record(start, &rendered, &result, |row| i64::from(row.is_some()));
        result
    }

    async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        let rendered = stmt.clone();
        let start = Instant::now();

        let result = self.inner.query_all(stmt).await;

        self.record(start, &rendered, &result, |rows| row_count(rows.len() as u64));
        result
    }

    fn support_returning(&self) -> bool {
        self.inner.support_returning()
    }

    fn is_mock_connection(&self) -> bool {
        self.inner.is_mock_connection()
    }
}

impl StreamTrait for TracedConnection {
    type Stream<'a> = <DatabaseConnection as StreamTrait>::Stream<'a>;

    fn stream<'a>(
        &'a self,
        stmt: Statement,
    ) -> Pin<Box<dyn Future<Output = Result<Self::Stream<'a>, DbErr>> + 'a + Send>> {
        Box::pin(async move {
            let rendered = stmt.clone();
            let start = Instant::now();

            let result = self.inner.stream(stmt).await;

            // Rows are unknown until the stream is drained.
            self.record(start, &rendered, &result, |_| ROWS_UNKNOWN);
            result
        })
    }
}

#[async_trait]
impl TransactionTrait for TracedConnection {
    async fn begin(&self) -> Result<DatabaseTransaction, DbErr> {
        let rendered = self.pseudo_statement("BEGIN");
        let start = Instant::now();

        let result = self.inner.begin().await;

        self.record(start, &rendered, &result, |_| ROWS_UNKNOWN);
        result
    }

    async fn begin_with_config(
        &self,
        isolation_level: Option<IsolationLevel>,
        access_mode: Option<AccessMode>,
    ) -> Result<DatabaseTransaction, DbErr> {
        let rendered = self.pseudo_statement("BEGIN");
        let start = Instant::now();

        let result = self
            .inner
            .begin_with_config(isolation_level, access_mode)
            .await;

        self.record(start, &rendered, &result, |_| ROWS_UNKNOWN);
        result
    }

    async fn transaction<F, T, E>(&self, callback: F) -> Result<T, TransactionError<E>>
    where
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>
            + Send,
        T: Send,
        E: std::fmt::Display + std::fmt::Debug + Send,
    {
        let rendered = self.pseudo_statement("TRANSACTION");
        let start = Instant::now();

        let result = self.inner.transaction(callback).await;

        self.record_transaction(start, &rendered, &result);
        result
    }

    async fn transaction_with_config<F, T, E>(
        &self,
        callback: F,
        isolation_level: Option<IsolationLevel>,
        access_mode: Option<AccessMode>,
    ) -> Result<T, TransactionError<E>>
    where
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>
            + Send,
        T: Send,
        E: std::fmt::Display + std::fmt::Debug + Send,
    {
        let rendered = self.pseudo_statement("TRANSACTION");
        let start = Instant::now();

        let result = self
            .inner
            .transaction_with_config(callback, isolation_level, access_mode)
            .await;

        self.record_transaction(start, &rendered, &result);
        result
    }
}

/// Extension trait for easy wrapping of database connections.
pub trait QueryLoggingExt {
    /// Wrap this connection, logging queries through `tracing`.
    fn with_query_logging(self) -> TracedConnection;

    /// Wrap this connection, reporting queries to `logger`.
    fn with_query_logger(self, logger: impl QueryLogger + 'static) -> TracedConnection;
}

impl QueryLoggingExt for DatabaseConnection {
    fn with_query_logging(self) -> TracedConnection {
        TracedConnection::wrap(self)
    }

    fn with_query_logger(self, logger: impl QueryLogger + 'static) -> TracedConnection {
        TracedConnection::new(self, logger)
    }
}
