//! Basic example showing how to wire structured-log-bridge into an application.
//!
//! Run with: cargo run --example basic

use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectionTrait, Database, DbBackend, Statement};
use structured_log_bridge::prelude::*;
use structured_log_bridge::{with_slow_threshold, ClientLogLevel, KeyValue};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,structured_log_bridge=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let host_logger: Arc<dyn StructuredLogger> = Arc::new(TracingLogger::new());

    // Messaging client side: hand this to the client as its logger.
    let client_logger = StructuredClientLogger::new(host_logger.clone());
    client_logger.log(
        ClientLogLevel::INFO,
        "client logger ready",
        &[KeyValue::new("level", client_logger.level().to_string())],
    );

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/test".into());

    tracing::info!("Connecting to database...");

    let db = Database::connect(&database_url).await?;

    // Option 1: Simple wrapping with defaults (2s slow-query threshold)
    // let traced_db = TracedConnection::from(db);

    // Option 2: Custom threshold through the extension trait
    let traced_db = db.with_query_logger(StructuredQueryLogger::new(
        host_logger,
        [with_slow_threshold(Duration::from_millis(100))],
    ));

    // Logged as QUERY with elapsed, sql and rows
    traced_db
        .execute(Statement::from_string(DbBackend::Postgres, "SELECT 1"))
        .await?;

    // Fails on purpose: logged at ERROR with the database error as the message
    match traced_db
        .execute_unprepared("SELECT * FROM table_that_does_not_exist")
        .await
    {
        Ok(_) => tracing::warn!("expected the missing table to fail"),
        Err(e) => tracing::info!(error = %e, "missing table reported as expected"),
    }

    Ok(())
}
