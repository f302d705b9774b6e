//! Health check for the database behind the pool.

use thiserror::Error;

use query_engine_execution::{params, ConnectionPool, QueryExecutor, Value};

/// Check that a connection can be acquired and a trivial query answered.
pub async fn health_check<P: ConnectionPool>(
    executor: &QueryExecutor<P>,
) -> Result<(), HealthCheckError> {
    let rows = executor
        .query("SELECT 1 AS ok", params![])
        .on_failure(|error| tracing::warn!(error = %error, "health check failed"))
        .fetch()
        .await?;

    match rows.rows.as_slice() {
        [row] if row.as_slice() == [Value::Int(1)] => Ok(()),
        _ => Err(HealthCheckError::UnexpectedResult(format!("{:?}", rows.rows))),
    }
}

#[derive(Debug, Error)]
pub enum HealthCheckError {
    #[error("health check query failed: {0}")]
    Query(#[from] query_engine_execution::Error),
    #[error("health check query returned {0}")]
    UnexpectedResult(String),
}
