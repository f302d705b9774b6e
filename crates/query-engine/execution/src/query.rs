//! A resolved statement with its bound values, and the three ways to run it.
//!
//! Every execution follows the same steps: acquire a connection, run the
//! statement, hand the outcome to the result handler or the failure handler,
//! and release the connection. The connection is held in a `ScopedConnection`,
//! so it goes back to the pool exactly once on every path, including a panic
//! in the result handler, and only after the handlers have run.

use std::convert::Infallible;
use std::sync::Arc;

use tracing::{info_span, Instrument};

use crate::error::{BoxError, Error};
use crate::metrics::Metrics;
use crate::pool::{Connection, ConnectionPool, ScopedConnection};
use crate::result::{BatchResult, ResultSet, UpdateResult};
use crate::value::Value;

/// Called once for every failed execution of a query.
pub type FailureHandler = Arc<dyn Fn(&Error) + Send + Sync>;

pub struct Query<'a, P: ConnectionPool> {
    pool: &'a P,
    metrics: &'a Metrics,
    sql: String,
    params: Vec<Value>,
    on_failure: Option<FailureHandler>,
}

impl<'a, P: ConnectionPool> Query<'a, P> {
    pub(crate) fn new(pool: &'a P, metrics: &'a Metrics, sql: String, params: Vec<Value>) -> Self {
        Query {
            pool,
            metrics,
            sql,
            params,
            on_failure: None,
        }
    }

    /// The statement with its administrative placeholders resolved.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Install the handler that every later execution of this query reports
    /// failures to. Replaces any handler installed before. Without one, failures
    /// are logged.
    #[must_use]
    pub fn on_failure<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        if self.on_failure.is_some() {
            tracing::debug!(query = %self.sql, "replacing failure handler");
        }
        self.on_failure = Some(Arc::new(handler));
        self
    }

    /// Run the statement as a read and pass the rows to `on_result`.
    pub async fn execute<T, E, F>(&self, on_result: F) -> Result<T, Error>
    where
        F: FnOnce(ResultSet) -> Result<T, E>,
        E: Into<BoxError>,
    {
        async {
            let mut connection = self.connect().await?;
            let outcome = connection
                .query(&self.sql, &self.params)
                .instrument(info_span!("Database round trip"))
                .await;
            let result = self.complete(connection, outcome, on_result);
            if result.is_ok() {
                self.metrics.record_query();
            }
            result
        }
        .instrument(info_span!("Execute query", query = %self.sql))
        .await
    }

    /// Run the statement as a write and pass the affected-row count to `on_result`.
    pub async fn execute_update<T, E, F>(&self, on_result: F) -> Result<T, Error>
    where
        F: FnOnce(UpdateResult) -> Result<T, E>,
        E: Into<BoxError>,
    {
        async {
            let mut connection = self.connect().await?;
            let outcome = connection
                .update(&self.sql, &self.params)
                .instrument(info_span!("Database round trip"))
                .await;
            let result = self.complete(connection, outcome, on_result);
            if result.is_ok() {
                self.metrics.record_update();
            }
            result
        }
        .instrument(info_span!("Execute update", query = %self.sql))
        .await
    }

    /// Run the statement once per entry of `batch` and pass the affected-row
    /// counts, in the order of `batch`, to `on_result`.
    ///
    /// The values the query was built with are not used. Each entry must have as
    /// many values as the statement has positional parameters; a mismatch is an
    /// execution error reported by the database.
    pub async fn execute_batch<T, E, F>(
        &self,
        on_result: F,
        batch: &[Vec<Value>],
    ) -> Result<T, Error>
    where
        F: FnOnce(BatchResult) -> Result<T, E>,
        E: Into<BoxError>,
    {
        async {
            let mut connection = self.connect().await?;
            let outcome = connection
                .batch(&self.sql, batch)
                .instrument(info_span!("Database round trip", items = batch.len()))
                .await;
            let result = self.complete(connection, outcome, on_result);
            if result.is_ok() {
                self.metrics.record_batch();
            }
            result
        }
        .instrument(info_span!("Execute batch", query = %self.sql))
        .await
    }

    /// Run the statement as a read and return the rows.
    pub async fn fetch(&self) -> Result<ResultSet, Error> {
        self.execute(Ok::<_, Infallible>).await
    }

    /// Run the statement as a write and return the affected-row count.
    pub async fn update(&self) -> Result<UpdateResult, Error> {
        self.execute_update(Ok::<_, Infallible>).await
    }

    /// Run the statement as a batch and return the affected-row counts.
    pub async fn batch(&self, batch: &[Vec<Value>]) -> Result<BatchResult, Error> {
        self.execute_batch(Ok::<_, Infallible>, batch).await
    }

    async fn connect(&self) -> Result<ScopedConnection<P::Connection>, Error> {
        match ScopedConnection::acquire(self.pool)
            .instrument(info_span!("Acquire connection"))
            .await
        {
            Ok(connection) => Ok(connection),
            Err(cause) => {
                tracing::error!(
                    query = %self.sql,
                    error = %cause,
                    "Failed getting a connection for execution"
                );
                let error = Error::ConnectionAcquisition(cause);
                self.report(&error);
                Err(error)
            }
        }
    }

    /// Route the outcome to the right handler, then give the connection back.
    fn complete<R, T, E, F>(
        &self,
        connection: ScopedConnection<P::Connection>,
        outcome: Result<R, BoxError>,
        on_result: F,
    ) -> Result<T, Error>
    where
        F: FnOnce(R) -> Result<T, E>,
        E: Into<BoxError>,
    {
        let result = match outcome {
            Err(cause) => {
                tracing::error!(query = %self.sql, error = %cause, "Failed executing query");
                Err(Error::Execution(cause))
            }
            Ok(value) => {
                tracing::info!(query = %self.sql, "Successfully executed query");
                on_result(value).map_err(|cause| Error::Continuation(cause.into()))
            }
        };

        if let Err(error) = &result {
            self.report(error);
        }

        drop(connection);
        result
    }

    fn report(&self, error: &Error) {
        self.metrics.record_failure(error.kind());
        match &self.on_failure {
            Some(handler) => handler(error),
            None => tracing::error!(query = %self.sql, error = %error, "Error handling query"),
        }
    }
}

impl<P: ConnectionPool> std::fmt::Debug for Query<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("sql", &self.sql)
            .field("params", &self.params)
            .field("on_failure", &self.on_failure.as_ref().map(|_| "custom"))
            .finish_non_exhaustive()
    }
}
