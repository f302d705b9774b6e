//! Entry point for building queries.

use query_util_configuration::DatabaseConfig;

use crate::metrics::Metrics;
use crate::placeholders;
use crate::pool::ConnectionPool;
use crate::query::Query;
use crate::value::Value;

/// Builds queries against one pool, resolving templates with one configuration.
///
/// Holds no mutable state: any number of queries may be built and run
/// concurrently, each on its own connection.
#[derive(Debug)]
pub struct QueryExecutor<P> {
    configuration: DatabaseConfig,
    pool: P,
    metrics: Metrics,
}

impl<P: ConnectionPool> QueryExecutor<P> {
    pub fn new(configuration: DatabaseConfig, pool: P, metrics: Metrics) -> Self {
        QueryExecutor {
            configuration,
            pool,
            metrics,
        }
    }

    /// Resolve the `<<name>>` placeholders of `template` and bind `params` to its
    /// positional parameters.
    ///
    /// ```ignore
    /// let users = executor
    ///     .query("SELECT name FROM <<schema>>.users WHERE id = $1", params![42])
    ///     .fetch()
    ///     .await?;
    /// ```
    pub fn query(&self, template: &str, params: impl IntoIterator<Item = Value>) -> Query<'_, P> {
        let sql = placeholders::resolve(template, &self.configuration);
        Query::new(&self.pool, &self.metrics, sql, params.into_iter().collect())
    }

    pub fn configuration(&self) -> &DatabaseConfig {
        &self.configuration
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
