//! Startup state: the connection pool and metrics behind a query executor.
//!
//! This is initialized on startup.

use std::path::Path;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use thiserror::Error;
use tracing::{info_span, Instrument};

use query_engine_execution::metrics::Metrics;
use query_engine_execution::postgres::PostgresPool;
use query_engine_execution::QueryExecutor;
use query_util_configuration::environment::Environment;
use query_util_configuration::{
    make_runtime_configuration, parse_configuration, DatabaseConfig,
    MakeRuntimeConfigurationError, ParseConfigurationError,
};

/// The executor applications use: PostgreSQL behind the pool seam.
pub type QueryUtil = QueryExecutor<PostgresPool>;

/// Create a connection pool and wrap it, with freshly registered metrics, in a
/// query executor.
pub async fn create_state(
    configuration: DatabaseConfig,
    metrics_registry: &mut prometheus::Registry,
) -> Result<QueryUtil, InitializationError> {
    let pool = create_pool(&configuration)
        .instrument(info_span!("Create connection pool"))
        .await
        .map_err(InitializationError::UnableToCreatePool)?;

    let metrics = async {
        Metrics::initialize(metrics_registry).map_err(InitializationError::MetricsError)
    }
    .instrument(info_span!("Setup metrics"))
    .await?;

    tracing::info!(
        host = %configuration.host,
        port = configuration.port,
        database = %configuration.database,
        "connection pool ready"
    );

    Ok(QueryExecutor::new(configuration, PostgresPool::new(pool), metrics))
}

/// Read, resolve and validate the configuration in `configuration_dir`, then
/// create the state.
pub async fn from_directory(
    configuration_dir: impl AsRef<Path>,
    environment: impl Environment,
    metrics_registry: &mut prometheus::Registry,
) -> Result<QueryUtil, InitializationError> {
    let parsed = parse_configuration(configuration_dir).await?;
    let configuration = make_runtime_configuration(parsed, environment)?;
    create_state(configuration, metrics_registry).await
}

/// Create a connection pool from the configuration and its pool settings.
async fn create_pool(configuration: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    pool_options(configuration)
        .connect_with(connect_options(configuration))
        .await
}

fn pool_options(configuration: &DatabaseConfig) -> PgPoolOptions {
    let settings = &configuration.pool_settings;
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.pool_timeout))
        .idle_timeout(settings.idle_timeout.map(Duration::from_secs))
        .max_lifetime(settings.connection_lifetime.map(Duration::from_secs))
}

fn connect_options(configuration: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&configuration.host)
        .port(configuration.port)
        .username(&configuration.username)
        .password(&configuration.password)
        .database(&configuration.database)
}

/// State initialization error.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("unable to initialize connection pool: {0}")]
    UnableToCreatePool(sqlx::Error),
    #[error("error initializing metrics: {0}")]
    MetricsError(prometheus::Error),
    #[error("{0}")]
    ParseConfiguration(#[from] ParseConfigurationError),
    #[error("{0}")]
    MakeRuntimeConfiguration(#[from] MakeRuntimeConfigurationError),
}
