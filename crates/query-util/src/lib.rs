//! Templated, parameterized PostgreSQL queries on a shared connection pool.
//!
//! ```ignore
//! use query_util::{params, ProcessEnvironment};
//!
//! let mut registry = prometheus::Registry::new();
//! let query_util =
//!     query_util::state::from_directory("config", ProcessEnvironment, &mut registry).await?;
//!
//! let orders = query_util
//!     .query("SELECT * FROM <<schema>>.orders WHERE customer = $1", params!["ada"])
//!     .fetch()
//!     .await?;
//! ```

pub mod health;
pub mod state;

pub use health::{health_check, HealthCheckError};
pub use state::{create_state, InitializationError, QueryUtil};

pub use query_engine_execution::{
    params, BatchResult, Error, Query, QueryExecutor, ResultSet, UpdateResult, Value,
};
pub use query_engine_template::Template;
pub use query_util_configuration::environment::{FixedEnvironment, ProcessEnvironment};
pub use query_util_configuration::DatabaseConfig;
