//! Parameterized, connection-scoped query execution.
//!
//! A `QueryExecutor` turns a template such as
//! `SELECT * FROM <<schema>>.users WHERE id = $1` plus positional values into a
//! `Query`, which can be run as a read, a write or a batch. Each run borrows one
//! connection from the pool and always gives it back.

pub mod error;
pub mod executor;
pub mod metrics;
pub mod placeholders;
pub mod pool;
pub mod postgres;
pub mod query;
pub mod result;
pub mod value;

pub use error::{BoxError, Error};
pub use executor::QueryExecutor;
pub use pool::{Connection, ConnectionPool, ScopedConnection};
pub use query::{FailureHandler, Query};
pub use result::{BatchResult, ResultSet, UpdateResult};
pub use value::Value;
