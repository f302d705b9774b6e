//! The seam between query execution and a database driver.

use std::ops::{Deref, DerefMut};

use async_trait::async_trait;

use crate::error::BoxError;
use crate::result::{BatchResult, ResultSet, UpdateResult};
use crate::value::Value;

/// Something that hands out exclusive connections.
#[async_trait]
pub trait ConnectionPool: Send + Sync {
    type Connection: Connection;

    async fn acquire(&self) -> Result<Self::Connection, BoxError>;
}

/// An exclusive handle on one database connection.
#[async_trait]
pub trait Connection: Send {
    /// Run a parameterized query and collect its rows.
    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet, BoxError>;

    /// Run a parameterized insert, update or delete.
    async fn update(&mut self, sql: &str, params: &[Value]) -> Result<UpdateResult, BoxError>;

    /// Run `sql` once per parameter set. Counts are returned in input order.
    async fn batch(&mut self, sql: &str, batch: &[Vec<Value>]) -> Result<BatchResult, BoxError>;

    /// Hand the connection back to its pool. Calling this more than once is a no-op.
    fn release(&mut self);
}

/// A connection that is released when it goes out of scope, whichever way that
/// happens.
pub struct ScopedConnection<C: Connection> {
    connection: C,
}

impl<C: Connection> ScopedConnection<C> {
    pub async fn acquire<P>(pool: &P) -> Result<Self, BoxError>
    where
        P: ConnectionPool<Connection = C> + ?Sized,
    {
        let connection = pool.acquire().await?;
        Ok(Self { connection })
    }
}

impl<C: Connection> Deref for ScopedConnection<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.connection
    }
}

impl<C: Connection> DerefMut for ScopedConnection<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.connection
    }
}

impl<C: Connection> Drop for ScopedConnection<C> {
    fn drop(&mut self) {
        self.connection.release();
    }
}
