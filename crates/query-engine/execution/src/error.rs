//! Errors for query execution.

use thiserror::Error;

/// The cause of a failure as reported by a pool, a driver or a result handler.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why an execution failed. Every variant is reported to the query's failure
/// handler exactly once before being returned to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// The pool could not supply a connection. No statement was issued.
    #[error("unable to acquire a connection: {0}")]
    ConnectionAcquisition(#[source] BoxError),
    /// The database rejected or failed the statement.
    #[error("error executing query: {0}")]
    Execution(#[source] BoxError),
    /// The result handler failed while processing a successful result.
    #[error("error handling query result: {0}")]
    Continuation(#[source] BoxError),
}

impl Error {
    /// A short name for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ConnectionAcquisition(_) => "connection_acquisition",
            Error::Execution(_) => "execution",
            Error::Continuation(_) => "continuation",
        }
    }
}
