// File: src/db/error.rs
// Purpose: Error type for the query layer

use thiserror::Error;

/// Failure of one prepare/bind/execute cycle.
///
/// Every variant is fatal for the current request: there is no retry or
/// partial-failure handling at this layer. A service caller maps these to a
/// 500 instead of letting them take the process down.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Caller bug: the type signature does not describe the bound values.
    /// Raised before the connection is touched.
    #[error("type signature mismatch: {0}")]
    Signature(String),

    /// No connection could be acquired from the pool.
    #[error("could not acquire a database connection: {0}")]
    Acquire(#[source] sqlx::Error),

    /// The statement failed to prepare (malformed SQL, unknown table/column).
    #[error("statement preparation failed: {0}")]
    Prepare(#[source] sqlx::Error),

    /// The prepared statement failed to execute (constraint violation,
    /// connection loss, undecodable row).
    #[error("statement execution failed: {0}")]
    Execute(#[source] sqlx::Error),
}
