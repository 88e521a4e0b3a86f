use thiserror::Error;

use interlink_shared::TransportError;

/// Errors that can occur while acquiring a client from a connection pool
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// A new connection was needed and could not be opened
    #[error("Failed to open connection: {0}")]
    Connect(#[from] TransportError),

    /// Every connection stayed checked out for the whole wait
    #[error("No connection became available within {millis} ms (capacity {capacity})")]
    Timeout {
        millis: u64,
        capacity: usize,
    },

    /// The pool was closed, usually because its group was torn down
    #[error("Connection pool is closed")]
    Closed,

    /// The pool's lock was poisoned by a panicking holder
    #[error("Connection pool state is poisoned")]
    Poisoned,
}
