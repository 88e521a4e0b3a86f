use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by a worker's connection pool
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Upper bound on live clients per worker. With the default of 1, acquire
    /// is exclusive: whoever holds the client is the only one talking to the worker.
    pub max_connections: usize,
    /// How long `acquire()` waits for a checked-out client to come back
    pub acquire_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}
