mod connection_config;
pub use connection_config::ConnectionConfig;

mod connection_pool;
pub use connection_pool::{ConnectionId, ConnectionPool, PoolStats, PooledClient};

mod error;
pub use error::PoolError;

mod remote_process;
pub use remote_process::RemoteProcess;
