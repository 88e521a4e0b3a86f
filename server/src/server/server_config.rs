use std::{default::Default, time::Duration};

use crate::{append::AppendConfig, connection::ConnectionConfig, events::PollConfig};

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Used to configure each group's event dispatch loop
    pub poll: PollConfig,
    /// Used to configure the connection pool of each worker process
    pub connection: ConnectionConfig,
    /// Used to configure the output append batcher
    pub append: AppendConfig,
    /// How long a correlated worker request may wait for its answer
    pub callback_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            poll: PollConfig::default(),
            connection: ConnectionConfig::default(),
            append: AppendConfig::default(),
            callback_timeout: Duration::from_secs(60),
        }
    }
}
