use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::info;

use interlink_shared::Connector;

use super::{
    connection_config::ConnectionConfig,
    connection_pool::{ConnectionPool, PooledClient},
    error::PoolError,
};

/// Liveness flag plus the connection pool of one worker OS process.
///
/// Shared with whatever supervises the process; the supervisor flips
/// `running` while the controller only reads it.
pub struct RemoteProcess {
    running: AtomicBool,
    pool: ConnectionPool,
}

impl RemoteProcess {
    pub fn new(connector: Arc<dyn Connector>, config: ConnectionConfig) -> Self {
        Self {
            running: AtomicBool::new(true),
            pool: ConnectionPool::new(connector, config),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stopping a process invalidates every pooled connection to it.
    pub fn set_running(&self, running: bool) {
        let was_running = self.running.swap(running, Ordering::AcqRel);
        if was_running && !running {
            info!("worker at {} stopped", self.pool.address());
            self.pool.invalidate();
        } else if !was_running && running {
            info!("worker at {} started", self.pool.address());
        }
    }

    pub fn acquire(&self) -> Result<PooledClient, PoolError> {
        self.pool.acquire()
    }

    pub fn release(&self, client: PooledClient, broken: bool) {
        self.pool.release(client, broken);
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn address(&self) -> String {
        self.pool.address()
    }
}
