use std::{
    collections::{HashSet, VecDeque},
    fmt,
    ops::{Deref, DerefMut},
    sync::{Arc, Condvar, Mutex, MutexGuard},
    thread,
    time::Instant,
};

use log::{debug, warn};

use interlink_shared::{Connector, WorkerClient};

use super::{connection_config::ConnectionConfig, error::PoolError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Counters describing a pool at one instant
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub idle: usize,
    pub outstanding: usize,
    pub opened: u64,
    pub discarded: u64,
}

struct IdleClient {
    id: ConnectionId,
    generation: u64,
    client: Box<dyn WorkerClient>,
}

struct PoolState {
    idle: Vec<IdleClient>,
    outstanding: HashSet<ConnectionId>,
    // tickets of callers inside `acquire()`, oldest first
    waiters: VecDeque<u64>,
    next_waiter: u64,
    generation: u64,
    next_id: u64,
    opened: u64,
    discarded: u64,
    closed: bool,
}

struct PoolInner {
    connector: Arc<dyn Connector>,
    config: ConnectionConfig,
    state: Mutex<PoolState>,
    returned: Condvar,
}

/// Connections to one worker process.
///
/// A client released as broken is dropped on the spot and its slot freed, so
/// the next `acquire()` has to open a fresh connection. Handles opened before
/// the last [`ConnectionPool::invalidate`] are dropped on release as well.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    pub fn new(connector: Arc<dyn Connector>, config: ConnectionConfig) -> Self {
        let config = ConnectionConfig {
            max_connections: config.max_connections.max(1),
            ..config
        };
        Self {
            inner: Arc::new(PoolInner {
                connector,
                config,
                state: Mutex::new(PoolState {
                    idle: Vec::new(),
                    outstanding: HashSet::new(),
                    waiters: VecDeque::new(),
                    next_waiter: 0,
                    generation: 0,
                    next_id: 1,
                    opened: 0,
                    discarded: 0,
                    closed: false,
                }),
                returned: Condvar::new(),
            }),
        }
    }

    pub fn address(&self) -> String {
        self.inner.connector.address()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    /// Checks out a client, reusing an idle one or opening a new one when
    /// below capacity. Waits up to `acquire_timeout` when at capacity.
    ///
    /// Callers are served in arrival order: a released client goes to the
    /// longest waiter, even if the releasing thread asks again right away.
    pub fn acquire(&self) -> Result<PooledClient, PoolError> {
        let timeout = self.inner.config.acquire_timeout;
        let deadline = Instant::now() + timeout;
        let mut state = self.lock()?;

        let ticket = state.next_waiter;
        state.next_waiter = state.next_waiter.wrapping_add(1);
        state.waiters.push_back(ticket);

        loop {
            if state.closed {
                self.leave_queue(state, ticket);
                return Err(PoolError::Closed);
            }

            if state.waiters.front() == Some(&ticket) {
                if let Some(idle) = state.idle.pop() {
                    state.outstanding.insert(idle.id);
                    self.leave_queue(state, ticket);
                    return Ok(PooledClient::new(self, idle.id, idle.generation, idle.client));
                }

                if state.outstanding.len() < self.inner.config.max_connections {
                    let id = ConnectionId(state.next_id);
                    state.next_id += 1;
                    state.outstanding.insert(id);
                    let generation = state.generation;
                    self.leave_queue(state, ticket);
                    return self.open(id, generation);
                }
            }

            let now = Instant::now();
            if now >= deadline {
                self.leave_queue(state, ticket);
                return Err(PoolError::Timeout {
                    millis: timeout.as_millis() as u64,
                    capacity: self.inner.config.max_connections,
                });
            }
            state = match self.inner.returned.wait_timeout(state, deadline - now) {
                Ok((guard, _)) => guard,
                Err(_) => return Err(PoolError::Poisoned),
            };
        }
    }

    /// Returns a client. A broken client is discarded and never handed out again.
    pub fn release(&self, mut client: PooledClient, broken: bool) {
        if broken {
            client.mark_broken();
        }
        drop(client);
    }

    /// Drops every idle client and marks every checked-out one as stale, so
    /// the next acquire opens a fresh connection. Used when the worker stops.
    pub fn invalidate(&self) {
        if let Ok(mut state) = self.inner.state.lock() {
            state.generation += 1;
            let dropped = state.idle.len() as u64;
            state.idle.clear();
            state.discarded += dropped;
            debug!(
                "connection pool for {} invalidated, {} idle clients dropped",
                self.address(),
                dropped
            );
        }
        self.inner.returned.notify_all();
    }

    /// Invalidates the pool and fails every current and future `acquire()`.
    pub fn close(&self) {
        if let Ok(mut state) = self.inner.state.lock() {
            state.closed = true;
        }
        self.invalidate();
    }

    pub fn stats(&self) -> PoolStats {
        match self.inner.state.lock() {
            Ok(state) => PoolStats {
                idle: state.idle.len(),
                outstanding: state.outstanding.len(),
                opened: state.opened,
                discarded: state.discarded,
            },
            Err(_) => PoolStats::default(),
        }
    }

    /// Callers currently blocked in `acquire()`.
    pub fn waiting(&self) -> usize {
        self.inner.state.lock().map(|state| state.waiters.len()).unwrap_or(0)
    }

    // Private

    fn lock(&self) -> Result<MutexGuard<'_, PoolState>, PoolError> {
        self.inner.state.lock().map_err(|_| PoolError::Poisoned)
    }

    // Waiters block on the same condvar, so every wake-up is broadcast and
    // only the caller at the head of the queue proceeds.
    fn leave_queue(&self, mut state: MutexGuard<'_, PoolState>, ticket: u64) {
        if let Some(position) = state.waiters.iter().position(|waiter| *waiter == ticket) {
            state.waiters.remove(position);
        }
        drop(state);
        self.inner.returned.notify_all();
    }

    fn open(&self, id: ConnectionId, generation: u64) -> Result<PooledClient, PoolError> {
        match self.inner.connector.connect() {
            Ok(client) => {
                if let Ok(mut state) = self.inner.state.lock() {
                    state.opened += 1;
                }
                debug!("opened connection {} to {}", id, self.address());
                Ok(PooledClient::new(self, id, generation, client))
            }
            Err(err) => {
                if let Ok(mut state) = self.inner.state.lock() {
                    state.outstanding.remove(&id);
                }
                self.inner.returned.notify_all();
                Err(PoolError::Connect(err))
            }
        }
    }

    fn check_in(
        &self,
        id: ConnectionId,
        generation: u64,
        client: Box<dyn WorkerClient>,
        broken: bool,
    ) {
        let Ok(mut state) = self.inner.state.lock() else {
            warn!("connection pool poisoned, dropping connection {}", id);
            return;
        };

        if !state.outstanding.remove(&id) {
            // not checked out: already discarded, never resurrect it
            state.discarded += 1;
            return;
        }

        if broken || state.closed || generation != state.generation {
            state.discarded += 1;
            debug!(
                "discarding connection {} to {} (broken: {})",
                id,
                self.inner.connector.address(),
                broken
            );
        } else {
            state.idle.push(IdleClient {
                id,
                generation,
                client,
            });
        }
        drop(state);
        self.inner.returned.notify_all();
    }
}

/// A checked-out client. Goes back to its pool when dropped: healthy unless
/// [`PooledClient::mark_broken`] was called or the thread is panicking.
pub struct PooledClient {
    pool: ConnectionPool,
    id: ConnectionId,
    generation: u64,
    client: Option<Box<dyn WorkerClient>>,
    broken: bool,
}

impl PooledClient {
    fn new(
        pool: &ConnectionPool,
        id: ConnectionId,
        generation: u64,
        client: Box<dyn WorkerClient>,
    ) -> Self {
        Self {
            pool: pool.clone(),
            id,
            generation,
            client: Some(client),
            broken: false,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn mark_broken(&mut self) {
        self.broken = true;
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Releases to the pool, marking the client broken if `broken`.
    pub fn release(self, broken: bool) {
        let pool = self.pool.clone();
        pool.release(self, broken);
    }
}

impl Deref for PooledClient {
    type Target = dyn WorkerClient;

    fn deref(&self) -> &Self::Target {
        self.client
            .as_deref()
            .expect("client is present until the handle is dropped")
    }
}

impl DerefMut for PooledClient {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.client
            .as_deref_mut()
            .expect("client is present until the handle is dropped")
    }
}

impl Drop for PooledClient {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            let broken = self.broken || thread::panicking();
            self.pool.check_in(self.id, self.generation, client, broken);
        }
    }
}
