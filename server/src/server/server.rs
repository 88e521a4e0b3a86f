use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use log::{debug, info, warn};

use interlink_shared::{Connector, GroupId, RegistryListener, ResourceId, ResourceSet};

use crate::{
    append::AppendBatcher,
    connection::RemoteProcess,
    error::InterlinkServerError,
    events::{EventDispatcher, EventLoop, EventLoopHandle},
    group::{GroupRegistry, WorkerGroup},
    listener::{ApplicationListener, ProcessListener},
    replication,
    request::PendingRequests,
    resolver::ResourceResolver,
    ServerConfig,
};

/// Coordinates worker groups: runs one event dispatch loop per worker
/// process, batches their output, and resolves resources across groups.
pub struct Server {
    config: ServerConfig,
    groups: GroupRegistry,
    resolver: ResourceResolver,
    pending: PendingRequests,
    batcher: Arc<AppendBatcher>,
    dispatcher: Arc<EventDispatcher>,
    registry_listener: Option<Arc<dyn RegistryListener>>,
    loops: Mutex<HashMap<GroupId, EventLoopHandle>>,
    shut_down: AtomicBool,
}

impl Server {
    /// Create a new Server and start its output flush thread
    pub fn new(
        config: ServerConfig,
        process_listener: Arc<dyn ProcessListener>,
        application_listener: Option<Arc<dyn ApplicationListener>>,
        registry_listener: Option<Arc<dyn RegistryListener>>,
    ) -> Result<Self, InterlinkServerError> {
        let groups = GroupRegistry::new();
        let resolver = ResourceResolver::new(groups.clone());
        let pending = PendingRequests::new(config.callback_timeout);
        let batcher = Arc::new(
            AppendBatcher::start(process_listener.clone(), config.append.clone()).map_err(
                |err| InterlinkServerError::ThreadSpawn {
                    name: "interlink-append-flush".to_string(),
                    reason: err.to_string(),
                },
            )?,
        );
        let dispatcher = Arc::new(EventDispatcher::new(
            resolver.clone(),
            batcher.clone(),
            pending.clone(),
            process_listener,
            application_listener,
        ));

        Ok(Self {
            config,
            groups,
            resolver,
            pending,
            batcher,
            dispatcher,
            registry_listener,
            loops: Mutex::new(HashMap::new()),
            shut_down: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    // Groups

    /// Registers a group whose resources live in this process. No loop is started.
    pub fn add_local_group(
        &self,
        id: impl Into<GroupId>,
    ) -> Result<Arc<WorkerGroup>, InterlinkServerError> {
        let group = Arc::new(WorkerGroup::new(
            id.into(),
            None,
            self.registry_listener.clone(),
        ));
        self.insert_group(group.clone())?;
        info!("local group {} registered", group.id());
        Ok(group)
    }

    /// Registers a group backed by a worker process and starts its event loop.
    pub fn add_remote_group(
        &self,
        id: impl Into<GroupId>,
        process: Arc<RemoteProcess>,
    ) -> Result<Arc<WorkerGroup>, InterlinkServerError> {
        let group = Arc::new(WorkerGroup::new(
            id.into(),
            Some(process),
            self.registry_listener.clone(),
        ));
        replication::attach_worker_pusher(&group);
        self.insert_group(group.clone())?;

        let handle = match EventLoop::spawn(
            group.clone(),
            self.dispatcher.clone(),
            self.config.poll.clone(),
        ) {
            Ok(handle) => handle,
            Err(err) => {
                self.groups.remove(group.id());
                return Err(err);
            }
        };
        match self.loops.lock() {
            Ok(mut loops) => {
                loops.insert(group.id().clone(), handle);
            }
            Err(poisoned) => {
                warn!("event loop table poisoned, recovering");
                poisoned.into_inner().insert(group.id().clone(), handle);
            }
        }
        info!("remote group {} registered", group.id());
        Ok(group)
    }

    /// Like [`Server::add_remote_group`], building the process handle from
    /// `connector` with this server's connection config.
    pub fn connect_remote_group(
        &self,
        id: impl Into<GroupId>,
        connector: Arc<dyn Connector>,
    ) -> Result<(Arc<WorkerGroup>, Arc<RemoteProcess>), InterlinkServerError> {
        let process = Arc::new(RemoteProcess::new(
            connector,
            self.config.connection.clone(),
        ));
        let group = self.add_remote_group(id, process.clone())?;
        Ok((group, process))
    }

    /// Tears a group down: its loop is shut down and joined, its pending
    /// requests are forgotten, and it stops answering resource lookups.
    pub fn remove_group(&self, id: &GroupId) -> Result<Arc<WorkerGroup>, InterlinkServerError> {
        let Some(group) = self.groups.remove(id) else {
            return Err(InterlinkServerError::GroupNotFound {
                group: id.to_string(),
            });
        };

        let handle = match self.loops.lock() {
            Ok(mut loops) => loops.remove(id),
            Err(poisoned) => poisoned.into_inner().remove(id),
        };
        if let Some(mut handle) = handle {
            handle.shutdown();
        }

        let forgotten = self.pending.clear_group(id);
        if forgotten > 0 {
            warn!("{} pending requests of group {} dropped", forgotten, id);
        }
        info!("group {} removed", id);
        Ok(group)
    }

    pub fn group(&self, id: &GroupId) -> Option<Arc<WorkerGroup>> {
        self.groups.get(id)
    }

    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    // Resources

    pub fn resolver(&self) -> &ResourceResolver {
        &self.resolver
    }

    pub fn resolve_one(&self, id: &ResourceId) -> Option<Vec<u8>> {
        self.resolver.resolve_one(id)
    }

    pub fn resolve_all(&self, excluding: &GroupId) -> ResourceSet {
        self.resolver.resolve_all(excluding)
    }

    // Requests & output

    pub fn pending_requests(&self) -> &PendingRequests {
        &self.pending
    }

    /// Delivers buffered output now instead of waiting for the next tick.
    pub fn flush_output(&self) -> usize {
        self.batcher.flush()
    }

    // Shutdown

    /// Shuts down and joins every event loop, then flushes output one last time.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }

        let mut handles: Vec<EventLoopHandle> = match self.loops.lock() {
            Ok(mut loops) => loops.drain().map(|(_, handle)| handle).collect(),
            Err(poisoned) => poisoned.into_inner().drain().map(|(_, handle)| handle).collect(),
        };
        // signal every loop first so they wind down concurrently
        for handle in handles.iter_mut() {
            handle.request_shutdown();
        }
        for handle in handles.iter_mut() {
            handle.shutdown();
        }

        let abandoned = self.pending.clear_all();
        if abandoned > 0 {
            debug!("dropped {} pending requests on shutdown", abandoned);
        }

        self.batcher.shutdown();
        info!("server shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    // Private

    fn insert_group(&self, group: Arc<WorkerGroup>) -> Result<(), InterlinkServerError> {
        if self.is_shut_down() {
            return Err(InterlinkServerError::ShutDown);
        }
        if !self.groups.insert(group.clone()) {
            return Err(InterlinkServerError::GroupAlreadyRegistered {
                group: group.id().to_string(),
            });
        }
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.shutdown();
    }
}
