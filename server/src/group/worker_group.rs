use std::sync::Arc;

use interlink_shared::{GroupId, LocalResourcePool, ReplicatedObjectRegistry, RegistryListener};

use crate::connection::RemoteProcess;

/// One execution context: a resource pool, a replicated object registry and,
/// when the context runs out of process, the handle to that worker process.
pub struct WorkerGroup {
    id: GroupId,
    pool: LocalResourcePool,
    registry: ReplicatedObjectRegistry,
    remote: Option<Arc<RemoteProcess>>,
}

impl WorkerGroup {
    /// A group whose resources live only in this process
    pub fn local(id: impl Into<GroupId>) -> Self {
        Self::new(id.into(), None, None)
    }

    /// A group backed by a worker process
    pub fn remote(id: impl Into<GroupId>, process: Arc<RemoteProcess>) -> Self {
        Self::new(id.into(), Some(process), None)
    }

    pub fn new(
        id: GroupId,
        remote: Option<Arc<RemoteProcess>>,
        registry_listener: Option<Arc<dyn RegistryListener>>,
    ) -> Self {
        Self {
            pool: LocalResourcePool::new(id.clone()),
            registry: ReplicatedObjectRegistry::new(id.clone(), registry_listener),
            remote,
            id,
        }
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn pool(&self) -> &LocalResourcePool {
        &self.pool
    }

    pub fn registry(&self) -> &ReplicatedObjectRegistry {
        &self.registry
    }

    pub fn remote_process(&self) -> Option<&Arc<RemoteProcess>> {
        self.remote.as_ref()
    }

    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }
}
