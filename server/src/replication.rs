use std::sync::Arc;

use log::{debug, warn};

use interlink_shared::{
    GroupId, ObjectKey, ReplicaChange, ReplicaError, ReplicaPusher, ReplicatedObject,
};

use crate::{connection::RemoteProcess, group::WorkerGroup};

/// Pushes registry changes of one group to that group's worker process.
///
/// Honors `exclude`: a change that came from the worker is never sent back to it.
pub struct WorkerReplicaPusher {
    group: GroupId,
    process: Arc<RemoteProcess>,
}

impl WorkerReplicaPusher {
    pub fn new(group: GroupId, process: Arc<RemoteProcess>) -> Self {
        Self { group, process }
    }
}

impl ReplicaPusher for WorkerReplicaPusher {
    fn push(&self, change: &ReplicaChange, exclude: Option<&GroupId>) {
        if exclude == Some(&self.group) {
            return;
        }
        if !self.process.is_running() {
            debug!(
                "worker of group {} not running, change to '{}' not pushed",
                self.group,
                change.name()
            );
            return;
        }

        let mut client = match self.process.acquire() {
            Ok(client) => client,
            Err(err) => {
                warn!(
                    "cannot push change to '{}' to group {}: {}",
                    change.name(),
                    self.group,
                    err
                );
                return;
            }
        };
        match client.push_replica_change(change) {
            Ok(()) => self.process.release(client, false),
            Err(err) => {
                warn!(
                    "failed to push change to '{}' to group {}: {}",
                    change.name(),
                    self.group,
                    err
                );
                self.process.release(client, true);
            }
        }
    }
}

/// Wires a remote group's registry to its worker. Local groups have no peer to push to.
pub fn attach_worker_pusher(group: &WorkerGroup) {
    if let Some(process) = group.remote_process() {
        group.registry().set_pusher(Arc::new(WorkerReplicaPusher::new(
            group.id().clone(),
            process.clone(),
        )));
    }
}

/// Mirrors an object the group's worker created.
pub fn apply_remote_add(group: &WorkerGroup, object: ReplicatedObject) -> Result<(), ReplicaError> {
    debug!("group {} added replicated object '{}'", group.id(), object.name);
    group.registry().apply_add(object, group.id())
}

/// Applies a value the group's worker changed, echo suppressed toward that worker.
pub fn apply_remote_update(
    group: &WorkerGroup,
    object: ReplicatedObject,
) -> Result<(), ReplicaError> {
    group.registry().apply_update(object, group.id())
}

pub fn apply_remote_remove(group: &WorkerGroup, key: &ObjectKey) -> Result<(), ReplicaError> {
    debug!("group {} removed replicated object '{}'", group.id(), key.name);
    group.registry().apply_remove(key, group.id())
}
