use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use log::warn;

use interlink_shared::GroupId;

use super::worker_group::WorkerGroup;

/// Every worker group known to the controller.
///
/// Cheap to clone; clones share the same table. The resolver, the dispatch
/// loops and the server all hold one.
#[derive(Clone, Default)]
pub struct GroupRegistry {
    groups: Arc<RwLock<BTreeMap<GroupId, Arc<WorkerGroup>>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a group. Returns false, leaving the table unchanged, when the id is taken.
    pub fn insert(&self, group: Arc<WorkerGroup>) -> bool {
        match self.groups.write() {
            Ok(mut groups) => {
                if groups.contains_key(group.id()) {
                    return false;
                }
                groups.insert(group.id().clone(), group);
                true
            }
            Err(_) => {
                warn!("group registry lock poisoned, cannot add {}", group.id());
                false
            }
        }
    }

    pub fn remove(&self, id: &GroupId) -> Option<Arc<WorkerGroup>> {
        match self.groups.write() {
            Ok(mut groups) => groups.remove(id),
            Err(_) => {
                warn!("group registry lock poisoned, cannot remove {}", id);
                None
            }
        }
    }

    pub fn get(&self, id: &GroupId) -> Option<Arc<WorkerGroup>> {
        match self.groups.read() {
            Ok(groups) => groups.get(id).cloned(),
            Err(_) => {
                warn!("group registry lock poisoned, cannot look up {}", id);
                None
            }
        }
    }

    pub fn contains(&self, id: &GroupId) -> bool {
        self.get(id).is_some()
    }

    /// Snapshot of every group, ordered by id. Taken under the lock and
    /// returned without it, so callers may block on a group's worker.
    pub fn all(&self) -> Vec<Arc<WorkerGroup>> {
        match self.groups.read() {
            Ok(groups) => groups.values().cloned().collect(),
            Err(_) => {
                warn!("group registry lock poisoned, no groups listed");
                Vec::new()
            }
        }
    }

    pub fn ids(&self) -> Vec<GroupId> {
        self.all().iter().map(|group| group.id().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.groups.read().map(|groups| groups.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
