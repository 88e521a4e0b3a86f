use log::{debug, warn};

use interlink_shared::{GroupId, ResourceId, ResourceSet};

use crate::group::{GroupRegistry, WorkerGroup};

/// Answers resource lookups across every worker group.
///
/// Local groups are read in place; remote groups are asked over a pooled
/// client, and only while their worker reports running. A miss anywhere is
/// `None` or an absent entry, never an error.
#[derive(Clone)]
pub struct ResourceResolver {
    groups: GroupRegistry,
}

impl ResourceResolver {
    pub fn new(groups: GroupRegistry) -> Self {
        Self { groups }
    }

    /// The serialized value of one resource, from whichever group owns it.
    pub fn resolve_one(&self, id: &ResourceId) -> Option<Vec<u8>> {
        let Some(group) = self.groups.get(&id.pool_id) else {
            debug!("resource {} belongs to unknown group", id);
            return None;
        };

        let Some(process) = group.remote_process() else {
            return group
                .pool()
                .get_scoped(id.note_id.as_deref(), id.paragraph_id.as_deref(), &id.name)
                .map(|resource| resource.value);
        };

        if !process.is_running() {
            debug!("worker of group {} not running, {} unresolved", group.id(), id);
            return None;
        }

        let mut client = match process.acquire() {
            Ok(client) => client,
            Err(err) => {
                warn!("cannot reach group {} for {}: {}", group.id(), id, err);
                return None;
            }
        };
        match client.resource_get(id.note_id.as_deref(), id.paragraph_id.as_deref(), &id.name) {
            Ok(value) => {
                process.release(client, false);
                if value.is_empty() {
                    None
                } else {
                    Some(value)
                }
            }
            Err(err) => {
                warn!("failed to get {} from group {}: {}", id, group.id(), err);
                process.release(client, true);
                None
            }
        }
    }

    /// Every resource of every group except `excluding`, asked one group at a time.
    pub fn resolve_all(&self, excluding: &GroupId) -> ResourceSet {
        let mut resources = ResourceSet::new();
        for group in self.groups.all() {
            if group.id() == excluding {
                continue;
            }
            collect_group(&group, &mut resources);
        }
        // remote replies may carry the caller's own entries
        resources.without_pool(excluding)
    }
}

fn collect_group(group: &WorkerGroup, resources: &mut ResourceSet) {
    let Some(process) = group.remote_process() else {
        resources.add_all(group.pool().get_all());
        return;
    };

    if !process.is_running() {
        debug!("worker of group {} not running, skipped", group.id());
        return;
    }

    let mut client = match process.acquire() {
        Ok(client) => client,
        Err(err) => {
            warn!("cannot reach group {} for its resources: {}", group.id(), err);
            return;
        }
    };
    match client.resource_pool_get_all() {
        Ok(remote) => {
            process.release(client, false);
            resources.add_all(remote);
        }
        Err(err) => {
            warn!("failed to list resources of group {}: {}", group.id(), err);
            process.release(client, true);
        }
    }
}
