use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, RwLock},
};

use log::{debug, warn};
use serde_json::Value;

use crate::types::GroupId;

use super::{
    error::ReplicaError,
    replicated_object::{ObjectKey, ObjectOwner, ReplicaChange, ReplicatedObject},
};

/// Observes every change applied to a registry, local or remote
pub trait RegistryListener: Send + Sync {
    fn on_add(&self, group: &GroupId, object: &ReplicatedObject);
    fn on_update(&self, group: &GroupId, object: &ReplicatedObject);
    fn on_remove(&self, group: &GroupId, key: &ObjectKey);
}

/// Transmits registry changes to peers.
///
/// Implementations must never transmit to the peer named by `exclude`.
pub trait ReplicaPusher: Send + Sync {
    fn push(&self, change: &ReplicaChange, exclude: Option<&GroupId>);
}

/// How a value written through the setter travels after it is stored
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Propagation<'a> {
    /// Notify observers and push to every peer
    All,
    /// Notify observers and push to every peer except the one the value came from
    SuppressEcho(&'a GroupId),
}

impl<'a> Propagation<'a> {
    fn exclude(&self) -> Option<&'a GroupId> {
        match self {
            Propagation::All => None,
            Propagation::SuppressEcho(origin) => Some(origin),
        }
    }
}

struct Entry {
    object: ReplicatedObject,
    owner: ObjectOwner,
}

/// Replicated objects of one worker group, keyed by name and note/paragraph scope.
///
/// Mutations are serialized from store through push, so peers receive changes
/// in the order they were stored. Listeners and pushers must not mutate the
/// same registry from their callbacks.
pub struct ReplicatedObjectRegistry {
    group: GroupId,
    entries: RwLock<HashMap<ObjectKey, Entry>>,
    // held from store until the push returns
    ordering: Mutex<()>,
    listener: Option<Arc<dyn RegistryListener>>,
    pusher: RwLock<Option<Arc<dyn ReplicaPusher>>>,
}

impl ReplicatedObjectRegistry {
    pub fn new(group: GroupId, listener: Option<Arc<dyn RegistryListener>>) -> Self {
        Self {
            group,
            entries: RwLock::new(HashMap::new()),
            ordering: Mutex::new(()),
            listener,
            pusher: RwLock::new(None),
        }
    }

    pub fn group(&self) -> &GroupId {
        &self.group
    }

    pub fn set_pusher(&self, pusher: Arc<dyn ReplicaPusher>) {
        if let Ok(mut slot) = self.pusher.write() {
            *slot = Some(pusher);
        }
    }

    pub fn get(&self, key: &ObjectKey) -> Option<ReplicatedObject> {
        let entries = self.entries.read().ok()?;
        entries.get(key).map(|entry| entry.object.clone())
    }

    pub fn owner(&self, key: &ObjectKey) -> Option<ObjectOwner> {
        let entries = self.entries.read().ok()?;
        entries.get(key).map(|entry| entry.owner.clone())
    }

    pub fn is_peer_backed(&self, key: &ObjectKey) -> bool {
        self.owner(key).map(|owner| owner.is_peer()).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every object in the note, plus objects in global scope when `include_global`.
    pub fn get_all(&self, note_id: Option<&str>, include_global: bool) -> Vec<ReplicatedObject> {
        let Ok(entries) = self.entries.read() else {
            return Vec::new();
        };
        let mut objects: Vec<ReplicatedObject> = entries
            .values()
            .filter(|entry| {
                let object_note = entry.object.note_id.as_deref();
                object_note == note_id || (include_global && object_note.is_none())
            })
            .map(|entry| entry.object.clone())
            .collect();
        objects.sort_by(|a, b| a.key().cmp(&b.key()));
        objects
    }

    // Local mutations

    /// Creates a controller-owned object and pushes it to peers.
    pub fn add(&self, object: ReplicatedObject) -> Result<(), ReplicaError> {
        let _order = self.order()?;
        self.insert(object.clone(), ObjectOwner::Local)?;
        self.notify_add(&object);
        self.push(&ReplicaChange::Added(object), None);
        Ok(())
    }

    /// Local write. Pushes the new value to every peer.
    pub fn set(&self, key: &ObjectKey, value: Value) -> Result<(), ReplicaError> {
        self.set_with(key, value, Propagation::All)
    }

    /// Stores `value`, notifies observers, then pushes according to `propagation`.
    pub fn set_with(
        &self,
        key: &ObjectKey,
        value: Value,
        propagation: Propagation<'_>,
    ) -> Result<(), ReplicaError> {
        let _order = self.order()?;
        let updated = {
            let mut entries = self.entries.write().map_err(|_| self.poisoned())?;
            let entry = entries.get_mut(key).ok_or_else(|| not_found(key))?;
            entry.object.value = value;
            entry.object.clone()
        };

        if let Some(listener) = &self.listener {
            listener.on_update(&self.group, &updated);
        }
        self.push(&ReplicaChange::Updated(updated), propagation.exclude());
        Ok(())
    }

    pub fn remove(&self, key: &ObjectKey) -> Result<ReplicatedObject, ReplicaError> {
        let _order = self.order()?;
        let removed = self.take(key)?;
        self.notify_remove(key);
        self.push(&ReplicaChange::Removed(key.clone()), None);
        Ok(removed)
    }

    /// Drops every object scoped to `note_id` without pushing, e.g. on note removal.
    pub fn remove_note(&self, note_id: &str) -> usize {
        let removed: Vec<ObjectKey> = match self.entries.write() {
            Ok(mut entries) => {
                let keys: Vec<ObjectKey> = entries
                    .keys()
                    .filter(|key| key.note_id.as_deref() == Some(note_id))
                    .cloned()
                    .collect();
                for key in &keys {
                    entries.remove(key);
                }
                keys
            }
            Err(_) => return 0,
        };
        for key in &removed {
            self.notify_remove(key);
        }
        removed.len()
    }

    // Remote mutations

    /// Mirrors an object a peer created. The local entry becomes a proxy owned by `origin`.
    pub fn apply_add(
        &self,
        object: ReplicatedObject,
        origin: &GroupId,
    ) -> Result<(), ReplicaError> {
        let _order = self.order()?;
        self.insert(object.clone(), ObjectOwner::Peer(origin.clone()))?;
        self.notify_add(&object);
        self.push(&ReplicaChange::Added(object), Some(origin));
        Ok(())
    }

    /// Applies a value a peer sent. Observers always see it; `origin` never gets it back.
    pub fn apply_update(
        &self,
        object: ReplicatedObject,
        origin: &GroupId,
    ) -> Result<(), ReplicaError> {
        let key = object.key();
        match self.owner(&key) {
            Some(ObjectOwner::Peer(owner)) => {
                if &owner != origin {
                    warn!(
                        "replicated object '{}' owned by {} was updated by {}",
                        key.name, owner, origin
                    );
                }
                self.set_with(&key, object.value, Propagation::SuppressEcho(origin))
            }
            Some(ObjectOwner::Local) => {
                debug!(
                    "peer {} updated controller-owned object '{}'",
                    origin, key.name
                );
                self.set_with(&key, object.value, Propagation::SuppressEcho(origin))
            }
            None => Err(not_found(&key)),
        }
    }

    pub fn apply_remove(&self, key: &ObjectKey, origin: &GroupId) -> Result<(), ReplicaError> {
        let _order = self.order()?;
        self.take(key)?;
        self.notify_remove(key);
        self.push(&ReplicaChange::Removed(key.clone()), Some(origin));
        Ok(())
    }

    // Private

    fn order(&self) -> Result<MutexGuard<'_, ()>, ReplicaError> {
        self.ordering.lock().map_err(|_| self.poisoned())
    }

    fn insert(&self, object: ReplicatedObject, owner: ObjectOwner) -> Result<(), ReplicaError> {
        let mut entries = self.entries.write().map_err(|_| self.poisoned())?;
        let key = object.key();
        match entries.get_mut(&key) {
            Some(existing) => {
                if existing.owner != owner {
                    warn!(
                        "replicated object '{}' in group {} claimed by {:?}, keeping owner {:?}",
                        key.name, self.group, owner, existing.owner
                    );
                }
                existing.object = object;
            }
            None => {
                entries.insert(key, Entry { object, owner });
            }
        }
        Ok(())
    }

    fn take(&self, key: &ObjectKey) -> Result<ReplicatedObject, ReplicaError> {
        let mut entries = self.entries.write().map_err(|_| self.poisoned())?;
        entries
            .remove(key)
            .map(|entry| entry.object)
            .ok_or_else(|| not_found(key))
    }

    fn notify_add(&self, object: &ReplicatedObject) {
        if let Some(listener) = &self.listener {
            listener.on_add(&self.group, object);
        }
    }

    fn notify_remove(&self, key: &ObjectKey) {
        if let Some(listener) = &self.listener {
            listener.on_remove(&self.group, key);
        }
    }

    fn push(&self, change: &ReplicaChange, exclude: Option<&GroupId>) {
        let pusher = match self.pusher.read() {
            Ok(slot) => slot.clone(),
            Err(_) => None,
        };
        if let Some(pusher) = pusher {
            pusher.push(change, exclude);
        }
    }

    fn poisoned(&self) -> ReplicaError {
        ReplicaError::Poisoned {
            group: self.group.to_string(),
        }
    }
}

fn not_found(key: &ObjectKey) -> ReplicaError {
    ReplicaError::ObjectNotFound {
        name: key.name.clone(),
        note_id: key.note_id.clone(),
        paragraph_id: key.paragraph_id.clone(),
    }
}
