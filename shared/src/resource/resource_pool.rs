use std::{collections::BTreeMap, sync::RwLock};

use log::warn;
use serde::Serialize;

use crate::types::GroupId;

use super::{
    error::ResourceError,
    resource::Resource,
    resource_id::{ResourceId, ResourceKey},
    resource_set::ResourceSet,
};

/// Key/value store owned by one worker group, scoped by note and paragraph.
///
/// Reads come from any group's dispatch loop through the resolver, writes
/// come from the owning group, so every access goes through the pool's own
/// lock. A poisoned lock degrades reads to "absent" and writes to no-ops.
pub struct LocalResourcePool {
    id: GroupId,
    resources: RwLock<BTreeMap<ResourceKey, Resource>>,
}

impl LocalResourcePool {
    pub fn new(id: GroupId) -> Self {
        Self {
            id,
            resources: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    /// Stores opaque bytes under an unscoped name.
    pub fn put(&self, name: &str, value: Vec<u8>) {
        let id = ResourceId::new(self.id.clone(), name);
        self.insert(Resource::from_bytes(id, value));
    }

    /// Stores a JSON-encoded value under an unscoped name.
    pub fn put_value<T: Serialize>(&self, name: &str, value: &T) -> Result<(), ResourceError> {
        let id = ResourceId::new(self.id.clone(), name);
        self.insert(Resource::from_value(id, value)?);
        Ok(())
    }

    /// Stores a JSON-encoded value scoped to a note and paragraph.
    pub fn put_scoped<T: Serialize>(
        &self,
        note_id: &str,
        paragraph_id: &str,
        name: &str,
        value: &T,
    ) -> Result<(), ResourceError> {
        let id = ResourceId::scoped(self.id.clone(), note_id, paragraph_id, name);
        self.insert(Resource::from_value(id, value)?);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Resource> {
        self.get_scoped(None, None, name)
    }

    pub fn get_scoped(
        &self,
        note_id: Option<&str>,
        paragraph_id: Option<&str>,
        name: &str,
    ) -> Option<Resource> {
        let key = ResourceKey::new(note_id, paragraph_id, name);
        match self.resources.read() {
            Ok(resources) => resources.get(&key).cloned(),
            Err(_) => {
                warn!("resource pool {} lock poisoned on read", self.id);
                None
            }
        }
    }

    pub fn remove(
        &self,
        note_id: Option<&str>,
        paragraph_id: Option<&str>,
        name: &str,
    ) -> Option<Resource> {
        let key = ResourceKey::new(note_id, paragraph_id, name);
        match self.resources.write() {
            Ok(mut resources) => resources.remove(&key),
            Err(_) => {
                warn!("resource pool {} lock poisoned on remove", self.id);
                None
            }
        }
    }

    /// Removes every resource scoped to `note_id`, e.g. when a note is deleted.
    pub fn remove_note(&self, note_id: &str) -> usize {
        match self.resources.write() {
            Ok(mut resources) => {
                let before = resources.len();
                resources.retain(|key, _| key.note_id.as_deref() != Some(note_id));
                before - resources.len()
            }
            Err(_) => {
                warn!("resource pool {} lock poisoned on remove_note", self.id);
                0
            }
        }
    }

    pub fn get_all(&self) -> ResourceSet {
        match self.resources.read() {
            Ok(resources) => resources.values().cloned().collect(),
            Err(_) => {
                warn!("resource pool {} lock poisoned on read", self.id);
                ResourceSet::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.resources.read().map(|resources| resources.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, resource: Resource) {
        match self.resources.write() {
            Ok(mut resources) => {
                resources.insert(resource.id.key(), resource);
            }
            Err(_) => warn!("resource pool {} lock poisoned on write", self.id),
        }
    }
}
