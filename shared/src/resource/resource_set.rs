use std::collections::HashMap;

use crate::types::GroupId;

use super::{resource::Resource, resource_id::ResourceId};

/// Resources deduplicated by id, kept in first-insertion order.
/// Adding a resource whose id is already present replaces the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceSet {
    resources: Vec<Resource>,
    index: HashMap<ResourceId, usize>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn add(&mut self, resource: Resource) {
        if let Some(position) = self.index.get(&resource.id) {
            self.resources[*position] = resource;
            return;
        }
        self.index.insert(resource.id.clone(), self.resources.len());
        self.resources.push(resource);
    }

    pub fn add_all<I: IntoIterator<Item = Resource>>(&mut self, resources: I) {
        for resource in resources {
            self.add(resource);
        }
    }

    pub fn get(&self, id: &ResourceId) -> Option<&Resource> {
        self.index.get(id).map(|position| &self.resources[*position])
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.resources.iter()
    }

    pub fn into_vec(self) -> Vec<Resource> {
        self.resources
    }

    pub fn filter_by_note_id(&self, note_id: &str) -> ResourceSet {
        self.filter(|resource| resource.id.note_id.as_deref() == Some(note_id))
    }

    pub fn filter_by_paragraph_id(&self, paragraph_id: &str) -> ResourceSet {
        self.filter(|resource| resource.id.paragraph_id.as_deref() == Some(paragraph_id))
    }

    pub fn filter_by_name(&self, name: &str) -> ResourceSet {
        self.filter(|resource| resource.id.name == name)
    }

    /// Drops every resource owned by `pool_id`.
    pub fn without_pool(&self, pool_id: &GroupId) -> ResourceSet {
        self.filter(|resource| &resource.id.pool_id != pool_id)
    }

    fn filter<F: Fn(&Resource) -> bool>(&self, keep: F) -> ResourceSet {
        let mut output = ResourceSet::new();
        for resource in self.resources.iter().filter(|resource| keep(resource)) {
            output.add(resource.clone());
        }
        output
    }
}

impl IntoIterator for ResourceSet {
    type Item = Resource;
    type IntoIter = std::vec::IntoIter<Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResourceSet {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}

impl FromIterator<Resource> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        let mut set = ResourceSet::new();
        set.add_all(iter);
        set
    }
}
