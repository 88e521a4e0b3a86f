use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{GroupId, NoteId, ParagraphId};

/// A named value mirrored between the controller and a worker
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicatedObject {
    pub name: String,
    #[serde(rename = "object", default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_id: Option<NoteId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph_id: Option<ParagraphId>,
}

impl ReplicatedObject {
    pub fn new(
        name: impl Into<String>,
        value: Value,
        note_id: Option<&str>,
        paragraph_id: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            value,
            note_id: note_id.map(str::to_string),
            paragraph_id: paragraph_id.map(str::to_string),
        }
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(
            &self.name,
            self.note_id.as_deref(),
            self.paragraph_id.as_deref(),
        )
    }
}

/// Registry key: an object name within an optional note/paragraph scope
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub name: String,
    pub note_id: Option<NoteId>,
    pub paragraph_id: Option<ParagraphId>,
}

impl ObjectKey {
    pub fn new(name: &str, note_id: Option<&str>, paragraph_id: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            note_id: note_id.map(str::to_string),
            paragraph_id: paragraph_id.map(str::to_string),
        }
    }
}

/// Who is authoritative for a registry entry
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObjectOwner {
    /// Created on the controller; the controller is authoritative
    Local,
    /// Created by a worker; the local entry is a proxy for that peer's object
    Peer(GroupId),
}

impl ObjectOwner {
    pub fn is_peer(&self) -> bool {
        matches!(self, ObjectOwner::Peer(_))
    }
}

/// A change that has to be transmitted to peers
#[derive(Clone, Debug, PartialEq)]
pub enum ReplicaChange {
    Added(ReplicatedObject),
    Updated(ReplicatedObject),
    Removed(ObjectKey),
}

impl ReplicaChange {
    pub fn name(&self) -> &str {
        match self {
            ReplicaChange::Added(object) | ReplicaChange::Updated(object) => &object.name,
            ReplicaChange::Removed(key) => &key.name,
        }
    }
}
