use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{GroupId, NoteId, ParagraphId};

/// Globally addresses one value inside exactly one group's resource pool
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    #[serde(rename = "resourcePoolId")]
    pub pool_id: GroupId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_id: Option<NoteId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph_id: Option<ParagraphId>,
    pub name: String,
}

impl ResourceId {
    pub fn new(pool_id: impl Into<GroupId>, name: impl Into<String>) -> Self {
        Self {
            pool_id: pool_id.into(),
            note_id: None,
            paragraph_id: None,
            name: name.into(),
        }
    }

    pub fn scoped(
        pool_id: impl Into<GroupId>,
        note_id: impl Into<NoteId>,
        paragraph_id: impl Into<ParagraphId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            pool_id: pool_id.into(),
            note_id: Some(note_id.into()),
            paragraph_id: Some(paragraph_id.into()),
            name: name.into(),
        }
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey {
            note_id: self.note_id.clone(),
            paragraph_id: self.paragraph_id.clone(),
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.pool_id,
            self.note_id.as_deref().unwrap_or("-"),
            self.paragraph_id.as_deref().unwrap_or("-"),
            self.name
        )
    }
}

/// Position of a value inside a single pool (the id minus its pool)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub note_id: Option<NoteId>,
    pub paragraph_id: Option<ParagraphId>,
    pub name: String,
}

impl ResourceKey {
    pub fn new(note_id: Option<&str>, paragraph_id: Option<&str>, name: &str) -> Self {
        Self {
            note_id: note_id.map(str::to_string),
            paragraph_id: paragraph_id.map(str::to_string),
            name: name.to_string(),
        }
    }

    pub fn into_id(self, pool_id: GroupId) -> ResourceId {
        ResourceId {
            pool_id,
            note_id: self.note_id,
            paragraph_id: self.paragraph_id,
            name: self.name,
        }
    }
}
