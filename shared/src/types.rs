use std::fmt;

use serde::{Deserialize, Serialize};

pub type NoteId = String;
pub type ParagraphId = String;
pub type OwnerKey = String;

const SETTING_SEPARATOR: char = ':';

/// Identity of a worker group. Doubles as the id of the group's resource pool.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Portion of the id before the first `:`, or the whole id when there is none.
    pub fn setting_id(&self) -> &str {
        match self.0.find(SETTING_SEPARATOR) {
            Some(index) => &self.0[..index],
            None => &self.0,
        }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for GroupId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A note/paragraph pair, used both as a scope and as a runnable reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphRef {
    pub note_id: NoteId,
    pub paragraph_id: ParagraphId,
}

impl ParagraphRef {
    pub fn new(note_id: impl Into<NoteId>, paragraph_id: impl Into<ParagraphId>) -> Self {
        Self {
            note_id: note_id.into(),
            paragraph_id: paragraph_id.into(),
        }
    }
}
