use thiserror::Error;

/// Errors that can occur while mutating a replicated object registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicaError {
    /// No entry exists under the given name and scope
    #[error("Replicated object '{name}' not found (note: {note_id:?}, paragraph: {paragraph_id:?})")]
    ObjectNotFound {
        name: String,
        note_id: Option<String>,
        paragraph_id: Option<String>,
    },

    /// The registry lock was poisoned by a panicking writer
    #[error("Replicated object registry for group '{group}' is poisoned")]
    Poisoned {
        group: String,
    },
}
