use thiserror::Error;

use interlink_shared::{EventError, ReplicaError, TransportError};

use crate::{connection::PoolError, request::CallbackError};

#[derive(Debug, Error)]
pub enum InterlinkServerError {
    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Replication error: {0}")]
    Replica(#[from] ReplicaError),

    #[error("Connection pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Callback error: {0}")]
    Callback(#[from] CallbackError),

    #[error("Group {group} is already registered")]
    GroupAlreadyRegistered { group: String },

    #[error("Group {group} is not registered")]
    GroupNotFound { group: String },

    #[error("Group {group} has no worker process")]
    NotRemote { group: String },

    #[error("Failed to spawn thread '{name}': {reason}")]
    ThreadSpawn { name: String, reason: String },

    #[error("Handler for {kind} event panicked")]
    HandlerPanicked { kind: String },

    #[error("Server has been shut down")]
    ShutDown,
}
