use thiserror::Error;

use interlink_shared::TransportError;

use crate::connection::PoolError;

/// Errors that can occur while answering a correlated worker request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackError {
    /// A request with the same owner key is still waiting for its answer
    #[error("Request '{owner_key}' from group {group} is already pending")]
    DuplicateOwnerKey {
        group: String,
        owner_key: String,
    },

    /// The request timed out or was dropped before the answer arrived
    #[error("Request '{owner_key}' is no longer pending, answer discarded")]
    NotPending {
        owner_key: String,
    },

    /// The listener reported that it could not produce an answer
    #[error("Request '{owner_key}' failed: {reason}")]
    Failed {
        owner_key: String,
        reason: String,
    },

    /// The answer could not be serialized
    #[error("Failed to encode answer to request '{owner_key}': {reason}")]
    Encode {
        owner_key: String,
        reason: String,
    },

    /// No client to the requesting worker could be acquired
    #[error("Failed to acquire client for answer: {0}")]
    Acquire(#[from] PoolError),

    /// The answer could not be sent to the requesting worker
    #[error("Failed to deliver answer: {0}")]
    Delivery(#[from] TransportError),
}
