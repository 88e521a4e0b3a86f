use thiserror::Error;

use super::event_kind::EventKind;

/// Errors that can occur while decoding or encoding worker events
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The payload of a known event kind did not match its expected shape
    #[error("Malformed {kind} payload ({size} bytes): {reason}")]
    MalformedPayload {
        kind: EventKind,
        size: usize,
        reason: String,
    },

    /// An event kind that requires a payload arrived without one
    #[error("{kind} event arrived without a payload")]
    MissingPayload {
        kind: EventKind,
    },

    /// The payload could not be encoded
    #[error("Failed to encode {kind} payload: {reason}")]
    EncodeFailed {
        kind: EventKind,
        reason: String,
    },

    /// Unknown events carry no payload shape and cannot be re-encoded
    #[error("Cannot encode unknown event kind '{tag}'")]
    UnknownKind {
        tag: String,
    },
}
