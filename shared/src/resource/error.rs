use thiserror::Error;

/// Errors that can occur while encoding or decoding resource values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// The value could not be serialized for storage or transfer
    #[error("Failed to serialize resource '{name}': {reason}")]
    SerializeFailed {
        name: String,
        reason: String,
    },

    /// The stored bytes could not be read back as the requested type
    #[error("Failed to deserialize resource '{name}' ({size} bytes): {reason}")]
    DeserializeFailed {
        name: String,
        size: usize,
        reason: String,
    },

    /// The resource was stored as opaque bytes and cannot be decoded
    #[error("Resource '{name}' is not serializable and cannot be decoded")]
    NotSerializable {
        name: String,
    },
}
