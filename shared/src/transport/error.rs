use thiserror::Error;

/// Errors raised by a worker client while talking to its worker process
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not open a connection to the worker
    #[error("Failed to connect to worker at {address}: {reason}")]
    ConnectFailed {
        address: String,
        reason: String,
    },

    /// A call was issued but did not complete
    #[error("Call '{call}' to worker failed: {reason}")]
    CallFailed {
        call: &'static str,
        reason: String,
    },

    /// A call did not complete before the transport's own deadline
    #[error("Call '{call}' to worker timed out after {millis} ms")]
    Timeout {
        call: &'static str,
        millis: u64,
    },

    /// The connection was closed by the worker
    #[error("Connection to worker was closed")]
    Closed,

    /// A payload could not be encoded for sending
    #[error("Failed to encode payload for '{call}': {reason}")]
    Encode {
        call: &'static str,
        reason: String,
    },
}

impl TransportError {
    pub fn call_failed(call: &'static str, reason: impl Into<String>) -> Self {
        Self::CallFailed {
            call,
            reason: reason.into(),
        }
    }
}
