use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by the output append batcher
#[derive(Clone, Debug)]
pub struct AppendConfig {
    /// How often pending output is handed to the listener
    pub flush_interval: Duration,
    /// A flush taking longer than this logs a warning
    pub slow_flush_warning: Duration,
    /// A single delivered chunk larger than this many bytes logs a warning
    pub large_chunk_warning: usize,
}

impl Default for AppendConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_millis(100),
            slow_flush_warning: Duration::from_millis(10),
            large_chunk_warning: 100_000,
        }
    }
}
