use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by each event dispatch loop
#[derive(Clone, Debug)]
pub struct PollConfig {
    /// Wait between liveness checks while the worker is not running
    pub not_running_interval: Duration,
    /// Wait after a failed acquire or fetch before the next attempt
    pub backoff: Duration,
    /// Upper bound of the random delay added to each back-off
    pub backoff_jitter: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            not_running_interval: Duration::from_secs(1),
            backoff: Duration::from_secs(1),
            backoff_jitter: Duration::from_millis(100),
        }
    }
}
