pub mod assertions;
pub mod recording_listeners;
pub mod test_server;

use std::thread;
use std::time::{Duration, Instant};

pub use recording_listeners::{
    AppCall, ProcessCall, RecordingApplicationListener, RecordingProcessListener,
    RecordingRegistryListener, RegistryCall, RunnersReply,
};
pub use test_server::{fast_config, init_logger, TestServer};

/// Polls `condition` every few milliseconds until it holds or `timeout` passes
pub fn wait_until<F: FnMut() -> bool>(timeout: Duration, mut condition: F) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(2));
    }
}
