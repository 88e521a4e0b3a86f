//! A `Server` wired to recording listeners, with intervals short enough for tests

use std::sync::Arc;
use std::time::Duration;

use interlink_server::{
    AppendConfig, ApplicationListener, ConnectionConfig, PollConfig, RemoteProcess, Server,
    ServerConfig, WorkerGroup,
};
use interlink_shared::{GroupId, RegistryListener};

use crate::helpers::recording_listeners::{
    RecordingApplicationListener, RecordingProcessListener, RecordingRegistryListener,
};
use crate::local_worker::LocalWorker;

/// Installs a test logger once; later calls are no-ops
pub fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

pub fn fast_config() -> ServerConfig {
    ServerConfig {
        poll: PollConfig {
            not_running_interval: Duration::from_millis(5),
            backoff: Duration::from_millis(5),
            backoff_jitter: Duration::ZERO,
        },
        connection: ConnectionConfig {
            max_connections: 4,
            acquire_timeout: Duration::from_millis(500),
        },
        append: AppendConfig {
            flush_interval: Duration::from_millis(10),
            ..AppendConfig::default()
        },
        callback_timeout: Duration::from_millis(500),
    }
}

pub struct TestServer {
    pub server: Server,
    pub process_listener: Arc<RecordingProcessListener>,
    pub app_listener: Arc<RecordingApplicationListener>,
    pub registry_listener: Arc<RecordingRegistryListener>,
}

impl TestServer {
    pub fn new() -> Self {
        Self::with_config(fast_config())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        init_logger();
        let process_listener = Arc::new(RecordingProcessListener::new());
        let app_listener = Arc::new(RecordingApplicationListener::new());
        let registry_listener = Arc::new(RecordingRegistryListener::new());
        let app: Arc<dyn ApplicationListener> = app_listener.clone();
        let registry: Arc<dyn RegistryListener> = registry_listener.clone();
        let server = Server::new(config, process_listener.clone(), Some(app), Some(registry))
            .expect("server starts");

        Self {
            server,
            process_listener,
            app_listener,
            registry_listener,
        }
    }

    pub fn add_local(&self, id: &str) -> Arc<WorkerGroup> {
        self.server.add_local_group(id).expect("local group registers")
    }

    /// Registers a group backed by a fresh `LocalWorker` and starts its loop
    pub fn add_worker(&self, id: &str) -> (Arc<WorkerGroup>, Arc<RemoteProcess>, LocalWorker) {
        let worker = LocalWorker::new(id);
        let (group, process) = self
            .server
            .connect_remote_group(id, worker.connector())
            .expect("remote group registers");
        (group, process, worker)
    }

    /// Like `add_worker`, but the worker starts out stopped
    pub fn add_stopped_worker(&self, id: &str) -> (Arc<WorkerGroup>, Arc<RemoteProcess>, LocalWorker) {
        let worker = LocalWorker::new(id);
        let process = Arc::new(RemoteProcess::new(
            worker.connector(),
            self.server.config().connection.clone(),
        ));
        process.set_running(false);
        let group = self
            .server
            .add_remote_group(id, process.clone())
            .expect("remote group registers");
        (group, process, worker)
    }

    pub fn group(&self, id: &str) -> Option<Arc<WorkerGroup>> {
        self.server.group(&GroupId::from(id))
    }
}

impl Default for TestServer {
    fn default() -> Self {
        Self::new()
    }
}
