//! # Interlink Server
//! Controller side of interlink: polls worker processes for events,
//! dispatches them to listeners and local state, resolves resources across
//! worker groups, and keeps replicated objects in sync without echoes.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use interlink_shared::{
        Connector, Event, EventKind, GroupId, ObjectKey, ParagraphRef, RawEvent, ReplicaChange,
        ReplicatedObject, Resource, ResourceId, ResourceSet, TransportError, WorkerClient,
    };
}

mod append;
mod connection;
mod error;
mod events;
mod group;
mod listener;
mod replication;
mod request;
mod resolver;
mod server;

pub use append::{AppendBatcher, AppendConfig, AppendKey};
pub use connection::{
    ConnectionConfig, ConnectionId, ConnectionPool, PoolError, PoolStats, PooledClient,
    RemoteProcess,
};
pub use error::InterlinkServerError;
pub use events::{EventDispatcher, EventLoop, EventLoopHandle, PollConfig};
pub use group::{GroupRegistry, WorkerGroup};
pub use listener::{ApplicationListener, ProcessListener};
pub use replication::{
    apply_remote_add, apply_remote_remove, apply_remote_update, attach_worker_pusher,
    WorkerReplicaPusher,
};
pub use request::{CallbackError, PendingRequests, RunnersCallback};
pub use resolver::ResourceResolver;
pub use server::{Server, ServerConfig};
