use crate::{
    events::event::RawEvent,
    replica::replicated_object::ReplicaChange,
    resource::{resource::Resource, resource_id::ResourceId},
};

use super::error::TransportError;

/// One live connection to a worker process.
///
/// A client is held by exactly one caller at a time, so every call takes
/// `&mut self`. Any `Err` means the connection must be treated as broken.
pub trait WorkerClient: Send {
    /// Blocks until the worker has an event, or the transport's own timeout elapses.
    fn fetch_next_event(&mut self) -> Result<RawEvent, TransportError>;

    /// Every resource in the worker's pool.
    fn resource_pool_get_all(&mut self) -> Result<Vec<Resource>, TransportError>;

    /// The serialized value of one resource; empty when the worker does not have it.
    fn resource_get(
        &mut self,
        note_id: Option<&str>,
        paragraph_id: Option<&str>,
        name: &str,
    ) -> Result<Vec<u8>, TransportError>;

    /// Answers a `RESOURCE_POOL_GET_ALL` event.
    fn deliver_resource_pool_all(&mut self, resources: &[Resource]) -> Result<(), TransportError>;

    /// Answers a `RESOURCE_GET` event. An empty value means "not found".
    fn deliver_resource_get(
        &mut self,
        id: &ResourceId,
        value: &[u8],
    ) -> Result<(), TransportError>;

    /// Answers a `CONTROLLER_RESOURCE_REQUEST` event, correlated by `owner_key`.
    fn deliver_correlated_result(
        &mut self,
        owner_key: &str,
        payload: &[u8],
    ) -> Result<(), TransportError>;

    /// Mirrors a replicated object change into the worker's registry.
    fn push_replica_change(&mut self, change: &ReplicaChange) -> Result<(), TransportError>;
}

/// Opens new connections to one worker process
pub trait Connector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn WorkerClient>, TransportError>;

    /// Human readable address, used in log lines.
    fn address(&self) -> String {
        String::from("<unknown>")
    }
}
