//! # Interlink Shared
//! Data model shared between the interlink controller and worker transports:
//! events, resources, resource pools and replicated objects.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod events;
mod replica;
mod resource;
mod transport;
mod types;

pub use events::{
    error::EventError,
    event::{Event, RawEvent},
    event_kind::EventKind,
    payloads::{
        AppStatusUpdate, ControllerResourceRequest, ControllerResourceResponse,
        ControllerResourceType, OutputAppend, OutputMessage, OutputUpdate, OutputUpdateAll,
    },
};
pub use replica::{
    error::ReplicaError,
    registry::{Propagation, RegistryListener, ReplicaPusher, ReplicatedObjectRegistry},
    replicated_object::{ObjectKey, ObjectOwner, ReplicaChange, ReplicatedObject},
};
pub use resource::{
    error::ResourceError,
    resource::{decode_value, Resource},
    resource_id::{ResourceId, ResourceKey},
    resource_pool::LocalResourcePool,
    resource_set::ResourceSet,
};
pub use transport::{
    error::TransportError,
    worker_client::{Connector, WorkerClient},
};
pub use types::{GroupId, NoteId, OwnerKey, ParagraphId, ParagraphRef};
