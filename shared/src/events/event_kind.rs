use std::fmt;

/// Closed set of event kinds a worker can emit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    NoOp,
    ReplicatedObjectAdd,
    ReplicatedObjectUpdate,
    ReplicatedObjectRemove,
    RunCommandRequest,
    ResourcePoolGetAll,
    ResourceGet,
    OutputAppend,
    OutputUpdate,
    OutputUpdateAll,
    AppStatusUpdate,
    ControllerResourceRequest,
    MetaInfo,
}

impl EventKind {
    pub const ALL: [EventKind; 13] = [
        EventKind::NoOp,
        EventKind::ReplicatedObjectAdd,
        EventKind::ReplicatedObjectUpdate,
        EventKind::ReplicatedObjectRemove,
        EventKind::RunCommandRequest,
        EventKind::ResourcePoolGetAll,
        EventKind::ResourceGet,
        EventKind::OutputAppend,
        EventKind::OutputUpdate,
        EventKind::OutputUpdateAll,
        EventKind::AppStatusUpdate,
        EventKind::ControllerResourceRequest,
        EventKind::MetaInfo,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            EventKind::NoOp => "NO_OP",
            EventKind::ReplicatedObjectAdd => "REPLICATED_OBJECT_ADD",
            EventKind::ReplicatedObjectUpdate => "REPLICATED_OBJECT_UPDATE",
            EventKind::ReplicatedObjectRemove => "REPLICATED_OBJECT_REMOVE",
            EventKind::RunCommandRequest => "RUN_COMMAND_REQUEST",
            EventKind::ResourcePoolGetAll => "RESOURCE_POOL_GET_ALL",
            EventKind::ResourceGet => "RESOURCE_GET",
            EventKind::OutputAppend => "OUTPUT_APPEND",
            EventKind::OutputUpdate => "OUTPUT_UPDATE",
            EventKind::OutputUpdateAll => "OUTPUT_UPDATE_ALL",
            EventKind::AppStatusUpdate => "APP_STATUS_UPDATE",
            EventKind::ControllerResourceRequest => "CONTROLLER_RESOURCE_REQUEST",
            EventKind::MetaInfo => "META_INFO",
        }
    }

    pub fn from_tag(tag: &str) -> Option<EventKind> {
        EventKind::ALL.iter().copied().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
