use std::collections::HashMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    replica::replicated_object::{ObjectKey, ReplicatedObject},
    resource::resource_id::ResourceId,
    types::ParagraphRef,
};

use super::{
    error::EventError,
    event_kind::EventKind,
    payloads::{
        AppStatusUpdate, ControllerResourceRequest, OutputAppend, OutputUpdate, OutputUpdateAll,
    },
};

/// An event exactly as the transport hands it over: a kind tag and a JSON payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub kind: String,
    #[serde(default)]
    pub data: String,
}

impl RawEvent {
    pub fn new(kind: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: data.into(),
        }
    }

    pub fn no_op() -> Self {
        Self::new(EventKind::NoOp.tag(), "")
    }
}

/// A decoded worker event
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    NoOp,
    ReplicatedObjectAdd(ReplicatedObject),
    ReplicatedObjectUpdate(ReplicatedObject),
    ReplicatedObjectRemove(ObjectKey),
    RunCommandRequest(ParagraphRef),
    ResourcePoolGetAll,
    ResourceGet(ResourceId),
    OutputAppend(OutputAppend),
    OutputUpdate(OutputUpdate),
    OutputUpdateAll(OutputUpdateAll),
    AppStatusUpdate(AppStatusUpdate),
    ControllerResourceRequest(ControllerResourceRequest),
    MetaInfo(HashMap<String, String>),
    /// A tag outside the known set; carried so it can be logged, never handled
    Unknown(String),
}

impl Event {
    pub fn decode(raw: &RawEvent) -> Result<Event, EventError> {
        let Some(kind) = EventKind::from_tag(&raw.kind) else {
            return Ok(Event::Unknown(raw.kind.clone()));
        };

        let event = match kind {
            EventKind::NoOp => Event::NoOp,
            EventKind::ResourcePoolGetAll => Event::ResourcePoolGetAll,
            EventKind::ReplicatedObjectAdd => Event::ReplicatedObjectAdd(payload(kind, raw)?),
            EventKind::ReplicatedObjectUpdate => {
                Event::ReplicatedObjectUpdate(payload(kind, raw)?)
            }
            EventKind::ReplicatedObjectRemove => {
                let object: ReplicatedObject = payload(kind, raw)?;
                Event::ReplicatedObjectRemove(object.key())
            }
            EventKind::RunCommandRequest => Event::RunCommandRequest(payload(kind, raw)?),
            EventKind::ResourceGet => Event::ResourceGet(payload(kind, raw)?),
            EventKind::OutputAppend => Event::OutputAppend(payload(kind, raw)?),
            EventKind::OutputUpdate => Event::OutputUpdate(payload(kind, raw)?),
            EventKind::OutputUpdateAll => Event::OutputUpdateAll(payload(kind, raw)?),
            EventKind::AppStatusUpdate => Event::AppStatusUpdate(payload(kind, raw)?),
            EventKind::ControllerResourceRequest => {
                Event::ControllerResourceRequest(payload(kind, raw)?)
            }
            EventKind::MetaInfo => Event::MetaInfo(payload(kind, raw)?),
        };

        Ok(event)
    }

    pub fn kind(&self) -> Option<EventKind> {
        let kind = match self {
            Event::NoOp => EventKind::NoOp,
            Event::ReplicatedObjectAdd(_) => EventKind::ReplicatedObjectAdd,
            Event::ReplicatedObjectUpdate(_) => EventKind::ReplicatedObjectUpdate,
            Event::ReplicatedObjectRemove(_) => EventKind::ReplicatedObjectRemove,
            Event::RunCommandRequest(_) => EventKind::RunCommandRequest,
            Event::ResourcePoolGetAll => EventKind::ResourcePoolGetAll,
            Event::ResourceGet(_) => EventKind::ResourceGet,
            Event::OutputAppend(_) => EventKind::OutputAppend,
            Event::OutputUpdate(_) => EventKind::OutputUpdate,
            Event::OutputUpdateAll(_) => EventKind::OutputUpdateAll,
            Event::AppStatusUpdate(_) => EventKind::AppStatusUpdate,
            Event::ControllerResourceRequest(_) => EventKind::ControllerResourceRequest,
            Event::MetaInfo(_) => EventKind::MetaInfo,
            Event::Unknown(_) => return None,
        };
        Some(kind)
    }

    /// Encodes the event into its wire form. Used by worker-side transports.
    pub fn encode(&self) -> Result<RawEvent, EventError> {
        let Some(kind) = self.kind() else {
            let tag = match self {
                Event::Unknown(tag) => tag.clone(),
                _ => String::new(),
            };
            return Err(EventError::UnknownKind { tag });
        };

        let data = match self {
            Event::NoOp | Event::ResourcePoolGetAll | Event::Unknown(_) => String::new(),
            Event::ReplicatedObjectAdd(object) | Event::ReplicatedObjectUpdate(object) => {
                to_json(kind, object)?
            }
            Event::ReplicatedObjectRemove(key) => to_json(
                kind,
                &ReplicatedObject::new(
                    key.name.clone(),
                    serde_json::Value::Null,
                    key.note_id.as_deref(),
                    key.paragraph_id.as_deref(),
                ),
            )?,
            Event::RunCommandRequest(paragraph) => to_json(kind, paragraph)?,
            Event::ResourceGet(id) => to_json(kind, id)?,
            Event::OutputAppend(append) => to_json(kind, append)?,
            Event::OutputUpdate(update) => to_json(kind, update)?,
            Event::OutputUpdateAll(update) => to_json(kind, update)?,
            Event::AppStatusUpdate(status) => to_json(kind, status)?,
            Event::ControllerResourceRequest(request) => to_json(kind, request)?,
            Event::MetaInfo(infos) => to_json(kind, infos)?,
        };

        Ok(RawEvent::new(kind.tag(), data))
    }
}

fn payload<T: DeserializeOwned>(kind: EventKind, raw: &RawEvent) -> Result<T, EventError> {
    if raw.data.trim().is_empty() {
        return Err(EventError::MissingPayload { kind });
    }
    serde_json::from_str(&raw.data).map_err(|err| EventError::MalformedPayload {
        kind,
        size: raw.data.len(),
        reason: err.to_string(),
    })
}

fn to_json<T: Serialize>(kind: EventKind, value: &T) -> Result<String, EventError> {
    serde_json::to_string(value).map_err(|err| EventError::EncodeFailed {
        kind,
        reason: err.to_string(),
    })
}
