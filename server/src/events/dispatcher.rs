use std::sync::Arc;

use log::{debug, warn};

use interlink_shared::{
    AppStatusUpdate, ControllerResourceRequest, ControllerResourceType, Event, OutputAppend,
    OutputUpdate, OutputUpdateAll, ReplicaError, ResourceId,
};

use crate::{
    append::AppendBatcher,
    connection::RemoteProcess,
    error::InterlinkServerError,
    group::WorkerGroup,
    listener::{ApplicationListener, ProcessListener},
    replication,
    request::PendingRequests,
    resolver::ResourceResolver,
};

/// Routes decoded worker events to local state, listeners and follow-up calls.
///
/// One dispatcher is shared by every group's loop; `dispatch` is given the
/// group the event came from.
pub struct EventDispatcher {
    resolver: ResourceResolver,
    batcher: Arc<AppendBatcher>,
    pending: PendingRequests,
    process_listener: Arc<dyn ProcessListener>,
    application_listener: Option<Arc<dyn ApplicationListener>>,
}

impl EventDispatcher {
    pub fn new(
        resolver: ResourceResolver,
        batcher: Arc<AppendBatcher>,
        pending: PendingRequests,
        process_listener: Arc<dyn ProcessListener>,
        application_listener: Option<Arc<dyn ApplicationListener>>,
    ) -> Self {
        Self {
            resolver,
            batcher,
            pending,
            process_listener,
            application_listener,
        }
    }

    pub fn pending(&self) -> &PendingRequests {
        &self.pending
    }

    pub fn dispatch(&self, group: &WorkerGroup, event: Event) -> Result<(), InterlinkServerError> {
        match event {
            Event::NoOp => Ok(()),
            Event::ReplicatedObjectAdd(object) => {
                replication::apply_remote_add(group, object)?;
                Ok(())
            }
            Event::ReplicatedObjectUpdate(object) => {
                match replication::apply_remote_update(group, object) {
                    Err(ReplicaError::ObjectNotFound { name, .. }) => {
                        warn!(
                            "group {} updated replicated object '{}' that does not exist here",
                            group.id(),
                            name
                        );
                        Ok(())
                    }
                    result => result.map_err(InterlinkServerError::from),
                }
            }
            Event::ReplicatedObjectRemove(key) => {
                replication::apply_remote_remove(group, &key)?;
                Ok(())
            }
            Event::RunCommandRequest(paragraph) => {
                self.process_listener.on_run_paragraph_requested(
                    group.id(),
                    &paragraph.note_id,
                    &paragraph.paragraph_id,
                );
                Ok(())
            }
            Event::ResourcePoolGetAll => self.answer_pool_get_all(group),
            Event::ResourceGet(id) => self.answer_resource_get(group, &id),
            Event::OutputAppend(append) => {
                self.output_append(append);
                Ok(())
            }
            Event::OutputUpdate(update) => {
                self.output_update(update);
                Ok(())
            }
            Event::OutputUpdateAll(update) => {
                self.output_update_all(update);
                Ok(())
            }
            Event::AppStatusUpdate(status) => {
                self.app_status_update(status);
                Ok(())
            }
            Event::ControllerResourceRequest(request) => self.controller_request(group, request),
            Event::MetaInfo(infos) => {
                self.process_listener
                    .on_meta_infos_received(group.id().setting_id(), infos);
                Ok(())
            }
            Event::Unknown(tag) => {
                warn!("group {} sent unknown event '{}', ignored", group.id(), tag);
                Ok(())
            }
        }
    }

    // Resource responses

    fn answer_pool_get_all(&self, group: &WorkerGroup) -> Result<(), InterlinkServerError> {
        let process = worker_of(group)?;
        let resources = self.resolver.resolve_all(group.id()).into_vec();
        debug!(
            "answering resource pool request of group {} with {} resources",
            group.id(),
            resources.len()
        );

        let mut client = process.acquire()?;
        match client.deliver_resource_pool_all(&resources) {
            Ok(()) => {
                process.release(client, false);
                Ok(())
            }
            Err(err) => {
                process.release(client, true);
                Err(err.into())
            }
        }
    }

    fn answer_resource_get(
        &self,
        group: &WorkerGroup,
        id: &ResourceId,
    ) -> Result<(), InterlinkServerError> {
        let process = worker_of(group)?;
        let value = self.resolver.resolve_one(id).unwrap_or_default();

        let mut client = process.acquire()?;
        match client.deliver_resource_get(id, &value) {
            Ok(()) => {
                process.release(client, false);
                Ok(())
            }
            Err(err) => {
                process.release(client, true);
                Err(err.into())
            }
        }
    }

    // Output

    fn output_append(&self, append: OutputAppend) {
        match (&append.app_id, &self.application_listener) {
            (None, _) => self.batcher.append(
                &append.note_id,
                &append.paragraph_id,
                append.index,
                &append.data,
            ),
            (Some(app_id), Some(listener)) => listener.on_output_append(
                &append.note_id,
                &append.paragraph_id,
                append.index,
                app_id,
                &append.data,
            ),
            (Some(app_id), None) => {
                debug!("no application listener, output of app {} dropped", app_id)
            }
        }
    }

    fn output_update(&self, update: OutputUpdate) {
        match (&update.app_id, &self.application_listener) {
            (None, _) => self.process_listener.on_output_updated(
                &update.note_id,
                &update.paragraph_id,
                update.index,
                &update.output_type,
                &update.data,
            ),
            (Some(app_id), Some(listener)) => listener.on_output_updated(
                &update.note_id,
                &update.paragraph_id,
                update.index,
                app_id,
                &update.output_type,
                &update.data,
            ),
            (Some(app_id), None) => {
                debug!("no application listener, output of app {} dropped", app_id)
            }
        }
    }

    fn output_update_all(&self, update: OutputUpdateAll) {
        let Some(messages) = update.messages else {
            return;
        };
        self.process_listener
            .on_output_clear(&update.note_id, &update.paragraph_id);
        for (index, message) in messages.iter().enumerate() {
            self.process_listener.on_output_updated(
                &update.note_id,
                &update.paragraph_id,
                index,
                &message.output_type,
                &message.data,
            );
        }
    }

    fn app_status_update(&self, status: AppStatusUpdate) {
        match &self.application_listener {
            Some(listener) => listener.on_status_change(
                &status.note_id,
                &status.paragraph_id,
                &status.app_id,
                &status.status,
            ),
            None => debug!(
                "no application listener, status of app {} dropped",
                status.app_id
            ),
        }
    }

    // Correlated requests

    fn controller_request(
        &self,
        group: &WorkerGroup,
        request: ControllerResourceRequest,
    ) -> Result<(), InterlinkServerError> {
        if request.resource_type != ControllerResourceType::ParagraphRunners {
            warn!(
                "group {} asked for an unsupported controller resource, request '{}' ignored",
                group.id(),
                request.owner_key
            );
            return Ok(());
        }

        let process = worker_of(group)?;
        let callback = self
            .pending
            .register(group.id(), &request.owner_key, process.clone())?;
        self.process_listener.on_resource_runners_requested(
            &request.data.note_id,
            &request.data.paragraph_id,
            callback,
        );
        Ok(())
    }
}

fn worker_of(group: &WorkerGroup) -> Result<&Arc<RemoteProcess>, InterlinkServerError> {
    group
        .remote_process()
        .ok_or_else(|| InterlinkServerError::NotRemote {
            group: group.id().to_string(),
        })
}
