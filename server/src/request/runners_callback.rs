use std::{fmt, sync::Arc};

use log::{debug, error, warn};

use interlink_shared::{
    ControllerResourceResponse, ControllerResourceType, GroupId, OwnerKey, ParagraphRef,
};

use crate::connection::RemoteProcess;

use super::{error::CallbackError, pending_requests::PendingRequests};

/// Answers one pending `CONTROLLER_RESOURCE_REQUEST`.
///
/// Consumed by [`RunnersCallback::complete`] or [`RunnersCallback::fail`].
/// Dropping it without calling either resolves the request as failed.
pub struct RunnersCallback {
    pending: PendingRequests,
    group: GroupId,
    owner_key: OwnerKey,
    ticket: u64,
    process: Arc<RemoteProcess>,
    resolved: bool,
}

impl RunnersCallback {
    pub(crate) fn new(
        pending: PendingRequests,
        group: GroupId,
        owner_key: OwnerKey,
        ticket: u64,
        process: Arc<RemoteProcess>,
    ) -> Self {
        Self {
            pending,
            group,
            owner_key,
            ticket,
            process,
            resolved: false,
        }
    }

    pub fn owner_key(&self) -> &str {
        &self.owner_key
    }

    pub fn group(&self) -> &GroupId {
        &self.group
    }

    /// Sends `runners` to the requesting worker on a fresh client.
    ///
    /// Returns `NotPending` without touching the worker when the request
    /// already expired.
    pub fn complete(mut self, runners: Vec<ParagraphRef>) -> Result<(), CallbackError> {
        self.resolved = true;
        if !self.pending.take(&self.group, &self.owner_key, self.ticket) {
            warn!(
                "late answer to request '{}' from group {} discarded",
                self.owner_key, self.group
            );
            return Err(CallbackError::NotPending {
                owner_key: self.owner_key.clone(),
            });
        }

        let result = self.deliver(runners);
        if let Err(err) = &result {
            error!(
                "answer to request '{}' from group {} not delivered: {}",
                self.owner_key, self.group, err
            );
        }
        result
    }

    /// Resolves the request without an answer. The worker is not notified.
    pub fn fail(mut self, reason: impl fmt::Display) {
        self.resolved = true;
        if self.pending.take(&self.group, &self.owner_key, self.ticket) {
            error!(
                "request '{}' from group {} failed: {}",
                self.owner_key, self.group, reason
            );
        } else {
            debug!(
                "failure of request '{}' arrived after it expired: {}",
                self.owner_key, reason
            );
        }
    }

    fn deliver(&self, runners: Vec<ParagraphRef>) -> Result<(), CallbackError> {
        let response = ControllerResourceResponse {
            owner_key: self.owner_key.clone(),
            resource_type: ControllerResourceType::ParagraphRunners,
            data: runners,
        };
        let payload = serde_json::to_vec(&response).map_err(|err| CallbackError::Encode {
            owner_key: self.owner_key.clone(),
            reason: err.to_string(),
        })?;

        let mut client = self.process.acquire()?;
        match client.deliver_correlated_result(&self.owner_key, &payload) {
            Ok(()) => {
                self.process.release(client, false);
                debug!(
                    "answered request '{}' from group {} with {} runners",
                    self.owner_key,
                    self.group,
                    response.data.len()
                );
                Ok(())
            }
            Err(err) => {
                self.process.release(client, true);
                Err(err.into())
            }
        }
    }
}

impl fmt::Debug for RunnersCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnersCallback")
            .field("group", &self.group)
            .field("owner_key", &self.owner_key)
            .finish()
    }
}

impl Drop for RunnersCallback {
    fn drop(&mut self) {
        if !self.resolved && self.pending.take(&self.group, &self.owner_key, self.ticket) {
            error!(
                "request '{}' from group {} dropped without an answer",
                self.owner_key, self.group
            );
        }
    }
}
