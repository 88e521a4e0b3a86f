use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};

use log::warn;

use interlink_shared::{GroupId, OwnerKey};

use crate::connection::RemoteProcess;

use super::{error::CallbackError, runners_callback::RunnersCallback};

struct PendingEntry {
    ticket: u64,
    deadline: Instant,
}

struct PendingInner {
    timeout: Duration,
    entries: Mutex<HashMap<(GroupId, OwnerKey), PendingEntry>>,
    next_ticket: AtomicU64,
}

/// Requests from workers that wait on an asynchronous listener answer.
///
/// Every entry resolves exactly once: the first of completion, failure,
/// drop of the callback, or expiry removes it. Whoever removes the entry
/// owns the outcome; everyone later finds nothing and backs off.
#[derive(Clone)]
pub struct PendingRequests {
    inner: Arc<PendingInner>,
}

impl PendingRequests {
    pub fn new(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(PendingInner {
                timeout,
                entries: Mutex::new(HashMap::new()),
                next_ticket: AtomicU64::new(1),
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Opens a pending entry and returns the callback that resolves it.
    /// The answer is delivered through `process`, the requesting worker.
    pub fn register(
        &self,
        group: &GroupId,
        owner_key: &str,
        process: Arc<RemoteProcess>,
    ) -> Result<RunnersCallback, CallbackError> {
        let key = (group.clone(), owner_key.to_string());
        let mut entries = match self.inner.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => {
                warn!("pending request table poisoned, recovering");
                poisoned.into_inner()
            }
        };
        if entries.contains_key(&key) {
            return Err(CallbackError::DuplicateOwnerKey {
                group: group.to_string(),
                owner_key: owner_key.to_string(),
            });
        }

        let ticket = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);
        entries.insert(
            key,
            PendingEntry {
                ticket,
                deadline: Instant::now() + self.inner.timeout,
            },
        );

        Ok(RunnersCallback::new(
            self.clone(),
            group.clone(),
            owner_key.to_string(),
            ticket,
            process,
        ))
    }

    /// Removes every entry of `group` whose deadline has passed. Returns the count.
    pub fn sweep_expired(&self, group: &GroupId) -> usize {
        let now = Instant::now();
        let Ok(mut entries) = self.inner.entries.lock() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|(entry_group, owner_key), entry| {
            let expired = entry_group == group && entry.deadline <= now;
            if expired {
                warn!(
                    "request '{}' from group {} timed out after {} ms",
                    owner_key,
                    entry_group,
                    self.inner.timeout.as_millis()
                );
            }
            !expired
        });
        before - entries.len()
    }

    /// Forgets every entry of `group`, used when the group is torn down.
    pub fn clear_group(&self, group: &GroupId) -> usize {
        let Ok(mut entries) = self.inner.entries.lock() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|(entry_group, _), _| entry_group != group);
        before - entries.len()
    }

    /// Drops every entry; callbacks still held elsewhere resolve as not pending.
    pub fn clear_all(&self) -> usize {
        let Ok(mut entries) = self.inner.entries.lock() else {
            return 0;
        };
        let dropped = entries.len();
        entries.clear();
        dropped
    }

    pub fn is_pending(&self, group: &GroupId, owner_key: &str) -> bool {
        match self.inner.entries.lock() {
            Ok(entries) => entries.contains_key(&(group.clone(), owner_key.to_string())),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes the entry if it is still the one `ticket` was issued for.
    pub(crate) fn take(&self, group: &GroupId, owner_key: &str, ticket: u64) -> bool {
        let Ok(mut entries) = self.inner.entries.lock() else {
            return false;
        };
        let key = (group.clone(), owner_key.to_string());
        match entries.get(&key) {
            Some(entry) if entry.ticket == ticket => {
                entries.remove(&key);
                true
            }
            _ => false,
        }
    }
}
