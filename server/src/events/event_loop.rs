use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use log::{debug, error, info, warn};

use interlink_shared::{Event, GroupId, RawEvent};

use crate::{connection::RemoteProcess, error::InterlinkServerError, group::WorkerGroup};

use super::{dispatcher::EventDispatcher, poll_config::PollConfig};

/// Polls one worker process for events and dispatches them in order.
///
/// Runs on its own thread until the paired [`EventLoopHandle`] shuts it down.
/// Shutdown is observed at the top of each iteration and wakes any back-off
/// wait, but does not interrupt a fetch already in flight.
pub struct EventLoop {
    group: Arc<WorkerGroup>,
    process: Arc<RemoteProcess>,
    dispatcher: Arc<EventDispatcher>,
    config: PollConfig,
    shutdown: Receiver<()>,
}

impl EventLoop {
    pub fn spawn(
        group: Arc<WorkerGroup>,
        dispatcher: Arc<EventDispatcher>,
        config: PollConfig,
    ) -> Result<EventLoopHandle, InterlinkServerError> {
        let Some(process) = group.remote_process().cloned() else {
            return Err(InterlinkServerError::NotRemote {
                group: group.id().to_string(),
            });
        };

        let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);
        let group_id = group.id().clone();
        let name = format!("interlink-poll-{}", group_id);
        let event_loop = EventLoop {
            group,
            process,
            dispatcher,
            config,
            shutdown: shutdown_rx,
        };

        let thread = thread::Builder::new()
            .name(name.clone())
            .spawn(move || event_loop.run())
            .map_err(|err| InterlinkServerError::ThreadSpawn {
                name,
                reason: err.to_string(),
            })?;

        Ok(EventLoopHandle {
            group: group_id,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    fn run(self) {
        info!("event loop for group {} started", self.group.id());

        while !self.shutdown_requested() {
            self.dispatcher.pending().sweep_expired(self.group.id());

            if !self.process.is_running() {
                if self.wait(self.config.not_running_interval) {
                    break;
                }
                continue;
            }

            let mut client = match self.process.acquire() {
                Ok(client) => client,
                Err(err) => {
                    warn!("group {} cannot acquire a client: {}", self.group.id(), err);
                    if self.wait(self.backoff()) {
                        break;
                    }
                    continue;
                }
            };

            let raw = match client.fetch_next_event() {
                Ok(raw) => {
                    self.process.release(client, false);
                    raw
                }
                Err(err) => {
                    self.process.release(client, true);
                    warn!("failed to fetch event from group {}: {}", self.group.id(), err);
                    if self.wait(self.backoff()) {
                        break;
                    }
                    continue;
                }
            };

            self.handle(raw);
        }

        info!("event loop for group {} stopped", self.group.id());
    }

    fn handle(&self, raw: RawEvent) {
        let event = match Event::decode(&raw) {
            Ok(event) => event,
            Err(err) => {
                warn!("group {} sent a malformed event: {}", self.group.id(), err);
                return;
            }
        };

        let dispatcher = &self.dispatcher;
        let group = &self.group;
        match panic::catch_unwind(AssertUnwindSafe(|| dispatcher.dispatch(group, event))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!(
                "failed to handle {} event from group {}: {}",
                raw.kind,
                self.group.id(),
                err
            ),
            Err(_) => error!(
                "{}",
                InterlinkServerError::HandlerPanicked {
                    kind: raw.kind.clone()
                }
            ),
        }
    }

    fn shutdown_requested(&self) -> bool {
        !matches!(self.shutdown.try_recv(), Err(TryRecvError::Empty))
    }

    /// Sleeps for `duration` unless shut down first. Returns true on shutdown.
    fn wait(&self, duration: Duration) -> bool {
        !matches!(
            self.shutdown.recv_timeout(duration),
            Err(RecvTimeoutError::Timeout)
        )
    }

    fn backoff(&self) -> Duration {
        let jitter = self.config.backoff_jitter.as_millis() as u64;
        let jitter = if jitter == 0 { 0 } else { fastrand::u64(0..=jitter) };
        self.config.backoff + Duration::from_millis(jitter)
    }
}

/// Owner side of a running [`EventLoop`]. Dropping it shuts the loop down and joins it.
pub struct EventLoopHandle {
    group: GroupId,
    shutdown: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl EventLoopHandle {
    pub fn group(&self) -> &GroupId {
        &self.group
    }

    /// Signals the loop without waiting for it.
    pub fn request_shutdown(&mut self) {
        // dropping the sender disconnects the channel, which the loop observes
        self.shutdown.take();
    }

    /// Signals the loop and waits for its thread to exit.
    pub fn shutdown(&mut self) {
        self.request_shutdown();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("event loop thread of group {} panicked", self.group);
            } else {
                debug!("event loop thread of group {} joined", self.group);
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.thread {
            Some(thread) => thread.is_finished(),
            None => true,
        }
    }
}

impl Drop for EventLoopHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
