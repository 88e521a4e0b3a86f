use std::{
    collections::HashMap,
    io,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex},
    thread::{self, JoinHandle},
    time::Instant,
};

use crossbeam::channel::{self, Sender};
use log::{debug, error, warn};

use interlink_shared::{NoteId, ParagraphId};

use crate::listener::ProcessListener;

use super::append_config::AppendConfig;

const FLUSH_THREAD_NAME: &str = "interlink-append-flush";

/// One result slot of one paragraph
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AppendKey {
    pub note_id: NoteId,
    pub paragraph_id: ParagraphId,
    pub index: usize,
}

impl AppendKey {
    pub fn new(note_id: &str, paragraph_id: &str, index: usize) -> Self {
        Self {
            note_id: note_id.to_string(),
            paragraph_id: paragraph_id.to_string(),
            index,
        }
    }
}

#[derive(Default)]
struct PendingOutput {
    chunks: Vec<(AppendKey, String)>,
    positions: HashMap<AppendKey, usize>,
}

impl PendingOutput {
    fn push(&mut self, key: AppendKey, data: &str) {
        match self.positions.get(&key) {
            Some(position) => self.chunks[*position].1.push_str(data),
            None => {
                self.positions.insert(key.clone(), self.chunks.len());
                self.chunks.push((key, data.to_string()));
            }
        }
    }
}

struct BatcherInner {
    config: AppendConfig,
    listener: Arc<dyn ProcessListener>,
    pending: Mutex<PendingOutput>,
    // serializes deliveries so a manual flush never overtakes the ticker's
    flushing: Mutex<()>,
}

impl BatcherInner {
    fn append(&self, key: AppendKey, data: &str) {
        match self.pending.lock() {
            Ok(mut pending) => pending.push(key, data),
            Err(poisoned) => {
                warn!("append buffer poisoned, recovering");
                poisoned.into_inner().push(key, data);
            }
        }
    }

    fn flush(&self) -> usize {
        let _flushing = self.flushing.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let taken = match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        if taken.chunks.is_empty() {
            return 0;
        }

        let started = Instant::now();
        let delivered = taken.chunks.len();
        for (key, chunk) in taken.chunks {
            if chunk.len() > self.config.large_chunk_warning {
                warn!(
                    "large output chunk of {} bytes for paragraph {} of note {}",
                    chunk.len(),
                    key.paragraph_id,
                    key.note_id
                );
            }
            let listener = &self.listener;
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                listener.on_output_append(&key.note_id, &key.paragraph_id, key.index, &chunk)
            }));
            if result.is_err() {
                error!(
                    "output listener panicked on append for paragraph {}",
                    key.paragraph_id
                );
            }
        }

        let elapsed = started.elapsed();
        if elapsed > self.config.slow_flush_warning {
            warn!(
                "output flush of {} chunks took {} ms",
                delivered,
                elapsed.as_millis()
            );
        }
        delivered
    }
}

/// Coalesces the high-frequency OUTPUT_APPEND stream.
///
/// Chunks for the same (note, paragraph, index) are concatenated and handed
/// to [`ProcessListener::on_output_append`] once per flush, keys in the order
/// they first arrived. A background thread flushes on a fixed interval and
/// once more on shutdown.
pub struct AppendBatcher {
    inner: Arc<BatcherInner>,
    shutdown: Mutex<Option<Sender<()>>>,
    flush_thread: Mutex<Option<JoinHandle<()>>>,
}

impl AppendBatcher {
    pub fn start(listener: Arc<dyn ProcessListener>, config: AppendConfig) -> io::Result<Self> {
        let inner = Arc::new(BatcherInner {
            config,
            listener,
            pending: Mutex::new(PendingOutput::default()),
            flushing: Mutex::new(()),
        });

        let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);
        let thread_inner = inner.clone();
        let flush_thread = thread::Builder::new()
            .name(FLUSH_THREAD_NAME.to_string())
            .spawn(move || {
                let ticker = channel::tick(thread_inner.config.flush_interval);
                loop {
                    crossbeam::select! {
                        recv(ticker) -> _ => {
                            thread_inner.flush();
                        }
                        recv(shutdown_rx) -> _ => break,
                    }
                }
                let delivered = thread_inner.flush();
                debug!("append batcher stopped after final flush of {} chunks", delivered);
            })?;

        Ok(Self {
            inner,
            shutdown: Mutex::new(Some(shutdown_tx)),
            flush_thread: Mutex::new(Some(flush_thread)),
        })
    }

    pub fn append(&self, note_id: &str, paragraph_id: &str, index: usize, data: &str) {
        self.inner
            .append(AppendKey::new(note_id, paragraph_id, index), data);
    }

    /// Delivers everything pending now, on the calling thread. Returns the
    /// number of chunks delivered.
    pub fn flush(&self) -> usize {
        self.inner.flush()
    }

    /// Stops the flush thread after one last flush. Later calls do nothing.
    pub fn shutdown(&self) {
        if let Some(shutdown) = take_slot(&self.shutdown) {
            // a disconnected channel also wakes the select
            let _ = shutdown.send(());
        }
        if let Some(flush_thread) = take_slot(&self.flush_thread) {
            if flush_thread.join().is_err() {
                error!("append flush thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        match self.flush_thread.lock() {
            Ok(flush_thread) => flush_thread.is_some(),
            Err(_) => false,
        }
    }
}

fn take_slot<T>(slot: &Mutex<Option<T>>) -> Option<T> {
    match slot.lock() {
        Ok(mut slot) => slot.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    }
}

impl Drop for AppendBatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
