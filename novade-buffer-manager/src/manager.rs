//! Producer-side bookkeeping for submitted buffers.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::buffer::{BufferDetails, BufferFormat, BufferId, BufferType, ClientId, SharedBuffer};
use crate::tracked::TrackedBuffer;

/// A buffer whose last handle was dropped, ready to be handed back to its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleasedBuffer {
    /// Id of the released buffer.
    pub id: BufferId,
    /// The client that submitted it, if known.
    pub client_owner_id: Option<ClientId>,
}

/// Tracks buffers handed to the compositor on behalf of clients.
///
/// Every registered buffer is returned as a [`TrackedBuffer`] handle. When the last
/// handle anywhere in the compositor is dropped, the release hook queues the id and
/// the next [`BufferManager::drain_released`] reports it. The manager itself holds
/// only descriptions, never handles, so it can't keep a buffer alive.
pub struct BufferManager {
    buffers: Mutex<HashMap<BufferId, BufferDetails>>,
    released_tx: Sender<BufferId>,
    released_rx: Receiver<BufferId>,
}

impl Default for BufferManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferManager {
    /// Creates a new, empty `BufferManager`.
    pub fn new() -> Self {
        let (released_tx, released_rx) = unbounded();
        Self {
            buffers: Mutex::new(HashMap::new()),
            released_tx,
            released_rx,
        }
    }

    /// Registers a new buffer and returns the handle to push into a schedule.
    ///
    /// This typically corresponds to a client attaching and committing a buffer.
    pub fn register_buffer(
        &self,
        buffer_type: BufferType,
        width: u32,
        height: u32,
        stride: u32,
        format: BufferFormat,
        client_owner_id: Option<ClientId>,
    ) -> SharedBuffer {
        let details = BufferDetails::new(buffer_type, width, height, stride, format, client_owner_id);
        let id = details.id;
        self.buffers.lock().insert(id, details.clone());
        debug!(%id, width, height, "registered buffer");

        let tx = self.released_tx.clone();
        TrackedBuffer::wrap(details.into_shared(), move |id| {
            if tx.send(id).is_err() {
                trace!(%id, "buffer manager gone, dropping release notification");
            }
        })
    }

    /// Retrieves the description of a buffer that has not been released yet.
    pub fn get_buffer_details(&self, id: BufferId) -> Option<BufferDetails> {
        self.buffers.lock().get(&id).cloned()
    }

    /// Number of registered buffers that have not been reported as released.
    pub fn outstanding_buffers(&self) -> usize {
        self.buffers.lock().len()
    }

    /// Returns every buffer released since the last call, each exactly once.
    pub fn drain_released(&self) -> Vec<ReleasedBuffer> {
        let ids: Vec<BufferId> = self.released_rx.try_iter().collect();
        ids.into_iter().filter_map(|id| self.retire(id)).collect()
    }

    /// Waits up to `timeout` for the next released buffer.
    ///
    /// Producers with a fixed number of buffers use this to block until a slot frees up.
    pub fn wait_released(&self, timeout: Duration) -> Option<ReleasedBuffer> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.released_rx.recv_deadline(deadline) {
                Ok(id) => {
                    if let Some(released) = self.retire(id) {
                        return Some(released);
                    }
                }
                Err(RecvTimeoutError::Timeout) => return None,
                // The manager owns a sender, so the channel can't disconnect while we hold `self`.
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn retire(&self, id: BufferId) -> Option<ReleasedBuffer> {
        match self.buffers.lock().remove(&id) {
            Some(details) => {
                debug!(%id, "buffer released back to producer");
                Some(ReleasedBuffer {
                    id,
                    client_owner_id: details.client_owner_id,
                })
            }
            None => {
                warn!(%id, "release notification for unknown buffer");
                None
            }
        }
    }
}
