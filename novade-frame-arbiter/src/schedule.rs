//! Producer-fed queues of buffers awaiting display.
//!
//! A [`Schedule`] belongs to a single producer. It keeps buffers in the order they
//! were submitted and hands them to the arbiter one at a time. It knows nothing about
//! consumers.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use novade_buffer_manager::{BufferId, SharedBuffer};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace};

use crate::config::ScheduleConfig;
use crate::error::{ConfigError, ScheduleError};

/// An ordered backlog of buffers from one producer.
///
/// Implementations never reorder or drop buffers: [`Schedule::next_buffer`] returns
/// them in exactly the order they were scheduled.
pub trait Schedule: Send + Sync {
    /// Enqueues `buffer`, blocking the caller while a backlog limit is exceeded.
    fn schedule(&self, buffer: SharedBuffer) -> Result<(), ScheduleError>;

    /// Enqueues `buffer` without ever blocking.
    ///
    /// The returned completion resolves once the buffer has been taken off the front
    /// of the schedule.
    fn schedule_nonblocking(&self, buffer: SharedBuffer) -> Result<ScheduleCompletion, ScheduleError>;

    /// Number of buffers scheduled but not yet taken.
    fn num_scheduled(&self) -> usize;

    /// Takes the oldest scheduled buffer.
    ///
    /// Fails with [`ScheduleError::Underflow`] when nothing is scheduled.
    fn next_buffer(&self) -> Result<SharedBuffer, ScheduleError>;
}

/// Resolves when a buffer passed to [`Schedule::schedule_nonblocking`] is consumed.
#[derive(Debug)]
#[must_use = "dropping the completion loses the consumption notification"]
pub struct ScheduleCompletion {
    id: BufferId,
    consumed: oneshot::Receiver<()>,
}

impl ScheduleCompletion {
    fn new(id: BufferId) -> (oneshot::Sender<()>, Self) {
        let (tx, consumed) = oneshot::channel();
        (tx, Self { id, consumed })
    }

    /// The buffer this completion belongs to.
    pub fn buffer_id(&self) -> BufferId {
        self.id
    }

    /// Blocks the current thread until the buffer is consumed.
    pub fn wait(self) -> Result<(), ScheduleError> {
        futures::executor::block_on(self)
    }
}

impl Future for ScheduleCompletion {
    type Output = Result<(), ScheduleError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let id = self.id;
        Pin::new(&mut self.consumed)
            .poll(cx)
            .map(|res| res.map_err(|_| ScheduleError::Discarded(id)))
    }
}

struct Pending {
    buffer: SharedBuffer,
    consumed: Option<oneshot::Sender<()>>,
}

/// First-in, first-out [`Schedule`].
///
/// With a backlog limit, [`Schedule::schedule`] waits for the consumer side to take
/// buffers before enqueueing more. [`Schedule::schedule_nonblocking`] ignores the
/// limit; enqueueing never fails for capacity reasons.
pub struct QueueingSchedule {
    queue: Mutex<VecDeque<Pending>>,
    space_available: Condvar,
    backlog_limit: Option<usize>,
}

impl Default for QueueingSchedule {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueingSchedule {
    /// Creates an unbounded schedule.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            space_available: Condvar::new(),
            backlog_limit: None,
        }
    }

    /// Creates a schedule whose blocking push waits while `limit` buffers are queued.
    ///
    /// # Panics
    /// In debug builds if `limit` is zero. Release builds treat zero as one.
    pub fn with_backlog_limit(limit: usize) -> Self {
        debug_assert!(limit > 0, "backlog limit must be positive");
        Self {
            queue: Mutex::new(VecDeque::new()),
            space_available: Condvar::new(),
            backlog_limit: Some(limit.max(1)),
        }
    }

    /// Creates a schedule from the `[schedule]` configuration section.
    ///
    /// # Arguments
    /// * `config`: The section, validated or not.
    ///
    /// # Returns
    /// The schedule, or `ConfigError::Validation` if `backlog_limit` is zero.
    pub fn from_config(config: &ScheduleConfig) -> Result<Self, ConfigError> {
        match config.backlog_limit {
            Some(0) => Err(ConfigError::Validation(
                "schedule.backlog_limit must be at least 1".to_string(),
            )),
            Some(limit) => Ok(Self::with_backlog_limit(limit)),
            None => Ok(Self::new()),
        }
    }

    /// The bound applied by [`Schedule::schedule`], `None` when unbounded.
    pub fn backlog_limit(&self) -> Option<usize> {
        self.backlog_limit
    }

    fn check_not_queued(queue: &VecDeque<Pending>, id: BufferId) -> Result<(), ScheduleError> {
        if queue.iter().any(|p| p.buffer.id() == id) {
            return Err(ScheduleError::AlreadyScheduled(id));
        }
        Ok(())
    }
}

impl Schedule for QueueingSchedule {
    fn schedule(&self, buffer: SharedBuffer) -> Result<(), ScheduleError> {
        let id = buffer.id();
        let mut queue = self.queue.lock();
        loop {
            // Re-checked after every wake: another producer may have queued the
            // same buffer while this one waited.
            Self::check_not_queued(&queue, id)?;
            match self.backlog_limit {
                Some(limit) if queue.len() >= limit => {
                    trace!(%id, backlog = queue.len(), "backlog full, producer waiting");
                    self.space_available.wait(&mut queue);
                }
                _ => break,
            }
        }

        queue.push_back(Pending { buffer, consumed: None });
        trace!(%id, backlog = queue.len(), "buffer scheduled");
        Ok(())
    }

    fn schedule_nonblocking(&self, buffer: SharedBuffer) -> Result<ScheduleCompletion, ScheduleError> {
        let id = buffer.id();
        let mut queue = self.queue.lock();
        Self::check_not_queued(&queue, id)?;

        let (tx, completion) = ScheduleCompletion::new(id);
        queue.push_back(Pending { buffer, consumed: Some(tx) });
        trace!(%id, backlog = queue.len(), "buffer scheduled without blocking");
        Ok(completion)
    }

    fn num_scheduled(&self) -> usize {
        self.queue.lock().len()
    }

    fn next_buffer(&self) -> Result<SharedBuffer, ScheduleError> {
        let pending = {
            let mut queue = self.queue.lock();
            let pending = queue.pop_front().ok_or(ScheduleError::Underflow)?;
            // A woken producer may fail its re-check, so wake them all.
            self.space_available.notify_all();
            pending
        };

        if let Some(tx) = pending.consumed {
            // The producer may have dropped its completion; that's fine.
            let _ = tx.send(());
        }
        Ok(pending.buffer)
    }
}

impl Drop for QueueingSchedule {
    fn drop(&mut self) {
        let leftover = self.queue.get_mut().len();
        if leftover > 0 {
            debug!(leftover, "schedule dropped with buffers still queued");
        }
    }
}
