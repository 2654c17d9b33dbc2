//! Hands buffers from one schedule to several compositors and snapshot readers.
//!
//! The fastest compositor pulls the schedule forward; slower compositors catch up
//! to whatever is current. Every consumer that keeps pace sees every scheduled
//! buffer exactly once and in order, no consumer ever waits for another one, and
//! the producer never waits for consumers.
//!
//! Handles returned by the acquire calls are ordinary [`SharedBuffer`]s. Releasing
//! is dropping the handle, so a consumer that unwinds still gives its reference
//! back. A buffer is destroyed (and recycled by its producer) once it is no longer
//! current and every handle to it is gone, in whichever order that happens.

use std::sync::Arc;

use novade_buffer_manager::{BufferId, SharedBuffer};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::consumer::{ConsumerId, ConsumerRegistry};
use crate::error::{ArbiterError, ScheduleError};
use crate::schedule::Schedule;

struct ArbiterState {
    schedule: Arc<dyn Schedule>,
    current: Option<SharedBuffer>,
    seen: ConsumerRegistry,
}

enum Advance {
    /// A new buffer became current. Holds the buffer it replaced, which must be
    /// dropped after the state lock is released.
    Advanced(Option<SharedBuffer>),
    NothingScheduled,
}

impl ArbiterState {
    fn try_advance(&mut self, advanced_by: Option<ConsumerId>) -> Advance {
        if self.schedule.num_scheduled() == 0 {
            return Advance::NothingScheduled;
        }

        let next = match self.schedule.next_buffer() {
            Ok(next) => next,
            Err(ScheduleError::Underflow) => return Advance::NothingScheduled,
            Err(e) => {
                warn!(error = %e, "schedule failed to produce a buffer, keeping current");
                return Advance::NothingScheduled;
            }
        };

        debug!(
            next = %next.id(),
            previous = ?self.current.as_ref().map(|b| b.id()),
            consumer = ?advanced_by,
            "advancing schedule"
        );
        let superseded = self.current.replace(next);
        self.seen.start_slot(advanced_by);
        Advance::Advanced(superseded)
    }
}

/// Multi-consumer front end over a [`Schedule`].
///
/// All state transitions happen under one lock, so every operation is linearizable
/// with respect to every other operation on the same arbiter.
pub struct MultiMonitorArbiter {
    state: Mutex<ArbiterState>,
}

impl MultiMonitorArbiter {
    /// Creates an arbiter over `schedule` with no current buffer.
    ///
    /// Nothing is taken from the schedule until a consumer acquires or
    /// [`Self::advance_schedule`] is called.
    pub fn new(schedule: Arc<dyn Schedule>) -> Self {
        Self {
            state: Mutex::new(ArbiterState {
                schedule,
                current: None,
                seen: ConsumerRegistry::new(),
            }),
        }
    }

    /// Returns the buffer `consumer` should render this frame.
    ///
    /// A consumer that hasn't seen the current buffer gets it. A consumer that has
    /// advances the schedule if something newer is queued, and otherwise gets the
    /// current buffer again.
    ///
    /// # Errors
    /// [`ArbiterError::NoBufferAvailable`] if nothing has ever been current and the
    /// schedule is empty. The arbiter is left untouched.
    pub fn compositor_acquire(&self, consumer: ConsumerId) -> Result<SharedBuffer, ArbiterError> {
        let (buffer, superseded) = {
            let mut state = self.state.lock();
            let superseded = if state.current.is_none() {
                match state.try_advance(Some(consumer)) {
                    Advance::Advanced(superseded) => superseded,
                    Advance::NothingScheduled => {
                        warn!(%consumer, "compositor acquire before any buffer was scheduled");
                        return Err(ArbiterError::NoBufferAvailable);
                    }
                }
            } else if !state.seen.has_seen(consumer) {
                state.seen.mark_seen(consumer);
                None
            } else {
                match state.try_advance(Some(consumer)) {
                    Advance::Advanced(superseded) => superseded,
                    Advance::NothingScheduled => None,
                }
            };

            let buffer = state.current.clone().ok_or(ArbiterError::NoBufferAvailable)?;
            (buffer, superseded)
        };
        drop(superseded);

        trace!(%consumer, buffer = %buffer.id(), "compositor acquired");
        Ok(buffer)
    }

    /// Gives back a handle obtained from [`Self::compositor_acquire`].
    ///
    /// Equivalent to dropping it.
    pub fn compositor_release(&self, buffer: SharedBuffer) {
        trace!(buffer = %buffer.id(), "compositor released");
        drop(buffer);
    }

    /// Whether [`Self::compositor_acquire`] would currently give `consumer` a buffer
    /// it hasn't seen yet.
    pub fn buffer_ready_for(&self, consumer: ConsumerId) -> bool {
        let state = self.state.lock();
        if state.schedule.num_scheduled() > 0 {
            return true;
        }
        state.current.is_some() && !state.seen.has_seen(consumer)
    }

    /// Returns the current buffer without advancing or touching any consumer's
    /// progress.
    ///
    /// # Errors
    /// [`ArbiterError::NoBufferAvailable`] if no buffer has become current yet.
    pub fn snapshot_acquire(&self) -> Result<SharedBuffer, ArbiterError> {
        let state = self.state.lock();
        match &state.current {
            Some(buffer) => {
                trace!(buffer = %buffer.id(), "snapshot acquired");
                Ok(Arc::clone(buffer))
            }
            None => {
                warn!("snapshot requested before any buffer was current");
                Err(ArbiterError::NoBufferAvailable)
            }
        }
    }

    /// Gives back a handle obtained from [`Self::snapshot_acquire`].
    pub fn snapshot_release(&self, buffer: SharedBuffer) {
        trace!(buffer = %buffer.id(), "snapshot released");
        drop(buffer);
    }

    /// Makes the next scheduled buffer current, if there is one.
    ///
    /// Nobody is marked as having seen the new buffer.
    pub fn advance_schedule(&self) {
        let superseded = {
            let mut state = self.state.lock();
            match state.try_advance(None) {
                Advance::Advanced(superseded) => superseded,
                Advance::NothingScheduled => None,
            }
        };
        drop(superseded);
    }

    /// Makes the newest scheduled buffer current, skipping everything queued before it.
    ///
    /// The whole skip happens under one lock, so no consumer is handed an
    /// intermediate frame. Buffers queued after the call starts are left for later.
    /// Returns the number of buffers taken off the schedule.
    pub fn advance_to_newest(&self) -> usize {
        let (advanced, superseded) = {
            let mut state = self.state.lock();
            let stale = state.schedule.num_scheduled();
            let mut advanced = 0;
            let mut superseded = Vec::with_capacity(stale);
            while advanced < stale {
                match state.try_advance(None) {
                    Advance::Advanced(previous) => superseded.extend(previous),
                    Advance::NothingScheduled => break,
                }
                advanced += 1;
            }
            if advanced > 0 {
                debug!(
                    advanced,
                    current = ?state.current.as_ref().map(|b| b.id()),
                    "skipped to newest buffer"
                );
            }
            (advanced, superseded)
        };
        drop(superseded);
        advanced
    }

    /// Replaces the schedule future advances pull from.
    ///
    /// The current buffer and consumer progress are kept.
    pub fn set_schedule(&self, schedule: Arc<dyn Schedule>) {
        let previous = {
            let mut state = self.state.lock();
            debug!(
                pending_in_previous = state.schedule.num_scheduled(),
                pending_in_new = schedule.num_scheduled(),
                "replacing schedule"
            );
            std::mem::replace(&mut state.schedule, schedule)
        };
        drop(previous);
    }

    /// Whether a buffer is current or waiting in the schedule.
    pub fn has_buffer(&self) -> bool {
        let state = self.state.lock();
        state.current.is_some() || state.schedule.num_scheduled() > 0
    }

    /// Id of the current buffer, if any.
    pub fn current_buffer_id(&self) -> Option<BufferId> {
        self.state.lock().current.as_ref().map(|b| b.id())
    }

    /// Number of times the current buffer has been replaced.
    pub fn frame_generation(&self) -> u64 {
        self.state.lock().seen.generation()
    }
}

impl Drop for MultiMonitorArbiter {
    fn drop(&mut self) {
        if let Some(current) = self.state.get_mut().current.take() {
            debug!(buffer = %current.id(), "arbiter dropped, releasing current buffer");
            drop(current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::QueueingSchedule;
    use novade_buffer_manager::{BufferDetails, BufferFormat, BufferType};
    use pretty_assertions::assert_eq;

    const A: ConsumerId = ConsumerId::new(1);
    const B: ConsumerId = ConsumerId::new(2);

    fn buffer() -> SharedBuffer {
        BufferDetails::new(BufferType::Shm, 4, 4, 16, BufferFormat::Xrgb8888, None).into_shared()
    }

    fn setup(count: usize) -> (Arc<QueueingSchedule>, MultiMonitorArbiter, Vec<BufferId>) {
        let schedule = Arc::new(QueueingSchedule::new());
        let mut ids = Vec::new();
        for _ in 0..count {
            let b = buffer();
            ids.push(b.id());
            schedule.schedule(b).unwrap();
        }
        let arbiter = MultiMonitorArbiter::new(schedule.clone());
        (schedule, arbiter, ids)
    }

    #[test]
    fn test_single_consumer_sees_push_order_then_repeats() {
        let (_schedule, arbiter, ids) = setup(3);
        let got: Vec<BufferId> = (0..5).map(|_| arbiter.compositor_acquire(A).unwrap().id()).collect();
        assert_eq!(got, vec![ids[0], ids[1], ids[2], ids[2], ids[2]]);
    }

    #[test]
    fn test_failed_acquire_leaves_state_untouched() {
        let (schedule, arbiter, _) = setup(0);
        assert_eq!(arbiter.compositor_acquire(A).unwrap_err(), ArbiterError::NoBufferAvailable);
        assert_eq!(arbiter.current_buffer_id(), None);
        assert_eq!(arbiter.frame_generation(), 0);

        let b = buffer();
        let id = b.id();
        schedule.schedule(b).unwrap();
        assert_eq!(arbiter.compositor_acquire(A).unwrap().id(), id);
    }

    #[test]
    fn test_second_consumer_catches_up_without_advancing() {
        let (schedule, arbiter, ids) = setup(2);
        assert_eq!(arbiter.compositor_acquire(A).unwrap().id(), ids[0]);
        assert_eq!(arbiter.compositor_acquire(A).unwrap().id(), ids[1]);
        assert_eq!(arbiter.compositor_acquire(B).unwrap().id(), ids[1]);
        assert_eq!(schedule.num_scheduled(), 0);
        assert_eq!(arbiter.frame_generation(), 2);
    }

    #[test]
    fn test_ready_state() {
        let (schedule, arbiter, _) = setup(0);
        assert!(!arbiter.buffer_ready_for(A), "nothing to acquire yet");

        schedule.schedule(buffer()).unwrap();
        assert!(arbiter.buffer_ready_for(A));

        let _held = arbiter.compositor_acquire(A).unwrap();
        assert!(!arbiter.buffer_ready_for(A));
        assert!(arbiter.buffer_ready_for(B));
    }

    #[test]
    fn test_snapshot_is_read_only() {
        let (schedule, arbiter, ids) = setup(2);
        assert_eq!(arbiter.snapshot_acquire().unwrap_err(), ArbiterError::NoBufferAvailable);

        let first = arbiter.compositor_acquire(A).unwrap();
        for _ in 0..4 {
            let snap = arbiter.snapshot_acquire().unwrap();
            assert_eq!(snap.id(), first.id());
            arbiter.snapshot_release(snap);
        }
        assert_eq!(schedule.num_scheduled(), 1);
        assert_eq!(arbiter.compositor_acquire(B).unwrap().id(), ids[0]);
    }

    #[test]
    fn test_advance_marks_nobody_seen() {
        let (_schedule, arbiter, ids) = setup(2);
        arbiter.advance_schedule();
        assert_eq!(arbiter.current_buffer_id(), Some(ids[0]));
        assert_eq!(arbiter.compositor_acquire(A).unwrap().id(), ids[0]);

        arbiter.advance_schedule();
        arbiter.advance_schedule();
        assert_eq!(arbiter.current_buffer_id(), Some(ids[1]));
    }

    #[test]
    fn test_set_schedule_keeps_current() {
        let (_schedule, arbiter, ids) = setup(1);
        assert_eq!(arbiter.compositor_acquire(A).unwrap().id(), ids[0]);

        let replacement = Arc::new(QueueingSchedule::new());
        let b = buffer();
        let new_id = b.id();
        replacement.schedule(b).unwrap();
        arbiter.set_schedule(replacement);

        assert_eq!(arbiter.current_buffer_id(), Some(ids[0]));
        assert_eq!(arbiter.compositor_acquire(B).unwrap().id(), ids[0]);
        assert_eq!(arbiter.compositor_acquire(A).unwrap().id(), new_id);
    }

    #[test]
    fn test_advance_to_newest_skips_in_one_step() {
        let (schedule, arbiter, ids) = setup(4);
        assert_eq!(arbiter.compositor_acquire(A).unwrap().id(), ids[0]);

        assert_eq!(arbiter.advance_to_newest(), 3);
        assert_eq!(schedule.num_scheduled(), 0);
        assert_eq!(arbiter.current_buffer_id(), Some(ids[3]));
        assert_eq!(arbiter.frame_generation(), 4);

        // Nobody has seen the newest buffer yet.
        assert!(arbiter.buffer_ready_for(A));
        assert_eq!(arbiter.compositor_acquire(B).unwrap().id(), ids[3]);
        assert_eq!(arbiter.compositor_acquire(A).unwrap().id(), ids[3]);
    }

    #[test]
    fn test_advance_to_newest_on_empty_schedule() {
        let (_schedule, arbiter, _ids) = setup(0);
        assert_eq!(arbiter.advance_to_newest(), 0);
        assert_eq!(arbiter.current_buffer_id(), None);
        assert_eq!(arbiter.frame_generation(), 0);
    }
}
