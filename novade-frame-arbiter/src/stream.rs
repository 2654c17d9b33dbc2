//! One client surface's frames, from submission to display.

use std::sync::Arc;

use novade_buffer_manager::SharedBuffer;
use crate::arbiter::MultiMonitorArbiter;
use crate::config::ScheduleConfig;
use crate::consumer::ConsumerId;
use crate::error::{ArbiterError, ConfigError, ScheduleError};
use crate::schedule::{QueueingSchedule, Schedule, ScheduleCompletion};

/// Pairs a producer's [`QueueingSchedule`] with the [`MultiMonitorArbiter`] that
/// every output and snapshot reader acquires from.
///
/// The producer side calls the `submit_*` methods; each output calls
/// [`FrameStream::lock_compositor_buffer`] once per repaint.
pub struct FrameStream {
    schedule: Arc<QueueingSchedule>,
    arbiter: MultiMonitorArbiter,
}

impl FrameStream {
    /// Creates a stream with an empty schedule built from `config`.
    ///
    /// # Errors
    /// `ConfigError::Validation` if the backlog limit is zero.
    pub fn new(config: &ScheduleConfig) -> Result<Self, ConfigError> {
        let schedule = Arc::new(QueueingSchedule::from_config(config)?);
        let arbiter = MultiMonitorArbiter::new(schedule.clone());
        Ok(Self { schedule, arbiter })
    }

    /// Queues a frame without blocking. The completion resolves once the frame
    /// has been taken off the queue for display.
    pub fn submit_buffer(&self, buffer: SharedBuffer) -> Result<ScheduleCompletion, ScheduleError> {
        self.schedule.schedule_nonblocking(buffer)
    }

    /// Queues a frame, waiting while the backlog limit is reached.
    pub fn submit_buffer_blocking(&self, buffer: SharedBuffer) -> Result<(), ScheduleError> {
        self.schedule.schedule(buffer)
    }

    /// The buffer `output` should composite this frame.
    pub fn lock_compositor_buffer(&self, output: ConsumerId) -> Result<SharedBuffer, ArbiterError> {
        self.arbiter.compositor_acquire(output)
    }

    /// Whether `output` has a frame it hasn't composited yet.
    pub fn frames_ready(&self, output: ConsumerId) -> bool {
        self.arbiter.buffer_ready_for(output)
    }

    /// The current frame for a screenshot or thumbnail.
    pub fn lock_snapshot_buffer(&self) -> Result<SharedBuffer, ArbiterError> {
        self.arbiter.snapshot_acquire()
    }

    /// Skips ahead to the newest frame queued so far.
    ///
    /// Frames skipped this way are never shown; they are released as soon as no
    /// one holds them. Returns how many frames were made current.
    pub fn drop_old_buffers(&self) -> usize {
        self.arbiter.advance_to_newest()
    }

    /// Frames submitted but not yet made current.
    pub fn queued_frames(&self) -> usize {
        self.schedule.num_scheduled()
    }

    /// Whether anything has been submitted that can be displayed.
    pub fn has_submitted_buffer(&self) -> bool {
        self.arbiter.has_buffer()
    }

    /// The arbiter behind this stream.
    pub fn arbiter(&self) -> &MultiMonitorArbiter {
        &self.arbiter
    }
}
