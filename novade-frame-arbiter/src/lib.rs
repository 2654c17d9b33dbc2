//! # Novade Frame Arbiter
//!
//! Decides which client buffer each output sees next and when a buffer can go
//! back to its client.
//!
//! - [`Schedule`] / [`QueueingSchedule`]: a producer's ordered backlog of buffers,
//!   with a blocking push (bounded backlog) and a non-blocking push that reports
//!   when the buffer is consumed.
//! - [`MultiMonitorArbiter`]: the multi-consumer front end. Outputs acquire with a
//!   stable [`ConsumerId`]; the fastest output advances the schedule and the others
//!   catch up. Snapshot readers get the current buffer without affecting anyone.
//! - [`FrameStream`]: a schedule and an arbiter wired together for one surface.
//!
//! Recycling is driven by reference counts. Wrap buffers in
//! [`novade_buffer_manager::TrackedBuffer`] (or register them with a
//! [`novade_buffer_manager::BufferManager`]) to learn when one is free again.
//!
//! ```
//! use std::sync::Arc;
//! use novade_buffer_manager::{BufferDetails, BufferFormat, BufferType};
//! use novade_frame_arbiter::{ConsumerId, MultiMonitorArbiter, QueueingSchedule, Schedule};
//!
//! let schedule = Arc::new(QueueingSchedule::new());
//! let arbiter = MultiMonitorArbiter::new(schedule.clone());
//!
//! let frame = BufferDetails::new(BufferType::Shm, 64, 64, 256, BufferFormat::Argb8888, None)
//!     .into_shared();
//! let id = frame.id();
//! schedule.schedule(frame).unwrap();
//!
//! let left = ConsumerId::new(1);
//! let right = ConsumerId::new(2);
//! assert_eq!(arbiter.compositor_acquire(left).unwrap().id(), id);
//! assert_eq!(arbiter.compositor_acquire(right).unwrap().id(), id);
//! assert!(!arbiter.buffer_ready_for(left));
//! ```

pub mod arbiter;
pub mod config;
pub mod consumer;
pub mod error;
pub mod logging;
pub mod schedule;
pub mod stream;

pub use arbiter::MultiMonitorArbiter;
pub use config::{FrameArbiterConfig, LoggingConfig, ScheduleConfig};
pub use consumer::{ConsumerId, ConsumerRegistry};
pub use error::{ArbiterError, ConfigError, FrameArbiterError, ScheduleError};
pub use logging::{init_minimal_logging, initialize_logging};
pub use schedule::{QueueingSchedule, Schedule, ScheduleCompletion};
pub use stream::FrameStream;
