//! # Novade Buffer Manager
//!
//! This crate provides the buffer data model shared by the Novade compositor's
//! producer and consumer sides: buffer identity, the [`Buffer`] trait, shared
//! handles, and the [`TrackedBuffer`] wrapper whose release hook is the signal
//! that a buffer can be recycled back to its client.
//!
//! [`BufferManager`] sits on the producer side. It registers client buffers,
//! hands out tracked handles, and reports each buffer once its last handle has
//! been dropped anywhere in the compositor.

pub mod buffer;
pub mod manager;
pub mod tracked;

// Re-export key types for convenience.
pub use buffer::{
    same_buffer, Buffer, BufferDetails, BufferFormat, BufferId, BufferType, ClientId, SharedBuffer,
};
pub use manager::{BufferManager, ReleasedBuffer};
pub use tracked::{ReleaseHook, TrackedBuffer};
