//! Buffers that report when their last handle is dropped.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::buffer::{Buffer, BufferFormat, BufferId, SharedBuffer};

/// Callback invoked once with the buffer's id when a [`TrackedBuffer`] is destroyed.
pub type ReleaseHook = Box<dyn FnOnce(BufferId) + Send + 'static>;

/// Decorates a buffer with a release hook.
///
/// The wrapper forwards identity, size and format to the decorated buffer. When the
/// last [`SharedBuffer`] handle to the wrapper is dropped, the hook runs exactly once.
/// This is the recycling signal the producer side listens for.
pub struct TrackedBuffer {
    inner: SharedBuffer,
    on_release: Mutex<Option<ReleaseHook>>,
}

impl TrackedBuffer {
    /// Wraps `inner` so that `on_release` fires when the returned handle and all its
    /// clones are gone.
    pub fn wrap<F>(inner: SharedBuffer, on_release: F) -> SharedBuffer
    where
        F: FnOnce(BufferId) + Send + 'static,
    {
        Arc::new(Self {
            inner,
            on_release: Mutex::new(Some(Box::new(on_release))),
        })
    }
}

impl Buffer for TrackedBuffer {
    fn id(&self) -> BufferId {
        self.inner.id()
    }

    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }

    fn format(&self) -> BufferFormat {
        self.inner.format()
    }
}

impl fmt::Debug for TrackedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedBuffer")
            .field("inner", &self.inner)
            .field("armed", &self.on_release.lock().is_some())
            .finish()
    }
}

impl Drop for TrackedBuffer {
    fn drop(&mut self) {
        if let Some(hook) = self.on_release.get_mut().take() {
            let id = self.inner.id();
            trace!(%id, "last handle dropped, running release hook");
            hook(id);
        }
    }
}
