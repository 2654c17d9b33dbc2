//! Buffer identity and descriptions.
//!
//! The arbitration layer never looks at pixel data, only at identity, size and
//! format, which is all the [`Buffer`] trait exposes. Buffers are always
//! passed around as [`SharedBuffer`] handles; the number of live handles is the
//! buffer's outstanding reference count.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The client a buffer was submitted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl ClientId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Process-wide buffer identity.
///
/// Two buffers with identical content still have distinct ids. Wrappers such as
/// [`crate::TrackedBuffer`] report the id of the buffer they decorate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(u64);

impl BufferId {
    /// Creates a new, process-wide unique `BufferId`.
    pub fn new_unique() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        BufferId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value of this id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer#{}", self.0)
    }
}

/// Where a buffer's storage lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferType {
    /// `wl_shm` pool memory.
    Shm,
    /// dmabuf file descriptors.
    DmaBuf,
    /// Texture owned by the renderer.
    GpuTexture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferFormat {
    Argb8888,
    Xrgb8888,
    /// Two planes: Y, then interleaved UV.
    Nv12,
}

/// A producer-owned buffer as seen by the compositor.
///
/// Implementations must be cheap to query and safe to share between the producer,
/// every output's render thread and snapshot readers.
pub trait Buffer: fmt::Debug + Send + Sync {
    /// Stable identity of the buffer.
    fn id(&self) -> BufferId;

    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// Pixel format of the buffer contents.
    fn format(&self) -> BufferFormat;
}

/// A shared owning handle to a buffer.
///
/// Cloning the handle is how a buffer is handed out; dropping it is how it is
/// released. A buffer is destroyed when its last handle goes away.
pub type SharedBuffer = Arc<dyn Buffer>;

/// Returns `true` if both handles refer to the same buffer identity.
pub fn same_buffer(a: &SharedBuffer, b: &SharedBuffer) -> bool {
    a.id() == b.id()
}

/// Description of a client buffer: storage kind, geometry and owner.
///
/// This is the plain [`Buffer`] implementation used for client submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDetails {
    pub id: BufferId,
    pub buffer_type: BufferType,
    pub width: u32,
    pub height: u32,
    /// Bytes per row.
    pub stride: u32,
    pub format: BufferFormat,
    /// `None` for compositor-internal buffers.
    pub client_owner_id: Option<ClientId>,
}

impl BufferDetails {
    /// Describes a new buffer under a fresh [`BufferId`]. `width` and `height` must
    /// be non-zero.
    pub fn new(
        buffer_type: BufferType,
        width: u32,
        height: u32,
        stride: u32,
        format: BufferFormat,
        client_owner_id: Option<ClientId>,
    ) -> Self {
        debug_assert!(width > 0 && height > 0, "zero-sized buffer {width}x{height}");

        Self {
            id: BufferId::new_unique(),
            buffer_type,
            width,
            height,
            stride,
            format,
            client_owner_id,
        }
    }

    /// Moves the description into a shared handle.
    pub fn into_shared(self) -> SharedBuffer {
        Arc::new(self)
    }
}

impl Buffer for BufferDetails {
    fn id(&self) -> BufferId {
        self.id
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn format(&self) -> BufferFormat {
        self.format
    }
}
