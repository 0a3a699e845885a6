//! Buffer handles and renderable sources for the blob cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;

/// Allocation/release accounting shared by the handles of one cache.
///
/// A handle is exclusively owned by a single cache instance; the tracker
/// only exists so the exactly-once release invariant is observable:
/// `allocated() - released()` must stay in `{0, 1}` at all times.
#[derive(Debug, Clone, Default)]
pub struct HandleTracker {
    inner: Arc<TrackerInner>,
}

#[derive(Debug, Default)]
struct TrackerInner {
    allocated: AtomicU64,
    released: AtomicU64,
}

impl HandleTracker {
    /// Creates a fresh tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a payload in a new tracked handle.
    #[must_use]
    pub fn allocate(&self, bytes: Bytes) -> BufferHandle {
        self.inner.allocated.fetch_add(1, Ordering::SeqCst);
        let uri = buffer_uri(&bytes);
        BufferHandle {
            bytes,
            uri,
            tracker: self.clone(),
        }
    }

    /// Total handles ever allocated.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.inner.allocated.load(Ordering::SeqCst)
    }

    /// Total handles released.
    #[must_use]
    pub fn released(&self) -> u64 {
        self.inner.released.load(Ordering::SeqCst)
    }

    /// Handles currently alive.
    #[must_use]
    pub fn live(&self) -> u64 {
        self.allocated() - self.released()
    }

    fn record_release(&self) {
        self.inner.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Exclusive ownership of an in-memory binary buffer.
///
/// The buffer is released exactly once, when the handle is dropped. Handles
/// are never shared across cache instances.
#[derive(Debug)]
pub struct BufferHandle {
    bytes: Bytes,
    uri: String,
    tracker: HandleTracker,
}

impl BufferHandle {
    /// The buffered payload.
    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Stable `mem://` URI derived from the payload content.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for an empty payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Drop for BufferHandle {
    fn drop(&mut self) {
        self.tracker.record_release();
    }
}

fn buffer_uri(bytes: &Bytes) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    format!("mem://{}", hex::encode(&digest[..16]))
}

/// What a consumer should actually render for a cache entry.
#[derive(Debug)]
pub enum RenderableSource {
    /// An owned in-memory buffer produced by a proxied fetch.
    Buffer(BufferHandle),
    /// A URL to render directly (local mirror or public asset), no fetch.
    Direct(String),
}

impl RenderableSource {
    /// URI or URL suitable for the presentation layer.
    #[must_use]
    pub fn uri(&self) -> &str {
        match self {
            Self::Buffer(handle) => handle.uri(),
            Self::Direct(url) => url,
        }
    }

    /// Buffered payload, when this source owns one.
    #[must_use]
    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Buffer(handle) => Some(handle.bytes()),
            Self::Direct(_) => None,
        }
    }
}

/// Origin classification surfaced by the debug overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOrigin {
    /// Served from the same-origin mirror.
    Local,
    /// Served remotely (gateway or public URL).
    Remote,
}

impl std::fmt::Display for AssetOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}
