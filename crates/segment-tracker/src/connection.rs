// Connection seam: turns a resolved chunk request into an opaque fetch handle.
//
// The tracker never performs I/O. It asks a connection manager to create a
// handle and hands that handle to its caller, which drives the actual
// transfer and cancels it if the chunk is discarded.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(test)]
use mockall::automock;

use crate::TrackId;
use crate::playlist::SegmentDescriptor;

/// Which part of a representation a chunk carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    /// One-time initialization data (e.g. `moov`)
    Init,
    /// Out-of-band index (e.g. `sidx`)
    Index,
    Media,
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::Index => "index",
            Self::Media => "media",
        };
        f.write_str(s)
    }
}

/// Everything a connection manager needs to set up a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRequest {
    pub track: TrackId,
    pub representation_id: String,
    pub kind: ChunkKind,
    /// Media segment number the chunk belongs to
    pub sequence: u64,
    pub descriptor: SegmentDescriptor,
    /// Declared bandwidth of the representation in bits per second
    pub bandwidth: u64,
}

/// Opaque handle to a fetch that has been created but not executed.
pub trait FetchHandle: Send + fmt::Debug {
    fn request(&self) -> &ChunkRequest;
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("no connection can serve `{uri}`")]
    Unroutable { uri: String },

    #[error("connection manager is closed")]
    Closed,

    #[error("connection temporarily unavailable: {reason}")]
    Unavailable { reason: String },

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl ConnectionError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Creates fetch handles for chunk requests.
#[cfg_attr(test, automock)]
pub trait ConnectionManager: Send + Sync {
    fn create_fetch(&self, request: ChunkRequest) -> Result<Box<dyn FetchHandle>, ConnectionError>;
}

/// Handle produced by [`DeferredConnectionManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    id: u64,
    request: ChunkRequest,
}

impl PendingFetch {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl FetchHandle for PendingFetch {
    fn request(&self) -> &ChunkRequest {
        &self.request
    }
}

/// Connection manager that only records requests; the caller executes them.
#[derive(Debug, Default)]
pub struct DeferredConnectionManager {
    next_id: AtomicU64,
}

impl DeferredConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles created so far.
    pub fn created(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }
}

impl ConnectionManager for DeferredConnectionManager {
    fn create_fetch(&self, request: ChunkRequest) -> Result<Box<dyn FetchHandle>, ConnectionError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(PendingFetch { id, request }))
    }
}
