//! Adaptive-bitrate segment sequencing for a single media track.
//!
//! A [`SegmentTracker`] walks the segments of one track (an
//! [`AdaptationSet`]) and decides, chunk by chunk, which representation the
//! next chunk comes from. Quality selection and buffering targets are
//! injected as [`AdaptationLogic`] and [`BufferingLogic`]; fetch handles are
//! created through a [`ConnectionManager`]. State transitions are reported to
//! registered [`TrackerListener`]s.
//!
//! ```ignore
//! let set = Arc::new(AdaptationSet::new("video", TrackCategory::Video)
//!     .with_representation(low)
//!     .with_representation(high));
//! let mut tracker = SegmentTracker::new(
//!     SharedResources::default(),
//!     set,
//!     Arc::new(RateBasedLogic::new()),
//! );
//!
//! while let NextChunk::Ready(chunk) = tracker.next_chunk(true)? {
//!     // execute chunk.handle, then
//!     tracker.update_download_rate(bytes, elapsed);
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
mod id;
pub mod logic;
pub mod playlist;
mod resources;
pub mod tracker;

#[cfg(test)]
mod test_utils;

pub use config::{BufferingConfig, TrackerConfig};
pub use connection::{
    ChunkKind, ChunkRequest, ConnectionError, ConnectionManager, DeferredConnectionManager,
    FetchHandle, PendingFetch,
};
pub use error::TrackerError;
pub use id::TrackId;
pub use logic::{
    AdaptationLogic, AlwaysBestLogic, AlwaysLowestLogic, BufferingLogic, BufferingTargets,
    DefaultBufferingLogic, FixedRateLogic, RateBasedLogic, SelectionContext,
};
pub use playlist::{
    AdaptationSet, MediaSegment, PlaybackRange, Representation, SegmentDescriptor,
    SegmentListRepresentation, SegmentLookup,
};
pub use resources::SharedResources;
pub use tracker::{
    NextChunk, Position, PositionState, SegmentChunk, SegmentTracker, SelectionHandle,
    TrackerEvent, TrackerEventKind, TrackerListener, TrackerNotification,
};
