use std::time::Duration;

use crate::TrackId;
use crate::connection::ConnectionError;
use crate::playlist::PlaybackRange;

/// Failures surfaced by [`SegmentTracker`](crate::SegmentTracker) operations.
///
/// "Not ready yet" and "end of stream" are ordinary outcomes of
/// [`NextChunk`](crate::NextChunk) and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("no representation available for track `{track}`")]
    NoRepresentationAvailable { track: TrackId },

    #[error(
        "position {} is outside the playback range {}",
        describe_time(.time),
        describe_range(.range)
    )]
    SeekOutOfRange {
        time: Option<Duration>,
        range: Option<PlaybackRange>,
    },

    #[error("representation referenced by position {position} is gone")]
    RepresentationExpired { position: String },

    #[error("failed to prepare chunk `{uri}`: {source}")]
    Connection {
        uri: String,
        #[source]
        source: ConnectionError,
    },
}

impl TrackerError {
    pub fn seek_out_of_range(time: Option<Duration>, range: Option<PlaybackRange>) -> Self {
        Self::SeekOutOfRange { time, range }
    }

    pub fn connection(uri: impl Into<String>, source: ConnectionError) -> Self {
        Self::Connection {
            uri: uri.into(),
            source,
        }
    }

    /// Whether the caller can reasonably retry or reposition after this error.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::NoRepresentationAvailable { .. } => false,
            Self::SeekOutOfRange { .. } | Self::RepresentationExpired { .. } => true,
            Self::Connection { source, .. } => source.is_retryable(),
        }
    }
}

fn describe_time(time: &Option<Duration>) -> String {
    match time {
        Some(t) => format!("{t:?}"),
        None => "<start>".to_string(),
    }
}

fn describe_range(range: &Option<PlaybackRange>) -> String {
    match range {
        Some(range) => range.to_string(),
        None => "<empty>".to_string(),
    }
}
