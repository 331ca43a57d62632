use std::fmt;
use std::time::Duration;

/// Byte range inside a resource, `length` bytes starting at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub offset: u64,
    pub length: u64,
}

impl ByteRange {
    pub fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// Exclusive end offset.
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }

    /// Value for an HTTP `Range` header (inclusive end).
    pub fn to_http_range(&self) -> String {
        format!(
            "bytes={}-{}",
            self.offset,
            self.end().saturating_sub(1).max(self.offset)
        )
    }
}

/// Where the bytes of a segment live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentDescriptor {
    pub uri: String,
    pub byte_range: Option<ByteRange>,
}

impl SegmentDescriptor {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            byte_range: None,
        }
    }

    pub fn with_byte_range(mut self, range: ByteRange) -> Self {
        self.byte_range = Some(range);
        self
    }
}

/// One published media segment of a representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSegment {
    /// Representation-local sequence number
    pub number: u64,
    /// Decode timeline origin, local to the representation
    pub start_time: Duration,
    /// Presentation timeline position after period and offset mapping
    pub display_time: Duration,
    pub duration: Duration,
    /// Timeline break declared by the manifest before this segment
    pub discontinuity: bool,
    pub descriptor: SegmentDescriptor,
}

impl MediaSegment {
    #[inline]
    pub fn display_end(&self) -> Duration {
        self.display_time + self.duration
    }

    /// Whether `time` falls inside this segment's presentation window.
    #[inline]
    pub fn contains(&self, time: Duration) -> bool {
        time >= self.display_time && time < self.display_end()
    }
}

/// Outcome of resolving a segment number against a representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentLookup {
    /// The first published segment at or after the requested number
    Found(MediaSegment),
    /// Open-ended representation, the segment is not published yet
    NotYetAvailable,
    /// Complete representation, nothing left at or after the number
    End,
}

/// Seekable presentation window, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackRange {
    pub start: Duration,
    pub end: Duration,
}

impl PlaybackRange {
    pub fn new(start: Duration, end: Duration) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    #[inline]
    pub fn length(&self) -> Duration {
        self.end - self.start
    }

    #[inline]
    pub fn contains(&self, time: Duration) -> bool {
        time >= self.start && time < self.end
    }
}

impl fmt::Display for PlaybackRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}, {:?})", self.start, self.end)
    }
}
