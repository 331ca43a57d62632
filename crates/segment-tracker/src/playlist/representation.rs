use std::fmt;
use std::time::Duration;

use media_types::{CodecDescription, Resolution, StreamFormat};

use super::{PlaybackRange, SegmentDescriptor, SegmentLookup};

/// One quality variant of a track as described by the manifest.
///
/// The tracker only reads through this interface. Implementations that
/// change over time (live manifests) synchronize internally.
pub trait Representation: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    /// Declared bandwidth in bits per second.
    fn bandwidth(&self) -> u64;

    /// Declared container format, `Unknown` when the manifest is silent.
    fn stream_format(&self) -> StreamFormat;

    fn codecs(&self) -> Vec<CodecDescription>;

    fn resolution(&self) -> Option<Resolution> {
        None
    }

    /// Open-ended catalog that may still publish segments.
    fn is_live(&self) -> bool;

    fn init_segment(&self) -> Option<SegmentDescriptor>;

    fn index_segment(&self) -> Option<SegmentDescriptor>;

    /// The first published segment whose number is `>= number`.
    fn media_segment(&self, number: u64) -> SegmentLookup;

    /// Number of the segment with the greatest display start `<= time`.
    ///
    /// Returns `None` when `time` lies outside [`playback_range`](Self::playback_range).
    fn segment_number_by_time(&self, time: Duration) -> Option<u64>;

    fn playback_range(&self) -> Option<PlaybackRange>;

    fn first_segment_number(&self) -> Option<u64>;

    fn last_segment_number(&self) -> Option<u64>;

    /// Published media duration from segment `from` (inclusive) onward.
    fn ahead_duration(&self, from: u64) -> Duration;

    fn playback_time_by_number(&self, number: u64) -> Option<Duration> {
        match self.media_segment(number) {
            SegmentLookup::Found(segment) => Some(segment.display_time),
            _ => None,
        }
    }

    /// Segment to start a live session from, `delay` behind the live edge.
    fn live_start_number(&self, delay: Duration) -> Option<u64> {
        let range = self.playback_range()?;
        let target = range.end.saturating_sub(delay).max(range.start);
        self.segment_number_by_time(target)
            .or_else(|| self.last_segment_number())
    }
}
