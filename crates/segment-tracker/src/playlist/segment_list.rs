// Segment List Representation: in-memory catalog with an explicit timeline.
//
// Serves complete on-demand catalogs that are known up front as well as live
// catalogs whose owner publishes and expires segments as the manifest is
// refreshed. Display times are derived from the media timeline through the
// period start and the presentation time offset.

use std::collections::BTreeMap;
use std::time::Duration;

use media_types::{CodecDescription, Resolution, StreamFormat, parse_codecs};
use parking_lot::RwLock;
use tracing::trace;

use super::{
    MediaSegment, PlaybackRange, Representation, SegmentDescriptor, SegmentLookup,
};

const DEFAULT_URI_TEMPLATE: &str = "$RepresentationID$/segment-$Number$.m4s";

#[derive(Debug)]
pub struct SegmentListRepresentation {
    id: String,
    bandwidth: u64,
    format: StreamFormat,
    codecs: Vec<CodecDescription>,
    resolution: Option<Resolution>,
    init: Option<SegmentDescriptor>,
    index: Option<SegmentDescriptor>,
    uri_template: String,
    timeline: RwLock<Timeline>,
}

#[derive(Debug)]
struct Timeline {
    segments: BTreeMap<u64, MediaSegment>,
    live: bool,
    next_number: u64,
    /// Media timeline position of the next segment to publish
    next_start: Duration,
    period_start: Duration,
    presentation_offset: Duration,
    pending_discontinuity: bool,
}

impl Timeline {
    fn push(&mut self, duration: Duration, uri: String) -> u64 {
        let number = self.next_number;
        let start_time = self.next_start;
        let display_time =
            (self.period_start + start_time).saturating_sub(self.presentation_offset);

        self.segments.insert(
            number,
            MediaSegment {
                number,
                start_time,
                display_time,
                duration,
                discontinuity: std::mem::take(&mut self.pending_discontinuity),
                descriptor: SegmentDescriptor::new(uri),
            },
        );
        self.next_number += 1;
        self.next_start += duration;
        number
    }

    fn first(&self) -> Option<&MediaSegment> {
        self.segments.values().next()
    }

    fn last(&self) -> Option<&MediaSegment> {
        self.segments.values().next_back()
    }
}

/// Expand `$RepresentationID$`, `$Bandwidth$` and `$Number$` placeholders.
fn expand_template(template: &str, id: &str, bandwidth: u64, number: u64) -> String {
    template
        .replace("$RepresentationID$", id)
        .replace("$Bandwidth$", &bandwidth.to_string())
        .replace("$Number$", &number.to_string())
}

impl SegmentListRepresentation {
    pub fn builder(id: impl Into<String>) -> SegmentListBuilder {
        SegmentListBuilder::new(id)
    }

    fn segment_uri(&self, number: u64) -> String {
        expand_template(&self.uri_template, &self.id, self.bandwidth, number)
    }

    // --- Live catalog maintenance ---

    /// Append a segment of `duration` at the live edge, returning its number.
    pub fn publish(&self, duration: Duration) -> u64 {
        let mut timeline = self.timeline.write();
        let uri = self.segment_uri(timeline.next_number);
        let number = timeline.push(duration, uri);
        trace!(representation = %self.id, number, ?duration, "Published segment");
        number
    }

    /// Flag the next published segment as starting a new timeline.
    pub fn publish_discontinuity(&self) {
        self.timeline.write().pending_discontinuity = true;
    }

    /// Drop every segment numbered below `number`, returning how many went.
    pub fn expire_before(&self, number: u64) -> usize {
        let mut timeline = self.timeline.write();
        let kept = timeline.segments.split_off(&number);
        let expired = std::mem::replace(&mut timeline.segments, kept).len();
        if expired > 0 {
            trace!(representation = %self.id, expired, below = number, "Expired segments");
        }
        expired
    }

    /// Mark the catalog complete; no further segments will be published.
    pub fn end_of_stream(&self) {
        self.timeline.write().live = false;
    }

    pub fn segment_count(&self) -> usize {
        self.timeline.read().segments.len()
    }
}

impl Representation for SegmentListRepresentation {
    fn id(&self) -> &str {
        &self.id
    }

    fn bandwidth(&self) -> u64 {
        self.bandwidth
    }

    fn stream_format(&self) -> StreamFormat {
        self.format
    }

    fn codecs(&self) -> Vec<CodecDescription> {
        self.codecs.clone()
    }

    fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    fn is_live(&self) -> bool {
        self.timeline.read().live
    }

    fn init_segment(&self) -> Option<SegmentDescriptor> {
        self.init.clone()
    }

    fn index_segment(&self) -> Option<SegmentDescriptor> {
        self.index.clone()
    }

    fn media_segment(&self, number: u64) -> SegmentLookup {
        let timeline = self.timeline.read();
        match timeline.segments.range(number..).next() {
            Some((_, segment)) => SegmentLookup::Found(segment.clone()),
            None if timeline.live => SegmentLookup::NotYetAvailable,
            None => SegmentLookup::End,
        }
    }

    fn segment_number_by_time(&self, time: Duration) -> Option<u64> {
        let timeline = self.timeline.read();
        let first = timeline.first()?;
        let last = timeline.last()?;
        if time < first.display_time || time >= last.display_end() {
            return None;
        }
        timeline
            .segments
            .values()
            .rev()
            .find(|segment| segment.display_time <= time)
            .map(|segment| segment.number)
    }

    fn playback_range(&self) -> Option<PlaybackRange> {
        let timeline = self.timeline.read();
        let first = timeline.first()?;
        let last = timeline.last()?;
        Some(PlaybackRange::new(first.display_time, last.display_end()))
    }

    fn first_segment_number(&self) -> Option<u64> {
        self.timeline.read().first().map(|s| s.number)
    }

    fn last_segment_number(&self) -> Option<u64> {
        self.timeline.read().last().map(|s| s.number)
    }

    fn ahead_duration(&self, from: u64) -> Duration {
        self.timeline
            .read()
            .segments
            .range(from..)
            .map(|(_, segment)| segment.duration)
            .sum()
    }
}

#[derive(Debug, Clone, Copy)]
enum TimelineEntry {
    Segment(Duration),
    Discontinuity,
    TimeGap(Duration),
    SkipNumbers(u64),
}

/// Builder for [`SegmentListRepresentation`].
#[derive(Debug)]
pub struct SegmentListBuilder {
    id: String,
    bandwidth: u64,
    format: StreamFormat,
    codecs: Vec<CodecDescription>,
    resolution: Option<Resolution>,
    init: Option<SegmentDescriptor>,
    index: Option<SegmentDescriptor>,
    uri_template: String,
    start_number: u64,
    period_start: Duration,
    presentation_offset: Duration,
    live: bool,
    entries: Vec<TimelineEntry>,
}

impl SegmentListBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            bandwidth: 0,
            format: StreamFormat::Unknown,
            codecs: Vec::new(),
            resolution: None,
            init: None,
            index: None,
            uri_template: DEFAULT_URI_TEMPLATE.to_string(),
            start_number: 0,
            period_start: Duration::ZERO,
            presentation_offset: Duration::ZERO,
            live: false,
            entries: Vec::new(),
        }
    }

    pub fn bandwidth(mut self, bps: u64) -> Self {
        self.bandwidth = bps;
        self
    }

    pub fn format(mut self, format: StreamFormat) -> Self {
        self.format = format;
        self
    }

    /// Comma separated RFC 6381 codec list.
    pub fn codecs(mut self, list: &str) -> Self {
        self.codecs = parse_codecs(list);
        self
    }

    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn init_segment(mut self, descriptor: SegmentDescriptor) -> Self {
        self.init = Some(descriptor);
        self
    }

    pub fn index_segment(mut self, descriptor: SegmentDescriptor) -> Self {
        self.index = Some(descriptor);
        self
    }

    pub fn uri_template(mut self, template: impl Into<String>) -> Self {
        self.uri_template = template.into();
        self
    }

    pub fn start_number(mut self, number: u64) -> Self {
        self.start_number = number;
        self
    }

    pub fn period_start(mut self, start: Duration) -> Self {
        self.period_start = start;
        self
    }

    pub fn presentation_time_offset(mut self, offset: Duration) -> Self {
        self.presentation_offset = offset;
        self
    }

    pub fn live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    pub fn segment(mut self, duration: Duration) -> Self {
        self.entries.push(TimelineEntry::Segment(duration));
        self
    }

    pub fn segments(mut self, count: usize, duration: Duration) -> Self {
        self.entries
            .extend(std::iter::repeat_n(TimelineEntry::Segment(duration), count));
        self
    }

    /// The next segment starts a new timeline.
    pub fn discontinuity(mut self) -> Self {
        self.entries.push(TimelineEntry::Discontinuity);
        self
    }

    /// Leave `duration` of the timeline uncovered before the next segment.
    pub fn time_gap(mut self, duration: Duration) -> Self {
        self.entries.push(TimelineEntry::TimeGap(duration));
        self
    }

    /// Leave `count` segment numbers unpublished.
    pub fn skip_numbers(mut self, count: u64) -> Self {
        self.entries.push(TimelineEntry::SkipNumbers(count));
        self
    }

    pub fn build(self) -> SegmentListRepresentation {
        let mut timeline = Timeline {
            segments: BTreeMap::new(),
            live: self.live,
            next_number: self.start_number,
            next_start: self.presentation_offset,
            period_start: self.period_start,
            presentation_offset: self.presentation_offset,
            pending_discontinuity: false,
        };

        for entry in &self.entries {
            match *entry {
                TimelineEntry::Segment(duration) => {
                    let uri = expand_template(
                        &self.uri_template,
                        &self.id,
                        self.bandwidth,
                        timeline.next_number,
                    );
                    timeline.push(duration, uri);
                }
                TimelineEntry::Discontinuity => timeline.pending_discontinuity = true,
                TimelineEntry::TimeGap(duration) => timeline.next_start += duration,
                TimelineEntry::SkipNumbers(count) => timeline.next_number += count,
            }
        }

        SegmentListRepresentation {
            id: self.id,
            bandwidth: self.bandwidth,
            format: self.format,
            codecs: self.codecs,
            resolution: self.resolution,
            init: self.init,
            index: self.index,
            uri_template: self.uri_template,
            timeline: RwLock::new(timeline),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn vod(count: usize) -> SegmentListRepresentation {
        SegmentListRepresentation::builder("v1")
            .bandwidth(800_000)
            .format(StreamFormat::Mp4)
            .segments(count, secs(1))
            .build()
    }

    #[test]
    fn test_segments_are_numbered_and_timed() {
        let rep = vod(10);
        assert_eq!(rep.first_segment_number(), Some(0));
        assert_eq!(rep.last_segment_number(), Some(9));
        assert_eq!(
            rep.playback_range(),
            Some(PlaybackRange::new(secs(0), secs(10)))
        );

        let SegmentLookup::Found(segment) = rep.media_segment(4) else {
            panic!("segment 4 should be published");
        };
        assert_eq!(segment.display_time, secs(4));
        assert_eq!(segment.descriptor.uri, "v1/segment-4.m4s");
    }

    #[test]
    fn test_lookup_past_end() {
        let rep = vod(3);
        assert_eq!(rep.media_segment(3), SegmentLookup::End);
    }

    #[test]
    fn test_segment_number_by_time() {
        let rep = vod(10);
        assert_eq!(rep.segment_number_by_time(Duration::from_millis(3500)), Some(3));
        assert_eq!(rep.segment_number_by_time(secs(0)), Some(0));
        assert_eq!(rep.segment_number_by_time(secs(10)), None);
    }

    #[test]
    fn test_offsets_map_display_time() {
        let rep = SegmentListRepresentation::builder("a")
            .period_start(secs(100))
            .presentation_time_offset(secs(10))
            .segments(2, secs(2))
            .build();

        let SegmentLookup::Found(segment) = rep.media_segment(1) else {
            panic!("segment 1 should be published");
        };
        assert_eq!(segment.start_time, secs(12));
        assert_eq!(segment.display_time, secs(102));
        assert_eq!(rep.segment_number_by_time(secs(101)), Some(0));
    }

    #[test]
    fn test_discontinuity_and_gaps() {
        let rep = SegmentListRepresentation::builder("v")
            .segment(secs(2))
            .time_gap(secs(1))
            .skip_numbers(2)
            .discontinuity()
            .segment(secs(2))
            .build();

        assert_eq!(rep.last_segment_number(), Some(3));
        let SegmentLookup::Found(segment) = rep.media_segment(1) else {
            panic!("lookup should skip to the next published segment");
        };
        assert_eq!(segment.number, 3);
        assert!(segment.discontinuity);
        assert_eq!(segment.display_time, secs(3));
    }

    #[test]
    fn test_live_publish_and_expire() {
        let rep = SegmentListRepresentation::builder("live")
            .live(true)
            .uri_template("chunk_$Number$.ts")
            .start_number(100)
            .segments(3, secs(2))
            .build();

        assert_eq!(rep.media_segment(103), SegmentLookup::NotYetAvailable);
        assert_eq!(rep.publish(secs(2)), 103);
        let SegmentLookup::Found(segment) = rep.media_segment(103) else {
            panic!("published segment should resolve");
        };
        assert_eq!(segment.descriptor.uri, "chunk_103.ts");

        assert_eq!(rep.expire_before(102), 2);
        assert_eq!(rep.first_segment_number(), Some(102));
        assert_eq!(
            rep.playback_range(),
            Some(PlaybackRange::new(secs(4), secs(8)))
        );

        rep.end_of_stream();
        assert!(!rep.is_live());
        assert_eq!(rep.media_segment(104), SegmentLookup::End);
    }

    #[test]
    fn test_live_start_number_honours_delay() {
        let rep = SegmentListRepresentation::builder("live")
            .live(true)
            .segments(30, secs(2))
            .build();
        // Edge at 60s, 15s behind lands inside segment 22.
        assert_eq!(rep.live_start_number(secs(15)), Some(22));
        assert_eq!(rep.live_start_number(Duration::ZERO), Some(29));
        assert_eq!(rep.live_start_number(secs(600)), Some(0));
    }

    #[test]
    fn test_ahead_duration() {
        let rep = vod(10);
        assert_eq!(rep.ahead_duration(7), secs(3));
        assert_eq!(rep.ahead_duration(20), Duration::ZERO);
    }
}
