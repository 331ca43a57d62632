use std::sync::Arc;
use std::time::Duration;

use media_types::{StreamFormat, TrackCategory};
use parking_lot::Mutex;

use crate::playlist::{AdaptationSet, Representation, SegmentListRepresentation};
use crate::tracker::{TrackerEvent, TrackerEventKind, TrackerListener, TrackerNotification};

/// Initialize tracing for tests with appropriate settings
#[inline]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

#[inline]
pub fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

/// Complete fMP4 representation of `count` equal segments.
pub fn vod(
    id: &str,
    bandwidth: u64,
    count: usize,
    duration: Duration,
) -> Arc<SegmentListRepresentation> {
    Arc::new(
        SegmentListRepresentation::builder(id)
            .bandwidth(bandwidth)
            .format(StreamFormat::Mp4)
            .segments(count, duration)
            .build(),
    )
}

/// Video track `"video"` holding a single representation.
pub fn single_set(representation: Arc<dyn Representation>) -> AdaptationSet {
    AdaptationSet::new("video", TrackCategory::Video).with_representation(representation)
}

/// Video track with one ten-second representation per `(id, bandwidth)`.
pub fn ladder(rungs: &[(&str, u64)]) -> AdaptationSet {
    rungs
        .iter()
        .fold(AdaptationSet::new("video", TrackCategory::Video), |set, (id, bandwidth)| {
            set.with_representation(vod(id, *bandwidth, 10, secs(1)))
        })
}

/// Listener that keeps owned copies of every event it sees.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Mutex<Vec<TrackerNotification>>,
}

impl EventRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn take(&self) -> Vec<TrackerNotification> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn kinds(&self) -> Vec<TrackerEventKind> {
        self.events.lock().iter().map(TrackerNotification::kind).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl TrackerListener for EventRecorder {
    fn tracker_event(&self, event: &TrackerEvent<'_>) {
        self.events.lock().push(event.to_notification());
    }
}
