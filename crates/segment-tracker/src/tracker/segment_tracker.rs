// Segment Tracker: sequences the chunks of one track across representations.
//
// The tracker owns the current and next positions, the tracked stream format
// and a lookahead queue of prepared chunks. Each call to `get_next_chunk` may
// apply a deferred representation switch, hands out init and index data
// ahead of the first media segment of a representation, and reports every
// transition to the registered listeners.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use media_types::{CodecDescription, StreamFormat, TrackCategory, TrackRole};
use tracing::{debug, trace, warn};

use super::{
    BufferingLevel, ChunkEntry, ChunkQueue, ListenerRegistry, NextChunk, Position,
    PositionState, SegmentChunk, SelectionHandle, TrackerEvent, TrackerListener,
};
use crate::TrackId;
use crate::config::TrackerConfig;
use crate::connection::{ChunkKind, ChunkRequest, ConnectionManager};
use crate::error::TrackerError;
use crate::logic::{AdaptationLogic, BufferingLogic, BufferingTargets, SelectionContext};
use crate::playlist::{AdaptationSet, PlaybackRange, Representation, SegmentLookup};
use crate::resources::SharedResources;

/// Last media chunk handed to the caller.
#[derive(Debug, Clone, Copy)]
struct DeliveredMedia {
    display_time: Duration,
    display_end: Duration,
}

enum Prepared {
    Entry(ChunkEntry),
    NotReady,
    EndOfStream,
}

/// Sequencing state machine for one track.
///
/// Driven by a single worker: every mutating operation takes `&mut self`.
/// The only cross-thread entry point is the [`SelectionHandle`] returned by
/// [`selection_handle`](Self::selection_handle).
pub struct SegmentTracker {
    config: TrackerConfig,
    resources: SharedResources,
    adaptation_set: Arc<AdaptationSet>,
    logic: Arc<dyn AdaptationLogic>,
    buffering: Option<Arc<dyn BufferingLogic>>,
    current: Position,
    next: Position,
    format: StreamFormat,
    /// Representation of the last delivered chunk
    active: Option<Weak<dyn Representation>>,
    /// The next media chunk follows a (re)position
    first: bool,
    /// Restart in progress; switching waits for media to flow again
    initializing: bool,
    /// A representation switch was announced and its first media chunk is
    /// still to come
    switch_pending_media: bool,
    queue: ChunkQueue,
    listeners: ListenerRegistry,
    selection: SelectionHandle,
    last_media: Option<DeliveredMedia>,
    seek_target: Option<Duration>,
}

impl SegmentTracker {
    pub fn new(
        resources: SharedResources,
        adaptation_set: Arc<AdaptationSet>,
        logic: Arc<dyn AdaptationLogic>,
    ) -> Self {
        Self {
            config: TrackerConfig::default(),
            resources,
            adaptation_set,
            logic,
            buffering: None,
            current: Position::default(),
            next: Position::default(),
            format: StreamFormat::Unknown,
            active: None,
            first: true,
            initializing: false,
            switch_pending_media: false,
            queue: ChunkQueue::default(),
            listeners: ListenerRegistry::default(),
            selection: SelectionHandle::default(),
            last_media: None,
            seek_target: None,
        }
    }

    pub fn with_buffering_logic(mut self, buffering: Arc<dyn BufferingLogic>) -> Self {
        self.buffering = Some(buffering);
        self
    }

    pub fn with_config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    // --- Lifecycle ---

    /// Forget every position, the lookahead and the tracked format.
    ///
    /// Emits nothing; calling it repeatedly is the same as calling it once.
    pub fn reset(&mut self) {
        let dropped = self.queue.clear();
        if self.next.is_valid() || dropped > 0 {
            debug!(track = %self.adaptation_set.id(), dropped, "Tracker reset");
        }
        self.current = Position::default();
        self.next = Position::default();
        self.format = StreamFormat::Unknown;
        self.active = None;
        self.first = false;
        self.initializing = false;
        self.switch_pending_media = false;
        self.last_media = None;
        self.seek_target = None;
    }

    /// Replace the catalog after a manifest reload. Positions into the old
    /// catalog are discarded.
    pub fn set_adaptation_set(&mut self, adaptation_set: Arc<AdaptationSet>) {
        self.reset();
        self.adaptation_set = adaptation_set;
    }

    pub fn set_adaptation_logic(&mut self, logic: Arc<dyn AdaptationLogic>) {
        debug!(track = %self.adaptation_set.id(), logic = logic.name(), "Adaptation logic replaced");
        self.logic = logic;
    }

    /// Request a selection re-evaluation at the next switchable boundary.
    pub fn update_selected(&self) {
        self.selection.update_selected();
    }

    /// Handle for requesting re-evaluation from other threads.
    pub fn selection_handle(&self) -> SelectionHandle {
        self.selection.clone()
    }

    /// Feed a completed download to the adaptation policy and schedule a
    /// re-evaluation.
    pub fn update_download_rate(&self, bytes: u64, elapsed: Duration) {
        self.logic.update_download_rate(bytes, elapsed);
        self.selection.update_selected();
    }

    pub fn register_listener(&mut self, listener: Arc<dyn TrackerListener>) {
        self.listeners.register(listener);
    }

    // --- Positioning ---

    /// Where a fresh session would start, without changing anything.
    pub fn start_position(&self) -> Result<Position, TrackerError> {
        let representation = self.select_fresh()?;
        let number = match &self.buffering {
            Some(buffering) => buffering.start_segment_number(representation.as_ref()),
            None if representation.is_live() => {
                representation.live_start_number(self.config.live_delay)
            }
            None => representation.first_segment_number(),
        };

        let number = number
            .ok_or_else(|| TrackerError::seek_out_of_range(None, representation.playback_range()))?;
        Ok(Position::new(&representation, number))
    }

    /// Position the tracker at the start of the stream unless it already is
    /// positioned.
    pub fn set_start_position(&mut self) -> Result<(), TrackerError> {
        if self.next.is_valid() {
            return Ok(());
        }
        let position = self.start_position()?;
        debug!(track = %self.adaptation_set.id(), %position, "Start position chosen");
        self.set_position(position, true);
        Ok(())
    }

    /// Install `position` as both the current and the next position.
    pub fn set_position(&mut self, position: Position, restarted: bool) {
        if restarted {
            self.initializing = true;
        }
        let dropped = self.queue.clear();
        debug!(
            track = %self.adaptation_set.id(),
            %position,
            restarted,
            dropped,
            "Position set"
        );

        self.first = true;
        self.switch_pending_media = false;
        self.last_media = None;
        self.seek_target = None;
        self.current = position.clone();
        self.next = position;
        self.notify(&TrackerEvent::PositionChange);
    }

    /// Seek to the segment containing `time` in the representation the
    /// adaptation policy picks for a fresh start.
    ///
    /// With `precise` the next media chunk carries `time` as its seek target.
    /// With `restart_from_first` init and index data are delivered again even
    /// when the representation does not change.
    pub fn set_position_by_time(
        &mut self,
        time: Duration,
        precise: bool,
        restart_from_first: bool,
    ) -> Result<(), TrackerError> {
        let representation = self.select_fresh()?;
        let Some(number) = representation.segment_number_by_time(time) else {
            let range = representation.playback_range();
            debug!(
                track = %self.adaptation_set.id(),
                ?time,
                range = ?range,
                "Seek target outside the playback range"
            );
            return Err(TrackerError::seek_out_of_range(Some(time), range));
        };

        let mut position = Position::new(&representation, number);
        if !restart_from_first && self.next.points_to(&representation) {
            position = position.with_state(self.next.state);
        }

        self.set_position(position, restart_from_first);
        if precise {
            self.seek_target = Some(time);
        }
        Ok(())
    }

    // --- Sequencing ---

    /// [`get_next_chunk`](Self::get_next_chunk) through the injected
    /// connection manager.
    pub fn next_chunk(&mut self, switch_allowed: bool) -> Result<NextChunk, TrackerError> {
        let connections = self.resources.connection_manager();
        self.get_next_chunk(switch_allowed, connections.as_ref())
    }

    /// Resolve and hand out the next chunk of the track.
    ///
    /// A pending selection request is only honoured when `switch_allowed`
    /// is set, no restart is in progress and the adaptation set is segment
    /// aligned. Failures leave every position untouched.
    ///
    /// A switch is announced with `RepresentationSwitch` when the first chunk
    /// of the new representation is delivered, not when it is decided.
    pub fn get_next_chunk(
        &mut self,
        switch_allowed: bool,
        connections: &dyn ConnectionManager,
    ) -> Result<NextChunk, TrackerError> {
        if !self.next.is_valid() {
            if self.next.is_expired() {
                return Err(TrackerError::RepresentationExpired {
                    position: format!("segment {}", self.next.number),
                });
            }
            self.set_start_position()?;
        }

        if switch_allowed
            && !self.initializing
            && self.adaptation_set.is_segment_aligned()
            && self.selection.take_pending()
        {
            self.evaluate_switch();
        }

        let entry = match self.queue.pop_front() {
            Some(entry) => entry,
            None => match self.prepare(&self.next, connections)? {
                Prepared::Entry(entry) => entry,
                Prepared::NotReady => {
                    trace!(track = %self.adaptation_set.id(), next = %self.next, "Segment not published yet");
                    return Ok(NextChunk::NotReady);
                }
                Prepared::EndOfStream => {
                    debug!(track = %self.adaptation_set.id(), next = %self.next, "End of stream reached");
                    return Ok(NextChunk::EndOfStream);
                }
            },
        };

        let chunk = self.deliver(entry);
        self.fill_lookahead(connections);
        Ok(NextChunk::Ready(chunk))
    }

    fn evaluate_switch(&mut self) {
        let Some(current) = self.next.representation() else {
            return;
        };
        let candidate = self.logic.select(&self.selection_context(Some(&current)));
        let Some(candidate) = candidate else {
            trace!(track = %self.adaptation_set.id(), "Adaptation logic selected nothing");
            return;
        };
        if self.next.points_to(&candidate) {
            return;
        }

        let reference = self
            .last_media
            .map(|media| media.display_time)
            .or_else(|| current.playback_time_by_number(self.next.number));
        let target = reference.and_then(|time| candidate.segment_number_by_time(time));
        let Some(number) = target else {
            warn!(
                track = %self.adaptation_set.id(),
                from = current.id(),
                to = candidate.id(),
                reference = ?reference,
                "No matching segment in the selected representation, switch skipped"
            );
            return;
        };

        let dropped = self.queue.clear();
        debug!(
            track = %self.adaptation_set.id(),
            from = current.id(),
            to = candidate.id(),
            number,
            reference = ?reference,
            dropped,
            "Switching representation"
        );
        self.next = Position::new(&candidate, number);
    }

    /// Resolve the chunk at `position` without touching tracker state.
    fn prepare(
        &self,
        position: &Position,
        connections: &dyn ConnectionManager,
    ) -> Result<Prepared, TrackerError> {
        let Some(representation) = position.representation() else {
            return Err(TrackerError::RepresentationExpired {
                position: format!("segment {}", position.number),
            });
        };

        let segment = match representation.media_segment(position.number) {
            SegmentLookup::Found(segment) => segment,
            SegmentLookup::NotYetAvailable => return Ok(Prepared::NotReady),
            SegmentLookup::End => return Ok(Prepared::EndOfStream),
        };

        // Init and index data are optional; skip what the representation lacks.
        let mut position = position.clone();
        let (kind, descriptor) = loop {
            match position.state {
                PositionState::NeedsInit => match representation.init_segment() {
                    Some(descriptor) => break (ChunkKind::Init, descriptor),
                    None => {
                        position.advance();
                    }
                },
                PositionState::NeedsIndex => match representation.index_segment() {
                    Some(descriptor) => break (ChunkKind::Index, descriptor),
                    None => {
                        position.advance();
                    }
                },
                PositionState::Streaming => break (ChunkKind::Media, segment.descriptor.clone()),
            }
        };

        let is_media = kind == ChunkKind::Media;
        let gap = is_media && segment.number != position.number;
        position.number = segment.number;

        let format = match representation.stream_format() {
            StreamFormat::Unknown => StreamFormat::from_uri(&segment.descriptor.uri),
            format => format,
        };

        let uri = descriptor.uri.clone();
        let request = ChunkRequest {
            track: self.adaptation_set.id().clone(),
            representation_id: representation.id().to_string(),
            kind,
            sequence: segment.number,
            descriptor,
            bandwidth: representation.bandwidth(),
        };
        let handle = connections
            .create_fetch(request)
            .map_err(|source| TrackerError::connection(uri, source))?;

        Ok(Prepared::Entry(ChunkEntry {
            chunk: SegmentChunk {
                handle,
                kind,
                representation_id: representation.id().to_string(),
                bandwidth: representation.bandwidth(),
                sequence: segment.number,
                start_time: segment.start_time,
                display_time: segment.display_time,
                duration: if is_media { segment.duration } else { Duration::ZERO },
                format,
                discontinuity: is_media && segment.discontinuity,
                seek_target: None,
            },
            position,
            gap,
        }))
    }

    /// Commit a prepared entry: emit its events and advance the positions.
    fn deliver(&mut self, entry: ChunkEntry) -> SegmentChunk {
        let ChunkEntry {
            mut chunk,
            position,
            gap,
        } = entry;
        let representation = position.representation();

        let switched = representation
            .as_ref()
            .is_some_and(|rep| !self.is_active(rep));
        if switched {
            let prev = self.active.as_ref().and_then(Weak::upgrade);
            self.notify(&TrackerEvent::RepresentationSwitch {
                prev: prev.as_ref(),
                next: representation.as_ref(),
            });
            self.active = representation.as_ref().map(Arc::downgrade);
            self.switch_pending_media = true;
        }

        if chunk.format != self.format {
            debug!(
                track = %self.adaptation_set.id(),
                from = %self.format,
                to = %chunk.format,
                "Stream format changed"
            );
            self.format = chunk.format;
            self.notify(&TrackerEvent::FormatChange {
                format: chunk.format,
            });
        }

        if chunk.is_media() {
            // Init and index chunks may sit between the switch and this chunk.
            let switched = std::mem::take(&mut self.switch_pending_media);
            let time_break = !switched
                && self
                    .last_media
                    .is_some_and(|last| last.display_end != chunk.display_time);
            let discontinuity = !self.first && (gap || chunk.discontinuity || time_break);
            if discontinuity {
                debug!(
                    track = %self.adaptation_set.id(),
                    sequence = chunk.sequence,
                    gap,
                    time_break,
                    "Timeline discontinuity"
                );
                self.notify(&TrackerEvent::Discontinuity);
            }

            chunk.discontinuity = discontinuity;
            chunk.seek_target = self.seek_target.take();
            self.first = false;
            self.initializing = false;
            self.last_media = Some(DeliveredMedia {
                display_time: chunk.display_time,
                display_end: chunk.display_end(),
            });
            self.notify(&TrackerEvent::SegmentChange {
                track: self.adaptation_set.id(),
                display_time: chunk.display_time,
                start_time: chunk.start_time,
                duration: chunk.duration,
            });
        }

        trace!(
            track = %self.adaptation_set.id(),
            representation = %chunk.representation_id,
            kind = %chunk.kind,
            sequence = chunk.sequence,
            display_time = ?chunk.display_time,
            "Chunk delivered"
        );

        self.next = position.next();
        self.current = position;
        self.notify(&TrackerEvent::PositionChange);
        chunk
    }

    /// Prepare chunks after `next` until the queued media covers the target.
    fn fill_lookahead(&mut self, connections: &dyn ConnectionManager) {
        if !self.config.lookahead_enabled {
            return;
        }
        let target = self.buffering_targets().min;

        while self.queue.media_duration() < target {
            let position = match self.queue.back() {
                Some(entry) => entry.position.next(),
                None => self.next.clone(),
            };
            match self.prepare(&position, connections) {
                Ok(Prepared::Entry(entry)) => self.queue.push_back(entry),
                Ok(Prepared::NotReady | Prepared::EndOfStream) => break,
                Err(error) => {
                    // Surfaces again when the chunk is requested on demand.
                    warn!(track = %self.adaptation_set.id(), %error, "Lookahead preparation failed");
                    break;
                }
            }
        }
        trace!(
            queued = self.queue.len(),
            ahead = ?self.queue.media_duration(),
            "Lookahead filled"
        );
    }

    // --- Queries ---

    /// Display time of the current position, or of the next one when asked
    /// for (or when nothing was delivered yet).
    pub fn get_playback_time(&self, from_next: bool) -> Option<Duration> {
        let position = if from_next || !self.current.is_valid() {
            &self.next
        } else {
            &self.current
        };
        position
            .representation()?
            .playback_time_by_number(position.number)
    }

    /// Seekable window of the selected representation.
    pub fn get_media_playback_range(&self) -> Option<PlaybackRange> {
        self.current
            .representation()
            .or_else(|| self.next.representation())?
            .playback_range()
    }

    /// Media time that should still be queued to reach the buffering target,
    /// bounded by what the catalog can currently provide.
    pub fn get_min_ahead_time(&self) -> Duration {
        let Some(representation) = self.next.representation() else {
            return Duration::ZERO;
        };
        let queued = self.queue.media_duration();
        let wanted = self.buffering_targets().min.saturating_sub(queued);
        let available = representation
            .ahead_duration(self.next.number)
            .saturating_sub(queued);
        wanted.min(available)
    }

    /// Published media duration from the next position onward.
    pub fn available_ahead_time(&self) -> Duration {
        self.next
            .representation()
            .map(|rep| rep.ahead_duration(self.next.number))
            .unwrap_or_default()
    }

    pub fn get_current_format(&self) -> StreamFormat {
        self.format
    }

    /// Codec descriptions of the representation in use, completed with the
    /// track's language and the representation's resolution and bandwidth.
    pub fn get_codecs_desc(&self) -> Vec<CodecDescription> {
        let representation = self
            .current
            .representation()
            .or_else(|| self.next.representation())
            .or_else(|| self.select_fresh().ok());
        let Some(representation) = representation else {
            return Vec::new();
        };

        let language = self.adaptation_set.language();
        representation
            .codecs()
            .into_iter()
            .map(|mut desc| {
                if desc.language.is_none() {
                    desc.language = language.map(str::to_string);
                }
                if desc.category == TrackCategory::Video && desc.resolution.is_none() {
                    desc.resolution = representation.resolution();
                }
                if desc.bitrate.is_none() {
                    desc.bitrate = Some(representation.bandwidth());
                }
                desc
            })
            .collect()
    }

    pub fn get_stream_role(&self) -> TrackRole {
        self.adaptation_set.role()
    }

    pub fn track_id(&self) -> &TrackId {
        self.adaptation_set.id()
    }

    pub fn adaptation_set(&self) -> &Arc<AdaptationSet> {
        &self.adaptation_set
    }

    pub fn position(&self) -> &Position {
        &self.current
    }

    pub fn next_position(&self) -> &Position {
        &self.next
    }

    /// Whether a buffering policy was injected.
    pub fn buffering_available(&self) -> bool {
        self.buffering.is_some()
    }

    // --- Notifications ---

    pub fn notify_buffering_state(&self, enabled: bool) {
        self.notify(&TrackerEvent::BufferingStateUpdate {
            track: self.adaptation_set.id(),
            enabled,
        });
    }

    /// Report the caller's buffer level. Suppressed without a buffering
    /// policy.
    pub fn notify_buffering_level(
        &self,
        min: Duration,
        max: Duration,
        current: Duration,
        target: Duration,
    ) {
        if !self.buffering_available() {
            return;
        }
        self.notify(&TrackerEvent::BufferingLevelChange {
            track: self.adaptation_set.id(),
            level: BufferingLevel::new(min, max, current, target),
        });
    }

    fn notify(&self, event: &TrackerEvent<'_>) {
        trace!(track = %self.adaptation_set.id(), kind = ?event.kind(), "Tracker event");
        self.listeners.notify(event);
    }

    // --- Helpers ---

    fn buffering_targets(&self) -> BufferingTargets {
        match &self.buffering {
            Some(buffering) => buffering.targets(),
            None => BufferingTargets {
                min: self.config.lookahead_target,
                max: self.config.lookahead_target,
                live_delay: self.config.live_delay,
            },
        }
    }

    fn selection_context<'a>(
        &'a self,
        current: Option<&'a Arc<dyn Representation>>,
    ) -> SelectionContext<'a> {
        SelectionContext {
            adaptation_set: &self.adaptation_set,
            current,
            role: self.adaptation_set.role(),
            format: self.format,
            buffering: self.buffering.as_ref().map(|b| b.targets()),
        }
    }

    fn select_fresh(&self) -> Result<Arc<dyn Representation>, TrackerError> {
        self.logic
            .select(&self.selection_context(None))
            .ok_or_else(|| TrackerError::NoRepresentationAvailable {
                track: self.adaptation_set.id().clone(),
            })
    }

    fn is_active(&self, representation: &Arc<dyn Representation>) -> bool {
        self.active.as_ref().is_some_and(|weak| {
            weak.strong_count() > 0
                && std::ptr::addr_eq(weak.as_ptr(), Arc::as_ptr(representation))
        })
    }
}

impl fmt::Debug for SegmentTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentTracker")
            .field("track", self.adaptation_set.id())
            .field("logic", &self.logic.name())
            .field("current", &self.current)
            .field("next", &self.next)
            .field("format", &self.format)
            .field("queued", &self.queue.len())
            .field("listeners", &self.listeners.len())
            .field("buffering", &self.buffering.is_some())
            .finish_non_exhaustive()
    }
}
