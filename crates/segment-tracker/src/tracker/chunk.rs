use std::collections::VecDeque;
use std::time::Duration;

use media_types::StreamFormat;

use super::Position;
use crate::connection::{ChunkKind, FetchHandle};

/// A resolved chunk ready to be fetched by the caller.
#[derive(Debug)]
pub struct SegmentChunk {
    pub handle: Box<dyn FetchHandle>,
    pub kind: ChunkKind,
    pub representation_id: String,
    pub bandwidth: u64,
    /// Media segment number; init and index chunks carry the upcoming one
    pub sequence: u64,
    pub start_time: Duration,
    pub display_time: Duration,
    /// Zero for init and index chunks
    pub duration: Duration,
    pub format: StreamFormat,
    /// A timeline break precedes this chunk
    pub discontinuity: bool,
    /// Exact presentation time to resume from inside this chunk
    pub seek_target: Option<Duration>,
}

impl SegmentChunk {
    #[inline]
    pub fn is_media(&self) -> bool {
        self.kind == ChunkKind::Media
    }

    #[inline]
    pub fn display_end(&self) -> Duration {
        self.display_time + self.duration
    }
}

/// Prepared chunk waiting in the lookahead queue.
#[derive(Debug)]
pub(crate) struct ChunkEntry {
    pub chunk: SegmentChunk,
    /// Position the chunk was prepared for
    pub position: Position,
    /// Segment numbers were skipped to reach this chunk
    pub gap: bool,
}

/// Oldest-first queue of prepared chunks.
#[derive(Debug, Default)]
pub(crate) struct ChunkQueue {
    entries: VecDeque<ChunkEntry>,
}

impl ChunkQueue {
    pub fn push_back(&mut self, entry: ChunkEntry) {
        self.entries.push_back(entry);
    }

    pub fn pop_front(&mut self) -> Option<ChunkEntry> {
        self.entries.pop_front()
    }

    pub fn back(&self) -> Option<&ChunkEntry> {
        self.entries.back()
    }

    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Presentation time covered by queued media chunks.
    pub fn media_duration(&self) -> Duration {
        self.entries.iter().map(|entry| entry.chunk.duration).sum()
    }
}

/// Outcome of asking the tracker for its next chunk.
#[derive(Debug)]
pub enum NextChunk {
    Ready(SegmentChunk),
    /// Open-ended catalog has not published the segment yet; retry later
    NotReady,
    /// Complete catalog exhausted at the current position
    EndOfStream,
}

impl NextChunk {
    pub fn into_chunk(self) -> Option<SegmentChunk> {
        match self {
            Self::Ready(chunk) => Some(chunk),
            _ => None,
        }
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }

    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrackId;
    use crate::connection::{ChunkRequest, ConnectionManager, DeferredConnectionManager};
    use crate::playlist::SegmentDescriptor;

    fn entry(kind: ChunkKind, seconds: u64) -> ChunkEntry {
        let manager = DeferredConnectionManager::new();
        let handle = manager
            .create_fetch(ChunkRequest {
                track: TrackId::from("t"),
                representation_id: "r".into(),
                kind,
                sequence: 0,
                descriptor: SegmentDescriptor::new("x.m4s"),
                bandwidth: 0,
            })
            .unwrap();
        ChunkEntry {
            chunk: SegmentChunk {
                handle,
                kind,
                representation_id: "r".into(),
                bandwidth: 0,
                sequence: 0,
                start_time: Duration::ZERO,
                display_time: Duration::ZERO,
                duration: Duration::from_secs(seconds),
                format: StreamFormat::Mp4,
                discontinuity: false,
                seek_target: None,
            },
            position: Position::default(),
            gap: false,
        }
    }

    #[test]
    fn test_queue_counts_media_duration() {
        let mut queue = ChunkQueue::default();
        queue.push_back(entry(ChunkKind::Init, 0));
        queue.push_back(entry(ChunkKind::Media, 2));
        queue.push_back(entry(ChunkKind::Media, 3));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.media_duration(), Duration::from_secs(5));

        let front = queue.pop_front().unwrap();
        assert_eq!(front.chunk.kind, ChunkKind::Init);
        assert_eq!(queue.clear(), 2);
        assert_eq!(queue.len(), 0);
        assert!(queue.back().is_none());
    }

    #[test]
    fn test_next_chunk_accessors() {
        assert!(NextChunk::EndOfStream.is_end_of_stream());
        assert!(NextChunk::NotReady.is_not_ready());
        assert!(NextChunk::NotReady.into_chunk().is_none());

        let ready = NextChunk::Ready(entry(ChunkKind::Media, 1).chunk);
        let chunk = ready.into_chunk().unwrap();
        assert!(chunk.is_media());
        assert_eq!(chunk.display_end(), Duration::from_secs(1));
        // Handles keep the request they were created for.
        assert_eq!(chunk.handle.request().representation_id, "r");
    }
}
