mod chunk;
mod events;
mod listener;
mod position;
mod segment_tracker;
mod selection;

pub(crate) use chunk::{ChunkEntry, ChunkQueue};
pub use chunk::{NextChunk, SegmentChunk};
pub use events::{BufferingLevel, TrackerEvent, TrackerEventKind, TrackerNotification};
pub use listener::{ChannelListener, ListenerRegistry, TrackerListener};
pub use position::{Position, PositionState};
pub use segment_tracker::SegmentTracker;
pub use selection::SelectionHandle;
