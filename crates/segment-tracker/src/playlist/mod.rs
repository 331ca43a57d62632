// Representation catalog: the read-only view of a parsed manifest that the
// tracker sequences over, plus an in-memory segment list implementation.

mod adaptation_set;
mod representation;
mod segment;
mod segment_list;

pub use adaptation_set::AdaptationSet;
pub use representation::Representation;
pub use segment::{ByteRange, MediaSegment, PlaybackRange, SegmentDescriptor, SegmentLookup};
pub use segment_list::{SegmentListBuilder, SegmentListRepresentation};
