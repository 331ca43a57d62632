// Tracker notifications.
//
// `TrackerEvent` borrows from the tracker and only lives for the duration of
// a listener callback. `TrackerNotification` is its owned counterpart for
// listeners that forward events to another task.

use std::sync::Arc;
use std::time::Duration;

use media_types::StreamFormat;

use crate::TrackId;
use crate::playlist::Representation;

/// Discriminant of a [`TrackerEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerEventKind {
    Discontinuity,
    RepresentationSwitch,
    FormatChange,
    SegmentChange,
    BufferingStateUpdate,
    BufferingLevelChange,
    PositionChange,
}

/// Buffer fill report, clamped so that `min <= current <= max` and
/// `min <= target <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferingLevel {
    pub min: Duration,
    pub max: Duration,
    pub current: Duration,
    pub target: Duration,
}

impl BufferingLevel {
    pub fn new(min: Duration, max: Duration, current: Duration, target: Duration) -> Self {
        let max = max.max(min);
        Self {
            min,
            max,
            current: current.clamp(min, max),
            target: target.clamp(min, max),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum TrackerEvent<'a> {
    Discontinuity,
    RepresentationSwitch {
        prev: Option<&'a Arc<dyn Representation>>,
        next: Option<&'a Arc<dyn Representation>>,
    },
    FormatChange {
        format: StreamFormat,
    },
    SegmentChange {
        track: &'a TrackId,
        display_time: Duration,
        start_time: Duration,
        duration: Duration,
    },
    BufferingStateUpdate {
        track: &'a TrackId,
        enabled: bool,
    },
    BufferingLevelChange {
        track: &'a TrackId,
        level: BufferingLevel,
    },
    PositionChange,
}

impl TrackerEvent<'_> {
    pub fn kind(&self) -> TrackerEventKind {
        match self {
            Self::Discontinuity => TrackerEventKind::Discontinuity,
            Self::RepresentationSwitch { .. } => TrackerEventKind::RepresentationSwitch,
            Self::FormatChange { .. } => TrackerEventKind::FormatChange,
            Self::SegmentChange { .. } => TrackerEventKind::SegmentChange,
            Self::BufferingStateUpdate { .. } => TrackerEventKind::BufferingStateUpdate,
            Self::BufferingLevelChange { .. } => TrackerEventKind::BufferingLevelChange,
            Self::PositionChange => TrackerEventKind::PositionChange,
        }
    }

    pub fn to_notification(&self) -> TrackerNotification {
        match *self {
            Self::Discontinuity => TrackerNotification::Discontinuity,
            Self::RepresentationSwitch { prev, next } => TrackerNotification::RepresentationSwitch {
                prev: prev.map(|r| r.id().to_string()),
                next: next.map(|r| r.id().to_string()),
            },
            Self::FormatChange { format } => TrackerNotification::FormatChange { format },
            Self::SegmentChange {
                track,
                display_time,
                start_time,
                duration,
            } => TrackerNotification::SegmentChange {
                track: track.clone(),
                display_time,
                start_time,
                duration,
            },
            Self::BufferingStateUpdate { track, enabled } => {
                TrackerNotification::BufferingStateUpdate {
                    track: track.clone(),
                    enabled,
                }
            }
            Self::BufferingLevelChange { track, level } => {
                TrackerNotification::BufferingLevelChange {
                    track: track.clone(),
                    level,
                }
            }
            Self::PositionChange => TrackerNotification::PositionChange,
        }
    }
}

/// Owned copy of a [`TrackerEvent`], representations named by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerNotification {
    Discontinuity,
    RepresentationSwitch {
        prev: Option<String>,
        next: Option<String>,
    },
    FormatChange {
        format: StreamFormat,
    },
    SegmentChange {
        track: TrackId,
        display_time: Duration,
        start_time: Duration,
        duration: Duration,
    },
    BufferingStateUpdate {
        track: TrackId,
        enabled: bool,
    },
    BufferingLevelChange {
        track: TrackId,
        level: BufferingLevel,
    },
    PositionChange,
}

impl TrackerNotification {
    pub fn kind(&self) -> TrackerEventKind {
        match self {
            Self::Discontinuity => TrackerEventKind::Discontinuity,
            Self::RepresentationSwitch { .. } => TrackerEventKind::RepresentationSwitch,
            Self::FormatChange { .. } => TrackerEventKind::FormatChange,
            Self::SegmentChange { .. } => TrackerEventKind::SegmentChange,
            Self::BufferingStateUpdate { .. } => TrackerEventKind::BufferingStateUpdate,
            Self::BufferingLevelChange { .. } => TrackerEventKind::BufferingLevelChange,
            Self::PositionChange => TrackerEventKind::PositionChange,
        }
    }
}
