use std::time::Duration;

use tracing::debug;

use crate::config::BufferingConfig;
use crate::playlist::Representation;

/// Lowest minimum buffering a policy will report.
pub const MIN_BUFFERING_FLOOR: Duration = Duration::from_secs(1);

/// Snapshot of a buffering policy's targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferingTargets {
    pub min: Duration,
    pub max: Duration,
    pub live_delay: Duration,
}

/// Decides how far ahead a track buffers and where live playback starts.
pub trait BufferingLogic: Send + Sync {
    /// Media duration the tracker keeps prepared ahead of delivery.
    fn min_buffering(&self) -> Duration;

    fn max_buffering(&self) -> Duration;

    /// Safety margin behind the live edge.
    fn live_delay(&self) -> Duration;

    fn targets(&self) -> BufferingTargets {
        BufferingTargets {
            min: self.min_buffering(),
            max: self.max_buffering(),
            live_delay: self.live_delay(),
        }
    }

    /// Segment a fresh session starts from in `representation`.
    fn start_segment_number(&self, representation: &dyn Representation) -> Option<u64> {
        if representation.is_live() {
            representation.live_start_number(self.live_delay())
        } else {
            representation.first_segment_number()
        }
    }
}

/// Fixed targets taken from a [`BufferingConfig`].
#[derive(Debug, Clone)]
pub struct DefaultBufferingLogic {
    targets: BufferingTargets,
}

impl DefaultBufferingLogic {
    /// Normalises the config so that `floor <= min <= max` and
    /// `live_delay >= min`.
    pub fn new(config: BufferingConfig) -> Self {
        let min = config.min_buffering.max(MIN_BUFFERING_FLOOR);
        let max = config.max_buffering.max(min);
        let live_delay = config.live_delay.max(min);

        if min != config.min_buffering || max != config.max_buffering {
            debug!(
                ?min,
                ?max,
                requested_min = ?config.min_buffering,
                requested_max = ?config.max_buffering,
                "Adjusted buffering bounds"
            );
        }

        Self {
            targets: BufferingTargets {
                min,
                max,
                live_delay,
            },
        }
    }
}

impl Default for DefaultBufferingLogic {
    fn default() -> Self {
        Self::new(BufferingConfig::default())
    }
}

impl BufferingLogic for DefaultBufferingLogic {
    fn min_buffering(&self) -> Duration {
        self.targets.min
    }

    fn max_buffering(&self) -> Duration {
        self.targets.max
    }

    fn live_delay(&self) -> Duration {
        self.targets.live_delay
    }

    fn targets(&self) -> BufferingTargets {
        self.targets
    }
}
