use std::time::Duration;

use serde::{Deserialize, Serialize};

// --- Tracker Configuration ---

/// Tracker-level tuning.
///
/// The buffering values here are only consulted when no
/// [`BufferingLogic`](crate::BufferingLogic) is injected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Keep prepared chunks queued ahead of delivery
    pub lookahead_enabled: bool,
    /// Media duration to keep prepared ahead of delivery
    pub lookahead_target: Duration,
    /// Distance behind the live edge used for the start position
    pub live_delay: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            lookahead_enabled: true,
            lookahead_target: Duration::from_secs(6),
            live_delay: Duration::from_secs(15),
        }
    }
}

impl TrackerConfig {
    pub fn with_lookahead(mut self, target: Duration) -> Self {
        self.lookahead_enabled = !target.is_zero();
        self.lookahead_target = target;
        self
    }

    pub fn without_lookahead(mut self) -> Self {
        self.lookahead_enabled = false;
        self
    }

    pub fn with_live_delay(mut self, delay: Duration) -> Self {
        self.live_delay = delay;
        self
    }
}

// --- Buffering Configuration ---

/// Parameters of [`DefaultBufferingLogic`](crate::DefaultBufferingLogic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferingConfig {
    /// Minimum media duration to hold before playback may start
    pub min_buffering: Duration,
    /// Upper bound of the buffer
    pub max_buffering: Duration,
    /// Distance behind the live edge for live streams
    pub live_delay: Duration,
}

impl Default for BufferingConfig {
    fn default() -> Self {
        Self {
            min_buffering: Duration::from_secs(6),
            max_buffering: Duration::from_secs(30),
            live_delay: Duration::from_secs(15),
        }
    }
}

impl BufferingConfig {
    pub fn with_min_buffering(mut self, value: Duration) -> Self {
        self.min_buffering = value;
        self
    }

    pub fn with_max_buffering(mut self, value: Duration) -> Self {
        self.max_buffering = value;
        self
    }

    pub fn with_live_delay(mut self, value: Duration) -> Self {
        self.live_delay = value;
        self
    }
}
