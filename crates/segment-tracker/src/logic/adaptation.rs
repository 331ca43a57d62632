use std::sync::Arc;
use std::time::Duration;

use media_types::{StreamFormat, TrackRole};

use super::BufferingTargets;
use crate::playlist::{AdaptationSet, Representation};

/// Everything a quality policy gets to look at when choosing.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    pub adaptation_set: &'a AdaptationSet,
    /// Representation currently being sequenced, `None` on a fresh start
    pub current: Option<&'a Arc<dyn Representation>>,
    pub role: TrackRole,
    pub format: StreamFormat,
    pub buffering: Option<BufferingTargets>,
}

/// Pluggable quality-selection policy.
pub trait AdaptationLogic: Send + Sync {
    /// Preferred representation, or `None` when nothing is acceptable.
    fn select(&self, ctx: &SelectionContext<'_>) -> Option<Arc<dyn Representation>>;

    /// Feed a completed download so rate-driven policies can adapt.
    fn update_download_rate(&self, _bytes: u64, _elapsed: Duration) {}

    fn name(&self) -> &str {
        "custom"
    }
}

/// Always the highest declared bandwidth.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysBestLogic;

impl AdaptationLogic for AlwaysBestLogic {
    fn select(&self, ctx: &SelectionContext<'_>) -> Option<Arc<dyn Representation>> {
        ctx.adaptation_set.best().cloned()
    }

    fn name(&self) -> &str {
        "always-best"
    }
}

/// Always the lowest declared bandwidth.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysLowestLogic;

impl AdaptationLogic for AlwaysLowestLogic {
    fn select(&self, ctx: &SelectionContext<'_>) -> Option<Arc<dyn Representation>> {
        ctx.adaptation_set.lowest().cloned()
    }

    fn name(&self) -> &str {
        "always-lowest"
    }
}

/// Highest bandwidth that fits a fixed budget, falling back to the lowest.
#[derive(Debug, Clone, Copy)]
pub struct FixedRateLogic {
    bps: u64,
}

impl FixedRateLogic {
    pub fn new(bps: u64) -> Self {
        Self { bps }
    }
}

impl AdaptationLogic for FixedRateLogic {
    fn select(&self, ctx: &SelectionContext<'_>) -> Option<Arc<dyn Representation>> {
        best_within(ctx.adaptation_set, self.bps)
            .or_else(|| ctx.adaptation_set.lowest())
            .cloned()
    }

    fn name(&self) -> &str {
        "fixed-rate"
    }
}

/// Highest bandwidth `<= budget`, first listed on ties.
pub(crate) fn best_within(set: &AdaptationSet, budget: u64) -> Option<&Arc<dyn Representation>> {
    set.representations()
        .iter()
        .rev()
        .filter(|r| r.bandwidth() <= budget)
        .max_by_key(|r| r.bandwidth())
}
