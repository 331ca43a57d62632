// Pluggable policies consulted by the tracker: quality selection and
// buffering targets, with reference implementations of each.

mod adaptation;
mod buffering;
mod rate_based;

pub use adaptation::{
    AdaptationLogic, AlwaysBestLogic, AlwaysLowestLogic, FixedRateLogic, SelectionContext,
};
pub use buffering::{BufferingLogic, BufferingTargets, DefaultBufferingLogic, MIN_BUFFERING_FLOOR};
pub use rate_based::{RateBasedLogic, ThroughputEstimator};
