// Rate-based adaptation: picks the highest representation whose bandwidth
// fits a throughput estimate built from completed downloads.
//
// The estimate is the smaller of a fast and a slow exponentially weighted
// moving average, so drops are followed quickly and spikes are not.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use super::adaptation::best_within;
use super::{AdaptationLogic, SelectionContext};
use crate::playlist::Representation;

#[derive(Debug, Clone)]
struct Ewma {
    alpha: f64,
    last_estimate: f64,
    total_weight: f64,
}

impl Ewma {
    fn new(half_life_secs: f64) -> Self {
        Self {
            alpha: f64::exp(0.5_f64.ln() / half_life_secs.max(0.001)),
            last_estimate: 0.0,
            total_weight: 0.0,
        }
    }

    fn add_sample(&mut self, weight: f64, value: f64) {
        let adj_alpha = self.alpha.powf(weight.max(0.0));
        self.last_estimate = value * (1.0 - adj_alpha) + adj_alpha * self.last_estimate;
        self.total_weight += weight.max(0.0);
    }

    fn estimate(&self) -> f64 {
        if self.total_weight <= 0.0 {
            return 0.0;
        }
        // Undo the bias towards the zero initial estimate.
        let zero_factor = 1.0 - self.alpha.powf(self.total_weight);
        if zero_factor <= 0.0 {
            0.0
        } else {
            self.last_estimate / zero_factor
        }
    }
}

/// Dual half-life throughput estimator.
#[derive(Debug, Clone)]
pub struct ThroughputEstimator {
    fast: Ewma,
    slow: Ewma,
    samples: u64,
}

impl ThroughputEstimator {
    const FAST_HALF_LIFE_SECS: f64 = 2.0;
    const SLOW_HALF_LIFE_SECS: f64 = 10.0;
    /// Smaller downloads are dominated by latency and say little about rate.
    const MIN_SAMPLE_BYTES: u64 = 16_000;
    const MIN_DURATION_MS: f64 = 0.5;

    pub fn new() -> Self {
        Self {
            fast: Ewma::new(Self::FAST_HALF_LIFE_SECS),
            slow: Ewma::new(Self::SLOW_HALF_LIFE_SECS),
            samples: 0,
        }
    }

    /// Returns whether the sample was accepted.
    pub fn push_sample(&mut self, bytes: u64, elapsed: Duration) -> bool {
        if bytes < Self::MIN_SAMPLE_BYTES {
            return false;
        }
        let dur_ms = (elapsed.as_secs_f64() * 1000.0).max(Self::MIN_DURATION_MS);
        let bps = (bytes as f64) * 8000.0 / dur_ms;
        let weight_secs = dur_ms / 1000.0;

        self.fast.add_sample(weight_secs, bps);
        self.slow.add_sample(weight_secs, bps);
        self.samples += 1;
        true
    }

    /// Estimated throughput in bits per second.
    pub fn estimate_bps(&self) -> Option<u64> {
        let estimate = self.fast.estimate().min(self.slow.estimate());
        (estimate > 0.0).then(|| estimate.round() as u64)
    }

    pub fn sample_count(&self) -> u64 {
        self.samples
    }
}

impl Default for ThroughputEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Throughput-driven [`AdaptationLogic`].
#[derive(Debug)]
pub struct RateBasedLogic {
    estimator: Mutex<ThroughputEstimator>,
    /// Fraction of the estimate considered usable
    safety_factor: f64,
}

impl RateBasedLogic {
    pub const DEFAULT_SAFETY_FACTOR: f64 = 0.8;

    pub fn new() -> Self {
        Self::with_safety_factor(Self::DEFAULT_SAFETY_FACTOR)
    }

    pub fn with_safety_factor(safety_factor: f64) -> Self {
        Self {
            estimator: Mutex::new(ThroughputEstimator::new()),
            safety_factor: safety_factor.clamp(0.05, 1.0),
        }
    }

    pub fn estimate_bps(&self) -> Option<u64> {
        self.estimator.lock().estimate_bps()
    }
}

impl Default for RateBasedLogic {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptationLogic for RateBasedLogic {
    fn select(&self, ctx: &SelectionContext<'_>) -> Option<Arc<dyn Representation>> {
        let set = ctx.adaptation_set;
        let Some(estimate) = self.estimate_bps() else {
            // Nothing measured yet: stay put, or start low.
            return ctx.current.cloned().or_else(|| set.lowest().cloned());
        };

        let budget = (estimate as f64 * self.safety_factor) as u64;
        best_within(set, budget).or_else(|| set.lowest()).cloned()
    }

    fn update_download_rate(&self, bytes: u64, elapsed: Duration) {
        let mut estimator = self.estimator.lock();
        if estimator.push_sample(bytes, elapsed) {
            debug!(
                bytes,
                elapsed_ms = elapsed.as_millis() as u64,
                estimate_bps = estimator.estimate_bps(),
                "Updated throughput estimate"
            );
        }
    }

    fn name(&self) -> &str {
        "rate-based"
    }
}
