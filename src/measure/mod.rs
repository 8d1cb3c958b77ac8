//! Measurement engine: latency probe, download sampler and upload estimator
//!
//! Each phase is exposed through a small async trait so the session can be
//! driven by real network implementations or by test doubles.

pub mod latency;
pub mod throughput;
pub mod upload;

pub use latency::LatencyProber;
pub use throughput::{BodyMode, RateReporter, SamplerConfig, ThroughputSampler};
pub use upload::UploadEstimator;

use crate::error::Result;
use crate::models::{SpeedSample, ThroughputReport};
use async_trait::async_trait;
use tokio::sync::watch;

/// Callback invoked for every progress sample a phase produces
pub type SampleSink<'a> = &'a (dyn Fn(SpeedSample) + Send + Sync);

/// Round-trip latency measurement
#[async_trait]
pub trait LatencyProbe: Send + Sync {
    /// Single round-trip time in whole milliseconds
    async fn measure_latency(&self) -> Result<u64>;
}

/// Sustained download throughput measurement
#[async_trait]
pub trait DownloadMeasure: Send + Sync {
    async fn measure_download(
        &self,
        on_sample: SampleSink<'_>,
        cancel: &CancellationHandle,
    ) -> Result<ThroughputReport>;
}

/// Upload rate estimation from a download baseline
#[async_trait]
pub trait UploadEstimate: Send + Sync {
    async fn estimate_upload(&self, baseline_mbps: f64, on_sample: SampleSink<'_>) -> f64;
}

/// Cooperative cancellation signal shared by all download loops
///
/// Clones observe the same signal. Cancelling is idempotent.
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    sender: std::sync::Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl CancellationHandle {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: std::sync::Arc::new(sender),
            receiver,
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once `cancel` has been called on any clone
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        // The sender lives as long as any handle, so this only errors if
        // every handle is gone, which cannot happen while `self` exists.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancellation_is_shared_between_clones() {
        let handle = CancellationHandle::new();
        let observer = handle.clone();
        assert!(!observer.is_cancelled());

        let waiter = tokio::spawn(async move {
            observer.cancelled().await;
            observer.is_cancelled()
        });

        handle.cancel();
        handle.cancel();
        let observed = tokio::time::timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
        assert!(observed);
    }

    #[tokio::test]
    async fn test_cancelled_returns_immediately_when_already_cancelled() {
        let handle = CancellationHandle::new();
        handle.cancel();
        tokio::time::timeout(Duration::from_millis(100), handle.cancelled())
            .await
            .unwrap();
    }
}
