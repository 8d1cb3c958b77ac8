//! Single-shot round-trip latency probe

use super::LatencyProbe;
use crate::client::cache_busted;
use crate::error::{AppError, Result};
use crate::logging::MeasurementLogger;
use crate::targets::Target;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use std::time::{Duration, Instant};
use url::Url;

/// Times one cache-defeated request against the probe target
///
/// The response status is irrelevant: any response that arrives before the
/// deadline counts as a round trip. There are no retries.
pub struct LatencyProber {
    client: Client,
    target: Url,
    deadline: Duration,
    logger: MeasurementLogger,
}

impl LatencyProber {
    pub fn new(client: Client, target: &Target, deadline: Duration) -> Self {
        Self {
            client,
            target: target.url().clone(),
            deadline,
            logger: MeasurementLogger::quiet(),
        }
    }

    pub fn with_logger(mut self, logger: MeasurementLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

#[async_trait]
impl LatencyProbe for LatencyProber {
    async fn measure_latency(&self) -> Result<u64> {
        let url = cache_busted(&self.target, &Utc::now().timestamp_millis().to_string());
        let request = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-store")
            .send();

        let start = Instant::now();
        let response = tokio::time::timeout(self.deadline, request)
            .await
            .map_err(|_| {
                AppError::probe_timeout(format!(
                    "No response from {} within {} ms",
                    self.target,
                    self.deadline.as_millis()
                ))
            })?;
        let elapsed = start.elapsed();

        match response {
            Ok(_) => {
                let ping_ms = (elapsed.as_secs_f64() * 1000.0).round() as u64;
                self.logger.latency_measured(self.target.as_str(), ping_ms).await;
                Ok(ping_ms)
            }
            Err(e) if e.is_timeout() => Err(AppError::probe_timeout(format!(
                "Request to {} timed out",
                self.target
            ))),
            Err(e) => Err(AppError::probe_unreachable(format!(
                "{} is unreachable: {}",
                self.target, e
            ))),
        }
    }
}
