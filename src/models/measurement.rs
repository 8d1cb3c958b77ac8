//! Measurement data models: live samples, phase outcomes and the final result

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Convert a byte count observed over `elapsed` into megabits per second
pub fn mbps(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        (bytes as f64 * 8.0) / (secs * 1_000_000.0)
    } else {
        0.0
    }
}

/// A point-in-time rate estimate streamed to progress observers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedSample {
    /// Wall-clock time of the sample, milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    /// Rate over the interval since the previous sample
    pub instantaneous_mbps: f64,
}

impl SpeedSample {
    pub fn new(timestamp_ms: i64, instantaneous_mbps: f64) -> Self {
        Self { timestamp_ms, instantaneous_mbps }
    }

    /// Sample stamped with the current wall-clock time
    pub fn now(instantaneous_mbps: f64) -> Self {
        Self::new(Utc::now().timestamp_millis(), instantaneous_mbps)
    }
}

/// Everything the download sampler observed over its window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThroughputReport {
    /// Average rate over the whole window
    pub mbps: f64,
    pub total_bytes: u64,
    pub elapsed: Duration,
    pub samples_emitted: u64,
}

impl ThroughputReport {
    pub fn from_totals(total_bytes: u64, elapsed: Duration, samples_emitted: u64) -> Self {
        Self {
            mbps: mbps(total_bytes, elapsed),
            total_bytes,
            elapsed,
            samples_emitted,
        }
    }
}

/// Terminal outcome of one successful session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    ping_ms: u64,
    download_mbps: f64,
    upload_mbps: f64,
    completed_at: DateTime<Utc>,
}

impl MeasurementResult {
    /// Build a result stamped with the current time
    ///
    /// Rates must be finite and non-negative; a failed measurement has no
    /// result at all rather than a zero one.
    pub fn new(ping_ms: u64, download_mbps: f64, upload_mbps: f64) -> Result<Self> {
        Self::with_timestamp(ping_ms, download_mbps, upload_mbps, Utc::now())
    }

    pub fn with_timestamp(
        ping_ms: u64,
        download_mbps: f64,
        upload_mbps: f64,
        completed_at: DateTime<Utc>,
    ) -> Result<Self> {
        for (name, value) in [("download", download_mbps), ("upload", upload_mbps)] {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::validation(format!(
                    "{} rate must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(Self {
            ping_ms,
            download_mbps,
            upload_mbps,
            completed_at,
        })
    }

    pub fn ping_ms(&self) -> u64 {
        self.ping_ms
    }

    pub fn download_mbps(&self) -> f64 {
        self.download_mbps
    }

    pub fn upload_mbps(&self) -> f64 {
        self.upload_mbps
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

/// Connection assessment produced by the analysis collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// One or two sentence technical summary
    pub summary: String,
    /// 4K/8K streaming assessment
    pub streaming: String,
    /// Competitive gaming assessment
    pub gaming: String,
    /// Video conferencing assessment
    #[serde(rename = "videoCalls")]
    pub video_calls: String,
}

/// What became of the analysis step of a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum AnalysisOutcome {
    /// No analyzer configured or analysis disabled
    #[default]
    Skipped,
    Available(AnalysisSummary),
    /// The analyzer failed, timed out or returned nothing
    Unavailable(String),
}

impl AnalysisOutcome {
    pub fn summary(&self) -> Option<&AnalysisSummary> {
        match self {
            AnalysisOutcome::Available(summary) => Some(summary),
            _ => None,
        }
    }
}

/// Public network identity of the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub ip: String,
    pub isp: String,
    pub location: String,
    /// "IPv4", "IPv6" or "N/A" when unknown
    pub address_family: String,
}

impl NetworkInfo {
    /// Placeholder used when every provider failed
    pub fn unknown() -> Self {
        Self {
            ip: "Unknown".to_string(),
            isp: "Unknown Provider".to_string(),
            location: "Unknown".to_string(),
            address_family: "N/A".to_string(),
        }
    }

    pub fn is_known(&self) -> bool {
        self.ip != "Unknown"
    }
}
