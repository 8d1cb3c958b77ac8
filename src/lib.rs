//! Network Speed Tester
//!
//! Measures the latency and throughput of the caller's network path with plain
//! HTTP requests against public endpoints. A measurement session runs a
//! latency probe, a concurrent download sampler and an upload estimate derived
//! from the download figure, streaming live readings along the way.

pub mod analysis;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod measure;
pub mod models;
pub mod netinfo;
pub mod output;
pub mod session;
pub mod stats;
pub mod targets;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use measure::{LatencyProber, ThroughputSampler, UploadEstimator};
pub use models::{AnalysisSummary, Config, MeasurementResult, NetworkInfo, SpeedSample};
pub use session::{MeasurementSession, SessionObserver};
pub use targets::TargetRegistry;
pub use types::{Phase, SessionState};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");

/// Short build description shown in debug mode
pub fn build_info() -> String {
    match option_env!("GIT_COMMIT") {
        Some(commit) => format!("{} v{} ({}, {}, built {})", PKG_NAME, VERSION, commit, TARGET_TRIPLE, BUILD_TIME),
        None => format!("{} v{} ({}, built {})", PKG_NAME, VERSION, TARGET_TRIPLE, BUILD_TIME),
    }
}

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_DOWNLOAD_TARGETS: &[&str] = &[
        "https://upload.wikimedia.org/wikipedia/commons/f/ff/Pizigani_1367_Chart_10MB.jpg",
        "https://images.pexels.com/photos/248797/pexels-photo-248797.jpeg",
        "https://upload.wikimedia.org/wikipedia/commons/2/2d/Snake_River_%285mb%29.jpg",
        "https://upload.wikimedia.org/wikipedia/commons/d/d6/Warp_trails.jpg",
    ];
    pub const DEFAULT_PING_TARGET: &str = "https://www.google.com/favicon.ico";

    pub const DEFAULT_DOWNLOAD_WINDOW: Duration = Duration::from_millis(8000);
    pub const DEFAULT_CONCURRENCY: usize = 2;
    pub const DEFAULT_UPLOAD_DURATION: Duration = Duration::from_millis(5000);
    pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_millis(2000);
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(15);

    /// Pause before a download loop retries on the next target
    pub const RETRY_COOLDOWN: Duration = Duration::from_millis(200);
    /// Minimum spacing between two live download samples
    pub const REPORT_INTERVAL: Duration = Duration::from_millis(150);
    /// Cadence of synthetic upload samples
    pub const UPLOAD_TICK: Duration = Duration::from_millis(100);
    /// Baseline used by the upload estimate when no download figure exists
    pub const FALLBACK_BASELINE_MBPS: f64 = 25.0;

    pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
