//! Data models and structures for the network speed tester

pub mod config;
pub mod measurement;

// Re-export main model types
pub use config::Config;
pub use measurement::{
    mbps, AnalysisOutcome, AnalysisSummary, MeasurementResult, NetworkInfo, SpeedSample,
    ThroughputReport,
};
