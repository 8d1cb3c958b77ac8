//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Measurement phases, in the order a session runs them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Latency,
    Download,
    Upload,
}

impl Phase {
    /// Label used when a phase failure is reported to the user
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            Phase::Latency => "Latency test failed",
            Phase::Download => "Download test failed",
            Phase::Upload => "Upload estimate failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Latency => write!(f, "Ping"),
            Phase::Download => write!(f, "Download"),
            Phase::Upload => write!(f, "Upload"),
        }
    }
}

/// Lifecycle of a measurement session
///
/// ```text
/// Idle -> MeasuringLatency -> MeasuringDownload -> MeasuringUpload -> Analyzing -> Complete
///              \___________________\___________________\__________-> Failed
/// ```
///
/// `Complete` and `Failed` are terminal; the only way out is a restart into
/// `MeasuringLatency`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason")]
pub enum SessionState {
    Idle,
    MeasuringLatency,
    MeasuringDownload,
    MeasuringUpload,
    Analyzing,
    Complete,
    Failed(String),
}

impl SessionState {
    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: &SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, MeasuringLatency)
                | (Complete, MeasuringLatency)
                | (Failed(_), MeasuringLatency)
                | (MeasuringLatency, MeasuringDownload)
                | (MeasuringDownload, MeasuringUpload)
                | (MeasuringUpload, Analyzing)
                | (Analyzing, Complete)
                | (MeasuringLatency, Failed(_))
                | (MeasuringDownload, Failed(_))
                | (MeasuringUpload, Failed(_))
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Complete | SessionState::Failed(_))
    }

    /// Whether a new run may start from this state
    pub fn can_start(&self) -> bool {
        matches!(self, SessionState::Idle | SessionState::Complete | SessionState::Failed(_))
    }

    /// The measurement phase this state is running, if any
    pub fn phase(&self) -> Option<Phase> {
        match self {
            SessionState::MeasuringLatency => Some(Phase::Latency),
            SessionState::MeasuringDownload => Some(Phase::Download),
            SessionState::MeasuringUpload => Some(Phase::Upload),
            _ => None,
        }
    }

    /// Short human-readable label for status lines
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "Ready",
            SessionState::MeasuringLatency => "Measuring latency",
            SessionState::MeasuringDownload => "Testing download",
            SessionState::MeasuringUpload => "Estimating upload",
            SessionState::Analyzing => "Analyzing",
            SessionState::Complete => "Complete",
            SessionState::Failed(_) => "Failed",
        }
    }
}

/// Throughput classification used for color coding
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedLevel {
    /// 100 Mbps and above
    Fast,
    /// 25-100 Mbps
    Moderate,
    /// 5-25 Mbps
    Slow,
    /// Below 5 Mbps
    VerySlow,
}

impl SpeedLevel {
    pub fn from_mbps(mbps: f64) -> Self {
        if mbps >= 100.0 {
            Self::Fast
        } else if mbps >= 25.0 {
            Self::Moderate
        } else if mbps >= 5.0 {
            Self::Slow
        } else {
            Self::VerySlow
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Fast => "Fast",
            Self::Moderate => "Moderate",
            Self::Slow => "Slow",
            Self::VerySlow => "Very Slow",
        }
    }
}

/// Latency classification based on round-trip time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LatencyLevel {
    /// Below 50 ms
    Excellent,
    /// 50-100 ms
    Good,
    /// 100-300 ms
    Fair,
    /// 300 ms and above
    Poor,
}

impl LatencyLevel {
    pub fn from_ping_ms(ping_ms: u64) -> Self {
        match ping_ms {
            0..=49 => Self::Excellent,
            50..=99 => Self::Good,
            100..=299 => Self::Fair,
            _ => Self::Poor,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            SessionState::Idle,
            SessionState::MeasuringLatency,
            SessionState::MeasuringDownload,
            SessionState::MeasuringUpload,
            SessionState::Analyzing,
            SessionState::Complete,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(&pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_failed_only_from_measuring_states() {
        let failed = SessionState::Failed("boom".to_string());
        assert!(SessionState::MeasuringLatency.can_transition_to(&failed));
        assert!(SessionState::MeasuringDownload.can_transition_to(&failed));
        assert!(SessionState::MeasuringUpload.can_transition_to(&failed));

        assert!(!SessionState::Idle.can_transition_to(&failed));
        assert!(!SessionState::Analyzing.can_transition_to(&failed));
        assert!(!SessionState::Complete.can_transition_to(&failed));
    }

    #[test]
    fn test_restart_is_only_exit_from_terminal_states() {
        let failed = SessionState::Failed("x".to_string());
        for terminal in [SessionState::Complete, failed] {
            assert!(terminal.is_terminal());
            assert!(terminal.can_transition_to(&SessionState::MeasuringLatency));
            assert!(!terminal.can_transition_to(&SessionState::MeasuringDownload));
            assert!(!terminal.can_transition_to(&SessionState::Idle));
        }
    }

    #[test]
    fn test_no_phase_skipping() {
        assert!(!SessionState::MeasuringLatency.can_transition_to(&SessionState::MeasuringUpload));
        assert!(!SessionState::MeasuringDownload.can_transition_to(&SessionState::Complete));
        assert!(!SessionState::Idle.can_transition_to(&SessionState::Complete));
    }

    #[test]
    fn test_levels() {
        assert_eq!(SpeedLevel::from_mbps(320.0), SpeedLevel::Fast);
        assert_eq!(SpeedLevel::from_mbps(45.0), SpeedLevel::Moderate);
        assert_eq!(SpeedLevel::from_mbps(7.5), SpeedLevel::Slow);
        assert_eq!(SpeedLevel::from_mbps(2.5), SpeedLevel::VerySlow);

        assert_eq!(LatencyLevel::from_ping_ms(12), LatencyLevel::Excellent);
        assert_eq!(LatencyLevel::from_ping_ms(99), LatencyLevel::Good);
        assert_eq!(LatencyLevel::from_ping_ms(150), LatencyLevel::Fair);
        assert_eq!(LatencyLevel::from_ping_ms(1200), LatencyLevel::Poor);
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&SessionState::Failed("offline".to_string())).unwrap();
        assert_eq!(json, r#"{"state":"Failed","reason":"offline"}"#);
        assert_eq!(SessionState::MeasuringDownload.phase(), Some(Phase::Download));
        assert_eq!(SessionState::Analyzing.phase(), None);
    }
}
