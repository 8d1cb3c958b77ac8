//! Measurement session: runs the phases in order and owns their results
//!
//! A session moves through `Idle -> MeasuringLatency -> MeasuringDownload ->
//! MeasuringUpload -> Analyzing -> Complete`. Any measurement failure ends the
//! run in `Failed` and later phases never start. The analysis step can only
//! degrade the outcome, never fail it.

use crate::analysis::{GeminiAnalyzer, NetworkAnalyzer};
use crate::defaults;
use crate::error::{AppError, Result};
use crate::logging::MeasurementLogger;
use crate::measure::{
    CancellationHandle, DownloadMeasure, LatencyProbe, LatencyProber, SamplerConfig, ThroughputSampler,
    UploadEstimate, UploadEstimator,
};
use crate::models::{AnalysisOutcome, Config, MeasurementResult, NetworkInfo, SpeedSample, ThroughputReport};
use crate::stats::SampleStatistics;
use crate::targets::TargetRegistry;
use crate::types::{Phase, SessionState};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Receives progress from a running session
///
/// Callbacks run on the measuring task and must return quickly.
pub trait SessionObserver: Send + Sync {
    fn on_state_change(&self, _state: &SessionState) {}

    fn on_sample(&self, _phase: Phase, _sample: &SpeedSample) {}

    /// `value` is milliseconds for latency and Mbps otherwise
    fn on_phase_complete(&self, _phase: Phase, _value: f64) {}
}

/// Observer that ignores everything
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Serializable summary of a finished session
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub result: MeasurementResult,
    pub analysis: AnalysisOutcome,
    pub download_samples: SampleStatistics,
    pub upload_samples: SampleStatistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkInfo>,
}

pub struct MeasurementSession {
    latency: Box<dyn LatencyProbe>,
    download: Box<dyn DownloadMeasure>,
    upload: Box<dyn UploadEstimate>,
    analyzer: Option<Arc<dyn NetworkAnalyzer>>,
    analysis_timeout: Duration,
    logger: MeasurementLogger,
    cancel: CancellationHandle,

    state: SessionState,
    run_id: String,
    started_at: DateTime<Utc>,
    download_samples: Vec<SpeedSample>,
    upload_samples: Vec<SpeedSample>,
    ping_ms: Option<u64>,
    download_report: Option<ThroughputReport>,
    upload_mbps: Option<f64>,
    result: Option<MeasurementResult>,
    analysis: AnalysisOutcome,
}

impl MeasurementSession {
    pub fn new(
        latency: Box<dyn LatencyProbe>,
        download: Box<dyn DownloadMeasure>,
        upload: Box<dyn UploadEstimate>,
    ) -> Self {
        Self {
            latency,
            download,
            upload,
            analyzer: None,
            analysis_timeout: defaults::DEFAULT_ANALYSIS_TIMEOUT,
            logger: MeasurementLogger::quiet(),
            cancel: CancellationHandle::new(),
            state: SessionState::Idle,
            run_id: String::new(),
            started_at: Utc::now(),
            download_samples: Vec::new(),
            upload_samples: Vec::new(),
            ping_ms: None,
            download_report: None,
            upload_mbps: None,
            result: None,
            analysis: AnalysisOutcome::Skipped,
        }
    }

    /// Wire up the network-backed phases described by `config`
    pub fn from_config(config: &Config, client: Client, logger: MeasurementLogger) -> Result<Self> {
        let targets = Arc::new(TargetRegistry::from_config(config)?);

        let latency = LatencyProber::new(client.clone(), targets.probe(), config.ping_timeout())
            .with_logger(logger.clone());
        let sampler = ThroughputSampler::new(client.clone(), targets, SamplerConfig::from_config(config))
            .with_logger(logger.clone());
        let upload = UploadEstimator::new(config.upload_duration());

        let mut session = Self::new(Box::new(latency), Box::new(sampler), Box::new(upload)).with_logger(logger);
        if let Some(analyzer) = GeminiAnalyzer::from_config(client, config) {
            session = session.with_analyzer(Arc::new(analyzer));
        }
        Ok(session)
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn NetworkAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn with_analysis_timeout(mut self, timeout: Duration) -> Self {
        self.analysis_timeout = timeout;
        self
    }

    pub fn with_logger(mut self, logger: MeasurementLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Handle that stops the download window of the current or next run early
    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancel.clone()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn ping_ms(&self) -> Option<u64> {
        self.ping_ms
    }

    pub fn download_mbps(&self) -> Option<f64> {
        self.download_report.as_ref().map(|r| r.mbps)
    }

    pub fn download_report(&self) -> Option<&ThroughputReport> {
        self.download_report.as_ref()
    }

    pub fn upload_mbps(&self) -> Option<f64> {
        self.upload_mbps
    }

    pub fn result(&self) -> Option<&MeasurementResult> {
        self.result.as_ref()
    }

    pub fn analysis(&self) -> &AnalysisOutcome {
        &self.analysis
    }

    /// Samples collected during `phase`; latency produces none
    pub fn samples(&self, phase: Phase) -> &[SpeedSample] {
        match phase {
            Phase::Latency => &[],
            Phase::Download => &self.download_samples,
            Phase::Upload => &self.upload_samples,
        }
    }

    /// Report of the last run, if it completed
    pub fn report(&self, network: Option<NetworkInfo>) -> Option<SessionReport> {
        let result = self.result.clone()?;
        Some(SessionReport {
            run_id: self.run_id.clone(),
            started_at: self.started_at,
            result,
            analysis: self.analysis.clone(),
            download_samples: SampleStatistics::from_samples(&self.download_samples),
            upload_samples: SampleStatistics::from_samples(&self.upload_samples),
            download_bytes: self.download_report.as_ref().map(|r| r.total_bytes),
            network,
        })
    }

    /// Run every phase and return the final result
    ///
    /// Starting again after `Complete` or `Failed` discards the previous run.
    pub async fn run(&mut self, observer: &dyn SessionObserver) -> Result<MeasurementResult> {
        if !self.state.can_start() {
            return Err(AppError::internal(format!(
                "A session cannot start while {}",
                self.state.label().to_lowercase()
            )));
        }

        self.clear();
        self.transition(SessionState::MeasuringLatency, observer)?;

        // Latency
        self.logger.phase_started(Phase::Latency, &self.run_id).await;
        let ping_ms = match self.latency.measure_latency().await {
            Ok(ping_ms) => ping_ms,
            Err(e) => return Err(self.fail(Phase::Latency, e, observer).await),
        };
        self.ping_ms = Some(ping_ms);
        self.logger.phase_completed(Phase::Latency, &self.run_id, ping_ms as f64, "ms").await;
        observer.on_phase_complete(Phase::Latency, ping_ms as f64);

        // Download
        self.transition(SessionState::MeasuringDownload, observer)?;
        self.logger.phase_started(Phase::Download, &self.run_id).await;
        let collected = Mutex::new(Vec::new());
        let sink = |sample: SpeedSample| {
            observer.on_sample(Phase::Download, &sample);
            collected.lock().unwrap_or_else(|p| p.into_inner()).push(sample);
        };
        let outcome = self.download.measure_download(&sink, &self.cancel).await;
        self.download_samples = collected.into_inner().unwrap_or_else(|p| p.into_inner());
        let report = match outcome {
            Ok(report) => report,
            Err(e) => return Err(self.fail(Phase::Download, e, observer).await),
        };
        let download_mbps = report.mbps;
        self.download_report = Some(report);
        self.logger.phase_completed(Phase::Download, &self.run_id, download_mbps, "Mbps").await;
        observer.on_phase_complete(Phase::Download, download_mbps);

        // Upload, derived from the download figure
        self.transition(SessionState::MeasuringUpload, observer)?;
        self.logger.phase_started(Phase::Upload, &self.run_id).await;
        let collected = Mutex::new(Vec::new());
        let sink = |sample: SpeedSample| {
            observer.on_sample(Phase::Upload, &sample);
            collected.lock().unwrap_or_else(|p| p.into_inner()).push(sample);
        };
        let upload_mbps = self.upload.estimate_upload(download_mbps, &sink).await;
        self.upload_samples = collected.into_inner().unwrap_or_else(|p| p.into_inner());
        self.upload_mbps = Some(upload_mbps);
        self.logger.phase_completed(Phase::Upload, &self.run_id, upload_mbps, "Mbps").await;
        observer.on_phase_complete(Phase::Upload, upload_mbps);

        let result = match MeasurementResult::new(ping_ms, download_mbps, upload_mbps) {
            Ok(result) => result,
            Err(e) => return Err(self.fail(Phase::Upload, e, observer).await),
        };
        self.result = Some(result.clone());

        self.transition(SessionState::Analyzing, observer)?;
        self.analysis = self.analyze(&result).await;

        self.transition(SessionState::Complete, observer)?;
        Ok(result)
    }

    async fn analyze(&self, result: &MeasurementResult) -> AnalysisOutcome {
        let Some(analyzer) = &self.analyzer else {
            return AnalysisOutcome::Skipped;
        };

        let outcome = match tokio::time::timeout(self.analysis_timeout, analyzer.analyze(result)).await {
            Ok(Ok(Some(summary))) => AnalysisOutcome::Available(summary),
            Ok(Ok(None)) => AnalysisOutcome::Unavailable("the analyzer returned no assessment".to_string()),
            Ok(Err(e)) => AnalysisOutcome::Unavailable(e.to_string()),
            Err(_) => AnalysisOutcome::Unavailable(format!(
                "no answer within {} s",
                self.analysis_timeout.as_secs()
            )),
        };

        if let AnalysisOutcome::Unavailable(reason) = &outcome {
            self.logger.analysis_unavailable(&self.run_id, reason).await;
        }
        outcome
    }

    fn clear(&mut self) {
        self.run_id = Uuid::new_v4().to_string();
        self.started_at = Utc::now();
        self.download_samples.clear();
        self.upload_samples.clear();
        self.ping_ms = None;
        self.download_report = None;
        self.upload_mbps = None;
        self.result = None;
        self.analysis = AnalysisOutcome::Skipped;
        if self.cancel.is_cancelled() {
            self.cancel = CancellationHandle::new();
        }
    }

    fn transition(&mut self, next: SessionState, observer: &dyn SessionObserver) -> Result<()> {
        if !self.state.can_transition_to(&next) {
            return Err(AppError::internal(format!(
                "Invalid session transition from {:?} to {:?}",
                self.state, next
            )));
        }
        self.state = next;
        observer.on_state_change(&self.state);
        Ok(())
    }

    /// Move to `Failed` with a phase-prefixed reason and hand the error back
    async fn fail(&mut self, phase: Phase, error: AppError, observer: &dyn SessionObserver) -> AppError {
        self.logger.phase_failed(phase, &self.run_id, &error).await;
        let reason = format!("{}: {}", phase.failure_prefix(), error);
        if let Err(e) = self.transition(SessionState::Failed(reason), observer) {
            return e;
        }
        error
    }
}
