//! Concurrent download throughput sampler
//!
//! A fixed number of download loops share one deadline, one byte counter and
//! one rate reporter. Each loop keeps pulling its current target until it
//! fails, then rotates to the next target in the registry after a short
//! cooldown. Every send, chunk read and cooldown is raced against the window
//! deadline and the caller's cancellation signal, so the window closes on time
//! even when a target stalls mid-body. The request timeout bounds the wait
//! for headers and for each chunk, not the transfer as a whole.

use super::{CancellationHandle, DownloadMeasure, SampleSink};
use crate::client::{cache_busted, ConnectivityCheck, SystemConnectivity};
use crate::defaults;
use crate::error::{AppError, Result};
use crate::logging::MeasurementLogger;
use crate::models::{mbps, Config, SpeedSample, ThroughputReport};
use crate::targets::{Target, TargetRegistry};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, Response};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep_until, timeout, Instant};

/// How a successful response body is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Credit bytes chunk by chunk as they arrive
    Streaming,
    /// Read the whole body, then credit it in one step
    Buffered,
}

/// Tuning of one download window
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub window: Duration,
    pub concurrency: usize,
    pub retry_cooldown: Duration,
    pub request_timeout: Duration,
    pub report_interval: Duration,
    pub body_mode: BodyMode,
}

impl SamplerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            window: config.download_window(),
            concurrency: config.concurrency,
            request_timeout: config.request_timeout(),
            ..Self::default()
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            window: defaults::DEFAULT_DOWNLOAD_WINDOW,
            concurrency: defaults::DEFAULT_CONCURRENCY,
            retry_cooldown: defaults::RETRY_COOLDOWN,
            request_timeout: defaults::DEFAULT_REQUEST_TIMEOUT,
            report_interval: defaults::REPORT_INTERVAL,
            body_mode: BodyMode::Streaming,
        }
    }
}

#[derive(Debug)]
struct ReporterState {
    previous_total: u64,
    last_report: Instant,
    emitted: u64,
}

/// Turns the shared byte counter into instantaneous rate samples
///
/// A sample covers the bytes credited since the previous sample, whichever
/// loop credited them. Samples are spaced at least `interval` apart.
#[derive(Debug)]
pub struct RateReporter {
    start: Instant,
    interval: Duration,
    state: Mutex<ReporterState>,
}

impl RateReporter {
    pub fn new(start: Instant, interval: Duration) -> Self {
        Self {
            start,
            interval,
            state: Mutex::new(ReporterState {
                previous_total: 0,
                last_report: start,
                emitted: 0,
            }),
        }
    }

    /// Record the counter value `total`, returning a sample if one is due
    pub fn observe(&self, total: u64) -> Option<SpeedSample> {
        self.observe_at(total, Instant::now())
    }

    pub fn observe_at(&self, total: u64, now: Instant) -> Option<SpeedSample> {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let time_diff = now.saturating_duration_since(state.last_report);
        if time_diff <= self.interval {
            return None;
        }

        let rate = mbps(total.saturating_sub(state.previous_total), time_diff);
        state.previous_total = total.max(state.previous_total);
        state.last_report = now;
        state.emitted += 1;

        Some(SpeedSample::now(rate))
    }

    /// Average rate from the start of the window up to the last sample
    pub fn cumulative_mbps(&self) -> f64 {
        let state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        mbps(state.previous_total, state.last_report.saturating_duration_since(self.start))
    }

    pub fn emitted(&self) -> u64 {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).emitted
    }
}

/// State shared by all loops of one download window
struct Window<'a> {
    bytes: AtomicU64,
    active: AtomicBool,
    deadline: Instant,
    reporter: RateReporter,
    on_sample: SampleSink<'a>,
    cancel: &'a CancellationHandle,
}

impl<'a> Window<'a> {
    fn new(
        start: Instant,
        config: &SamplerConfig,
        on_sample: SampleSink<'a>,
        cancel: &'a CancellationHandle,
    ) -> Self {
        Self {
            bytes: AtomicU64::new(0),
            active: AtomicBool::new(!cancel.is_cancelled()),
            deadline: start + config.window,
            reporter: RateReporter::new(start, config.report_interval),
            on_sample,
            cancel,
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn close(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Credit `len` bytes to the window; ignored once the window has closed
    fn record(&self, len: usize) {
        if !self.is_active() {
            return;
        }
        if Instant::now() >= self.deadline {
            self.close();
            return;
        }

        self.bytes.fetch_add(len as u64, Ordering::AcqRel);
        if let Some(sample) = self.reporter.observe(self.bytes.load(Ordering::Acquire)) {
            (self.on_sample)(sample);
        }
    }

    fn total_bytes(&self) -> u64 {
        self.bytes.load(Ordering::Acquire)
    }

    /// Run `fut` until it finishes, the deadline passes or the caller cancels
    ///
    /// Returns `None` and closes the window in the latter two cases.
    async fn race<F: Future>(&self, fut: F) -> Option<F::Output> {
        if !self.is_active() {
            return None;
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                self.close();
                None
            }
            _ = sleep_until(self.deadline) => {
                self.close();
                None
            }
            output = fut => Some(output),
        }
    }

    /// Sleep for `cooldown`, never past the deadline. Returns false if the window closed.
    async fn pause(&self, cooldown: Duration) -> bool {
        let wake = (Instant::now() + cooldown).min(self.deadline);
        self.race(sleep_until(wake)).await.is_some() && self.is_active()
    }
}

/// Result of one request against one target
#[derive(Debug, PartialEq)]
enum FetchOutcome {
    /// Body fully read; the loop re-requests the same target
    Completed,
    /// Target failed; the loop rotates
    Failed(String),
    /// Window closed or cancelled
    Stopped,
}

/// Measures sustained download throughput over a fixed window
pub struct ThroughputSampler {
    client: Client,
    targets: Arc<TargetRegistry>,
    config: SamplerConfig,
    connectivity: Arc<dyn ConnectivityCheck>,
    logger: MeasurementLogger,
}

impl ThroughputSampler {
    pub fn new(client: Client, targets: Arc<TargetRegistry>, config: SamplerConfig) -> Self {
        Self {
            client,
            targets,
            config,
            connectivity: Arc::new(SystemConnectivity::new()),
            logger: MeasurementLogger::quiet(),
        }
    }

    pub fn with_connectivity(mut self, connectivity: Arc<dyn ConnectivityCheck>) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn with_logger(mut self, logger: MeasurementLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    async fn download_loop(&self, index: usize, window: &Window<'_>) {
        let mut cursor = self.targets.start_cursor(index);

        while window.is_active() {
            let target = self.targets.download_at(cursor);
            match self.fetch_once(index, target, window).await {
                FetchOutcome::Completed => continue,
                FetchOutcome::Stopped => break,
                FetchOutcome::Failed(reason) => {
                    let next = self.targets.next_cursor(cursor);
                    self.logger
                        .target_rotated(
                            index,
                            target.url().as_str(),
                            self.targets.download_at(next).url().as_str(),
                            &reason,
                        )
                        .await;
                    cursor = next;

                    if !window.pause(self.config.retry_cooldown).await {
                        break;
                    }
                }
            }
        }
    }

    async fn fetch_once(&self, index: usize, target: &Target, window: &Window<'_>) -> FetchOutcome {
        let token = format!("{}-{}", Utc::now().timestamp_millis(), index);
        let request = self
            .client
            .get(cache_busted(target.url(), &token))
            .header(CACHE_CONTROL, "no-store")
            .send();

        let response = match window.race(timeout(self.config.request_timeout, request)).await {
            None => return FetchOutcome::Stopped,
            Some(Err(_)) => return FetchOutcome::Failed(self.stalled("no response")),
            Some(Ok(Err(e))) => return FetchOutcome::Failed(describe_failure(&e)),
            Some(Ok(Ok(response))) => response,
        };

        if !response.status().is_success() {
            return FetchOutcome::Failed(format!("HTTP {}", response.status()));
        }

        match self.config.body_mode {
            BodyMode::Streaming => self.stream_body(response, window).await,
            BodyMode::Buffered => self.buffer_body(response, window).await,
        }
    }

    /// Each chunk gets the full request timeout, so a slow but steady body is never cut off
    async fn stream_body(&self, mut response: Response, window: &Window<'_>) -> FetchOutcome {
        loop {
            match window.race(timeout(self.config.request_timeout, response.chunk())).await {
                None => return FetchOutcome::Stopped,
                Some(Err(_)) => return FetchOutcome::Failed(self.stalled("body stalled")),
                Some(Ok(Ok(Some(chunk)))) => {
                    window.record(chunk.len());
                    if !window.is_active() {
                        return FetchOutcome::Stopped;
                    }
                }
                Some(Ok(Ok(None))) => return FetchOutcome::Completed,
                Some(Ok(Err(e))) => return FetchOutcome::Failed(describe_failure(&e)),
            }
        }
    }

    // Buffered bodies have no chunk boundaries, so the timeout covers the whole read
    async fn buffer_body(&self, response: Response, window: &Window<'_>) -> FetchOutcome {
        match window.race(timeout(self.config.request_timeout, response.bytes())).await {
            None => FetchOutcome::Stopped,
            Some(Err(_)) => FetchOutcome::Failed(self.stalled("body not received")),
            Some(Ok(Ok(body))) => {
                window.record(body.len());
                FetchOutcome::Completed
            }
            Some(Ok(Err(e))) => FetchOutcome::Failed(describe_failure(&e)),
        }
    }

    fn stalled(&self, what: &str) -> String {
        format!("{} within {} ms", what, self.config.request_timeout.as_millis())
    }
}

fn describe_failure(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    }
}

#[async_trait]
impl DownloadMeasure for ThroughputSampler {
    async fn measure_download(
        &self,
        on_sample: SampleSink<'_>,
        cancel: &CancellationHandle,
    ) -> Result<ThroughputReport> {
        let start = Instant::now();
        let window = Window::new(start, &self.config, on_sample, cancel);

        let loops = (0..self.config.concurrency.max(1)).map(|index| self.download_loop(index, &window));
        join_all(loops).await;
        window.close();

        let report = ThroughputReport::from_totals(window.total_bytes(), start.elapsed(), window.reporter.emitted());
        self.logger
            .download_finished(report.total_bytes, report.elapsed.as_millis(), report.mbps, report.samples_emitted)
            .await;

        if report.total_bytes == 0 {
            if cancel.is_cancelled() {
                return Err(AppError::interrupted("The download window was stopped before any data arrived"));
            }
            if !self.connectivity.is_online().await {
                return Err(AppError::offline("The host reports no network connectivity"));
            }
            return Err(AppError::no_data_received(format!(
                "None of the {} download targets delivered data within {} ms",
                self.targets.download_count(),
                self.config.window.as_millis()
            )));
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::StaticConnectivity;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BODY_SIZE: usize = 64 * 1024;

    fn sampler(server: &MockServer, paths: &[&str], config: SamplerConfig, online: bool) -> ThroughputSampler {
        let downloads: Vec<String> = paths.iter().map(|p| format!("{}{}", server.uri(), p)).collect();
        let registry = TargetRegistry::new(&format!("{}/ping", server.uri()), &downloads).unwrap();
        ThroughputSampler::new(Client::new(), Arc::new(registry), config)
            .with_connectivity(Arc::new(StaticConnectivity(online)))
    }

    fn short_window(concurrency: usize) -> SamplerConfig {
        SamplerConfig {
            window: Duration::from_millis(600),
            concurrency,
            retry_cooldown: Duration::from_millis(20),
            request_timeout: Duration::from_secs(2),
            report_interval: Duration::from_millis(50),
            body_mode: BodyMode::Streaming,
        }
    }

    async fn serve(server: &MockServer, at: &str, template: ResponseTemplate) {
        Mock::given(method("GET")).and(path(at)).respond_with(template).mount(server).await;
    }

    #[tokio::test]
    async fn test_measures_throughput_across_loops() {
        let server = MockServer::start().await;
        serve(&server, "/a.bin", ResponseTemplate::new(200).set_body_bytes(vec![7u8; BODY_SIZE])).await;
        serve(&server, "/b.bin", ResponseTemplate::new(200).set_body_bytes(vec![7u8; BODY_SIZE])).await;

        let samples = Mutex::new(Vec::new());
        let sink = |sample: SpeedSample| samples.lock().unwrap().push(sample);

        let sampler = sampler(&server, &["/a.bin", "/b.bin"], short_window(2), true);
        let report = sampler.measure_download(&sink, &CancellationHandle::new()).await.unwrap();

        assert!(report.total_bytes >= BODY_SIZE as u64);
        assert!(report.mbps > 0.0);
        assert!(report.elapsed >= Duration::from_millis(600));

        let samples = samples.into_inner().unwrap();
        assert!(!samples.is_empty());
        assert_eq!(samples.len() as u64, report.samples_emitted);
        assert!(samples.iter().all(|s| s.instantaneous_mbps >= 0.0));

        // Both loops ran, each starting on its own target
        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().any(|r| r.url.path() == "/a.bin"));
        assert!(requests.iter().any(|r| r.url.path() == "/b.bin"));
        assert!(requests.iter().all(|r| r.url.query().is_some_and(|q| q.starts_with("t="))));
    }

    #[tokio::test]
    async fn test_failing_target_rotates_to_next() {
        let server = MockServer::start().await;
        serve(&server, "/broken.bin", ResponseTemplate::new(503)).await;
        serve(&server, "/good.bin", ResponseTemplate::new(200).set_body_bytes(vec![1u8; BODY_SIZE])).await;

        let sampler = sampler(&server, &["/broken.bin", "/good.bin"], short_window(1), true);
        let report = sampler.measure_download(&|_| {}, &CancellationHandle::new()).await.unwrap();
        assert!(report.total_bytes > 0);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.path(), "/broken.bin");
        assert!(requests.iter().any(|r| r.url.path() == "/good.bin"));
    }

    #[tokio::test]
    async fn test_stalled_target_hits_request_timeout() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/stalled.bin",
            ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
        )
        .await;
        serve(&server, "/good.bin", ResponseTemplate::new(200).set_body_bytes(vec![1u8; BODY_SIZE])).await;

        let config = SamplerConfig {
            request_timeout: Duration::from_millis(150),
            ..short_window(1)
        };
        let sampler = sampler(&server, &["/stalled.bin", "/good.bin"], config, true);
        let report = sampler.measure_download(&|_| {}, &CancellationHandle::new()).await.unwrap();
        assert!(report.total_bytes > 0);
    }

    #[tokio::test]
    async fn test_no_data_when_every_target_fails() {
        let server = MockServer::start().await;
        serve(&server, "/a.bin", ResponseTemplate::new(500)).await;
        serve(&server, "/b.bin", ResponseTemplate::new(404)).await;

        let sampler = sampler(&server, &["/a.bin", "/b.bin"], short_window(2), true);
        let err = sampler.measure_download(&|_| {}, &CancellationHandle::new()).await.unwrap_err();
        assert!(matches!(err, AppError::NoDataReceived(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_offline_host_reports_offline() {
        let server = MockServer::start().await;
        serve(&server, "/a.bin", ResponseTemplate::new(500)).await;

        let sampler = sampler(&server, &["/a.bin"], short_window(1), false);
        let err = sampler.measure_download(&|_| {}, &CancellationHandle::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Offline(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_window_closes_on_stalled_body() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/slow.bin",
            ResponseTemplate::new(200).set_delay(Duration::from_secs(10)),
        )
        .await;

        let config = SamplerConfig {
            request_timeout: Duration::from_secs(30),
            ..short_window(2)
        };
        let sampler = sampler(&server, &["/slow.bin"], config, true);

        let started = std::time::Instant::now();
        let result = sampler.measure_download(&|_| {}, &CancellationHandle::new()).await;
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(matches!(result, Err(AppError::NoDataReceived(_))));
    }

    #[tokio::test]
    async fn test_cancellation_stops_early() {
        let server = MockServer::start().await;
        serve(&server, "/a.bin", ResponseTemplate::new(200).set_body_bytes(vec![1u8; BODY_SIZE])).await;

        let config = SamplerConfig {
            window: Duration::from_secs(30),
            ..short_window(2)
        };
        let sampler = sampler(&server, &["/a.bin"], config, true);
        let cancel = CancellationHandle::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let report = sampler.measure_download(&|_| {}, &cancel).await.unwrap();
        assert!(report.elapsed < Duration::from_secs(5));
        assert!(report.total_bytes > 0);
    }

    #[tokio::test]
    async fn test_cancel_before_window_is_interrupted() {
        let server = MockServer::start().await;
        serve(&server, "/a.bin", ResponseTemplate::new(200).set_body_bytes(vec![1u8; BODY_SIZE])).await;

        let config = SamplerConfig {
            window: Duration::from_secs(8),
            ..short_window(1)
        };
        let sampler = sampler(&server, &["/a.bin"], config, true);
        let cancel = CancellationHandle::new();
        cancel.cancel();

        let started = std::time::Instant::now();
        let err = sampler.measure_download(&|_| {}, &cancel).await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(matches!(err, AppError::Interrupted(_)), "got {:?}", err);
        assert_eq!(err.exit_code(), 130);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_slow_steady_body_outlives_request_timeout() {
        use std::sync::atomic::AtomicUsize;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        const CHUNK: usize = 4096;
        const CHUNKS: usize = 10;

        // Only the first connection gets a body: 10 chunks, 50 ms apart
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let seen = connections.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                if seen.fetch_add(1, Ordering::SeqCst) > 0 {
                    continue;
                }
                tokio::spawn(async move {
                    let mut request = [0u8; 1024];
                    let _ = socket.read(&mut request).await;
                    let head = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\n\r\n",
                        CHUNK * CHUNKS
                    );
                    if socket.write_all(head.as_bytes()).await.is_err() {
                        return;
                    }
                    for _ in 0..CHUNKS {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        if socket.write_all(&[3u8; CHUNK]).await.is_err() {
                            return;
                        }
                    }
                    let _ = socket.flush().await;
                });
            }
        });

        let url = format!("http://{}/slow.bin", addr);
        let registry = TargetRegistry::new(&url, &[url.clone()]).unwrap();
        let config = SamplerConfig {
            window: Duration::from_millis(1200),
            request_timeout: Duration::from_millis(200),
            ..short_window(1)
        };
        let sampler = ThroughputSampler::new(Client::new(), Arc::new(registry), config)
            .with_connectivity(Arc::new(StaticConnectivity(true)));

        let report = sampler.measure_download(&|_| {}, &CancellationHandle::new()).await.unwrap();
        assert_eq!(report.total_bytes, (CHUNK * CHUNKS) as u64);
    }

    #[tokio::test]
    async fn test_buffered_mode_credits_whole_bodies() {
        let server = MockServer::start().await;
        serve(&server, "/a.bin", ResponseTemplate::new(200).set_body_bytes(vec![1u8; BODY_SIZE])).await;

        let config = SamplerConfig {
            body_mode: BodyMode::Buffered,
            ..short_window(1)
        };
        let sampler = sampler(&server, &["/a.bin"], config, true);
        let report = sampler.measure_download(&|_| {}, &CancellationHandle::new()).await.unwrap();
        assert_eq!(report.total_bytes % BODY_SIZE as u64, 0);
        assert!(report.total_bytes > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reporter_spacing_and_rate() {
        let start = Instant::now();
        let reporter = RateReporter::new(start, Duration::from_millis(150));

        // Too soon after the start
        assert!(reporter.observe_at(1_000_000, start + Duration::from_millis(100)).is_none());

        // 1.25 MB over 250 ms is 40 Mbps
        let sample = reporter.observe_at(1_250_000, start + Duration::from_millis(250)).unwrap();
        assert!((sample.instantaneous_mbps - 40.0).abs() < 1e-9);

        // Exactly one interval later is not enough
        assert!(reporter.observe_at(2_000_000, start + Duration::from_millis(400)).is_none());

        // Only bytes since the previous sample count
        let sample = reporter.observe_at(2_500_000, start + Duration::from_millis(500)).unwrap();
        assert!((sample.instantaneous_mbps - 40.0).abs() < 1e-9);

        assert_eq!(reporter.emitted(), 2);
        assert!((reporter.cumulative_mbps() - 40.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_window_ignores_bytes() {
        let cancel = CancellationHandle::new();
        let config = SamplerConfig::default();
        let sink = |_: SpeedSample| {};
        let window = Window::new(Instant::now(), &config, &sink, &cancel);

        window.record(100);
        assert_eq!(window.total_bytes(), 100);

        window.close();
        window.record(100);
        assert_eq!(window.total_bytes(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bytes_after_deadline_are_dropped() {
        let cancel = CancellationHandle::new();
        let config = SamplerConfig {
            window: Duration::from_millis(500),
            ..SamplerConfig::default()
        };
        let sink = |_: SpeedSample| {};
        let window = Window::new(Instant::now(), &config, &sink, &cancel);

        tokio::time::advance(Duration::from_millis(600)).await;
        window.record(4096);
        assert_eq!(window.total_bytes(), 0);
        assert!(!window.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_never_outlives_deadline() {
        let cancel = CancellationHandle::new();
        let config = SamplerConfig {
            window: Duration::from_millis(100),
            ..SamplerConfig::default()
        };
        let start = Instant::now();
        let sink = |_: SpeedSample| {};
        let window = Window::new(start, &config, &sink, &cancel);

        assert!(!window.pause(Duration::from_secs(5)).await);
        assert!(Instant::now() - start <= Duration::from_millis(101));
    }
}
