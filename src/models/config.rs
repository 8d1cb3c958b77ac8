//! Configuration data model and validation

use crate::defaults;
use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Download targets, rotated through by the throughput sampler
    #[serde(default = "default_download_targets")]
    pub download_targets: Vec<String>,

    /// Latency probe target
    #[serde(default = "default_ping_target")]
    pub ping_target: String,

    /// Length of the download measurement window in milliseconds
    #[serde(default = "default_download_window_ms")]
    pub download_window_ms: u64,

    /// Number of concurrent download loops
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Length of the upload estimate in milliseconds
    #[serde(default = "default_upload_duration_ms")]
    pub upload_duration_ms: u64,

    /// Hard deadline of the latency probe in milliseconds
    #[serde(default = "default_ping_timeout_ms")]
    pub ping_timeout_ms: u64,

    /// Per-request timeout for download transfers
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Run the connection analysis after a successful session
    #[serde(default = "default_true")]
    pub analysis_enabled: bool,

    /// Look up public IP / ISP / location before testing
    #[serde(default = "default_true")]
    pub show_network_info: bool,

    /// Gemini API key; never serialized
    #[serde(skip)]
    pub gemini_api_key: Option<String>,

    /// Gemini model used for the analysis
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Print the final report as JSON
    #[serde(default)]
    pub json_output: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

fn default_download_targets() -> Vec<String> {
    defaults::DEFAULT_DOWNLOAD_TARGETS.iter().map(|s| s.to_string()).collect()
}

fn default_ping_target() -> String {
    defaults::DEFAULT_PING_TARGET.to_string()
}

fn default_download_window_ms() -> u64 {
    defaults::DEFAULT_DOWNLOAD_WINDOW.as_millis() as u64
}

fn default_concurrency() -> usize {
    defaults::DEFAULT_CONCURRENCY
}

fn default_upload_duration_ms() -> u64 {
    defaults::DEFAULT_UPLOAD_DURATION.as_millis() as u64
}

fn default_ping_timeout_ms() -> u64 {
    defaults::DEFAULT_PING_TIMEOUT.as_millis() as u64
}

fn default_request_timeout_secs() -> u64 {
    defaults::DEFAULT_REQUEST_TIMEOUT.as_secs()
}

fn default_enable_color() -> bool {
    defaults::DEFAULT_ENABLE_COLOR
}

fn default_true() -> bool {
    true
}

fn default_gemini_model() -> String {
    defaults::DEFAULT_GEMINI_MODEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_targets: default_download_targets(),
            ping_target: default_ping_target(),
            download_window_ms: default_download_window_ms(),
            concurrency: default_concurrency(),
            upload_duration_ms: default_upload_duration_ms(),
            ping_timeout_ms: default_ping_timeout_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            enable_color: default_enable_color(),
            analysis_enabled: true,
            show_network_info: true,
            gemini_api_key: None,
            gemini_model: default_gemini_model(),
            json_output: false,
            verbose: false,
            debug: false,
        }
    }
}

/// Parse a comma-separated list, dropping empty entries
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Check that `value` is an absolute http(s) URL
pub(crate) fn validate_http_url(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AppError::config(format!("{} cannot be empty", field)));
    }

    let parsed = url::Url::parse(value)
        .map_err(|e| AppError::config(format!("Invalid {} '{}': {}", field, value, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::config(format!(
            "{} must use http or https, got '{}': {}",
            field, other, value
        ))),
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn download_window(&self) -> Duration {
        Duration::from_millis(self.download_window_ms)
    }

    pub fn upload_duration(&self) -> Duration {
        Duration::from_millis(self.upload_duration_ms)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Whether a Gemini analysis can be attempted
    pub fn analysis_available(&self) -> bool {
        self.analysis_enabled && self.gemini_api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Validate the configuration and return the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.download_targets.is_empty() {
            return Err(AppError::config("At least one download target is required"));
        }

        for target in &self.download_targets {
            validate_http_url("download target", target)?;
        }

        validate_http_url("ping target", &self.ping_target)?;

        if !(1000..=60_000).contains(&self.download_window_ms) {
            return Err(AppError::config(format!(
                "Download window must be between 1000 and 60000 ms, got {}",
                self.download_window_ms
            )));
        }

        if !(1..=16).contains(&self.concurrency) {
            return Err(AppError::config(format!(
                "Concurrency must be between 1 and 16, got {}",
                self.concurrency
            )));
        }

        if !(500..=60_000).contains(&self.upload_duration_ms) {
            return Err(AppError::config(format!(
                "Upload duration must be between 500 and 60000 ms, got {}",
                self.upload_duration_ms
            )));
        }

        if !(100..=10_000).contains(&self.ping_timeout_ms) {
            return Err(AppError::config(format!(
                "Ping timeout must be between 100 and 10000 ms, got {}",
                self.ping_timeout_ms
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(AppError::config("Request timeout must be greater than 0"));
        }

        if self.request_timeout_secs > 300 {
            return Err(AppError::config("Request timeout cannot exceed 300 seconds"));
        }

        if self.gemini_model.trim().is_empty() {
            return Err(AppError::config("Gemini model name cannot be empty"));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(targets) = std::env::var("DOWNLOAD_TARGETS") {
            self.download_targets = split_list(&targets);
        }

        if let Ok(ping_target) = std::env::var("PING_TARGET") {
            self.ping_target = ping_target.trim().to_string();
        }

        if let Ok(window) = std::env::var("DOWNLOAD_WINDOW_MS") {
            self.download_window_ms = window.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid DOWNLOAD_WINDOW_MS value '{}': {}", window, e)))?;
        }

        if let Ok(concurrency) = std::env::var("CONCURRENCY") {
            self.concurrency = concurrency.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CONCURRENCY value '{}': {}", concurrency, e)))?;
        }

        if let Ok(duration) = std::env::var("UPLOAD_DURATION_MS") {
            self.upload_duration_ms = duration.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid UPLOAD_DURATION_MS value '{}': {}", duration, e)))?;
        }

        if let Ok(timeout) = std::env::var("PING_TIMEOUT_MS") {
            self.ping_timeout_ms = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PING_TIMEOUT_MS value '{}': {}", timeout, e)))?;
        }

        if let Ok(timeout) = std::env::var("REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_secs = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid REQUEST_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        if let Ok(enable_analysis) = std::env::var("ENABLE_ANALYSIS") {
            self.analysis_enabled = enable_analysis.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_ANALYSIS value '{}': {}", enable_analysis, e)))?;
        }

        // GEMINI_API_KEY wins over the generic API_KEY
        if let Some(key) = std::env::var("GEMINI_API_KEY").ok().or_else(|| std::env::var("API_KEY").ok()) {
            let key = key.trim().to_string();
            if !key.is_empty() {
                self.gemini_api_key = Some(key);
            }
        }

        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            self.gemini_model = model.trim().to_string();
        }

        Ok(())
    }
}
