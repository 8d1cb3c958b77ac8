//! Error handling for the network speed tester

use thiserror::Error;

/// Custom error types for the network speed tester
#[derive(Error, Debug)]
pub enum AppError {
    /// Latency probe did not complete before its deadline
    #[error("Latency probe timed out: {0}")]
    ProbeTimeout(String),

    /// Latency probe target could not be reached (DNS, refused, TLS)
    #[error("Latency probe target unreachable: {0}")]
    ProbeUnreachable(String),

    /// Download window elapsed without a single byte from any target
    #[error("No data received: {0}")]
    NoDataReceived(String),

    /// Host reports no network connectivity
    #[error("Offline: {0}")]
    Offline(String),

    /// The user stopped the run before any data arrived
    #[error("Interrupted: {0}")]
    Interrupted(String),

    /// Analysis collaborator failed; never fatal to a session
    #[error("Analysis unavailable: {0}")]
    AnalysisUnavailable(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network connectivity errors
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (URLs, JSON, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn probe_timeout<S: Into<String>>(message: S) -> Self {
        Self::ProbeTimeout(message.into())
    }

    pub fn probe_unreachable<S: Into<String>>(message: S) -> Self {
        Self::ProbeUnreachable(message.into())
    }

    pub fn no_data_received<S: Into<String>>(message: S) -> Self {
        Self::NoDataReceived(message.into())
    }

    pub fn offline<S: Into<String>>(message: S) -> Self {
        Self::Offline(message.into())
    }

    pub fn interrupted<S: Into<String>>(message: S) -> Self {
        Self::Interrupted(message.into())
    }

    pub fn analysis_unavailable<S: Into<String>>(message: S) -> Self {
        Self::AnalysisUnavailable(message.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    /// Create a new HTTP request error
    pub fn http_request<S: Into<String>>(message: S) -> Self {
        Self::HttpRequest(message.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::ProbeTimeout(_) => "PROBE_TIMEOUT",
            Self::ProbeUnreachable(_) => "PROBE_UNREACHABLE",
            Self::NoDataReceived(_) => "NO_DATA",
            Self::Offline(_) => "OFFLINE",
            Self::Interrupted(_) => "INTERRUPTED",
            Self::AnalysisUnavailable(_) => "ANALYSIS",
            Self::Config(_) => "CONFIG",
            Self::Network(_) => "NETWORK",
            Self::HttpRequest(_) => "HTTP",
            Self::Timeout(_) => "TIMEOUT",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Check if error is recoverable (running the measurement again may succeed)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::ProbeTimeout(_) | Self::ProbeUnreachable(_) | Self::NoDataReceived(_) | Self::Offline(_) => true,
            Self::AnalysisUnavailable(_) => true,
            Self::Network(_) | Self::HttpRequest(_) | Self::Timeout(_) => true,
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => false,
            Self::Interrupted(_) | Self::Io(_) | Self::Internal(_) => false,
        }
    }

    /// Whether this error ends a measurement session
    pub fn is_fatal_to_session(&self) -> bool {
        !matches!(self, Self::AnalysisUnavailable(_))
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ProbeTimeout(msg) => {
                format!("Connection timed out. The server took too long to respond: {}\n\nSuggestion: Check your connection quality or raise the limit with --ping-timeout.", msg)
            }
            Self::ProbeUnreachable(msg) => {
                format!("Unable to reach the test server: {}\n\nSuggestion: Check your internet connection or firewall settings.", msg)
            }
            Self::NoDataReceived(msg) => {
                format!("No data received: {}\n\nSuggestion: A firewall, proxy or filtering software may be blocking the test files. Try other targets with --target.", msg)
            }
            Self::Offline(msg) => {
                format!("You appear to be offline: {}\n\nSuggestion: Please check your network connection.", msg)
            }
            Self::Interrupted(msg) => {
                format!("Measurement interrupted: {}", msg)
            }
            Self::AnalysisUnavailable(msg) => {
                format!("Connection analysis unavailable: {}\n\nSuggestion: Set GEMINI_API_KEY to enable the analysis, or pass --no-analysis.", msg)
            }
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file or command line arguments.", msg)
            }
            Self::Network(msg) => {
                format!("Network connectivity issue: {}\n\nSuggestion: Check your internet connection and try again.", msg)
            }
            Self::HttpRequest(msg) => {
                format!("HTTP request failed: {}\n\nSuggestion: The target server may be down or blocking requests. Try a different target.", msg)
            }
            Self::Timeout(msg) => {
                format!("Request timed out: {}\n\nSuggestion: Increase the timeout value using --request-timeout or check your network connection.", msg)
            }
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Check the format of your URLs and numeric options.", msg)
            }
            Self::Io(msg) => {
                format!("File operation failed: {}\n\nSuggestion: Check file permissions and disk space.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse data: {}\n\nSuggestion: Check the format of your input data or configuration files.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,
            Self::Network(_) | Self::HttpRequest(_) => 2,
            Self::Timeout(_) | Self::ProbeTimeout(_) => 3,
            Self::ProbeUnreachable(_) | Self::NoDataReceived(_) | Self::Offline(_) => 4,
            Self::Io(_) => 5,
            Self::AnalysisUnavailable(_) => 6,
            Self::Internal(_) => 99,
            Self::Interrupted(_) => 130,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::ProbeUnreachable(_) | Self::NoDataReceived(_) | Self::Offline(_)
                | Self::Network(_) | Self::HttpRequest(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::ProbeTimeout(_) | Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Interrupted(_) | Self::AnalysisUnavailable(_) | Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(error.to_string())
        } else if error.is_connect() || error.is_request() {
            Self::network(error.to_string())
        } else {
            Self::http_request(error.to_string())
        }
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

// Anyhow integration
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(error.to_string())
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error reporter for user feedback on the terminal
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", error.format_for_console(self.use_color));

        if self.verbose {
            eprintln!();
            eprintln!("{}", error.user_friendly_message());

            if error.is_recoverable() {
                eprintln!();
                if self.use_color {
                    use colored::Colorize;
                    eprintln!("{}", "This error might be temporary. You can try running the test again.".green());
                } else {
                    eprintln!("This error might be temporary. You can try running the test again.");
                }
            }
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}
