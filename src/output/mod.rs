//! Output formatting and display system
//!
//! This module provides a flexible output formatting system for measurement
//! results, supporting both colored and plain text output, plus a console
//! observer that renders live session progress.

mod colored;
mod formatter;

pub use self::colored::{ColorScheme, ColoredFormatter};
pub use formatter::{
    format_bytes, format_mbps, Alignment, Column, FormattingOptions, OutputFormatter, PlainFormatter, RowData,
    TableFormat,
};

use crate::{
    error::Result,
    models::{NetworkInfo, SpeedSample},
    session::{SessionObserver, SessionReport},
    types::{Phase, SessionState},
};
use std::io::{self, Write};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            ..FormattingOptions::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, false)
    }
}

/// Main output coordinator that handles all result display
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
    verbose: bool,
}

impl OutputCoordinator {
    pub fn new(formatter: Box<dyn OutputFormatter>, verbose: bool) -> Self {
        Self { formatter, verbose }
    }

    pub fn formatter(&self) -> &dyn OutputFormatter {
        self.formatter.as_ref()
    }

    /// Banner shown before the session starts
    pub fn display_banner(&self, network: Option<&NetworkInfo>) -> Result<String> {
        let mut output = self.formatter.format_header("Network Speed Test")?;
        if let Some(info) = network {
            output.push('\n');
            output.push_str(&self.formatter.format_network_info(info)?);
        }
        Ok(output)
    }

    /// Final results of a completed session
    pub fn display_report(&self, report: &SessionReport) -> Result<String> {
        let mut sections = vec![self.formatter.format_result(&report.result)?];

        if self.verbose {
            let stats = self
                .formatter
                .format_sample_statistics(&report.download_samples, &report.upload_samples)?;
            if !stats.is_empty() {
                sections.push(stats);
            }
            if let Some(bytes) = report.download_bytes {
                sections.push(format!("Downloaded {} during the test window", format_bytes(bytes)));
            }
        }

        let analysis = self.formatter.format_analysis(&report.analysis)?;
        if !analysis.is_empty() {
            sections.push(analysis);
        }

        Ok(sections.join("\n\n"))
    }
}

/// Prints session progress to the terminal as it happens
///
/// Live samples overwrite one status line unless verbose output is on, in
/// which case every sample gets its own line.
pub struct ConsoleProgress<'a> {
    coordinator: &'a OutputCoordinator,
}

impl<'a> ConsoleProgress<'a> {
    pub fn new(coordinator: &'a OutputCoordinator) -> Self {
        Self { coordinator }
    }

    fn emit(&self, line: Result<String>, overwrite: bool) {
        let Ok(line) = line else { return };
        let mut stdout = io::stdout().lock();
        let _ = if overwrite {
            write!(stdout, "\r\x1b[2K{}", line)
        } else {
            writeln!(stdout, "\r\x1b[2K{}", line)
        };
        let _ = stdout.flush();
    }
}

impl SessionObserver for ConsoleProgress<'_> {
    fn on_state_change(&self, state: &SessionState) {
        // Failures are reported by the caller together with the exit code
        if matches!(state, SessionState::Failed(_) | SessionState::Complete) {
            return;
        }
        self.emit(self.coordinator.formatter.format_state(state), false);
    }

    fn on_sample(&self, phase: Phase, sample: &SpeedSample) {
        let overwrite = !self.coordinator.verbose;
        self.emit(self.coordinator.formatter.format_sample(phase, sample), overwrite);
    }

    fn on_phase_complete(&self, phase: Phase, value: f64) {
        self.emit(self.coordinator.formatter.format_phase_result(phase, value), false);
    }
}
