//! Colored formatter implementation with terminal color support
//!
//! This module provides a rich colored output formatter that uses
//! ANSI colors and Unicode symbols for enhanced visual presentation.

use super::formatter::{format_mbps, FormattingOptions, OutputFormatter, PlainFormatter};
use crate::{
    error::{AppError, Result},
    models::{AnalysisOutcome, MeasurementResult, NetworkInfo, SpeedSample},
    stats::SampleStatistics,
    types::{LatencyLevel, Phase, SessionState, SpeedLevel},
};
use colored::*;
use std::fmt::Write as _;

impl SpeedLevel {
    /// Get color for this speed level
    pub fn color(&self) -> Color {
        match self {
            Self::Fast => Color::Green,
            Self::Moderate => Color::Cyan,
            Self::Slow => Color::Yellow,
            Self::VerySlow => Color::Red,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Fast => "🚀",
            Self::Moderate => "⚡",
            Self::Slow => "🔶",
            Self::VerySlow => "🔴",
        }
    }
}

impl LatencyLevel {
    /// Get color for this latency level
    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Red,
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub muted: Color,
    pub border: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            muted: Color::BrightBlack,
            border: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        let plain_formatter = PlainFormatter::new(options.clone());
        Self {
            plain_formatter,
            options,
            color_scheme,
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    /// Apply bold formatting if colors are enabled
    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    fn phase_icon(phase: Phase) -> &'static str {
        match phase {
            Phase::Latency => "📡",
            Phase::Download => "⬇️",
            Phase::Upload => "⬆️",
        }
    }

    fn format_rate_colored(&self, mbps: f64) -> ColoredString {
        self.colorize(&format_mbps(mbps), SpeedLevel::from_mbps(mbps).color())
    }

    /// Create a colored section header
    fn create_section_header(&self, title: &str, icon: &str) -> String {
        if self.options.enable_color {
            format!("{} {}", icon, title.bold().color(self.color_scheme.header))
        } else {
            format!("{} {}", icon, title)
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let border = "═".repeat(title.chars().count() + 4);
        let mut output = String::new();
        writeln!(output, "{}", self.colorize(&border, self.color_scheme.border))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        writeln!(output, "  {}  ", self.colorize(title, self.color_scheme.header))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        write!(output, "{}", self.colorize(&border, self.color_scheme.border))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        Ok(output)
    }

    fn format_network_info(&self, info: &NetworkInfo) -> Result<String> {
        let ip_color = if info.is_known() { self.color_scheme.info } else { self.color_scheme.muted };
        Ok(format!(
            "🌐 {} {}\n🏢 {}\n📍 {}",
            self.colorize(&info.ip, ip_color),
            self.colorize(&format!("({})", info.address_family), self.color_scheme.muted),
            info.isp,
            info.location
        ))
    }

    fn format_state(&self, state: &SessionState) -> Result<String> {
        Ok(match state {
            SessionState::Failed(reason) => format!(
                "❌ {}",
                self.colorize(reason, self.color_scheme.error)
            ),
            SessionState::Complete => format!(
                "✅ {}",
                self.colorize(state.label(), self.color_scheme.success)
            ),
            SessionState::Analyzing => format!(
                "🧠 {}...",
                self.colorize(state.label(), self.color_scheme.info)
            ),
            _ => match state.phase() {
                Some(phase) => self.create_section_header(&format!("{}...", state.label()), Self::phase_icon(phase)),
                None => state.label().to_string(),
            },
        })
    }

    fn format_sample(&self, phase: Phase, sample: &SpeedSample) -> Result<String> {
        Ok(format!(
            "   {} {}",
            self.colorize(&format!("{:<8}", phase.to_string()), self.color_scheme.muted),
            self.format_rate_colored(sample.instantaneous_mbps)
        ))
    }

    fn format_phase_result(&self, phase: Phase, value: f64) -> Result<String> {
        let figure = match phase {
            Phase::Latency => {
                let ping_ms = value.round().max(0.0) as u64;
                self.colorize(&format!("{} ms", ping_ms), LatencyLevel::from_ping_ms(ping_ms).color())
            }
            _ => self.format_rate_colored(value),
        };
        Ok(format!("   {} {:<8} {}", Self::phase_icon(phase), phase.to_string(), self.bold(&figure.to_string())))
    }

    fn format_result(&self, result: &MeasurementResult) -> Result<String> {
        let mut output = String::new();
        let rule = "─".repeat(44);

        writeln!(output, "{}", self.create_section_header("Results", "📊"))
            .map_err(|e| AppError::io(format!("Failed to format result: {}", e)))?;
        writeln!(output, "{}", self.colorize(&rule, self.color_scheme.border))
            .map_err(|e| AppError::io(format!("Failed to format result: {}", e)))?;

        let latency = LatencyLevel::from_ping_ms(result.ping_ms());
        writeln!(
            output,
            "{} {:<10} {:>14}  {}",
            Self::phase_icon(Phase::Latency),
            "Ping",
            self.colorize(&format!("{} ms", result.ping_ms()), latency.color()),
            self.colorize(latency.description(), latency.color())
        )
        .map_err(|e| AppError::io(format!("Failed to format result: {}", e)))?;

        for (phase, mbps) in [(Phase::Download, result.download_mbps()), (Phase::Upload, result.upload_mbps())] {
            let level = SpeedLevel::from_mbps(mbps);
            writeln!(
                output,
                "{} {:<10} {:>14}  {} {}",
                Self::phase_icon(phase),
                phase.to_string(),
                self.format_rate_colored(mbps),
                level.symbol(),
                self.colorize(level.description(), level.color())
            )
            .map_err(|e| AppError::io(format!("Failed to format result: {}", e)))?;
        }

        write!(output, "{}", self.colorize(&rule, self.color_scheme.border))
            .map_err(|e| AppError::io(format!("Failed to format result: {}", e)))?;
        Ok(output)
    }

    fn format_sample_statistics(&self, download: &SampleStatistics, upload: &SampleStatistics) -> Result<String> {
        let table = self.plain_formatter.format_sample_statistics(download, upload)?;
        if table.is_empty() {
            return Ok(table);
        }
        Ok(format!("{}\n{}", self.create_section_header("Sample distribution (Mbps)", "📈"), table))
    }

    fn format_analysis(&self, outcome: &AnalysisOutcome) -> Result<String> {
        match outcome {
            AnalysisOutcome::Skipped => Ok(String::new()),
            AnalysisOutcome::Unavailable(reason) => Ok(format!(
                "🧠 {}",
                self.colorize(&format!("Analysis unavailable: {}", reason), self.color_scheme.warning)
            )),
            AnalysisOutcome::Available(summary) => {
                let mut output = String::new();
                writeln!(output, "{}", self.create_section_header("Connection analysis", "🧠"))
                    .map_err(|e| AppError::io(format!("Failed to format analysis: {}", e)))?;
                writeln!(output, "{}", summary.summary)
                    .map_err(|e| AppError::io(format!("Failed to format analysis: {}", e)))?;
                for (icon, label, text) in [
                    ("🎬", "Streaming", &summary.streaming),
                    ("🎮", "Gaming", &summary.gaming),
                    ("📹", "Video calls", &summary.video_calls),
                ] {
                    writeln!(output, "  {} {} {}", icon, self.bold(&format!("{:<12}", label)), text)
                        .map_err(|e| AppError::io(format!("Failed to format analysis: {}", e)))?;
                }
                Ok(output.trim_end().to_string())
            }
        }
    }
}
