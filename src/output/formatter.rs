//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface and provides
//! a plain text implementation with table formatting capabilities.

use crate::{
    error::{AppError, Result},
    models::{AnalysisOutcome, MeasurementResult, NetworkInfo, SpeedSample},
    stats::SampleStatistics,
    types::{LatencyLevel, Phase, SessionState, SpeedLevel},
};
use std::fmt::Write as _;

/// Main trait for output formatting
pub trait OutputFormatter: Send + Sync {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format the caller's public network identity
    fn format_network_info(&self, info: &NetworkInfo) -> Result<String>;

    /// Format a status line for a new session state
    fn format_state(&self, state: &SessionState) -> Result<String>;

    /// Format a live progress sample
    fn format_sample(&self, phase: Phase, sample: &SpeedSample) -> Result<String>;

    /// Format the figure a phase finished with
    fn format_phase_result(&self, phase: Phase, value: f64) -> Result<String>;

    /// Format the final result as a table
    fn format_result(&self, result: &MeasurementResult) -> Result<String>;

    /// Format the sample distribution of the download and upload phases
    fn format_sample_statistics(&self, download: &SampleStatistics, upload: &SampleStatistics) -> Result<String>;

    /// Format the connection analysis, if any
    fn format_analysis(&self, outcome: &AnalysisOutcome) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Enable verbose mode with detailed information
    pub verbose_mode: bool,
    /// Show table borders
    pub table_borders: bool,
    /// Maximum output width
    pub max_width: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            table_borders: true,
            max_width: 100,
        }
    }
}

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Show borders around table
    pub show_borders: bool,
    /// Show header row
    pub show_header: bool,
    /// Maximum column width
    pub max_column_width: usize,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    /// Column header
    pub header: String,
    /// Column alignment
    pub alignment: Alignment,
    /// Minimum width
    pub min_width: usize,
    /// Maximum width
    pub max_width: usize,
}

impl Column {
    pub fn new(header: &str, alignment: Alignment, min_width: usize) -> Self {
        Self {
            header: header.to_string(),
            alignment,
            min_width,
            max_width: 60,
        }
    }
}

/// Text alignment options
#[derive(Debug, Clone)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

fn fmt_err(e: std::fmt::Error) -> AppError {
    AppError::io(format!("Failed to format output: {}", e))
}

/// Megabits per second with two decimals
pub fn format_mbps(mbps: f64) -> String {
    format!("{:.2} Mbps", mbps)
}

/// Human-readable byte count
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    /// Table layout used for the final result
    pub(crate) fn result_table(&self) -> TableFormat {
        TableFormat {
            columns: vec![
                Column::new("Metric", Alignment::Left, 10),
                Column::new("Value", Alignment::Right, 12),
                Column::new("Rating", Alignment::Left, 10),
            ],
            show_borders: self.options.table_borders,
            show_header: true,
            max_column_width: self.options.max_width / 3,
        }
    }

    pub(crate) fn result_rows(result: &MeasurementResult) -> Vec<RowData> {
        vec![
            vec![
                "Ping".to_string(),
                format!("{} ms", result.ping_ms()),
                LatencyLevel::from_ping_ms(result.ping_ms()).description().to_string(),
            ],
            vec![
                "Download".to_string(),
                format_mbps(result.download_mbps()),
                SpeedLevel::from_mbps(result.download_mbps()).description().to_string(),
            ],
            vec![
                "Upload".to_string(),
                format_mbps(result.upload_mbps()),
                SpeedLevel::from_mbps(result.upload_mbps()).description().to_string(),
            ],
        ]
    }

    /// Create a table with the given format and data
    pub(crate) fn create_table(&self, format: &TableFormat, rows: &[RowData]) -> Result<String> {
        if rows.is_empty() {
            return Ok(String::new());
        }

        let column_widths = self.calculate_column_widths(format, rows);
        let mut output = String::new();

        if format.show_header && !format.columns.is_empty() {
            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }

            let headers: Vec<String> = format.columns.iter().map(|c| c.header.clone()).collect();
            output.push_str(&self.create_row(&headers, &column_widths, format));
            output.push('\n');

            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }
        }

        for row in rows {
            output.push_str(&self.create_row(row, &column_widths, format));
            output.push('\n');
        }

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&column_widths));
        }

        Ok(output.trim_end().to_string())
    }

    /// Calculate optimal column widths
    fn calculate_column_widths(&self, format: &TableFormat, rows: &[RowData]) -> Vec<usize> {
        let num_columns = format.columns.len().max(rows.iter().map(|r| r.len()).max().unwrap_or(0));

        (0..num_columns)
            .map(|col_idx| {
                let column = format.columns.get(col_idx);
                let mut width = column.map(|c| c.min_width.max(c.header.len())).unwrap_or(0);

                for row in rows {
                    if let Some(cell) = row.get(col_idx) {
                        width = width.max(cell.chars().count());
                    }
                }

                match column {
                    Some(c) => width.min(c.max_width),
                    None => width.min(format.max_column_width),
                }
            })
            .collect()
    }

    /// Create a table row
    fn create_row(&self, data: &[String], widths: &[usize], format: &TableFormat) -> String {
        let mut row = String::new();

        if format.show_borders {
            row.push('|');
        }

        for (idx, (cell, &width)) in data.iter().zip(widths.iter()).enumerate() {
            let alignment = format.columns.get(idx).map(|c| &c.alignment).unwrap_or(&Alignment::Left);

            if format.show_borders {
                row.push(' ');
            }
            row.push_str(&self.align_text(cell, width, alignment));
            if format.show_borders {
                row.push_str(" |");
            } else {
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    /// Create horizontal border for table
    fn create_horizontal_border(&self, widths: &[usize]) -> String {
        let mut border = String::new();

        if !widths.is_empty() {
            border.push('+');
            for &width in widths {
                border.push_str(&"-".repeat(width + 2));
                border.push('+');
            }
        }

        border
    }

    /// Align text within specified width
    fn align_text(&self, text: &str, width: usize, alignment: &Alignment) -> String {
        let len = text.chars().count();
        if len >= width {
            return text.chars().take(width).collect();
        }

        let padding = width - len;
        match alignment {
            Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
            Alignment::Right => format!("{}{}", " ".repeat(padding), text),
            Alignment::Center => {
                let left_pad = padding / 2;
                let right_pad = padding - left_pad;
                format!("{}{}{}", " ".repeat(left_pad), text, " ".repeat(right_pad))
            }
        }
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.len() + 4);

        writeln!(output, "{}", border).map_err(fmt_err)?;
        writeln!(output, "  {}  ", title).map_err(fmt_err)?;
        write!(output, "{}", border).map_err(fmt_err)?;

        Ok(output)
    }

    fn format_network_info(&self, info: &NetworkInfo) -> Result<String> {
        let mut output = String::new();
        writeln!(output, "IP:       {} ({})", info.ip, info.address_family).map_err(fmt_err)?;
        writeln!(output, "Provider: {}", info.isp).map_err(fmt_err)?;
        write!(output, "Location: {}", info.location).map_err(fmt_err)?;
        Ok(output)
    }

    fn format_state(&self, state: &SessionState) -> Result<String> {
        Ok(match state {
            SessionState::Failed(reason) => format!("[{}] {}", state.label(), reason),
            _ => format!("[{}]", state.label()),
        })
    }

    fn format_sample(&self, phase: Phase, sample: &SpeedSample) -> Result<String> {
        Ok(format!("  {:<8} {:>12}", phase.to_string(), format_mbps(sample.instantaneous_mbps)))
    }

    fn format_phase_result(&self, phase: Phase, value: f64) -> Result<String> {
        Ok(match phase {
            Phase::Latency => format!("  {:<8} {:>9.0} ms", phase.to_string(), value),
            _ => format!("  {:<8} {:>12}", phase.to_string(), format_mbps(value)),
        })
    }

    fn format_result(&self, result: &MeasurementResult) -> Result<String> {
        self.create_table(&self.result_table(), &Self::result_rows(result))
    }

    fn format_sample_statistics(&self, download: &SampleStatistics, upload: &SampleStatistics) -> Result<String> {
        let format = TableFormat {
            columns: vec![
                Column::new("Phase", Alignment::Left, 8),
                Column::new("Samples", Alignment::Right, 7),
                Column::new("Min", Alignment::Right, 8),
                Column::new("Mean", Alignment::Right, 8),
                Column::new("P90", Alignment::Right, 8),
                Column::new("Max", Alignment::Right, 8),
                Column::new("Std Dev", Alignment::Right, 8),
            ],
            show_borders: self.options.table_borders,
            show_header: true,
            max_column_width: 16,
        };

        let rows: Vec<RowData> = [("Download", download), ("Upload", upload)]
            .iter()
            .filter(|(_, stats)| stats.count > 0)
            .map(|(name, stats)| {
                vec![
                    name.to_string(),
                    stats.count.to_string(),
                    format!("{:.2}", stats.min),
                    format!("{:.2}", stats.mean),
                    format!("{:.2}", stats.p90),
                    format!("{:.2}", stats.max),
                    format!("{:.2}", stats.std_dev),
                ]
            })
            .collect();

        self.create_table(&format, &rows)
    }

    fn format_analysis(&self, outcome: &AnalysisOutcome) -> Result<String> {
        let mut output = String::new();
        match outcome {
            AnalysisOutcome::Skipped => {}
            AnalysisOutcome::Unavailable(reason) => {
                write!(output, "Analysis unavailable: {}", reason).map_err(fmt_err)?;
            }
            AnalysisOutcome::Available(summary) => {
                writeln!(output, "Analysis:").map_err(fmt_err)?;
                writeln!(output, "---------").map_err(fmt_err)?;
                writeln!(output, "{}", summary.summary).map_err(fmt_err)?;
                writeln!(output, "  Streaming:   {}", summary.streaming).map_err(fmt_err)?;
                writeln!(output, "  Gaming:      {}", summary.gaming).map_err(fmt_err)?;
                write!(output, "  Video calls: {}", summary.video_calls).map_err(fmt_err)?;
            }
        }
        Ok(output)
    }
}
