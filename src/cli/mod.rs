//! Command-line interface module

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Network Speed Tester - measures latency, download and upload speed over plain HTTP
#[derive(Parser, Debug, Clone)]
#[command(name = "nst")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Download target URL (can be used multiple times)
    #[arg(long = "target", value_name = "URL", action = ArgAction::Append)]
    pub targets: Vec<String>,

    /// URL whose round-trip time is reported as ping
    #[arg(long, value_name = "URL")]
    pub ping_target: Option<String>,

    /// Download measurement window in milliseconds
    #[arg(short, long, value_name = "MS", value_parser = parse_window)]
    pub window: Option<u64>,

    /// Number of concurrent download loops
    #[arg(short, long, value_parser = parse_concurrency)]
    pub concurrency: Option<usize>,

    /// Duration of the upload estimate in milliseconds
    #[arg(long, value_name = "MS", value_parser = parse_upload_duration)]
    pub upload_duration: Option<u64>,

    /// Latency probe deadline in milliseconds
    #[arg(long, value_name = "MS", value_parser = parse_ping_timeout)]
    pub ping_timeout: Option<u64>,

    /// Per-request timeout for download targets in seconds
    #[arg(short = 't', long, value_name = "SECONDS", value_parser = parse_duration)]
    pub request_timeout: Option<u64>,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Skip the connection analysis even when an API key is configured
    #[arg(long)]
    pub no_analysis: bool,

    /// Skip the public IP and ISP lookup
    #[arg(long)]
    pub no_network_info: bool,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Write an example .env file to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub write_env_example: Option<PathBuf>,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.json && self.color {
            return Err("--color has no effect together with --json".to_string());
        }

        for target in self.targets.iter().chain(self.ping_target.iter()) {
            if !(target.starts_with("http://") || target.starts_with("https://")) {
                return Err(format!("Target must be an http(s) URL: {}", target));
            }
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.json {
            false
        } else if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Command Line Overrides:\n");
        if !self.targets.is_empty() {
            summary.push_str(&format!("  Download targets: {}\n", self.targets.join(", ")));
        }
        if let Some(ref ping_target) = self.ping_target {
            summary.push_str(&format!("  Ping target: {}\n", ping_target));
        }
        if let Some(window) = self.window {
            summary.push_str(&format!("  Download window: {}ms\n", window));
        }
        if let Some(concurrency) = self.concurrency {
            summary.push_str(&format!("  Concurrency: {}\n", concurrency));
        }
        if let Some(duration) = self.upload_duration {
            summary.push_str(&format!("  Upload duration: {}ms\n", duration));
        }
        if let Some(timeout) = self.ping_timeout {
            summary.push_str(&format!("  Ping timeout: {}ms\n", timeout));
        }
        if let Some(timeout) = self.request_timeout {
            summary.push_str(&format!("  Request timeout: {}s\n", timeout));
        }
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));
        summary.push_str(&format!("  Analysis: {}\n", !self.no_analysis));
        summary.push_str(&format!("  Network info: {}\n", !self.no_network_info));
        summary.push_str(&format!("  JSON output: {}\n", self.json));
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));

        summary
    }
}

fn parse_bounded(s: &str, name: &str, min: u64, max: u64) -> Result<u64, String> {
    // Reject strings with leading + sign or other invalid formats
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid {}: {}", name, s));
    }

    let value = s.parse::<u64>().map_err(|_| format!("Invalid {}: {}", name, s))?;
    if value < min || value > max {
        return Err(format!("{} must be between {} and {}", name, min, max));
    }
    Ok(value)
}

/// Parse duration from seconds string
fn parse_duration(s: &str) -> Result<u64, String> {
    parse_bounded(s, "duration", 1, 300)
}

fn parse_window(s: &str) -> Result<u64, String> {
    parse_bounded(s, "window", 1000, 60_000)
}

fn parse_concurrency(s: &str) -> Result<usize, String> {
    parse_bounded(s, "concurrency", 1, 16).map(|v| v as usize)
}

fn parse_upload_duration(s: &str) -> Result<u64, String> {
    parse_bounded(s, "upload duration", 500, 60_000)
}

fn parse_ping_timeout(s: &str) -> Result<u64, String> {
    parse_bounded(s, "ping timeout", 100, 10_000)
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    // Default to true on Unix-like systems, false on Windows
    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing_defaults() {
        let cli = Cli::parse_from(["nst"]);
        assert!(cli.targets.is_empty());
        assert!(cli.window.is_none());
        assert!(cli.concurrency.is_none());
        assert!(!cli.json);
        assert!(!cli.verbose);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from([
            "nst",
            "--target", "https://cdn.test/a.jpg",
            "--target", "https://cdn.test/b.jpg",
            "--ping-target", "https://probe.test/favicon.ico",
            "--window", "5000",
            "--concurrency", "4",
            "--upload-duration", "2000",
            "--ping-timeout", "1500",
            "--request-timeout", "20",
            "--no-color",
            "--no-analysis",
            "--no-network-info",
            "--verbose",
            "--debug",
        ]);

        assert_eq!(cli.targets.len(), 2);
        assert_eq!(cli.ping_target.as_deref(), Some("https://probe.test/favicon.ico"));
        assert_eq!(cli.window, Some(5000));
        assert_eq!(cli.concurrency, Some(4));
        assert_eq!(cli.upload_duration, Some(2000));
        assert_eq!(cli.ping_timeout, Some(1500));
        assert_eq!(cli.request_timeout, Some(20));
        assert!(cli.no_color && cli.no_analysis && cli.no_network_info);
        assert!(cli.verbose && cli.debug);
        assert!(!cli.use_colors());
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from(["nst", "-w", "3000", "-c", "3", "-t", "5"]);
        assert_eq!(cli.window, Some(3000));
        assert_eq!(cli.concurrency, Some(3));
        assert_eq!(cli.request_timeout, Some(5));
    }

    #[test]
    fn test_bounded_parsers() {
        assert!(parse_window("999").is_err());
        assert!(parse_window("60000").is_ok());
        assert!(parse_concurrency("0").is_err());
        assert!(parse_concurrency("17").is_err());
        assert_eq!(parse_concurrency("16").unwrap(), 16);
        assert!(parse_upload_duration("499").is_err());
        assert!(parse_ping_timeout("10001").is_err());
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("301").is_err());
        assert!(parse_duration("+5").is_err());
        assert!(parse_duration("0x10").is_err());
        assert!(parse_duration("abc").is_err());
    }

    #[test]
    fn test_out_of_range_value_is_rejected_by_clap() {
        assert!(Cli::try_parse_from(["nst", "--concurrency", "64"]).is_err());
        assert!(Cli::try_parse_from(["nst", "--window", "fast"]).is_err());
    }

    #[test]
    fn test_cli_validation() {
        let cli = Cli::parse_from(["nst", "--color", "--no-color"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["nst", "--target", "ftp://files.test/big.bin"]);
        assert!(cli.validate().unwrap_err().contains("ftp://files.test/big.bin"));

        let cli = Cli::parse_from(["nst", "--json", "--color"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_json_disables_colors() {
        let cli = Cli::parse_from(["nst", "--json"]);
        assert!(!cli.use_colors());

        let cli = Cli::parse_from(["nst", "--color"]);
        assert!(cli.use_colors());
    }

    #[test]
    fn test_config_summary() {
        let cli = Cli::parse_from(["nst", "--window", "4000", "--target", "https://cdn.test/x"]);
        let summary = cli.get_config_summary();
        assert!(summary.contains("Download window: 4000ms"));
        assert!(summary.contains("Download targets: https://cdn.test/x"));
        assert!(!summary.contains("Concurrency:"));
    }
}
