//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    models::Config,
    error::Result,
    config::env::EnvManager,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        // Start with default configuration
        let mut config = Config::default();

        // Load from environment file if it exists
        self.load_env_file()?;

        // Merge environment variables into config
        config.merge_from_env()?;

        // Override with CLI arguments
        self.apply_cli_overrides(&mut config);

        // Validate the final configuration
        config.validate()?;

        Ok(config)
    }

    /// Load .env file if it exists
    fn load_env_file(&self) -> Result<()> {
        EnvManager::load_env_file(self.cli.debug)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        if !self.cli.targets.is_empty() {
            config.download_targets = self.cli.targets.clone();
        }

        if let Some(ref ping_target) = self.cli.ping_target {
            config.ping_target = ping_target.clone();
        }

        if let Some(window) = self.cli.window {
            config.download_window_ms = window;
        }

        if let Some(concurrency) = self.cli.concurrency {
            config.concurrency = concurrency;
        }

        if let Some(duration) = self.cli.upload_duration {
            config.upload_duration_ms = duration;
        }

        if let Some(timeout) = self.cli.ping_timeout {
            config.ping_timeout_ms = timeout;
        }

        if let Some(timeout) = self.cli.request_timeout {
            config.request_timeout_secs = timeout;
        }

        if self.cli.color {
            config.enable_color = true;
        }
        if self.cli.no_color || self.cli.json {
            config.enable_color = false;
        }

        if self.cli.no_analysis {
            config.analysis_enabled = false;
        }

        if self.cli.no_network_info {
            config.show_network_info = false;
        }

        // These are CLI-only
        config.json_output = self.cli.json;
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        if config.debug {
            eprintln!("Applied CLI overrides to configuration");
            eprintln!(
                "Final config: window={}ms, concurrency={}, upload={}ms, enable_color={}",
                config.download_window_ms, config.concurrency, config.upload_duration_ms, config.enable_color
            );
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    let parser = ConfigParser::new(cli);
    parser.parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Download Targets: {}", config.download_targets.join(", ")));
    summary.push(format!("Ping Target: {}", config.ping_target));
    summary.push(format!("Download Window: {}ms", config.download_window_ms));
    summary.push(format!("Concurrency: {}", config.concurrency));
    summary.push(format!("Upload Duration: {}ms", config.upload_duration_ms));
    summary.push(format!("Ping Timeout: {}ms", config.ping_timeout_ms));
    summary.push(format!("Request Timeout: {}s", config.request_timeout_secs));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!(
        "Analysis: {}",
        if config.analysis_available() {
            format!("enabled ({})", config.gemini_model)
        } else if config.analysis_enabled {
            "no API key".to_string()
        } else {
            "disabled".to_string()
        }
    ));
    summary.push(format!("Network Info: {}", config.show_network_info));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
