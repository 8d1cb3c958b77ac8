//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        if Path::new(".env").exists() {
            dotenv::from_filename(".env")
                .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;

            if debug {
                eprintln!("Loaded configuration from .env file");
            }
        } else if debug {
            eprintln!("No .env file found, using defaults and CLI arguments");
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Network Speed Tester Configuration
#
# Values specified here are used as defaults and can be overridden
# by command-line arguments.

# Download targets, rotated through when one fails (comma-separated)
# DOWNLOAD_TARGETS=https://upload.wikimedia.org/wikipedia/commons/f/ff/Pizigani_1367_Chart_10MB.jpg,https://images.pexels.com/photos/248797/pexels-photo-248797.jpeg

# Small resource used for the latency probe
# PING_TARGET=https://www.google.com/favicon.ico

# Download measurement window in milliseconds (1000-60000)
# DOWNLOAD_WINDOW_MS=8000

# Concurrent download loops (1-16)
# CONCURRENCY=2

# Duration of the upload estimate in milliseconds (500-60000)
# UPLOAD_DURATION_MS=5000

# Latency probe deadline in milliseconds (100-10000)
# PING_TIMEOUT_MS=2000

# Per-request timeout for download transfers in seconds (1-300)
# REQUEST_TIMEOUT_SECONDS=10

# Enable colored output (true/false)
# ENABLE_COLOR=true

# Connection analysis after a successful run (true/false)
# ENABLE_ANALYSIS=true

# Gemini API key; API_KEY is accepted as a fallback name
# GEMINI_API_KEY=

# Gemini model used for the analysis
# GEMINI_MODEL=gemini-2.5-flash

# Example configurations for different scenarios:
#
# Quick check on a slow link:
# DOWNLOAD_WINDOW_MS=4000
# CONCURRENCY=1
# UPLOAD_DURATION_MS=2000
#
# Saturating a fast link:
# DOWNLOAD_WINDOW_MS=15000
# CONCURRENCY=6
"#
        .to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        use std::fs;

        let content = Self::create_example_env_content();
        fs::write(path, content)
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))?;

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "DOWNLOAD_TARGETS" => {
                for url in value.split(',') {
                    let url = url.trim();
                    if !url.is_empty() {
                        url::Url::parse(url)
                            .map_err(|e| AppError::config(format!("Invalid DOWNLOAD_TARGETS entry '{}': {}", url, e)))?;
                    }
                }
            }
            "PING_TARGET" => {
                url::Url::parse(value.trim())
                    .map_err(|e| AppError::config(format!("Invalid PING_TARGET '{}': {}", value, e)))?;
            }
            "DOWNLOAD_WINDOW_MS" => Self::check_range(key, value, 1000, 60_000)?,
            "CONCURRENCY" => Self::check_range(key, value, 1, 16)?,
            "UPLOAD_DURATION_MS" => Self::check_range(key, value, 500, 60_000)?,
            "PING_TIMEOUT_MS" => Self::check_range(key, value, 100, 10_000)?,
            "REQUEST_TIMEOUT_SECONDS" => Self::check_range(key, value, 1, 300)?,
            "ENABLE_COLOR" | "ENABLE_ANALYSIS" => {
                value.trim().parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            "GEMINI_MODEL" => {
                if value.trim().is_empty() {
                    return Err(AppError::config("GEMINI_MODEL cannot be empty"));
                }
            }
            _ => {
                // Unknown environment variable, ignore
            }
        }

        Ok(())
    }

    fn check_range(key: &str, value: &str, min: u64, max: u64) -> Result<()> {
        let parsed: u64 = value.trim().parse()
            .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
        if parsed < min || parsed > max {
            return Err(AppError::config(format!(
                "{} must be between {} and {}, got: {}",
                key, min, max, parsed
            )));
        }
        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("DOWNLOAD_TARGETS", "Comma-separated list of download URLs", "https://cdn.example.com/10MB.bin"),
            ("PING_TARGET", "URL probed for latency", "https://www.google.com/favicon.ico"),
            ("DOWNLOAD_WINDOW_MS", "Download window in milliseconds (1000-60000)", "8000"),
            ("CONCURRENCY", "Concurrent download loops (1-16)", "2"),
            ("UPLOAD_DURATION_MS", "Upload estimate duration in milliseconds (500-60000)", "5000"),
            ("PING_TIMEOUT_MS", "Latency probe deadline in milliseconds (100-10000)", "2000"),
            ("REQUEST_TIMEOUT_SECONDS", "Download request timeout in seconds (1-300)", "10"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
            ("ENABLE_ANALYSIS", "Run the connection analysis", "true"),
            ("GEMINI_API_KEY", "API key for the connection analysis", "your-key"),
            ("GEMINI_MODEL", "Model used for the connection analysis", "gemini-2.5-flash"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<24} {}\n", var, description));
            help.push_str(&format!("  {:<24} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        let mut warnings = Vec::new();

        for (var_name, _, _) in Self::get_supported_env_vars() {
            if let Ok(value) = std::env::var(var_name) {
                if let Err(e) = Self::validate_env_var(var_name, &value) {
                    warnings.push(format!("Warning: {}", e));
                }
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_env_manager_create_example_content() {
        let content = EnvManager::create_example_env_content();

        for (name, _, _) in EnvManager::get_supported_env_vars() {
            assert!(content.contains(&format!("# {}=", name)), "missing {}", name);
        }
    }

    #[test]
    fn test_env_manager_save_example_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let result = EnvManager::save_example_env_file(temp_file.path());

        assert!(result.is_ok());

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("Network Speed Tester Configuration"));
    }

    #[test]
    fn test_env_manager_validate_env_var() {
        // Valid cases
        assert!(EnvManager::validate_env_var("DOWNLOAD_TARGETS", "https://a.test/x,https://b.test/y").is_ok());
        assert!(EnvManager::validate_env_var("PING_TARGET", "https://probe.test/favicon.ico").is_ok());
        assert!(EnvManager::validate_env_var("DOWNLOAD_WINDOW_MS", "8000").is_ok());
        assert!(EnvManager::validate_env_var("CONCURRENCY", "16").is_ok());
        assert!(EnvManager::validate_env_var("REQUEST_TIMEOUT_SECONDS", "10").is_ok());
        assert!(EnvManager::validate_env_var("ENABLE_ANALYSIS", "false").is_ok());
        assert!(EnvManager::validate_env_var("SOMETHING_ELSE", "anything").is_ok());

        // Invalid cases
        assert!(EnvManager::validate_env_var("DOWNLOAD_TARGETS", "not-a-url").is_err());
        assert!(EnvManager::validate_env_var("DOWNLOAD_WINDOW_MS", "999").is_err());
        assert!(EnvManager::validate_env_var("CONCURRENCY", "0").is_err());
        assert!(EnvManager::validate_env_var("UPLOAD_DURATION_MS", "60001").is_err());
        assert!(EnvManager::validate_env_var("PING_TIMEOUT_MS", "fast").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
        assert!(EnvManager::validate_env_var("GEMINI_MODEL", "  ").is_err());
    }

    #[test]
    fn test_display_env_help() {
        let help = EnvManager::display_env_help();

        assert!(help.contains("Supported Environment Variables:"));
        assert!(help.contains("DOWNLOAD_TARGETS"));
        assert!(help.contains("GEMINI_API_KEY"));
        assert!(help.contains("Configuration Priority"));
        assert!(help.contains("Command-line arguments"));
    }
}
