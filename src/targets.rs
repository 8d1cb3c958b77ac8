//! Registry of remote endpoints used as timing and byte-transfer sources

use crate::error::{AppError, Result};
use crate::models::Config;
use url::Url;

/// What a target is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    LatencyProbe,
    Download,
}

/// An immutable remote endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    kind: TargetKind,
    url: Url,
}

impl Target {
    pub fn new(kind: TargetKind, url: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::validation(format!("Target must use http or https: {}", url)));
        }
        Ok(Self { kind, url })
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or("unknown")
    }
}

/// One latency probe target plus an ordered, cyclic list of download targets
///
/// Download order only matters for deterministic rotation; no target is
/// preferred over another.
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    probe: Target,
    downloads: Vec<Target>,
}

impl TargetRegistry {
    pub fn new(probe_url: &str, download_urls: &[String]) -> Result<Self> {
        if download_urls.is_empty() {
            return Err(AppError::validation("At least one download target is required"));
        }

        let probe = Target::new(TargetKind::LatencyProbe, probe_url)?;
        let downloads = download_urls
            .iter()
            .map(|url| Target::new(TargetKind::Download, url))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { probe, downloads })
    }

    /// Registry of the built-in public endpoints
    pub fn builtin() -> Result<Self> {
        let downloads: Vec<String> = crate::defaults::DEFAULT_DOWNLOAD_TARGETS
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self::new(crate::defaults::DEFAULT_PING_TARGET, &downloads)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.ping_target, &config.download_targets)
    }

    pub fn probe(&self) -> &Target {
        &self.probe
    }

    pub fn downloads(&self) -> &[Target] {
        &self.downloads
    }

    pub fn download_count(&self) -> usize {
        self.downloads.len()
    }

    /// Download target at `cursor`, wrapping around the list
    pub fn download_at(&self, cursor: usize) -> &Target {
        &self.downloads[cursor % self.downloads.len()]
    }

    /// Starting cursor for a download loop, so concurrent loops begin on different hosts
    pub fn start_cursor(&self, loop_index: usize) -> usize {
        loop_index % self.downloads.len()
    }

    /// Cursor after a failure on `cursor`
    pub fn next_cursor(&self, cursor: usize) -> usize {
        (cursor + 1) % self.downloads.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(count: usize) -> TargetRegistry {
        let urls: Vec<String> = (0..count).map(|i| format!("https://cdn{}.test/file.bin", i)).collect();
        TargetRegistry::new("https://probe.test/favicon.ico", &urls).unwrap()
    }

    #[test]
    fn test_builtin_registry() {
        let registry = TargetRegistry::builtin().unwrap();
        assert_eq!(registry.download_count(), 4);
        assert_eq!(registry.probe().kind(), TargetKind::LatencyProbe);
        assert!(registry.downloads().iter().all(|t| t.kind() == TargetKind::Download));
    }

    #[test]
    fn test_start_cursors_spread_loops() {
        let registry = registry(4);
        assert_eq!(registry.start_cursor(0), 0);
        assert_eq!(registry.start_cursor(1), 1);
        assert_eq!(registry.start_cursor(5), 1);

        let registry = registry_of_one();
        assert_eq!(registry.start_cursor(3), 0);
    }

    fn registry_of_one() -> TargetRegistry {
        registry(1)
    }

    #[test]
    fn test_rotation_wraps_around() {
        let registry = registry(3);
        assert_eq!(registry.next_cursor(0), 1);
        assert_eq!(registry.next_cursor(2), 0);
        assert_eq!(registry.download_at(4).host(), "cdn1.test");
    }

    #[test]
    fn test_rejects_bad_targets() {
        assert!(TargetRegistry::new("https://probe.test", &[]).is_err());
        assert!(TargetRegistry::new("mailto:x@y.z", &["https://a.test".to_string()]).is_err());
        assert!(TargetRegistry::new("https://probe.test", &["not a url".to_string()]).is_err());
    }
}
