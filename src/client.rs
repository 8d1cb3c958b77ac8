//! HTTP client construction, cache-defeating URLs and host connectivity checks

use crate::error::{AppError, Result};
use crate::models::Config;
use async_trait::async_trait;
use reqwest::Client;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use url::Url;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Connect timeout applied to every connection the shared client opens
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the shared `reqwest::Client` used by all measurement phases
pub struct ClientFactory;

impl ClientFactory {
    /// Client with the defaults used by the CLI
    ///
    /// No overall timeout is set on the client itself: the latency probe and
    /// the download sampler each enforce their own deadlines per request.
    pub fn create() -> Result<Client> {
        Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))
    }

    /// Client sized for the configured number of download loops
    pub fn for_config(config: &Config) -> Result<Client> {
        Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT.min(config.request_timeout()))
            .pool_max_idle_per_host(config.concurrency)
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))
    }
}

/// Append a cache-defeating `t` query parameter to `url`
pub fn cache_busted(url: &Url, token: &str) -> Url {
    let mut busted = url.clone();
    busted.query_pairs_mut().append_pair("t", token);
    busted
}

/// Source of the host's own view of network availability
#[async_trait]
pub trait ConnectivityCheck: Send + Sync {
    /// Whether the host believes it has a usable network route
    async fn is_online(&self) -> bool;
}

/// Connectivity as reported by the operating system's routing table
///
/// Connecting a UDP socket sends no packets but fails when the host has no
/// route to the address, which is what "offline" means here.
pub struct SystemConnectivity {
    probes: Vec<SocketAddr>,
}

impl SystemConnectivity {
    pub fn new() -> Self {
        Self {
            probes: vec![
                SocketAddr::from(([1, 1, 1, 1], 53)),
                SocketAddr::from(([0x2606, 0x4700, 0x4700, 0, 0, 0, 0, 0x1111], 53)),
            ],
        }
    }

    async fn has_route(addr: SocketAddr) -> bool {
        let bind: SocketAddr = if addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        match UdpSocket::bind(bind).await {
            Ok(socket) => socket.connect(addr).await.is_ok(),
            Err(_) => false,
        }
    }
}

impl Default for SystemConnectivity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectivityCheck for SystemConnectivity {
    async fn is_online(&self) -> bool {
        for addr in &self.probes {
            if Self::has_route(*addr).await {
                return true;
            }
        }
        false
    }
}

/// Fixed connectivity answer, for hosts where the routing table is not meaningful
pub struct StaticConnectivity(pub bool);

#[async_trait]
impl ConnectivityCheck for StaticConnectivity {
    async fn is_online(&self) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_busted_appends_token() {
        let url = Url::parse("https://cdn.test/image.jpg").unwrap();
        let busted = cache_busted(&url, "1700000000000-1");
        assert_eq!(busted.as_str(), "https://cdn.test/image.jpg?t=1700000000000-1");
        // original is untouched
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_cache_busted_keeps_existing_query() {
        let url = Url::parse("https://cdn.test/down?bytes=1000").unwrap();
        let busted = cache_busted(&url, "42");
        assert_eq!(busted.query(), Some("bytes=1000&t=42"));
    }

    #[test]
    fn test_client_factory() {
        assert!(ClientFactory::create().is_ok());
        assert!(ClientFactory::for_config(&Config::default()).is_ok());
    }

    #[tokio::test]
    async fn test_static_connectivity() {
        assert!(StaticConnectivity(true).is_online().await);
        assert!(!StaticConnectivity(false).is_online().await);
    }
}
