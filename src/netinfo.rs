//! Public IP, ISP and location lookup
//!
//! Several free lookup services are tried in order so that one blocked or
//! rate-limited provider does not leave the header empty. The lookup never
//! fails: when every provider is unavailable the caller gets placeholder
//! values.

use crate::error::{AppError, Result};
use crate::models::NetworkInfo;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;

/// Timeout applied to each provider
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(3);

/// Source of the caller's public network identity
#[async_trait]
pub trait NetworkInfoSource: Send + Sync {
    async fn fetch_network_info(&self) -> NetworkInfo;
}

/// Supported lookup services, in default order of preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    IpApi,
    IpWhoIs,
    IpInfo,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::IpApi, Provider::IpWhoIs, Provider::IpInfo];

    pub fn default_url(&self) -> &'static str {
        match self {
            Provider::IpApi => "https://ipapi.co/json/",
            Provider::IpWhoIs => "https://ipwho.is/",
            Provider::IpInfo => "https://ipinfo.io/json",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::IpApi => "ipapi.co",
            Provider::IpWhoIs => "ipwho.is",
            Provider::IpInfo => "ipinfo.io",
        }
    }

    /// Extract network info from a provider response, `None` if it reports failure
    pub fn parse(&self, data: &Value) -> Option<NetworkInfo> {
        match self {
            Provider::IpApi => {
                if data.get("error").and_then(Value::as_bool).unwrap_or(false) {
                    return None;
                }
                let ip = text(data, "ip")?;
                Some(NetworkInfo {
                    ip: ip.to_string(),
                    isp: text(data, "org")
                        .or_else(|| text(data, "asn"))
                        .unwrap_or("Unknown Provider")
                        .to_string(),
                    location: join_location(text(data, "city"), text(data, "country_name").or_else(|| text(data, "country_code"))),
                    address_family: text(data, "version").unwrap_or("IPv4").to_string(),
                })
            }
            Provider::IpWhoIs => {
                if !data.get("success").and_then(Value::as_bool).unwrap_or(false) {
                    return None;
                }
                let connection = data.get("connection").unwrap_or(&Value::Null);
                Some(NetworkInfo {
                    ip: text(data, "ip")?.to_string(),
                    isp: text(connection, "isp")
                        .or_else(|| text(connection, "org"))
                        .or_else(|| text(data, "isp"))
                        .unwrap_or("Unknown Provider")
                        .to_string(),
                    location: join_location(text(data, "city"), text(data, "country_code")),
                    address_family: text(data, "type").unwrap_or("IPv4").to_string(),
                })
            }
            Provider::IpInfo => Some(NetworkInfo {
                ip: text(data, "ip").unwrap_or("Unknown").to_string(),
                isp: text(data, "org")
                    .map(strip_as_number)
                    .unwrap_or_else(|| "Unknown".to_string()),
                location: match text(data, "city") {
                    Some(city) => join_location(Some(city), text(data, "country")),
                    None => "Unknown".to_string(),
                },
                address_family: "IPv4".to_string(),
            }),
        }
    }
}

/// Non-empty string field of a JSON object
fn text<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn join_location(city: Option<&str>, country: Option<&str>) -> String {
    match (city, country) {
        (Some(city), Some(country)) => format!("{}, {}", city, country),
        (Some(place), None) | (None, Some(place)) => place.to_string(),
        (None, None) => "Unknown".to_string(),
    }
}

/// "AS13335 Cloudflare, Inc." -> "Cloudflare, Inc."
pub fn strip_as_number(org: &str) -> String {
    static AS_PREFIX: OnceLock<Option<Regex>> = OnceLock::new();
    match AS_PREFIX.get_or_init(|| Regex::new(r"^AS\d+\s").ok()) {
        Some(re) => re.replace(org, "").into_owned(),
        None => org.to_string(),
    }
}

/// Queries the providers in order until one answers
pub struct NetworkInfoFetcher {
    client: Client,
    providers: Vec<(Provider, String)>,
    timeout: Duration,
}

impl NetworkInfoFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            providers: Provider::ALL.iter().map(|p| (*p, p.default_url().to_string())).collect(),
            timeout: PROVIDER_TIMEOUT,
        }
    }

    /// Point `provider` at a different URL
    pub fn with_provider_url(mut self, provider: Provider, url: impl Into<String>) -> Self {
        let url = url.into();
        for (candidate, current) in &mut self.providers {
            if *candidate == provider {
                *current = url.clone();
            }
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn query(&self, provider: Provider, url: &str) -> Result<Option<NetworkInfo>> {
        let response = self.client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::network(format!("{} lookup failed: {}", provider.name(), e)))?;

        if !response.status().is_success() {
            return Err(AppError::network(format!(
                "{} returned {}",
                provider.name(),
                response.status()
            )));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| AppError::parse(format!("{} sent unreadable JSON: {}", provider.name(), e)))?;

        Ok(provider.parse(&data))
    }
}

#[async_trait]
impl NetworkInfoSource for NetworkInfoFetcher {
    async fn fetch_network_info(&self) -> NetworkInfo {
        for (provider, url) in &self.providers {
            // Failures fall through to the next provider
            if let Ok(Some(info)) = self.query(*provider, url).await {
                return info;
            }
        }
        NetworkInfo::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_strip_as_number() {
        assert_eq!(strip_as_number("AS13335 Cloudflare, Inc."), "Cloudflare, Inc.");
        assert_eq!(strip_as_number("Comcast Cable"), "Comcast Cable");
        assert_eq!(strip_as_number("ASN Telecom"), "ASN Telecom");
    }

    #[test]
    fn test_parse_ipapi() {
        let data = json!({
            "ip": "203.0.113.7", "org": "Example ISP", "city": "Lisbon",
            "country_name": "Portugal", "version": "IPv4"
        });
        let info = Provider::IpApi.parse(&data).unwrap();
        assert_eq!(info.isp, "Example ISP");
        assert_eq!(info.location, "Lisbon, Portugal");

        assert!(Provider::IpApi.parse(&json!({ "error": true, "reason": "RateLimited" })).is_none());
    }

    #[test]
    fn test_parse_ipwhois() {
        let data = json!({
            "success": true, "ip": "2001:db8::1", "type": "IPv6", "city": "Oslo",
            "country_code": "NO", "connection": { "org": "Fiber AS" }
        });
        let info = Provider::IpWhoIs.parse(&data).unwrap();
        assert_eq!(info.isp, "Fiber AS");
        assert_eq!(info.location, "Oslo, NO");
        assert_eq!(info.address_family, "IPv6");

        assert!(Provider::IpWhoIs.parse(&json!({ "success": false })).is_none());
    }

    #[test]
    fn test_parse_ipinfo() {
        let info = Provider::IpInfo
            .parse(&json!({ "ip": "198.51.100.4", "org": "AS64500 Example Net" }))
            .unwrap();
        assert_eq!(info.isp, "Example Net");
        assert_eq!(info.location, "Unknown");
        assert_eq!(info.address_family, "IPv4");
    }

    fn fetcher(server: &MockServer) -> NetworkInfoFetcher {
        NetworkInfoFetcher::new(Client::new())
            .with_provider_url(Provider::IpApi, format!("{}/ipapi", server.uri()))
            .with_provider_url(Provider::IpWhoIs, format!("{}/ipwho", server.uri()))
            .with_provider_url(Provider::IpInfo, format!("{}/ipinfo", server.uri()))
            .with_timeout(Duration::from_millis(300))
    }

    #[tokio::test]
    async fn test_falls_back_to_later_providers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ipapi"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ipwho"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ipinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ip": "192.0.2.1", "org": "AS64501 Third Choice", "city": "Austin", "country": "US"
            })))
            .mount(&server)
            .await;

        let info = fetcher(&server).fetch_network_info().await;
        assert_eq!(info.ip, "192.0.2.1");
        assert_eq!(info.isp, "Third Choice");
        assert_eq!(info.location, "Austin, US");
    }

    #[tokio::test]
    async fn test_first_provider_wins() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ipapi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ip": "192.0.2.9", "asn": "AS64502", "city": "Paris", "country_code": "FR"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ipinfo"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let info = fetcher(&server).fetch_network_info().await;
        assert_eq!(info.isp, "AS64502");
        assert_eq!(info.location, "Paris, FR");
    }

    #[tokio::test]
    async fn test_all_providers_failing_gives_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let info = fetcher(&server).fetch_network_info().await;
        assert_eq!(info, NetworkInfo::unknown());
    }
}
