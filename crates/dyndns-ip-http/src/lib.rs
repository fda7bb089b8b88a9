// # HTTP IP Source
//
// Discovers the public address by asking plain-text lookup services
// ("what is my IP") over HTTP.
//
// ## Fallback Order
//
// Services are tried strictly in order, one at a time. The first one that
// answers with a 2xx status and a well-formed address wins; later services
// are never contacted. A failing service (transport error, non-2xx status,
// malformed body) is logged at debug level and the next one is tried.
//
// ## Timeouts
//
// Every request is bounded by a 5s connect timeout and a 10s total timeout.

use dyndns_core::address::is_valid_address;
use dyndns_core::traits::IpSource;
use dyndns_core::{DdnsConfig, Error, IpVersion, Result};

use std::time::Duration;
use tracing::{debug, warn};

/// Connect timeout per lookup request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Total timeout per lookup request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// IP source backed by HTTP lookup services
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    ipv4_services: Vec<String>,
    ipv6_services: Vec<String>,
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `ipv4_services`: IPv4 lookup URLs, in the order they are tried
    /// - `ipv6_services`: IPv6 lookup URLs, in the order they are tried
    pub fn new(ipv4_services: Vec<String>, ipv6_services: Vec<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            ipv4_services,
            ipv6_services,
            client,
        })
    }

    /// Create a source using the lookup services from the configuration
    pub fn from_config(config: &DdnsConfig) -> Result<Self> {
        Self::new(config.ipv4_services.clone(), config.ipv6_services.clone())
    }

    fn services(&self, version: IpVersion) -> &[String] {
        match version {
            IpVersion::V4 => &self.ipv4_services,
            IpVersion::V6 => &self.ipv6_services,
        }
    }

    /// Query one service and validate its answer
    async fn query(&self, url: &str, version: IpVersion) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::http(format!("HTTP error: {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        let address = body.trim();
        if !is_valid_address(version, address) {
            return Err(Error::ip_source(format!(
                "not a valid {} address: {:?}",
                version, address
            )));
        }

        Ok(address.to_string())
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn resolve(&self, version: IpVersion) -> Result<String> {
        let services = self.services(version);

        for url in services {
            match self.query(url, version).await {
                Ok(address) => {
                    debug!("{} lookup via {} returned {}", version, url, address);
                    return Ok(address);
                }
                Err(e) => debug!("{} lookup via {} failed: {}", version, url, e),
            }
        }

        warn!(
            "All {} {} lookup service(s) failed",
            services.len(),
            version
        );
        Err(Error::not_found(format!(
            "no {} lookup service returned a valid address",
            version
        )))
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_body(server: &MockServer, route: &str, status: u16, body: &str, hits: u64) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .expect(hits)
            .mount(server)
            .await;
    }

    fn source(v4: &[String], v6: &[String]) -> HttpIpSource {
        HttpIpSource::new(v4.to_vec(), v6.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_first_valid_answer_wins() {
        let server = MockServer::start().await;
        mount_body(&server, "/one", 200, "not an address", 1).await;
        mount_body(&server, "/two", 200, "203.0.113.5\n", 1).await;
        mount_body(&server, "/three", 200, "198.51.100.1", 0).await;

        let services = vec![
            format!("{}/one", server.uri()),
            format!("{}/two", server.uri()),
            format!("{}/three", server.uri()),
        ];
        let ip = source(&services, &[]).resolve(IpVersion::V4).await.unwrap();

        assert_eq!(ip, "203.0.113.5");
    }

    #[tokio::test]
    async fn test_non_success_status_falls_through() {
        let server = MockServer::start().await;
        mount_body(&server, "/down", 503, "203.0.113.9", 1).await;
        mount_body(&server, "/up", 200, "  203.0.113.5  ", 1).await;

        let services = vec![
            format!("{}/down", server.uri()),
            format!("{}/up", server.uri()),
        ];
        let ip = source(&services, &[]).resolve(IpVersion::V4).await.unwrap();

        assert_eq!(ip, "203.0.113.5");
    }

    #[tokio::test]
    async fn test_unreachable_service_falls_through() {
        let server = MockServer::start().await;
        mount_body(&server, "/ip", 200, "203.0.113.5", 1).await;

        // Port 9 on localhost is expected to refuse connections
        let services = vec![
            "http://127.0.0.1:9/ip".to_string(),
            format!("{}/ip", server.uri()),
        ];
        let ip = source(&services, &[]).resolve(IpVersion::V4).await.unwrap();

        assert_eq!(ip, "203.0.113.5");
    }

    #[tokio::test]
    async fn test_all_services_failing_is_not_found() {
        let server = MockServer::start().await;
        mount_body(&server, "/a", 500, "", 1).await;
        mount_body(&server, "/b", 200, "<html>blocked</html>", 1).await;

        let services = vec![format!("{}/a", server.uri()), format!("{}/b", server.uri())];
        let result = source(&services, &[]).resolve(IpVersion::V4).await;

        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_versions_use_their_own_lists() {
        let server = MockServer::start().await;
        mount_body(&server, "/v4", 200, "203.0.113.5", 0).await;
        mount_body(&server, "/v6", 200, "2001:db8::1\n", 1).await;

        let source = source(
            &[format!("{}/v4", server.uri())],
            &[format!("{}/v6", server.uri())],
        );
        let ip = source.resolve(IpVersion::V6).await.unwrap();

        assert_eq!(ip, "2001:db8::1");
    }

    #[tokio::test]
    async fn test_ipv4_answer_rejected_for_ipv6() {
        let server = MockServer::start().await;
        mount_body(&server, "/v6", 200, "203.0.113.5", 1).await;

        let source = source(&[], &[format!("{}/v6", server.uri())]);
        assert!(source.resolve(IpVersion::V6).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_service_list_is_not_found() {
        let source = source(&[], &[]);
        assert!(matches!(
            source.resolve(IpVersion::V6).await,
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_from_config_uses_configured_lists() {
        let config = DdnsConfig::new("T", ["a.example.com"]);
        let source = HttpIpSource::from_config(&config).unwrap();
        assert_eq!(source.services(IpVersion::V4), config.ipv4_services.as_slice());
        assert_eq!(source.services(IpVersion::V6), config.ipv6_services.as_slice());
        assert_eq!(source.source_name(), "http");
    }
}
