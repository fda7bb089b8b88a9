// # DynDNS2 Provider
//
// Sends hostname updates using the DynDNS2 protocol (`/nic/update`), as
// spoken by ipv64.net, dyndns.org, No-IP and most router-compatible services.
//
// ## Request
//
// One HTTP GET per hostname:
//
// ```text
// GET <update_url>?hostname=<host>[&myip=<v4>][&myipv6=<v6>]
// Authorization: Basic base64(<token>:<token>)
// ```
//
// - `myip` is sent only when an IPv4 address was resolved
// - `myipv6` is sent only when IPv6 detection is enabled and an address was resolved
// - Timeouts: 10s connect, 30s total
//
// ## Response
//
// The body is read regardless of HTTP status and handed to
// [`UpdateOutcome::classify`]. Transport failures are reported as
// [`UpdateOutcome::EmptyResponse`]. No retries: the next cycle is the retry.
//
// ## Security
//
// - The token NEVER appears in logs or Debug output

use async_trait::async_trait;
use dyndns_core::traits::{DnsProvider, UpdateRequest};
use dyndns_core::{Error, Result, UpdateOutcome};
use std::time::Duration;
use tracing::{debug, warn};

/// Connect timeout for update requests
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total timeout for update requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with every update request
const USER_AGENT: &str = concat!("dyndns/", env!("CARGO_PKG_VERSION"));

/// DynDNS2 protocol provider
pub struct DynDns2Provider {
    /// Update endpoint, e.g. `https://ipv64.net/nic/update`
    update_url: String,

    /// Account token, used as both Basic auth user and password
    /// ⚠️ NEVER log this value
    token: String,

    /// Whether `myipv6` may be sent
    send_ipv6: bool,

    client: reqwest::Client,
}

// Custom Debug implementation that hides the token
impl std::fmt::Debug for DynDns2Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynDns2Provider")
            .field("update_url", &self.update_url)
            .field("token", &"<REDACTED>")
            .field("send_ipv6", &self.send_ipv6)
            .finish()
    }
}

impl DynDns2Provider {
    /// Create a new DynDNS2 provider
    ///
    /// # Parameters
    ///
    /// - `update_url`: Provider update endpoint
    /// - `token`: Account token (must not be empty)
    /// - `send_ipv6`: Whether IPv6 detection is enabled
    pub fn new(
        update_url: impl Into<String>,
        token: impl Into<String>,
        send_ipv6: bool,
    ) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::config("DynDNS2 token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            update_url: update_url.into(),
            token,
            send_ipv6,
            client,
        })
    }

    /// Query parameters for one request, in wire order
    fn query_params<'a>(&self, request: &'a UpdateRequest) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![("hostname", request.hostname.as_str())];

        if let Some(ip) = &request.ipv4 {
            params.push(("myip", ip.as_str()));
        }

        if self.send_ipv6
            && let Some(ip) = &request.ipv6
        {
            params.push(("myipv6", ip.as_str()));
        }

        params
    }

    /// Perform the request and return the raw body
    async fn send(&self, request: &UpdateRequest) -> std::result::Result<String, reqwest::Error> {
        let response = self
            .client
            .get(&self.update_url)
            .query(&self.query_params(request))
            .basic_auth(&self.token, Some(&self.token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!("{} answered HTTP {}", request.hostname, status);
        }

        response.text().await
    }
}

#[async_trait]
impl DnsProvider for DynDns2Provider {
    async fn update_record(&self, request: &UpdateRequest) -> UpdateOutcome {
        match self.send(request).await {
            Ok(body) => {
                debug!("{} response body: {:?}", request.hostname, body.trim());
                UpdateOutcome::classify(&body)
            }
            Err(e) => {
                // reqwest errors carry the URL but never the auth header
                warn!("Update request for {} failed: {}", request.hostname, e);
                UpdateOutcome::EmptyResponse
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "dyndns2"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{basic_auth, header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer, send_ipv6: bool) -> DynDns2Provider {
        DynDns2Provider::new(format!("{}/nic/update", server.uri()), "T", send_ipv6).unwrap()
    }

    #[tokio::test]
    async fn test_sends_hostname_ip_and_auth() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/nic/update"))
            .and(query_param("hostname", "a.example.com"))
            .and(query_param("myip", "203.0.113.5"))
            .and(query_param_is_missing("myipv6"))
            .and(basic_auth("T", "T"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("good 203.0.113.5"))
            .expect(1)
            .mount(&server)
            .await;

        let request = UpdateRequest::new("a.example.com").with_ipv4("203.0.113.5");
        let outcome = provider(&server, false).update_record(&request).await;

        assert_eq!(
            outcome,
            UpdateOutcome::Good {
                ip: Some("203.0.113.5".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_ipv6_sent_only_when_enabled() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("myipv6", "2001:db8::1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("good"))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(query_param_is_missing("myipv6"))
            .respond_with(ResponseTemplate::new(200).set_body_string("nochg"))
            .expect(1)
            .mount(&server)
            .await;

        let request = UpdateRequest::new("a.example.com")
            .with_ipv4("203.0.113.5")
            .with_ipv6("2001:db8::1");

        let enabled = provider(&server, true).update_record(&request).await;
        let disabled = provider(&server, false).update_record(&request).await;

        assert_eq!(enabled, UpdateOutcome::Good { ip: None });
        assert_eq!(disabled, UpdateOutcome::NoChange { ip: None });
    }

    #[tokio::test]
    async fn test_myip_omitted_when_unresolved() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("hostname", "a.example.com"))
            .and(query_param_is_missing("myip"))
            .and(query_param("myipv6", "2001:db8::1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("good"))
            .expect(1)
            .mount(&server)
            .await;

        let request = UpdateRequest::new("a.example.com").with_ipv6("2001:db8::1");
        let outcome = provider(&server, true).update_record(&request).await;

        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_body_classified_regardless_of_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("badauth\n"))
            .mount(&server)
            .await;

        let request = UpdateRequest::new("a.example.com").with_ipv4("203.0.113.5");
        let outcome = provider(&server, false).update_record(&request).await;

        assert_eq!(outcome, UpdateOutcome::BadAuth);
    }

    #[tokio::test]
    async fn test_empty_and_unknown_bodies() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("hostname", "empty.example.com"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(query_param("hostname", "odd.example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let provider = provider(&server, false);

        let outcome = provider
            .update_record(&UpdateRequest::new("empty.example.com"))
            .await;
        assert_eq!(outcome, UpdateOutcome::EmptyResponse);

        let outcome = provider
            .update_record(&UpdateRequest::new("odd.example.com"))
            .await;
        assert_eq!(
            outcome,
            UpdateOutcome::Unrecognized {
                body: "maintenance".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_empty_response() {
        let provider = DynDns2Provider::new("http://127.0.0.1:9/nic/update", "T", false).unwrap();
        let outcome = provider
            .update_record(&UpdateRequest::new("a.example.com"))
            .await;
        assert_eq!(outcome, UpdateOutcome::EmptyResponse);
    }

    #[test]
    fn test_empty_token_rejected() {
        let result = DynDns2Provider::new("https://ipv64.net/nic/update", "  ", false);
        assert!(result.is_err());
    }

    #[test]
    fn test_token_not_exposed_in_debug() {
        let provider =
            DynDns2Provider::new("https://ipv64.net/nic/update", "secret_token_12345", true)
                .unwrap();
        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_token_12345"));
        assert!(debug_str.contains("<REDACTED>"));
    }
}
