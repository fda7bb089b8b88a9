// # DNS Provider Trait
//
// Defines the interface for sending one update request per hostname.
//
// ## Implementations
//
// - DynDNS2 protocol: `dyndns-provider-dyndns2` crate
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::{DnsProvider, UpdateRequest};
//
// #[tokio::main]
// async fn main() {
//     let provider = /* DnsProvider implementation */;
//
//     let request = UpdateRequest::new("home.example.com")
//         .with_ipv4("203.0.113.5");
//     let outcome = provider.update_record(&request).await;
//     println!("{}", outcome);
// }
// ```

use async_trait::async_trait;
use serde::Serialize;

use crate::response::UpdateOutcome;

/// Parameters of a single hostname update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateRequest {
    /// Hostname to update
    pub hostname: String,
    /// IPv4 address to publish, if one was resolved
    pub ipv4: Option<String>,
    /// IPv6 address to publish, if one was resolved
    pub ipv6: Option<String>,
}

impl UpdateRequest {
    /// Create a request for `hostname` with no addresses
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ipv4: None,
            ipv6: None,
        }
    }

    /// Attach an IPv4 address
    pub fn with_ipv4(mut self, ip: impl Into<String>) -> Self {
        self.ipv4 = Some(ip.into());
        self
    }

    /// Attach an IPv6 address
    pub fn with_ipv6(mut self, ip: impl Into<String>) -> Self {
        self.ipv6 = Some(ip.into());
        self
    }
}

/// Trait for DNS provider implementations
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform one HTTP/HTTPS call to the provider endpoint per invocation
/// - ✅ Parse the provider response into an [`UpdateOutcome`]
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (the next scheduled cycle is the retry)
/// - ❌ Access the state store (owned by `DdnsEngine`)
/// - ❌ Decide whether an update is needed (owned by `DdnsEngine`)
///
/// The call is total: transport failures surface as
/// [`UpdateOutcome::EmptyResponse`] rather than as an error.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Send one update request and classify the answer
    async fn update_record(&self, request: &UpdateRequest) -> UpdateOutcome;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
