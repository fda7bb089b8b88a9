// # IP Source Trait
//
// Defines the interface for discovering the current public address.
//
// ## Implementations
//
// - HTTP lookup services: `dyndns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::{IpSource, IpVersion};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let ipv4 = source.resolve(IpVersion::V4).await?;
//     println!("public IPv4: {}", ipv4);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::address::IpVersion;

/// Trait for IP source implementations
///
/// An IP source answers one question: "what is my public address for this
/// IP version right now?". It is queried once per version per cycle.
///
/// ## Allowed Capabilities
/// - ✅ Perform bounded-time network requests to lookup services
///
/// ## Forbidden Capabilities
/// - ❌ Access the state store (owned by `DdnsEngine`)
/// - ❌ Decide whether an update is needed (owned by `DdnsEngine`)
/// - ❌ Spawn background tasks or poll on its own schedule (owned by `Scheduler`)
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Resolve the current public address for `version`
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: A syntactically valid address, whitespace-trimmed
    /// - `Err(Error::NotFound)`: No lookup service produced a valid address
    async fn resolve(&self, version: IpVersion) -> Result<String, crate::Error>;

    /// Name used in log lines
    fn source_name(&self) -> &'static str;
}
