// # State Store Trait
//
// Defines the interface for the last-known address cache.
//
// ## Purpose
//
// The state store enables smart updates by tracking:
// - The last known IPv4 address
// - The last known IPv6 address
// - The time the last cycle completed (liveness signal)
//
// ## Implementations
//
// - File-based: one plain-text file per value
// - Memory: for tests and embedders

use async_trait::async_trait;

use crate::address::IpVersion;

/// Trait for state store implementations
///
/// Accessed from a single control flow; implementations only need to be
/// `Send + Sync` so the engine can be moved into a task.
///
/// # Trust Level: Trusted (Core Component)
///
/// ## Allowed Capabilities
/// - ✅ Perform I/O for persistent storage
///
/// ## Forbidden Capabilities
/// - ❌ Perform DNS updates (owned by `DnsProvider`)
/// - ❌ Decide when to update (owned by `DdnsEngine`)
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the last known address for `version`
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The cached value, or an empty string if none exists
    /// - `Err(Error)`: Storage error other than "absent"
    async fn read(&self, version: IpVersion) -> Result<String, crate::Error>;

    /// Overwrite the last known address for `version`
    async fn write(&self, version: IpVersion, value: &str) -> Result<(), crate::Error>;

    /// Record the completion time of a cycle (epoch seconds)
    async fn record_cycle_timestamp(&self, epoch_secs: i64) -> Result<(), crate::Error>;

    /// Completion time of the last cycle, if any cycle ever completed
    async fn last_cycle_timestamp(&self) -> Result<Option<i64>, crate::Error>;
}
